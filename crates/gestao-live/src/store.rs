//! View state and its single writer.
//!
//! [`Store`] is owned by the session actor. Everybody else reads through a
//! [`StoreReader`], which always sees a whole `ViewState`: each write swaps
//! one collection in its entirety, or one entity record in its entirety,
//! before readers are notified.

use std::{
  collections::HashMap,
  sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
  },
};

use gestao_core::{
  dashboard::DashboardData,
  employee::{Employee, EmployeeId},
  message::InitialData,
  site::{Construction, ConstructionId, ConstructionSector, Department},
};
use tokio::sync::watch;
use tracing::debug;

use crate::{Error, Result};

// ─── ViewState ───────────────────────────────────────────────────────────────

/// Everything the presentation layer renders from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
  pub departments:   Vec<Department>,
  pub constructions: Vec<Construction>,
  pub sectors:       Vec<ConstructionSector>,
  pub employees:     Vec<Employee>,
  /// `None` until the first dashboard snapshot arrives.
  pub dashboard:     Option<DashboardData>,
}

impl ViewState {
  pub fn employee(&self, id: EmployeeId) -> Option<&Employee> {
    self.employees.iter().find(|e| e.id == id)
  }

  pub fn construction(&self, id: ConstructionId) -> Option<&Construction> {
    self.constructions.iter().find(|c| c.id == id)
  }

  pub fn sectors_of(
    &self,
    construction: ConstructionId,
  ) -> impl Iterator<Item = &ConstructionSector> {
    self
      .sectors
      .iter()
      .filter(move |s| s.construction == construction)
  }
}

// ─── Tickets ─────────────────────────────────────────────────────────────────

/// Issue order of a REST list request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// Hands out increasing [`Ticket`]s. Clones share the same counter.
#[derive(Debug, Clone, Default)]
pub struct Tickets(Arc<AtomicU64>);

impl Tickets {
  pub fn issue(&self) -> Ticket { Ticket(self.0.fetch_add(1, Ordering::SeqCst) + 1) }

  fn latest(&self) -> u64 { self.0.load(Ordering::SeqCst) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Slot {
  Departments,
  Constructions,
  Employees,
  Dashboard,
  Sectors(ConstructionId),
}

// ─── Completions ─────────────────────────────────────────────────────────────

/// The result of a finished REST call, ready to be written.
#[derive(Debug, Clone)]
pub enum Completion {
  Employees { ticket: Ticket, employees: Vec<Employee> },
  Departments { ticket: Ticket, departments: Vec<Department> },
  Constructions { ticket: Ticket, constructions: Vec<Construction> },
  Dashboard { ticket: Ticket, dashboard: DashboardData },
  Sectors {
    ticket:       Ticket,
    construction: ConstructionId,
    sectors:      Vec<ConstructionSector>,
  },
  EmployeeSaved(Employee),
  EmployeeRemoved(EmployeeId),
  ConstructionSaved(Construction),
  ConstructionRemoved(ConstructionId),
}

// ─── Store ───────────────────────────────────────────────────────────────────

pub struct Store {
  tx:            watch::Sender<ViewState>,
  tickets:       Tickets,
  /// Newest ticket whose data each slot reflects.
  applied:       HashMap<Slot, u64>,
  /// Ticket floor for every `Slot::Sectors`, raised when a push replaces
  /// all sectors at once.
  sectors_floor: u64,
}

impl Store {
  pub fn new(tickets: Tickets) -> Self {
    let (tx, _) = watch::channel(ViewState::default());
    Self { tx, tickets, applied: HashMap::new(), sectors_floor: 0 }
  }

  pub fn reader(&self) -> StoreReader { StoreReader(self.tx.subscribe()) }

  pub fn snapshot(&self) -> ViewState { self.tx.borrow().clone() }

  // ── Push writes ───────────────────────────────────────────────────────────

  /// Replace reference data from an `initial_data` snapshot. Sectors are
  /// only touched when the snapshot carries them.
  pub fn replace_reference(&mut self, data: InitialData) {
    self.supersede(Slot::Departments);
    self.supersede(Slot::Constructions);
    let InitialData { departments, constructions, construction_sectors } = data;
    if construction_sectors.is_some() {
      self.sectors_floor = self.tickets.latest();
    }
    self.tx.send_modify(|s| {
      s.departments = departments;
      s.constructions = constructions;
      if let Some(sectors) = construction_sectors {
        s.sectors = sectors;
      }
    });
  }

  pub fn replace_employees(&mut self, employees: Vec<Employee>) {
    self.supersede(Slot::Employees);
    self.tx.send_modify(|s| s.employees = employees);
  }

  pub fn replace_dashboard(&mut self, dashboard: DashboardData) {
    self.supersede(Slot::Dashboard);
    self.tx.send_modify(|s| s.dashboard = Some(dashboard));
  }

  /// A push snapshot is newer than any REST list already in flight for the
  /// same slot.
  fn supersede(&mut self, slot: Slot) {
    self.applied.insert(slot, self.tickets.latest());
  }

  // ── REST writes ───────────────────────────────────────────────────────────

  /// Apply a finished REST call. Returns `false` when a list result was
  /// older than what the slot already holds and was discarded, or when a
  /// removal found nothing to remove.
  pub fn apply(&mut self, completion: Completion) -> bool {
    match completion {
      Completion::Employees { ticket, employees } => {
        self.accept(Slot::Employees, ticket)
          && self.write(|s| s.employees = employees)
      }
      Completion::Departments { ticket, departments } => {
        self.accept(Slot::Departments, ticket)
          && self.write(|s| s.departments = departments)
      }
      Completion::Constructions { ticket, constructions } => {
        self.accept(Slot::Constructions, ticket)
          && self.write(|s| s.constructions = constructions)
      }
      Completion::Dashboard { ticket, dashboard } => {
        self.accept(Slot::Dashboard, ticket)
          && self.write(|s| s.dashboard = Some(dashboard))
      }
      Completion::Sectors { ticket, construction, sectors } => {
        self.accept(Slot::Sectors(construction), ticket)
          && self.replace_sectors_for(construction, sectors)
      }
      Completion::EmployeeSaved(employee) => self.upsert_employee(employee),
      Completion::EmployeeRemoved(id) => self.remove_employee(id),
      Completion::ConstructionSaved(construction) => {
        self.upsert_construction(construction)
      }
      Completion::ConstructionRemoved(id) => self.remove_construction(id),
    }
  }

  // ── Entity writes ─────────────────────────────────────────────────────────

  /// Replace one employee record whole, or append it if unknown.
  pub fn upsert_employee(&mut self, employee: Employee) -> bool {
    self.write(|s| upsert(&mut s.employees, employee, |e| e.id))
  }

  /// Returns whether the employee was present.
  pub fn remove_employee(&mut self, id: EmployeeId) -> bool {
    self
      .tx
      .send_if_modified(|s| remove_by(&mut s.employees, |e| e.id == id))
  }

  pub fn upsert_construction(&mut self, construction: Construction) -> bool {
    self.write(|s| upsert(&mut s.constructions, construction, |c| c.id))
  }

  /// Drops the construction together with its sectors.
  pub fn remove_construction(&mut self, id: ConstructionId) -> bool {
    self.tx.send_if_modified(|s| {
      let removed = remove_by(&mut s.constructions, |c| c.id == id);
      if removed {
        s.sectors.retain(|x| x.construction != id);
      }
      removed
    })
  }

  /// Swap the sectors of one construction, leaving the others alone.
  pub fn replace_sectors_for(
    &mut self,
    construction: ConstructionId,
    sectors: Vec<ConstructionSector>,
  ) -> bool {
    self.write(|s| {
      s.sectors.retain(|x| x.construction != construction);
      s.sectors.extend(sectors);
    })
  }

  fn accept(&mut self, slot: Slot, Ticket(ticket): Ticket) -> bool {
    let floor = match slot {
      Slot::Sectors(_) => self.sectors_floor,
      _ => 0,
    };
    let newest = self.applied.entry(slot).or_insert(0);
    *newest = (*newest).max(floor);
    if ticket <= *newest {
      debug!(?slot, ticket, newest = *newest, "discarding stale REST result");
      return false;
    }
    *newest = ticket;
    true
  }

  fn write(&self, f: impl FnOnce(&mut ViewState)) -> bool {
    self.tx.send_modify(f);
    true
  }
}

fn upsert<T, K: PartialEq>(items: &mut Vec<T>, item: T, key: impl Fn(&T) -> K) {
  let k = key(&item);
  match items.iter_mut().find(|x| key(&**x) == k) {
    Some(slot) => *slot = item,
    None => items.push(item),
  }
}

fn remove_by<T>(items: &mut Vec<T>, pred: impl Fn(&T) -> bool) -> bool {
  let before = items.len();
  items.retain(|x| !pred(x));
  items.len() != before
}

// ─── StoreReader ─────────────────────────────────────────────────────────────

/// Read-only view of the store for the presentation layer.
#[derive(Debug, Clone)]
pub struct StoreReader(watch::Receiver<ViewState>);

impl StoreReader {
  pub fn snapshot(&self) -> ViewState { self.0.borrow().clone() }

  /// Run `f` against the current state without cloning it.
  pub fn with<R>(&self, f: impl FnOnce(&ViewState) -> R) -> R { f(&self.0.borrow()) }

  /// `true` if a write happened since the last [`latest`](Self::latest) or
  /// [`changed`](Self::changed). A closed session counts as unchanged.
  pub fn has_changed(&self) -> bool { self.0.has_changed().unwrap_or(false) }

  /// Snapshot the current state and mark it as seen.
  pub fn latest(&mut self) -> ViewState { self.0.borrow_and_update().clone() }

  /// Wait for the next write.
  pub async fn changed(&mut self) -> Result<()> {
    self.0.changed().await.map_err(|_| Error::SessionClosed)
  }

  /// Wait until `pred` holds and return a snapshot of that state.
  pub async fn wait_for(
    &mut self,
    mut pred: impl FnMut(&ViewState) -> bool,
  ) -> Result<ViewState> {
    let state = self
      .0
      .wait_for(|s| pred(s))
      .await
      .map_err(|_| Error::SessionClosed)?;
    Ok(state.clone())
  }
}
