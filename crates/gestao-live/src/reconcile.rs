//! Translates inbound frames into store writes.
//!
//! Every payload-bearing message is a full snapshot, so applying one is a
//! wholesale replacement of a single collection and the last frame of a
//! given type wins. A frame that fails to decode is dropped before it can
//! touch the store.

use gestao_core::message::{ServerMessage, UpdateAction};
use strum::Display;
use tracing::{debug, warn};

use crate::{notice::Notice, store::Store};

/// Longest frame excerpt written to the log.
const FRAME_PREVIEW_CHARS: usize = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Collection {
  /// Departments, constructions and (when present) sectors.
  Reference,
  Employees,
  Dashboard,
}

/// What a single frame did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
  Replaced(Collection),
  Notice(Notice),
  /// Valid but carried nothing to apply.
  Ignored,
  /// Failed to decode.
  Dropped,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
  pub replaced: u64,
  pub notices:  u64,
  pub ignored:  u64,
  pub dropped:  u64,
}

#[derive(Debug, Default)]
pub struct Reconciler {
  stats: FrameStats,
}

impl Reconciler {
  pub fn new() -> Self { Self::default() }

  pub fn stats(&self) -> FrameStats { self.stats }

  /// Decode and apply one raw text frame.
  pub fn handle_frame(&mut self, store: &mut Store, text: &str) -> Applied {
    let applied = match ServerMessage::parse(text) {
      Ok(message) => self.apply(store, message),
      Err(e) => {
        warn!(error = %e, frame = %preview(text), "dropping malformed frame");
        Applied::Dropped
      }
    };
    match &applied {
      Applied::Replaced(_) => self.stats.replaced += 1,
      Applied::Notice(_) => self.stats.notices += 1,
      Applied::Ignored => self.stats.ignored += 1,
      Applied::Dropped => self.stats.dropped += 1,
    }
    applied
  }

  /// Apply an already decoded message.
  pub fn apply(&self, store: &mut Store, message: ServerMessage) -> Applied {
    let kind = message.kind();
    match message {
      ServerMessage::InitialData { data: Some(data) } => {
        debug!(
          kind,
          departments = data.departments.len(),
          constructions = data.constructions.len(),
          "replacing reference data"
        );
        store.replace_reference(data);
        Applied::Replaced(Collection::Reference)
      }
      ServerMessage::EmployeesUpdate { data: Some(employees) } => {
        debug!(kind, count = employees.len(), "replacing employees");
        store.replace_employees(employees);
        Applied::Replaced(Collection::Employees)
      }
      ServerMessage::DashboardUpdate { data: Some(dashboard) } => {
        debug!(kind, "replacing dashboard");
        store.replace_dashboard(dashboard);
        Applied::Replaced(Collection::Dashboard)
      }
      ServerMessage::InitialData { data: None }
      | ServerMessage::EmployeesUpdate { data: None }
      | ServerMessage::DashboardUpdate { data: None } => {
        debug!(kind, "snapshot without data");
        Applied::Ignored
      }
      ServerMessage::Update { action: Some(action), message } => {
        match notice_for(action, message) {
          Some(notice) => Applied::Notice(notice),
          None => {
            debug!(kind, action = action.as_ref(), "no notice for action");
            Applied::Ignored
          }
        }
      }
      ServerMessage::Update { action: None, .. } => Applied::Ignored,
      ServerMessage::Error { message } => {
        warn!(
          message = message.as_deref().unwrap_or("<none>"),
          "server rejected a request"
        );
        Applied::Ignored
      }
      ServerMessage::Unknown => {
        debug!("ignoring message of unknown type");
        Applied::Ignored
      }
    }
  }
}

fn notice_for(action: UpdateAction, message: Option<String>) -> Option<Notice> {
  let (title, detail) = match action {
    UpdateAction::EmployeeCreated => {
      ("Employee created", "A new employee was added.")
    }
    UpdateAction::EmployeeUpdated => {
      ("Employee updated", "An employee's details were updated.")
    }
    UpdateAction::EmployeeDeleted => {
      ("Employee removed", "An employee was removed.")
    }
    UpdateAction::PaymentRegistered => {
      ("Payment registered", "A payment was registered.")
    }
    UpdateAction::PaymentsReset => {
      ("Payments reset", "Payment statuses were reset for a new cycle.")
    }
    UpdateAction::PaymentStatusChanged => {
      ("Payment status changed", "A payment status was changed.")
    }
    UpdateAction::ConstructionCreated => {
      ("Construction created", "A new construction was added.")
    }
    UpdateAction::ConstructionUpdated => {
      ("Construction updated", "A construction was updated.")
    }
    UpdateAction::ConstructionDeleted => {
      ("Construction removed", "A construction was removed.")
    }
    UpdateAction::ConstructionSectorCreated => {
      ("Sector created", "A construction sector was added.")
    }
    UpdateAction::DepartmentUpdate => {
      ("Departments updated", "Department data changed.")
    }
    UpdateAction::Other => return None,
  };
  let detail = message
    .filter(|m| !m.trim().is_empty())
    .unwrap_or_else(|| detail.to_string());
  Some(Notice::info(title, detail))
}

fn preview(text: &str) -> String {
  let mut out: String = text.chars().take(FRAME_PREVIEW_CHARS).collect();
  if out.len() < text.len() {
    out.push('…');
  }
  out
}
