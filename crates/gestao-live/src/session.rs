//! The live session: one actor task that owns the [`Store`] and applies
//! every event in arrival order.
//!
//! Socket frames, connection changes and REST completions all travel over
//! the same queue, so a handler always runs to completion before the next
//! event is looked at. [`Actions`] is the handle the presentation layer uses
//! to call the REST API; it waits until its result has been written before
//! returning.

use std::{sync::Arc, time::Duration};

use gestao_core::{
  api::Api,
  employee::{Employee, EmployeeId, EmployeeInput, PaymentData},
  message::ClientMessage,
  site::{Construction, ConstructionId, ConstructionInput},
};
use tokio::{
  sync::{broadcast, mpsc, oneshot, watch},
  task::JoinHandle,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::{
  Error, Result,
  config::LiveConfig,
  event::LiveEvent,
  manager::ConnectionManager,
  notice::Notice,
  reconcile::{Applied, Reconciler},
  state::ConnectionState,
  store::{Completion, Store, StoreReader, Tickets},
  transport::Transport,
};

/// Buffered notices per subscriber before the oldest are dropped.
const NOTICE_CAPACITY: usize = 64;

// ─── LiveSession ─────────────────────────────────────────────────────────────

pub struct LiveSession<T: Transport, A> {
  manager: Arc<ConnectionManager<T>>,
  actions: Actions<A>,
  reader:  StoreReader,
  notices: broadcast::Sender<Notice>,
  cancel:  CancellationToken,
  actor:   JoinHandle<()>,
}

impl<T: Transport, A: Api + 'static> LiveSession<T, A> {
  /// Spawn the actor and start connecting to `config.ws_url`.
  ///
  /// Must be called from within a tokio runtime.
  pub fn start(config: LiveConfig, transport: T, api: A) -> Self {
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let (notices, _) = broadcast::channel(NOTICE_CAPACITY);
    let tickets = Tickets::default();
    let store = Store::new(tickets.clone());
    let reader = store.reader();

    let manager = Arc::new(ConnectionManager::new(
      transport,
      config.clone(),
      events_tx.clone(),
    ));
    let cancel = CancellationToken::new();
    let actor = tokio::spawn(run_actor(
      store,
      Arc::clone(&manager),
      notices.clone(),
      events_rx,
      cancel.clone(),
    ));

    let actions = Actions {
      api: Arc::new(api),
      tickets,
      events: events_tx,
      notices: notices.clone(),
      reconcile_delay: config.reconcile_delay(),
    };

    manager.connect(&config.ws_url);

    Self { manager, actions, reader, notices, cancel, actor }
  }

  pub fn store(&self) -> StoreReader { self.reader.clone() }

  pub fn actions(&self) -> Actions<A> { self.actions.clone() }

  pub fn connection(&self) -> &ConnectionManager<T> { &self.manager }

  pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
    self.manager.watch_state()
  }

  pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
    self.notices.subscribe()
  }

  /// Disconnect and stop the actor. Readers see [`Error::SessionClosed`]
  /// afterwards.
  pub async fn shutdown(self) {
    self.manager.disconnect().await;
    self.cancel.cancel();
    if let Err(e) = self.actor.await
      && e.is_panic()
    {
      error!(error = %e, "live session actor panicked");
    }
  }
}

async fn run_actor<T: Transport>(
  mut store: Store,
  manager: Arc<ConnectionManager<T>>,
  notices: broadcast::Sender<Notice>,
  mut events: mpsc::UnboundedReceiver<LiveEvent>,
  cancel: CancellationToken,
) {
  let mut reconciler = Reconciler::new();

  loop {
    let event = tokio::select! {
      _ = cancel.cancelled() => break,
      event = events.recv() => match event {
        Some(event) => event,
        None => break,
      },
    };

    match event {
      LiveEvent::Connection(state) => {
        if state.is_open() {
          manager.send(&ClientMessage::GetDashboard);
          manager.send(&ClientMessage::GetEmployees);
        }
      }
      LiveEvent::Frame(text) => {
        let applied = reconciler.handle_frame(&mut store, &text);
        if let Applied::Notice(notice) = applied {
          let _ = notices.send(notice);
        }
      }
      LiveEvent::Completion { completion, applied } => {
        let _ = applied.send(store.apply(completion));
      }
    }
  }

  debug!(stats = ?reconciler.stats(), "live session actor stopped");
}

// ─── Actions ─────────────────────────────────────────────────────────────────

/// Handle for REST calls whose results land in the store.
///
/// Failed mutations produce an error [`Notice`] and an `Err` for the caller.
/// Deletes re-check the server before reporting failure: if the entity is
/// gone after all, the delete counts as done.
pub struct Actions<A> {
  api:             Arc<A>,
  tickets:         Tickets,
  events:          mpsc::UnboundedSender<LiveEvent>,
  notices:         broadcast::Sender<Notice>,
  reconcile_delay: Duration,
}

impl<A> Clone for Actions<A> {
  fn clone(&self) -> Self {
    Self {
      api:             Arc::clone(&self.api),
      tickets:         self.tickets.clone(),
      events:          self.events.clone(),
      notices:         self.notices.clone(),
      reconcile_delay: self.reconcile_delay,
    }
  }
}

fn rest<E: std::error::Error + Send + Sync + 'static>(
  operation: &'static str,
) -> impl FnOnce(E) -> Error {
  move |e| Error::Rest { operation, source: Box::new(e) }
}

#[derive(Debug, Clone, Copy)]
enum Target {
  Employees,
  Constructions,
}

impl<A: Api + 'static> Actions<A> {
  /// Queue `completion` for the actor and wait until it has been applied.
  async fn post(&self, completion: Completion) -> Result<bool> {
    let (applied, rx) = oneshot::channel();
    self
      .events
      .send(LiveEvent::Completion { completion, applied })
      .map_err(|_| Error::SessionClosed)?;
    rx.await.map_err(|_| Error::SessionClosed)
  }

  fn notify(&self, notice: Notice) { let _ = self.notices.send(notice); }

  /// Report a failed operation and hand the error back.
  fn fail(&self, title: &str, err: Error) -> Error {
    warn!(error = %err, "{title}");
    self.notify(Notice::error(title, err.to_string()));
    err
  }

  /// Re-read a collection once the server has had time to settle.
  fn refresh_later(&self, target: Target) {
    let actions = self.clone();
    tokio::spawn(async move {
      tokio::time::sleep(actions.reconcile_delay).await;
      let result = match target {
        Target::Employees => actions.refresh_employees().await,
        Target::Constructions => actions.refresh_constructions().await,
      };
      if let Err(e) = result {
        warn!(?target, error = %e, "reconciling refresh failed");
      }
    });
  }

  // ── Loads ─────────────────────────────────────────────────────────────────

  pub async fn refresh_employees(&self) -> Result<()> {
    let ticket = self.tickets.issue();
    let employees =
      self.api.list_employees().await.map_err(rest("list employees"))?;
    self.post(Completion::Employees { ticket, employees }).await?;
    Ok(())
  }

  pub async fn refresh_departments(&self) -> Result<()> {
    let ticket = self.tickets.issue();
    let departments =
      self.api.list_departments().await.map_err(rest("list departments"))?;
    self.post(Completion::Departments { ticket, departments }).await?;
    Ok(())
  }

  pub async fn refresh_constructions(&self) -> Result<()> {
    let ticket = self.tickets.issue();
    let constructions = self
      .api
      .list_constructions()
      .await
      .map_err(rest("list constructions"))?;
    self.post(Completion::Constructions { ticket, constructions }).await?;
    Ok(())
  }

  pub async fn refresh_dashboard(&self) -> Result<()> {
    let ticket = self.tickets.issue();
    let dashboard = self.api.dashboard().await.map_err(rest("load dashboard"))?;
    self.post(Completion::Dashboard { ticket, dashboard }).await?;
    Ok(())
  }

  /// Fetch the sectors of one construction. Unlike the list refreshes this is
  /// user-initiated, so a failure is reported as a notice.
  pub async fn load_sectors(&self, construction: ConstructionId) -> Result<()> {
    let ticket = self.tickets.issue();
    let sectors = match self.api.list_construction_sectors(construction).await {
      Ok(sectors) => sectors,
      Err(e) => {
        return Err(self.fail(
          "Could not load sectors",
          rest("list construction sectors")(e),
        ));
      }
    };
    self
      .post(Completion::Sectors { ticket, construction, sectors })
      .await?;
    Ok(())
  }

  async fn load_everything(&self) -> Result<()> {
    self.refresh_employees().await?;
    self.refresh_departments().await?;
    self.refresh_constructions().await?;
    self.refresh_dashboard().await
  }

  /// Reload every collection and the dashboard over REST.
  pub async fn refresh_all(&self) -> Result<()> {
    self
      .load_everything()
      .await
      .map_err(|e| self.fail("Could not load data", e))
  }

  // ── Employees ─────────────────────────────────────────────────────────────

  pub async fn create_employee(
    &self,
    input: &EmployeeInput,
  ) -> Result<Employee> {
    let employee = match self.api.create_employee(input).await {
      Ok(employee) => employee,
      Err(e) => {
        self.refresh_later(Target::Employees);
        return Err(self.fail(
          "Could not create employee",
          rest("create employee")(e),
        ));
      }
    };
    self.post(Completion::EmployeeSaved(employee.clone())).await?;
    self.notify(Notice::success(
      "Employee created",
      format!("{} was added.", employee.name),
    ));
    Ok(employee)
  }

  pub async fn update_employee(
    &self,
    id: EmployeeId,
    input: &EmployeeInput,
  ) -> Result<Employee> {
    let employee = match self.api.update_employee(id, input).await {
      Ok(employee) => employee,
      Err(e) => {
        self.refresh_later(Target::Employees);
        return Err(self.fail(
          "Could not update employee",
          rest("update employee")(e),
        ));
      }
    };
    self.post(Completion::EmployeeSaved(employee.clone())).await?;
    self.notify(Notice::success(
      "Employee updated",
      format!("{} was updated.", employee.name),
    ));
    Ok(employee)
  }

  pub async fn register_payment(
    &self,
    id: EmployeeId,
    payment: &PaymentData,
  ) -> Result<Employee> {
    let employee = match self.api.register_payment(id, payment).await {
      Ok(employee) => employee,
      Err(e) => {
        self.refresh_later(Target::Employees);
        return Err(self.fail(
          "Could not register payment",
          rest("register payment")(e),
        ));
      }
    };
    self.post(Completion::EmployeeSaved(employee.clone())).await?;
    self.notify(Notice::success(
      "Payment registered",
      format!(
        "{} payment registered for {}.",
        payment.payment_type, employee.name
      ),
    ));
    Ok(employee)
  }

  /// Delete an employee, trusting a refreshed list over an error response.
  pub async fn delete_employee(&self, id: EmployeeId) -> Result<()> {
    const TITLE: &str = "Could not remove employee";

    if let Err(e) = self.api.delete_employee(id).await {
      warn!(
        employee_id = id,
        error = %e,
        "delete reported failure; re-checking server"
      );
      tokio::time::sleep(self.reconcile_delay).await;

      let ticket = self.tickets.issue();
      let employees = match self.api.list_employees().await {
        Ok(employees) => employees,
        Err(refresh) => {
          warn!(employee_id = id, error = %refresh, "re-check failed");
          return Err(self.fail(TITLE, rest("delete employee")(e)));
        }
      };
      let still_present = employees.iter().any(|x| x.id == id);
      self.post(Completion::Employees { ticket, employees }).await?;

      if still_present {
        return Err(self.fail(TITLE, Error::StillPresent {
          entity: "employee",
          id,
          operation: "delete",
        }));
      }
      info!(
        employee_id = id,
        "employee is gone despite the error; delete succeeded"
      );
      self.notify(Notice::success(
        "Employee removed",
        "The employee was removed.",
      ));
      return Ok(());
    }

    self.post(Completion::EmployeeRemoved(id)).await?;
    self.notify(Notice::success(
      "Employee removed",
      "The employee was removed.",
    ));
    if let Err(e) = self.refresh_employees().await {
      warn!(employee_id = id, error = %e, "refresh after delete failed");
    }
    Ok(())
  }

  // ── Constructions ─────────────────────────────────────────────────────────

  pub async fn create_construction(
    &self,
    input: &ConstructionInput,
  ) -> Result<Construction> {
    let construction = match self.api.create_construction(input).await {
      Ok(construction) => construction,
      Err(e) => {
        self.refresh_later(Target::Constructions);
        return Err(self.fail(
          "Could not create construction",
          rest("create construction")(e),
        ));
      }
    };
    self
      .post(Completion::ConstructionSaved(construction.clone()))
      .await?;
    self.notify(Notice::success(
      "Construction created",
      format!("{} was added.", construction.name),
    ));
    Ok(construction)
  }

  pub async fn update_construction(
    &self,
    id: ConstructionId,
    input: &ConstructionInput,
  ) -> Result<Construction> {
    let construction = match self.api.update_construction(id, input).await {
      Ok(construction) => construction,
      Err(e) => {
        self.refresh_later(Target::Constructions);
        return Err(self.fail(
          "Could not update construction",
          rest("update construction")(e),
        ));
      }
    };
    self
      .post(Completion::ConstructionSaved(construction.clone()))
      .await?;
    self.notify(Notice::success(
      "Construction updated",
      format!("{} was updated.", construction.name),
    ));
    Ok(construction)
  }

  /// Delete a construction. The server deactivates rather than removes
  /// constructions that still have employees; either outcome counts.
  pub async fn delete_construction(&self, id: ConstructionId) -> Result<()> {
    const TITLE: &str = "Could not remove construction";

    if let Err(e) = self.api.delete_construction(id).await {
      warn!(
        construction_id = id,
        error = %e,
        "delete reported failure; re-checking server"
      );
      tokio::time::sleep(self.reconcile_delay).await;

      let ticket = self.tickets.issue();
      let constructions = match self.api.list_constructions().await {
        Ok(constructions) => constructions,
        Err(refresh) => {
          warn!(construction_id = id, error = %refresh, "re-check failed");
          return Err(self.fail(TITLE, rest("delete construction")(e)));
        }
      };
      let still_active =
        constructions.iter().any(|c| c.id == id && c.is_active);
      self
        .post(Completion::Constructions { ticket, constructions })
        .await?;

      if still_active {
        return Err(self.fail(TITLE, Error::StillPresent {
          entity: "construction",
          id,
          operation: "delete",
        }));
      }
      info!(
        construction_id = id,
        "construction is gone despite the error; delete succeeded"
      );
      self.notify(Notice::success(
        "Construction removed",
        "The construction was removed.",
      ));
      return Ok(());
    }

    self.post(Completion::ConstructionRemoved(id)).await?;
    self.notify(Notice::success(
      "Construction removed",
      "The construction was removed.",
    ));
    if let Err(e) = self.refresh_constructions().await {
      warn!(construction_id = id, error = %e, "refresh after delete failed");
    }
    Ok(())
  }
}
