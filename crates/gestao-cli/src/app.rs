//! Application state machine and key dispatcher.

use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};
use gestao_core::{
  employee::{Employee, PaymentData, PaymentType},
  site::Construction,
};
use gestao_live::{
  ApiClient, ConnectionState, LiveSession, Notice, StoreReader, ViewState,
  WsTransport, session::Actions, views,
};
use tokio::sync::{
  broadcast::{self, error::TryRecvError},
  mpsc, watch,
};
use tracing::{debug, info, warn};

use crate::prefs::Prefs;

pub type Session = LiveSession<WsTransport, ApiClient>;

// ─── Screen ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
  Dashboard,
  Employees,
  Constructions,
}

impl Screen {
  pub const ALL: [Screen; 3] =
    [Screen::Dashboard, Screen::Employees, Screen::Constructions];

  pub fn title(self) -> &'static str {
    match self {
      Screen::Dashboard => "Dashboard",
      Screen::Employees => "Employees",
      Screen::Constructions => "Constructions",
    }
  }
}

// ─── Activity ────────────────────────────────────────────────────────────────

/// Counts background actions still running.
struct Activity {
  running: usize,
  done_tx: mpsc::UnboundedSender<()>,
  done_rx: mpsc::UnboundedReceiver<()>,
}

impl Activity {
  fn new() -> Self {
    let (done_tx, done_rx) = mpsc::unbounded_channel();
    Self { running: 0, done_tx, done_rx }
  }

  /// Register one more action, which reports back on the returned sender.
  fn start(&mut self) -> mpsc::UnboundedSender<()> {
    self.running += 1;
    self.done_tx.clone()
  }

  /// Collect finished actions. `true` when the last one just finished.
  fn settle(&mut self) -> bool {
    let before = self.running;
    while self.done_rx.try_recv().is_ok() {
      self.running = self.running.saturating_sub(1);
    }
    before > 0 && self.running == 0
  }
}

// ─── App ─────────────────────────────────────────────────────────────────────

pub struct App {
  pub screen: Screen,

  /// Latest store snapshot; refreshed whenever the store reports a write.
  pub view: ViewState,

  pub connection: ConnectionState,

  /// Fuzzy query over employee name, position and tax id.
  pub filter: String,

  /// Whether the user is typing a filter query.
  pub filter_active: bool,

  /// Department name the employee list is restricted to.
  pub department_filter: Option<String>,

  /// Construction name the employee list is restricted to.
  pub construction_filter: Option<String>,

  /// Cursor within the list shown on the current screen.
  pub cursor: usize,

  /// Most recent notice, shown in the status bar.
  pub notice: Option<Notice>,

  /// Transient local feedback, cleared by the next notice or once every
  /// background action has finished.
  pub status_msg: String,

  pub prefs: Prefs,
  prefs_path: Option<PathBuf>,

  activity: Activity,
  session:  Session,
  actions:  Actions<ApiClient>,
  reader:   StoreReader,
  state_rx: watch::Receiver<ConnectionState>,
  notices:  broadcast::Receiver<Notice>,
}

impl App {
  pub fn new(session: Session, prefs: Prefs, prefs_path: Option<PathBuf>) -> Self {
    let mut reader = session.store();
    let state_rx = session.connection_state();
    let connection = *state_rx.borrow();
    Self {
      screen: Screen::Dashboard,
      view: reader.latest(),
      connection,
      filter: String::new(),
      filter_active: false,
      department_filter: None,
      construction_filter: None,
      cursor: 0,
      notice: None,
      status_msg: String::new(),
      prefs,
      prefs_path,
      activity: Activity::new(),
      actions: session.actions(),
      notices: session.subscribe(),
      session,
      reader,
      state_rx,
    }
  }

  pub async fn shutdown(self) { self.session.shutdown().await }

  /// Pull in everything that changed since the last frame.
  pub fn sync(&mut self) {
    if self.reader.has_changed() {
      self.view = self.reader.latest();
      self.clamp_cursor();
    }
    if self.state_rx.has_changed().unwrap_or(false) {
      self.connection = *self.state_rx.borrow_and_update();
    }
    loop {
      match self.notices.try_recv() {
        Ok(notice) => {
          self.status_msg.clear();
          self.notice = Some(notice);
        }
        Err(TryRecvError::Lagged(skipped)) => {
          warn!(skipped, "notice receiver lagged");
        }
        Err(TryRecvError::Empty | TryRecvError::Closed) => break,
      }
    }
    if self.activity.settle() {
      self.status_msg.clear();
    }
  }

  // ── Background actions ────────────────────────────────────────────────────

  /// Run an action without blocking the UI. `status` stays up until it
  /// finishes; failures arrive as error notices.
  fn spawn<F, Fut>(&mut self, status: impl Into<String>, f: F)
  where
    F: FnOnce(Actions<ApiClient>) -> Fut,
    Fut: Future<Output = gestao_live::Result<()>> + Send + 'static,
  {
    self.status_msg = status.into();
    let done = self.activity.start();
    let action = f(self.actions.clone());
    tokio::spawn(async move {
      if let Err(e) = action.await {
        debug!(error = %e, "background action failed");
      }
      let _ = done.send(());
    });
  }

  pub fn refresh(&mut self) {
    self.spawn("Loading…", |a| async move { a.refresh_all().await });
  }

  // ── Derived lists ─────────────────────────────────────────────────────────

  /// Employees passing the department, construction and fuzzy filters.
  pub fn visible_employees(&self) -> Vec<&Employee> {
    let list = views::filter_employees(
      &self.view.employees,
      self.department_filter.as_deref(),
      self.construction_filter.as_deref(),
    );
    if self.filter.is_empty() {
      return list;
    }
    let matcher = SkimMatcherV2::default();
    list
      .into_iter()
      .filter(|e| {
        [e.name.as_str(), e.position.as_str(), e.tax_id.as_str()]
          .iter()
          .any(|field| matcher.fuzzy_match(field, &self.filter).is_some())
      })
      .collect()
  }

  /// Active constructions first, then inactive, as listed on screen.
  pub fn listed_constructions(&self) -> Vec<&Construction> {
    let mut list = views::active_constructions(&self.view.constructions);
    list.extend(views::inactive_constructions(&self.view.constructions));
    list
  }

  fn list_len(&self) -> usize {
    match self.screen {
      Screen::Dashboard => self
        .view
        .dashboard
        .as_ref()
        .map_or(0, |d| views::works_status(d).len()),
      Screen::Employees => self.visible_employees().len(),
      Screen::Constructions => self.listed_constructions().len(),
    }
  }

  fn clamp_cursor(&mut self) {
    let len = self.list_len();
    if self.cursor >= len {
      self.cursor = len.saturating_sub(1);
    }
  }

  pub fn selected_employee(&self) -> Option<&Employee> {
    self.visible_employees().get(self.cursor).copied()
  }

  pub fn selected_construction(&self) -> Option<&Construction> {
    self.listed_constructions().get(self.cursor).copied()
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub fn handle_key(&mut self, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return false;
    }

    if self.filter_active {
      self.handle_filter_key(key);
      return true;
    }

    match key.code {
      KeyCode::Char('q') => return false,

      KeyCode::Char('1') => self.switch(Screen::Dashboard),
      KeyCode::Char('2') => self.switch(Screen::Employees),
      KeyCode::Char('3') => self.switch(Screen::Constructions),

      KeyCode::Down | KeyCode::Char('j') => {
        if self.cursor + 1 < self.list_len() {
          self.cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.cursor = self.cursor.saturating_sub(1);
      }

      KeyCode::Char('r') => self.refresh(),
      KeyCode::Char('R') => {
        info!("manual reconnect");
        self.status_msg = "Reconnecting…".into();
        self.session.connection().reconnect();
      }
      KeyCode::Char('b') => self.toggle_sidebar(),

      _ => match self.screen {
        Screen::Dashboard => {}
        Screen::Employees => self.handle_employee_key(key),
        Screen::Constructions => self.handle_construction_key(key),
      },
    }
    true
  }

  fn switch(&mut self, screen: Screen) {
    self.screen = screen;
    self.cursor = 0;
  }

  fn toggle_sidebar(&mut self) {
    self.prefs.sidebar_collapsed = !self.prefs.sidebar_collapsed;
    if let Some(path) = &self.prefs_path
      && let Err(e) = self.prefs.save(path)
    {
      warn!(error = %e, "could not save preferences");
      self.status_msg = format!("Could not save preferences: {e}");
    }
  }

  fn handle_filter_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        self.filter_active = false;
        self.filter.clear();
      }
      KeyCode::Enter => self.filter_active = false,
      KeyCode::Backspace => {
        self.filter.pop();
      }
      KeyCode::Char(c) => self.filter.push(c),
      _ => {}
    }
    self.cursor = 0;
  }

  fn handle_employee_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Char('/') => {
        self.filter_active = true;
        self.filter.clear();
        self.cursor = 0;
      }
      KeyCode::Char('f') => {
        let names = self.view.departments.iter().map(|d| d.name.clone()).collect();
        self.department_filter = cycle(self.department_filter.take(), names);
        self.cursor = 0;
      }
      KeyCode::Char('o') => {
        let names =
          self.view.constructions.iter().map(|c| c.name.clone()).collect();
        self.construction_filter = cycle(self.construction_filter.take(), names);
        self.cursor = 0;
      }
      KeyCode::Char('s') => self.pay(PaymentType::Salary),
      KeyCode::Char('m') => self.pay(PaymentType::MealAllowance),
      KeyCode::Char('t') => self.pay(PaymentType::TransportAllowance),
      KeyCode::Char('d') => {
        if let Some(e) = self.selected_employee() {
          let (id, name) = (e.id, e.name.clone());
          self.spawn(format!("Removing {name}…"), move |a| async move {
            a.delete_employee(id).await
          });
        }
      }
      _ => {}
    }
  }

  fn pay(&mut self, kind: PaymentType) {
    let Some(e) = self.selected_employee() else { return };
    let (id, name) = (e.id, e.name.clone());
    self.spawn(format!("Registering {kind} for {name}…"), move |a| async move {
      a.register_payment(id, &PaymentData::full(kind)).await.map(|_| ())
    });
  }

  fn handle_construction_key(&mut self, key: KeyEvent) {
    let Some(c) = self.selected_construction() else { return };
    let (id, name) = (c.id, c.name.clone());
    match key.code {
      KeyCode::Enter => {
        self.spawn(format!("Loading sectors of {name}…"), move |a| async move {
          a.load_sectors(id).await
        });
      }
      KeyCode::Char('d') => {
        self.spawn(format!("Removing {name}…"), move |a| async move {
          a.delete_construction(id).await
        });
      }
      _ => {}
    }
  }
}

/// Step through `None → options[0] → … → options[n-1] → None`.
fn cycle(current: Option<String>, options: Vec<String>) -> Option<String> {
  match current {
    None => options.into_iter().next(),
    Some(cur) => options
      .iter()
      .position(|o| *o == cur)
      .and_then(|i| options.get(i + 1).cloned()),
  }
}
