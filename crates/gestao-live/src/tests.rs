//! Behavioural tests against a scripted transport and an in-memory API.

use std::{
  collections::VecDeque,
  sync::{
    Arc, Mutex,
    atomic::{AtomicBool, AtomicU32, Ordering},
  },
  time::Duration,
};

use gestao_core::{
  api::Api,
  dashboard::DashboardData,
  employee::{
    Employee, EmployeeId, EmployeeInput, PaymentData, PaymentStatus,
    PaymentType,
  },
  message::ClientMessage,
  site::{
    Construction, ConstructionId, ConstructionInput, ConstructionSector,
    Department,
  },
};
use serde_json::json;
use tokio::{sync::mpsc, time::Instant};

use crate::{
  ConnectionManager, ConnectionState, Error, LiveConfig, LiveSession,
  NoticeLevel, Reconciler, Result, Socket, Store, Transport,
  reconcile::Applied, store::Tickets,
};

// ─── Fixtures ────────────────────────────────────────────────────────────────

fn employee_json(id: EmployeeId, name: &str, salary: &str) -> serde_json::Value {
  json!({
    "id": id,
    "name": name,
    "cpf": format!("000.000.000-{id:02}"),
    "department": 1,
    "department_name": "Obras",
    "construction": 4,
    "construction_name": "Torre Norte",
    "salary": salary,
    "meal_allowance": "400.00",
    "transport_allowance": "150.00",
    "salary_payment_status": "pending",
    "meal_allowance_payment_status": "pending",
    "transport_allowance_payment_status": "pending"
  })
}

fn employee(id: EmployeeId, name: &str) -> Employee {
  serde_json::from_value(employee_json(id, name, "2500.00")).unwrap()
}

fn employees_frame(list: &[(EmployeeId, &str)]) -> String {
  let data: Vec<_> = list
    .iter()
    .map(|(id, name)| employee_json(*id, name, "2500.00"))
    .collect();
  json!({ "type": "employees_update", "data": data }).to_string()
}

fn dashboard_frame(total_employees: u32, salary_to_pay: &str) -> String {
  json!({
    "type": "dashboard_update",
    "data": {
      "total_employees": total_employees,
      "total_constructions": 2,
      "total_departments": 3,
      "total_salary_to_pay": salary_to_pay,
      "total_salary_paid": "0.00",
      "total_meal_allowance_to_pay": "0.00",
      "total_meal_allowance_paid": "0.00",
      "total_transport_allowance_to_pay": "0.00",
      "total_transport_allowance_paid": "0.00",
      "employees_with_pending_salary": total_employees,
      "employees_with_paid_salary": 0,
      "employees_with_partial_salary": 0
    }
  })
  .to_string()
}

fn names(employees: &[Employee]) -> Vec<&str> {
  employees.iter().map(|e| e.name.as_str()).collect()
}

// ─── Fake transport ──────────────────────────────────────────────────────────

/// The server end of one accepted fake connection. Dropping it closes the
/// connection from the server side.
struct Peer {
  to_client:   mpsc::UnboundedSender<String>,
  from_client: mpsc::UnboundedReceiver<String>,
}

impl Peer {
  fn push(&self, frame: impl Into<String>) {
    self.to_client.send(frame.into()).unwrap();
  }

  async fn next_request(&mut self) -> serde_json::Value {
    let text = self.from_client.recv().await.expect("client request");
    serde_json::from_str(&text).unwrap()
  }
}

struct FakeSocket {
  inbound:  mpsc::UnboundedReceiver<String>,
  outbound: mpsc::UnboundedSender<String>,
}

impl Socket for FakeSocket {
  async fn recv(&mut self) -> Option<Result<String>> {
    self.inbound.recv().await.map(Ok)
  }

  async fn send(&mut self, text: String) -> Result<()> {
    self.outbound.send(text).map_err(|_| Error::SessionClosed)
  }

  async fn close(&mut self) -> Result<()> { Ok(()) }
}

struct TransportState {
  /// Outcome of upcoming opens; `fallback` applies once this runs dry.
  script:    Mutex<VecDeque<bool>>,
  fallback:  bool,
  opens:     AtomicU32,
  opened_at: Mutex<Vec<Instant>>,
  peers:     mpsc::UnboundedSender<Peer>,
}

#[derive(Clone)]
struct FakeTransport(Arc<TransportState>);

impl FakeTransport {
  fn new(fallback: bool) -> (Self, mpsc::UnboundedReceiver<Peer>) {
    let (peers, rx) = mpsc::unbounded_channel();
    let state = TransportState {
      script: Mutex::new(VecDeque::new()),
      fallback,
      opens: AtomicU32::new(0),
      opened_at: Mutex::new(Vec::new()),
      peers,
    };
    (Self(Arc::new(state)), rx)
  }

  fn script(&self, outcomes: impl IntoIterator<Item = bool>) {
    self.0.script.lock().unwrap().extend(outcomes);
  }

  fn opens(&self) -> u32 { self.0.opens.load(Ordering::SeqCst) }

  fn gaps(&self) -> Vec<Duration> {
    let at = self.0.opened_at.lock().unwrap();
    at.windows(2).map(|w| w[1] - w[0]).collect()
  }
}

impl Transport for FakeTransport {
  type Socket = FakeSocket;

  async fn open<'a>(&'a self, url: &'a str) -> Result<FakeSocket> {
    self.0.opens.fetch_add(1, Ordering::SeqCst);
    self.0.opened_at.lock().unwrap().push(Instant::now());
    let accept = self
      .0
      .script
      .lock()
      .unwrap()
      .pop_front()
      .unwrap_or(self.0.fallback);
    if !accept {
      return Err(Error::Connect {
        url:    url.to_string(),
        reason: "connection refused".into(),
      });
    }
    let (to_client, inbound) = mpsc::unbounded_channel();
    let (outbound, from_client) = mpsc::unbounded_channel();
    let _ = self.0.peers.send(Peer { to_client, from_client });
    Ok(FakeSocket { inbound, outbound })
  }
}

fn manager(
  transport: FakeTransport,
  config: LiveConfig,
) -> ConnectionManager<FakeTransport> {
  let (events, rx) = mpsc::unbounded_channel();
  // Nobody reads manager events in these tests.
  drop(rx);
  ConnectionManager::new(transport, config, events)
}

// ─── Fake API ────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct FakeError(&'static str);

#[derive(Default)]
struct ApiState {
  employees:      Mutex<Vec<Employee>>,
  constructions:  Mutex<Vec<Construction>>,
  /// Deletes report a network error.
  fail_deletes:   AtomicBool,
  /// A delete that reports an error still takes effect on the server.
  deletes_stick:  AtomicBool,
  fail_creates:   AtomicBool,
  fail_updates:   AtomicBool,
  fail_sectors:   AtomicBool,
}

#[derive(Clone, Default)]
struct FakeApi(Arc<ApiState>);

impl FakeApi {
  fn with_employees(employees: Vec<Employee>) -> Self {
    let api = Self::default();
    *api.0.employees.lock().unwrap() = employees;
    api
  }

  fn failing_deletes(self, stick: bool) -> Self {
    self.0.fail_deletes.store(true, Ordering::SeqCst);
    self.0.deletes_stick.store(stick, Ordering::SeqCst);
    self
  }

  /// Remove `id` unless a failure was scripted that leaves it in place.
  fn delete_from<T>(
    &self,
    items: &Mutex<Vec<T>>,
    matches: impl Fn(&T) -> bool,
  ) -> Result<(), FakeError> {
    let fail = self.0.fail_deletes.load(Ordering::SeqCst);
    if !fail || self.0.deletes_stick.load(Ordering::SeqCst) {
      items.lock().unwrap().retain(|x| !matches(x));
    }
    if fail { Err(FakeError("network error")) } else { Ok(()) }
  }
}

impl Api for FakeApi {
  type Error = FakeError;

  async fn list_employees(&self) -> Result<Vec<Employee>, FakeError> {
    Ok(self.0.employees.lock().unwrap().clone())
  }

  async fn create_employee<'a>(
    &'a self,
    input: &'a EmployeeInput,
  ) -> Result<Employee, FakeError> {
    if self.0.fail_creates.load(Ordering::SeqCst) {
      return Err(FakeError("validation failed"));
    }
    let mut list = self.0.employees.lock().unwrap();
    let id = list.iter().map(|e| e.id).max().unwrap_or(0) + 1;
    let mut created = employee(id, &input.name);
    created.salary = input.salary;
    list.push(created.clone());
    Ok(created)
  }

  async fn update_employee<'a>(
    &'a self,
    id: EmployeeId,
    input: &'a EmployeeInput,
  ) -> Result<Employee, FakeError> {
    if self.0.fail_updates.load(Ordering::SeqCst) {
      return Err(FakeError("gateway timeout"));
    }
    let mut list = self.0.employees.lock().unwrap();
    let e = list.iter_mut().find(|e| e.id == id).ok_or(FakeError("not found"))?;
    e.name = input.name.clone();
    Ok(e.clone())
  }

  async fn delete_employee(&self, id: EmployeeId) -> Result<(), FakeError> {
    self.delete_from(&self.0.employees, |e: &Employee| e.id == id)
  }

  async fn register_payment<'a>(
    &'a self,
    id: EmployeeId,
    payment: &'a PaymentData,
  ) -> Result<Employee, FakeError> {
    let mut list = self.0.employees.lock().unwrap();
    let e = list.iter_mut().find(|e| e.id == id).ok_or(FakeError("not found"))?;
    match payment.payment_type {
      PaymentType::Salary => {
        e.salary_payment_status = PaymentStatus::Paid;
        e.salary_amount_paid = e.salary;
      }
      PaymentType::MealAllowance => {
        e.meal_allowance_payment_status = PaymentStatus::Paid;
      }
      PaymentType::TransportAllowance => {
        e.transport_allowance_payment_status = PaymentStatus::Paid;
      }
    }
    Ok(e.clone())
  }

  async fn list_departments(&self) -> Result<Vec<Department>, FakeError> {
    Ok(vec![Department { id: 1, name: "Obras".into(), description: None }])
  }

  async fn list_constructions(&self) -> Result<Vec<Construction>, FakeError> {
    Ok(self.0.constructions.lock().unwrap().clone())
  }

  async fn create_construction<'a>(
    &'a self,
    input: &'a ConstructionInput,
  ) -> Result<Construction, FakeError> {
    let mut list = self.0.constructions.lock().unwrap();
    let created = Construction {
      id:         list.len() as i64 + 1,
      name:       input.name.clone().unwrap_or_default(),
      address:    input.address.clone(),
      start_date: input.start_date,
      end_date:   input.end_date.flatten(),
      is_active:  true,
    };
    list.push(created.clone());
    Ok(created)
  }

  async fn update_construction<'a>(
    &'a self,
    id: ConstructionId,
    input: &'a ConstructionInput,
  ) -> Result<Construction, FakeError> {
    let mut list = self.0.constructions.lock().unwrap();
    let c = list.iter_mut().find(|c| c.id == id).ok_or(FakeError("not found"))?;
    if let Some(active) = input.is_active {
      c.is_active = active;
    }
    Ok(c.clone())
  }

  async fn delete_construction(&self, id: ConstructionId) -> Result<(), FakeError> {
    self.delete_from(&self.0.constructions, |c: &Construction| c.id == id)
  }

  async fn list_construction_sectors(
    &self,
    construction_id: ConstructionId,
  ) -> Result<Vec<ConstructionSector>, FakeError> {
    if self.0.fail_sectors.load(Ordering::SeqCst) {
      return Err(FakeError("service unavailable"));
    }
    Ok(vec![ConstructionSector {
      id:           10,
      name:         "Bloco A".into(),
      construction: construction_id,
    }])
  }

  async fn dashboard(&self) -> Result<DashboardData, FakeError> {
    Ok(DashboardData {
      total_employees: self.0.employees.lock().unwrap().len() as u32,
      ..Default::default()
    })
  }
}

fn employee_input(name: &str) -> EmployeeInput {
  EmployeeInput {
    name:                name.into(),
    tax_id:              "000.000.000-01".into(),
    phone:               "(11) 90000-0000".into(),
    email:               None,
    position:            "Mestre de obras".into(),
    department:          1,
    construction:        4,
    construction_sector: None,
    salary:              "2500.00".parse().unwrap(),
    meal_allowance:      "400.00".parse().unwrap(),
    transport_allowance: "150.00".parse().unwrap(),
    payment_day:         5,
  }
}

/// A session whose socket never opens, for exercising the REST path alone.
fn offline_session(api: FakeApi) -> LiveSession<FakeTransport, FakeApi> {
  let (transport, _peers) = FakeTransport::new(false);
  let config = LiveConfig::default().with_reconnect_attempts(0);
  LiveSession::start(config, transport, api)
}

// ─── Reconciliation ──────────────────────────────────────────────────────────

#[test]
fn employees_update_is_a_full_replacement() {
  let mut store = Store::new(Tickets::default());
  let mut reconciler = Reconciler::new();

  for frame in [
    employees_frame(&[(1, "Ana"), (2, "Bia"), (3, "Caio")]),
    employees_frame(&[(2, "Bia")]),
    employees_frame(&[(4, "Davi"), (1, "Ana")]),
  ] {
    reconciler.handle_frame(&mut store, &frame);
  }

  assert_eq!(names(&store.snapshot().employees), vec!["Davi", "Ana"]);
}

#[test]
fn malformed_frames_leave_the_store_untouched() {
  let mut store = Store::new(Tickets::default());
  let mut reconciler = Reconciler::new();

  reconciler.handle_frame(&mut store, &employees_frame(&[(1, "Ana")]));
  let before = store.snapshot();

  for bad in [
    "not json at all",
    r#"{"data":[]}"#,
    r#"{"type":"employees_update","data":[{"id":1}]}"#,
    r#"{"type":"employees_update","data":[{"id":1,"name":"Ana","cpf":"x","salary":"1","salary_payment_status":"overdue","meal_allowance_payment_status":"paid","transport_allowance_payment_status":"paid","department":null,"construction":null}]}"#,
  ] {
    assert_eq!(reconciler.handle_frame(&mut store, bad), Applied::Dropped);
    assert_eq!(store.snapshot(), before);
  }

  reconciler.handle_frame(&mut store, &employees_frame(&[(2, "Bia")]));
  assert_eq!(names(&store.snapshot().employees), vec!["Bia"]);
  assert_eq!(reconciler.stats().dropped, 4);
  assert_eq!(reconciler.stats().replaced, 2);
}

#[test]
fn repeated_dashboard_update_is_idempotent() {
  let mut store = Store::new(Tickets::default());
  let mut reconciler = Reconciler::new();
  let frame = dashboard_frame(12, "30000.00");

  reconciler.handle_frame(&mut store, &frame);
  let once = store.snapshot();
  reconciler.handle_frame(&mut store, &frame);

  assert_eq!(store.snapshot(), once);
}

#[test]
fn later_dashboard_update_wins() {
  let mut store = Store::new(Tickets::default());
  let mut reconciler = Reconciler::new();

  reconciler.handle_frame(&mut store, &dashboard_frame(12, "30000.00"));
  reconciler.handle_frame(&mut store, &dashboard_frame(13, "32500.00"));

  let dashboard = store.snapshot().dashboard.unwrap();
  assert_eq!(dashboard.total_employees, 13);
  assert_eq!(dashboard.total_salary_to_pay, "32500.00".parse().unwrap());
}

// ─── Connection manager ──────────────────────────────────────────────────────

#[tokio::test]
async fn send_without_connection_is_dropped() {
  let (transport, _peers) = FakeTransport::new(true);
  let m = manager(transport, LiveConfig::default());
  assert!(!m.send(&ClientMessage::GetEmployees));
  assert_eq!(m.state(), ConnectionState::Closed);
}

#[tokio::test(start_paused = true)]
async fn gives_up_after_retry_budget() {
  let (transport, _peers) = FakeTransport::new(false);
  let m = manager(transport.clone(), LiveConfig::default());

  m.connect("ws://fake/ws/employees/");
  tokio::time::sleep(Duration::from_secs(60)).await;

  // One initial attempt plus five retries.
  assert_eq!(transport.opens(), 6);
  assert_eq!(m.attempts(), 5);
  assert_eq!(m.state(), ConnectionState::Closed);

  tokio::time::sleep(Duration::from_secs(600)).await;
  assert_eq!(transport.opens(), 6);

  m.disconnect().await;
  m.disconnect().await;
  assert_eq!(transport.opens(), 6);
}

#[tokio::test(start_paused = true)]
async fn disconnect_cancels_pending_retry() {
  let (transport, _peers) = FakeTransport::new(false);
  let m = manager(transport.clone(), LiveConfig::default());

  m.connect("ws://fake/ws/employees/");
  tokio::time::sleep(Duration::from_secs(1)).await;
  assert_eq!(transport.opens(), 1);

  m.disconnect().await;
  tokio::time::sleep(Duration::from_secs(60)).await;
  assert_eq!(transport.opens(), 1);
  assert_eq!(m.state(), ConnectionState::Closed);
}

#[tokio::test(start_paused = true)]
async fn unexpected_close_reconnects_and_resets_counter() {
  let (transport, mut peers) = FakeTransport::new(true);
  transport.script([true, false, true]);
  let config = LiveConfig::default();
  let m = manager(transport.clone(), config.clone());
  let mut state = m.watch_state();

  m.connect("ws://fake/ws/employees/");
  let first = peers.recv().await.unwrap();
  state.wait_for(|s| s.is_open()).await.unwrap();

  drop(first);
  state.wait_for(|s| !s.is_open()).await.unwrap();

  let _second = peers.recv().await.unwrap();
  state.wait_for(|s| s.is_open()).await.unwrap();

  assert_eq!(transport.opens(), 3);
  assert_eq!(m.attempts(), 0);
  for gap in transport.gaps() {
    assert!(gap >= config.reconnect_interval());
    assert!(gap < config.reconnect_interval() + Duration::from_millis(10));
  }

  m.disconnect().await;
}

#[tokio::test(start_paused = true)]
async fn connect_while_active_is_a_no_op() {
  let (transport, mut peers) = FakeTransport::new(true);
  let m = manager(transport.clone(), LiveConfig::default());
  let mut state = m.watch_state();

  m.connect("ws://fake/ws/employees/");
  let _peer = peers.recv().await.unwrap();
  state.wait_for(|s| s.is_open()).await.unwrap();

  m.connect("ws://fake/ws/employees/");
  m.connect("ws://fake/other/");
  tokio::time::sleep(Duration::from_secs(10)).await;

  assert_eq!(transport.opens(), 1);
  assert!(peers.try_recv().is_err());
  m.disconnect().await;
}

#[tokio::test(start_paused = true)]
async fn manual_reconnect_after_giving_up() {
  let (transport, mut peers) = FakeTransport::new(false);
  let m = manager(
    transport.clone(),
    LiveConfig::default().with_reconnect_attempts(1),
  );
  let mut state = m.watch_state();

  m.connect("ws://fake/ws/employees/");
  tokio::time::sleep(Duration::from_secs(30)).await;
  assert_eq!(transport.opens(), 2);
  assert_eq!(m.state(), ConnectionState::Closed);

  transport.script([true]);
  m.reconnect();
  let _peer = peers.recv().await.unwrap();
  state.wait_for(|s| s.is_open()).await.unwrap();

  assert_eq!(transport.opens(), 3);
  assert_eq!(m.attempts(), 0);
  assert!(m.send(&ClientMessage::GetDashboard));
  m.disconnect().await;
}

// ─── Session ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn get_employees_round_trip() {
  let (transport, mut peers) = FakeTransport::new(true);
  let session =
    LiveSession::start(LiveConfig::default(), transport, FakeApi::default());
  let mut reader = session.store();
  let mut notices = session.subscribe();

  let mut peer = peers.recv().await.unwrap();
  assert_eq!(peer.next_request().await, json!({ "type": "get_dashboard" }));
  assert_eq!(peer.next_request().await, json!({ "type": "get_employees" }));

  peer.push(employees_frame(&[(1, "Ana")]));
  let state = tokio::time::timeout(
    Duration::from_secs(5),
    reader.wait_for(|s| !s.employees.is_empty()),
  )
  .await
  .unwrap()
  .unwrap();
  assert_eq!(state.employees, vec![employee(1, "Ana")]);

  peer.push(r#"{"type":"update","action":"employee_created"}"#);
  let notice = notices.recv().await.unwrap();
  assert_eq!(notice.title, "Employee created");

  session.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn failed_delete_of_absent_employee_counts_as_success() {
  let api = FakeApi::with_employees(vec![employee(7, "Gil"), employee(8, "Hana")])
    .failing_deletes(true);
  let session = offline_session(api);
  let actions = session.actions();
  let mut notices = session.subscribe();

  actions.refresh_employees().await.unwrap();
  actions.delete_employee(7).await.unwrap();

  assert_eq!(names(&session.store().snapshot().employees), vec!["Hana"]);
  let notice = notices.recv().await.unwrap();
  assert_eq!(notice.level, NoticeLevel::Success);

  session.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn failed_delete_of_present_employee_is_rejected() {
  let api = FakeApi::with_employees(vec![employee(7, "Gil")]).failing_deletes(false);
  let session = offline_session(api);
  let actions = session.actions();
  let mut notices = session.subscribe();

  let err = actions.delete_employee(7).await.unwrap_err();
  assert!(matches!(err, Error::StillPresent { id: 7, .. }));
  assert_eq!(names(&session.store().snapshot().employees), vec!["Gil"]);
  assert_eq!(notices.recv().await.unwrap().level, NoticeLevel::Error);

  session.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn deactivated_construction_counts_as_deleted() {
  let api = FakeApi::default().failing_deletes(false);
  *api.0.constructions.lock().unwrap() = vec![Construction {
    id:         4,
    name:       "Torre Norte".into(),
    address:    None,
    start_date: None,
    end_date:   None,
    is_active:  false,
  }];
  let session = offline_session(api);

  session.actions().delete_construction(4).await.unwrap();
  let state = session.store().snapshot();
  assert_eq!(state.constructions.len(), 1);
  assert!(!state.constructions[0].is_active);

  session.shutdown().await;
}

#[tokio::test]
async fn payment_replaces_only_that_record() {
  let api = FakeApi::with_employees(vec![employee(1, "Ana"), employee(2, "Bia")]);
  let session = offline_session(api);
  let actions = session.actions();

  actions.refresh_all().await.unwrap();
  let paid = actions
    .register_payment(2, &PaymentData::full(PaymentType::Salary))
    .await
    .unwrap();
  assert_eq!(paid.salary_payment_status, PaymentStatus::Paid);

  let state = session.store().snapshot();
  assert_eq!(state.employee(2), Some(&paid));
  assert_eq!(state.employee(1), Some(&employee(1, "Ana")));
  assert_eq!(state.departments.len(), 1);
  assert_eq!(state.dashboard.map(|d| d.total_employees), Some(2));

  session.shutdown().await;
}

#[tokio::test]
async fn failed_create_is_rejected_with_notice() {
  let api = FakeApi::default();
  api.0.fail_creates.store(true, Ordering::SeqCst);
  let session = offline_session(api);
  let mut notices = session.subscribe();

  let err = session
    .actions()
    .create_employee(&employee_input("Ana"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Rest { operation: "create employee", .. }));
  assert_eq!(notices.recv().await.unwrap().level, NoticeLevel::Error);
  assert!(session.store().snapshot().employees.is_empty());

  session.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn failed_update_refetches_after_delay() {
  let api = FakeApi::with_employees(vec![employee(1, "Ana"), employee(2, "Bia")]);
  api.0.fail_updates.store(true, Ordering::SeqCst);
  let session = offline_session(api);
  let mut reader = session.store();
  let mut notices = session.subscribe();

  let err = session
    .actions()
    .update_employee(1, &employee_input("Ana Maria"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Rest { operation: "update employee", .. }));
  assert_eq!(notices.recv().await.unwrap().level, NoticeLevel::Error);
  assert!(reader.snapshot().employees.is_empty());

  tokio::time::sleep(LiveConfig::default().reconcile_delay()).await;
  let state = tokio::time::timeout(
    Duration::from_secs(1),
    reader.wait_for(|s| !s.employees.is_empty()),
  )
  .await
  .expect("store was not refreshed")
  .unwrap();
  assert_eq!(names(&state.employees), vec!["Ana", "Bia"]);

  session.shutdown().await;
}

#[tokio::test]
async fn failed_sector_load_reports_an_error() {
  let api = FakeApi::default();
  api.0.fail_sectors.store(true, Ordering::SeqCst);
  let session = offline_session(api);
  let mut notices = session.subscribe();

  let err = session.actions().load_sectors(4).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Rest { operation: "list construction sectors", .. }
  ));
  let notice = notices.recv().await.unwrap();
  assert_eq!(notice.level, NoticeLevel::Error);
  assert_eq!(notice.title, "Could not load sectors");

  session.shutdown().await;
}

#[tokio::test]
async fn sectors_load_per_construction() {
  let session = offline_session(FakeApi::default());
  let actions = session.actions();

  actions.load_sectors(4).await.unwrap();
  actions.load_sectors(5).await.unwrap();
  actions.load_sectors(4).await.unwrap();

  let state = session.store().snapshot();
  assert_eq!(state.sectors.len(), 2);
  assert_eq!(state.sectors_of(4).count(), 1);

  session.shutdown().await;
}

#[tokio::test]
async fn shutdown_closes_the_store() {
  let session = offline_session(FakeApi::default());
  let mut reader = session.store();
  let actions = session.actions();

  session.shutdown().await;

  assert!(matches!(reader.changed().await, Err(Error::SessionClosed)));
  assert!(matches!(
    actions.refresh_employees().await,
    Err(Error::SessionClosed)
  ));
}
