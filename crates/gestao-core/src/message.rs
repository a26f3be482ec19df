//! Messages exchanged over the live connection.
//!
//! Inbound frames are UTF-8 JSON objects shaped `{type, data?, action?}`.
//! Every payload-bearing message is a full snapshot of one collection or
//! aggregate, never a delta.

use serde::{Deserialize, Serialize};
use strum::AsRefStr;

use crate::{
  Result,
  dashboard::DashboardData,
  employee::Employee,
  site::{Construction, ConstructionSector, Department},
};

// ─── Server → client ─────────────────────────────────────────────────────────

/// Reference data pushed on connect and whenever departments or
/// constructions change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InitialData {
  #[serde(default)]
  pub departments:          Vec<Department>,
  #[serde(default)]
  pub constructions:        Vec<Construction>,
  /// Absent unless the server chooses to include sectors.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub construction_sectors: Option<Vec<ConstructionSector>>,
}

/// What changed on the server, carried by an `update` notification.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum UpdateAction {
  EmployeeCreated,
  EmployeeUpdated,
  EmployeeDeleted,
  PaymentRegistered,
  PaymentsReset,
  PaymentStatusChanged,
  ConstructionCreated,
  ConstructionUpdated,
  ConstructionDeleted,
  ConstructionSectorCreated,
  DepartmentUpdate,
  /// An action this client does not know about yet.
  #[serde(other)]
  Other,
}

/// A frame pushed by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
  InitialData {
    #[serde(default)]
    data: Option<InitialData>,
  },
  EmployeesUpdate {
    #[serde(default)]
    data: Option<Vec<Employee>>,
  },
  DashboardUpdate {
    #[serde(default)]
    data: Option<DashboardData>,
  },
  /// Side-effect-only notification. The matching list or dashboard
  /// snapshot follows as a separate message.
  Update {
    #[serde(default)]
    action:  Option<UpdateAction>,
    #[serde(default)]
    message: Option<String>,
  },
  /// The server rejected something this client sent.
  Error {
    #[serde(default)]
    message: Option<String>,
  },
  /// A `type` this client does not know about yet.
  #[serde(other)]
  Unknown,
}

impl ServerMessage {
  /// Decode one text frame.
  ///
  /// Fails for non-JSON input and for JSON whose `type` is known but whose
  /// payload does not match the expected shape. Unknown `type` values decode
  /// to [`ServerMessage::Unknown`].
  pub fn parse(text: &str) -> Result<Self> { Ok(serde_json::from_str(text)?) }

  /// The wire discriminant, for logging.
  pub fn kind(&self) -> &'static str {
    match self {
      Self::InitialData { .. } => "initial_data",
      Self::EmployeesUpdate { .. } => "employees_update",
      Self::DashboardUpdate { .. } => "dashboard_update",
      Self::Update { .. } => "update",
      Self::Error { .. } => "error",
      Self::Unknown => "unknown",
    }
  }
}

// ─── Client → server ─────────────────────────────────────────────────────────

/// A request for an immediate snapshot push.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
  GetDashboard,
  GetEmployees,
}

impl ClientMessage {
  pub fn to_json(&self) -> Result<String> { Ok(serde_json::to_string(self)?) }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_employees_update() {
    let msg = ServerMessage::parse(
      r#"{"type":"employees_update","data":[{
        "id":1,"name":"Ana","cpf":"1","department":null,"construction":null,
        "salary":"10.00","salary_payment_status":"pending",
        "meal_allowance_payment_status":"pending",
        "transport_allowance_payment_status":"paid"}]}"#,
    )
    .unwrap();

    let list = match msg {
      ServerMessage::EmployeesUpdate { data: Some(list) } => list,
      other => panic!("unexpected message: {other:?}"),
    };
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].name, "Ana");
  }

  #[test]
  fn unknown_type_is_not_an_error() {
    let msg = ServerMessage::parse(r#"{"type":"expenses_update","data":{}}"#)
      .unwrap();
    assert_eq!(msg, ServerMessage::Unknown);
  }

  #[test]
  fn unknown_action_is_not_an_error() {
    let msg = ServerMessage::parse(
      r#"{"type":"update","action":"material_restocked","message":"x"}"#,
    )
    .unwrap();
    assert_eq!(msg, ServerMessage::Update {
      action:  Some(UpdateAction::Other),
      message: Some("x".into()),
    });
  }

  #[test]
  fn malformed_frames_fail() {
    assert!(ServerMessage::parse("not json").is_err());
    assert!(ServerMessage::parse(r#"{"data":[]}"#).is_err());
    assert!(
      ServerMessage::parse(r#"{"type":"employees_update","data":{"id":1}}"#)
        .is_err()
    );
    assert!(
      ServerMessage::parse(r#"{"type":"dashboard_update","data":[1,2]}"#)
        .is_err()
    );
  }

  #[test]
  fn initial_data_missing_keys_are_empty() {
    let msg =
      ServerMessage::parse(r#"{"type":"initial_data","data":{}}"#).unwrap();
    assert_eq!(msg, ServerMessage::InitialData {
      data: Some(InitialData::default()),
    });
  }

  #[test]
  fn client_messages_serialise_to_type_only() {
    assert_eq!(
      ClientMessage::GetDashboard.to_json().unwrap(),
      r#"{"type":"get_dashboard"}"#
    );
    assert_eq!(
      ClientMessage::GetEmployees.to_json().unwrap(),
      r#"{"type":"get_employees"}"#
    );
  }
}
