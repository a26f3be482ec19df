//! Employee records and payment tracking.
//!
//! The client never owns an employee's identity; it holds a cached copy of
//! the record the server last sent. Every record is replaced as a whole,
//! never patched field by field.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter};

use crate::site::{ConstructionId, DepartmentId, SectorId};

/// Server-assigned, stable employee identifier.
pub type EmployeeId = i64;

// ─── Payment enums ───────────────────────────────────────────────────────────

/// Payment progress for one compensation kind.
///
/// The set is closed: a record carrying any other value fails to
/// deserialise and the frame containing it is dropped.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Default,
  Serialize,
  Deserialize,
  Display,
  AsRefStr,
  EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PaymentStatus {
  #[default]
  Pending,
  Partial,
  Paid,
}

/// The three independently tracked compensation kinds.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  AsRefStr,
  EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PaymentType {
  Salary,
  MealAllowance,
  TransportAllowance,
}

/// Body of `POST employees/{id}/register_payment/`.
///
/// Omitting `amount` asks the server to settle the full outstanding value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentData {
  pub payment_type: PaymentType,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub amount:       Option<Decimal>,
}

impl PaymentData {
  /// Pay the full outstanding value of `payment_type`.
  pub fn full(payment_type: PaymentType) -> Self {
    Self { payment_type, amount: None }
  }

  /// Pay a specific (possibly partial) amount.
  pub fn partial(payment_type: PaymentType, amount: Decimal) -> Self {
    Self { payment_type, amount: Some(amount) }
  }
}

// ─── Employee ────────────────────────────────────────────────────────────────

/// An employee as mirrored from the server.
///
/// Department and construction references carry denormalised names so that
/// lists render without a join against the other collections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
  pub id:                                 EmployeeId,
  pub name:                               String,
  /// National tax identifier; `cpf` on the wire.
  #[serde(rename = "cpf")]
  pub tax_id:                             String,
  #[serde(default)]
  pub phone:                              String,
  #[serde(default)]
  pub email:                              Option<String>,
  #[serde(default)]
  pub position:                           String,

  pub department:                         Option<DepartmentId>,
  #[serde(default)]
  pub department_name:                    Option<String>,
  pub construction:                       Option<ConstructionId>,
  #[serde(default)]
  pub construction_name:                  Option<String>,
  #[serde(default)]
  pub construction_sector:                Option<SectorId>,
  #[serde(default)]
  pub construction_sector_name:           Option<String>,

  pub salary:                             Decimal,
  #[serde(default)]
  pub meal_allowance:                     Decimal,
  #[serde(default)]
  pub transport_allowance:                Decimal,
  #[serde(default)]
  pub payment_day:                        Option<u8>,

  pub salary_payment_status:              PaymentStatus,
  pub meal_allowance_payment_status:      PaymentStatus,
  pub transport_allowance_payment_status: PaymentStatus,

  #[serde(default)]
  pub salary_amount_paid:                 Decimal,
  #[serde(default)]
  pub meal_allowance_amount_paid:         Decimal,
  #[serde(default)]
  pub transport_allowance_amount_paid:    Decimal,
  #[serde(default)]
  pub last_payment_date:                  Option<NaiveDate>,

  #[serde(default)]
  pub created_at:                         Option<DateTime<Utc>>,
  #[serde(default)]
  pub updated_at:                         Option<DateTime<Utc>>,
}

impl Employee {
  /// The status tracked for one compensation kind.
  pub fn status(&self, kind: PaymentType) -> PaymentStatus {
    match kind {
      PaymentType::Salary => self.salary_payment_status,
      PaymentType::MealAllowance => self.meal_allowance_payment_status,
      PaymentType::TransportAllowance => {
        self.transport_allowance_payment_status
      }
    }
  }

  /// The amount owed for one compensation kind.
  pub fn amount(&self, kind: PaymentType) -> Decimal {
    match kind {
      PaymentType::Salary => self.salary,
      PaymentType::MealAllowance => self.meal_allowance,
      PaymentType::TransportAllowance => self.transport_allowance,
    }
  }

  /// The amount already paid for one compensation kind.
  pub fn amount_paid(&self, kind: PaymentType) -> Decimal {
    match kind {
      PaymentType::Salary => self.salary_amount_paid,
      PaymentType::MealAllowance => self.meal_allowance_amount_paid,
      PaymentType::TransportAllowance => self.transport_allowance_amount_paid,
    }
  }
}

// ─── EmployeeInput ───────────────────────────────────────────────────────────

/// Body of `POST employees/` and `PUT employees/{id}/`.
///
/// Form validation happens before one of these is built; the server assigns
/// the id and all payment bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeInput {
  pub name:                String,
  #[serde(rename = "cpf")]
  pub tax_id:              String,
  pub phone:               String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub email:               Option<String>,
  pub position:            String,
  pub department:          DepartmentId,
  pub construction:        ConstructionId,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub construction_sector: Option<SectorId>,
  pub salary:              Decimal,
  pub meal_allowance:      Decimal,
  pub transport_allowance: Decimal,
  pub payment_day:         u8,
}
