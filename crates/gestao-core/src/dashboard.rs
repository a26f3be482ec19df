//! The dashboard aggregate.
//!
//! A projection recomputed by the server from the employee table. The client
//! never edits it; it is replaced whole whenever a newer copy arrives.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::site::ConstructionId;

/// Headcount and salary mass for one active construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructionHeadcount {
  pub construction_id:   ConstructionId,
  pub construction_name: String,
  pub total_employees:   u32,
  pub total_salary:      Decimal,
  pub total_paid:        Decimal,
}

/// Money owed vs. paid (all compensation kinds) for one active construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructionPayments {
  pub construction_id:   ConstructionId,
  pub construction_name: String,
  pub total_to_pay:      Decimal,
  pub total_paid:        Decimal,
}

impl ConstructionPayments {
  pub fn remaining(&self) -> Decimal { self.total_to_pay - self.total_paid }
}

/// Aggregate snapshot of headcount and payments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardData {
  pub total_employees:                  u32,
  pub total_constructions:              u32,
  pub total_departments:                u32,

  pub total_salary_to_pay:              Decimal,
  pub total_salary_paid:                Decimal,
  pub total_meal_allowance_to_pay:      Decimal,
  pub total_meal_allowance_paid:        Decimal,
  pub total_transport_allowance_to_pay: Decimal,
  pub total_transport_allowance_paid:   Decimal,

  pub employees_with_pending_salary:    u32,
  pub employees_with_paid_salary:       u32,
  pub employees_with_partial_salary:    u32,

  #[serde(default)]
  pub employees_by_construction:        Vec<ConstructionHeadcount>,
  #[serde(default)]
  pub payments_by_construction:         Vec<ConstructionPayments>,
}

impl DashboardData {
  /// Everything owed across salary and both allowances.
  pub fn total_to_pay(&self) -> Decimal {
    self.total_salary_to_pay
      + self.total_meal_allowance_to_pay
      + self.total_transport_allowance_to_pay
  }

  /// Everything paid across salary and both allowances.
  pub fn total_paid(&self) -> Decimal {
    self.total_salary_paid
      + self.total_meal_allowance_paid
      + self.total_transport_allowance_paid
  }
}
