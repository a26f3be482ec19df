//! Departments, construction sites, and their sectors.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub type DepartmentId = i64;
pub type ConstructionId = i64;
pub type SectorId = i64;

/// An organisational department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
  pub id:          DepartmentId,
  pub name:        String,
  #[serde(default)]
  pub description: Option<String>,
}

/// A construction site employees are assigned to.
///
/// Sites referenced by employees are soft-deactivated (`is_active = false`)
/// rather than removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Construction {
  pub id:         ConstructionId,
  pub name:       String,
  #[serde(default)]
  pub address:    Option<String>,
  #[serde(default)]
  pub start_date: Option<NaiveDate>,
  #[serde(default)]
  pub end_date:   Option<NaiveDate>,
  #[serde(default = "active_by_default")]
  pub is_active:  bool,
}

fn active_by_default() -> bool { true }

/// A sector within a construction site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructionSector {
  pub id:           SectorId,
  pub name:         String,
  pub construction: ConstructionId,
}

/// Body of `POST constructions/` and `PATCH constructions/{id}/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructionInput {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name:       Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub address:    Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub start_date: Option<NaiveDate>,
  /// `Some(None)` clears the end date.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub end_date:   Option<Option<NaiveDate>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub is_active:  Option<bool>,
}
