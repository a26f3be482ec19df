//! Derived views.
//!
//! Pure functions over a [`ViewState`](crate::store::ViewState) snapshot or
//! one of its parts. Nothing here is cached; callers recompute on every
//! render.

use std::collections::BTreeMap;

use gestao_core::{
  dashboard::DashboardData,
  employee::{Employee, PaymentStatus, PaymentType},
  site::{Construction, ConstructionId},
};
use rust_decimal::Decimal;
use strum::{Display, IntoEnumIterator};

/// Grouping key for employees without a department.
pub const UNASSIGNED: &str = "Unassigned";

// ─── Employees ───────────────────────────────────────────────────────────────

/// Matches a reference by display name or by id.
fn matches(selector: &str, id: Option<i64>, name: Option<&str>) -> bool {
  name == Some(selector) || id.is_some_and(|id| id.to_string() == selector)
}

/// Employees matching both filters. `None` means "all".
pub fn filter_employees<'a>(
  employees: &'a [Employee],
  department: Option<&str>,
  construction: Option<&str>,
) -> Vec<&'a Employee> {
  employees
    .iter()
    .filter(|e| {
      department.is_none_or(|d| {
        matches(d, e.department, e.department_name.as_deref())
      })
    })
    .filter(|e| {
      construction.is_none_or(|c| {
        matches(c, e.construction, e.construction_name.as_deref())
      })
    })
    .collect()
}

/// Employees keyed by department name, in name order.
pub fn employees_by_department(
  employees: &[Employee],
) -> BTreeMap<&str, Vec<&Employee>> {
  let mut groups: BTreeMap<&str, Vec<&Employee>> = BTreeMap::new();
  for e in employees {
    let key = e.department_name.as_deref().unwrap_or(UNASSIGNED);
    groups.entry(key).or_default().push(e);
  }
  groups
}

/// Salary plus both allowances.
pub fn total_compensation(employee: &Employee) -> Decimal {
  PaymentType::iter().map(|kind| employee.amount(kind)).sum()
}

/// Outstanding amount across every compensation kind.
pub fn total_outstanding(employee: &Employee) -> Decimal {
  PaymentType::iter()
    .map(|kind| employee.amount(kind) - employee.amount_paid(kind))
    .sum()
}

/// `true` when any compensation kind is not fully paid.
pub fn has_pendencies(employee: &Employee) -> bool {
  PaymentType::iter().any(|kind| employee.status(kind) != PaymentStatus::Paid)
}

// ─── Payment status ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusSlice {
  pub status: PaymentStatus,
  pub count:  u32,
}

/// The salary status pie, in `Pending, Partial, Paid` order.
pub fn salary_status_breakdown(dashboard: &DashboardData) -> Vec<StatusSlice> {
  PaymentStatus::iter()
    .map(|status| StatusSlice {
      status,
      count: match status {
        PaymentStatus::Pending => dashboard.employees_with_pending_salary,
        PaymentStatus::Partial => dashboard.employees_with_partial_salary,
        PaymentStatus::Paid => dashboard.employees_with_paid_salary,
      },
    })
    .collect()
}

/// Status counts for one compensation kind, computed from the employee list.
pub fn status_breakdown(
  employees: &[Employee],
  kind: PaymentType,
) -> Vec<StatusSlice> {
  PaymentStatus::iter()
    .map(|status| StatusSlice {
      status,
      count: employees.iter().filter(|e| e.status(kind) == status).count()
        as u32,
    })
    .collect()
}

// ─── Executive metrics ───────────────────────────────────────────────────────

/// Works with less than this fraction paid are critical.
fn critical_threshold() -> Decimal { Decimal::new(5, 1) }

fn percentage(part: Decimal, whole: Decimal) -> Decimal {
  if whole.is_zero() {
    Decimal::ZERO
  } else {
    part / whole * Decimal::ONE_HUNDRED
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutiveMetrics {
  pub total_budget:              Decimal,
  pub total_executed:            Decimal,
  pub total_remaining:           Decimal,
  /// Executed share of the budget, in percent.
  pub burn_rate:                 Decimal,
  /// Works with less than half of their total paid.
  pub critical_works:            usize,
  pub employees_with_pendencies: u32,
}

impl ExecutiveMetrics {
  pub fn from_dashboard(dashboard: &DashboardData) -> Self {
    let total_budget = dashboard.total_to_pay();
    let total_executed = dashboard.total_paid();
    let critical_works = dashboard
      .payments_by_construction
      .iter()
      .filter(|w| {
        w.total_to_pay > Decimal::ZERO
          && w.total_paid / w.total_to_pay < critical_threshold()
      })
      .count();
    Self {
      total_budget,
      total_executed,
      total_remaining: total_budget - total_executed,
      burn_rate: percentage(total_executed, total_budget),
      critical_works,
      employees_with_pendencies: dashboard.employees_with_pending_salary
        + dashboard.employees_with_partial_salary,
    }
  }
}

// ─── Works status ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum WorkLevel {
  Excellent,
  Good,
  Warning,
  Critical,
}

impl WorkLevel {
  /// Level for a paid percentage.
  pub fn for_percentage(pct: Decimal) -> Self {
    if pct >= Decimal::from(90) {
      Self::Excellent
    } else if pct >= Decimal::from(70) {
      Self::Good
    } else if pct >= Decimal::from(40) {
      Self::Warning
    } else {
      Self::Critical
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkStatus {
  pub construction_id:   ConstructionId,
  pub construction_name: String,
  pub total_to_pay:      Decimal,
  pub total_paid:        Decimal,
  pub remaining:         Decimal,
  pub percentage:        Decimal,
  pub level:             WorkLevel,
}

/// Per-construction payment progress, worst first.
pub fn works_status(dashboard: &DashboardData) -> Vec<WorkStatus> {
  let mut works: Vec<WorkStatus> = dashboard
    .payments_by_construction
    .iter()
    .map(|w| {
      let pct = percentage(w.total_paid, w.total_to_pay);
      WorkStatus {
        construction_id:   w.construction_id,
        construction_name: w.construction_name.clone(),
        total_to_pay:      w.total_to_pay,
        total_paid:        w.total_paid,
        remaining:         w.remaining(),
        percentage:        pct,
        level:             WorkLevel::for_percentage(pct),
      }
    })
    .collect();
  works.sort_by(|a, b| a.percentage.cmp(&b.percentage));
  works
}

// ─── Constructions ───────────────────────────────────────────────────────────

pub fn active_constructions(constructions: &[Construction]) -> Vec<&Construction> {
  constructions.iter().filter(|c| c.is_active).collect()
}

pub fn inactive_constructions(
  constructions: &[Construction],
) -> Vec<&Construction> {
  constructions.iter().filter(|c| !c.is_active).collect()
}
