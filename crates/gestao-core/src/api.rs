//! The REST collaborator the live client consumes.
//!
//! Implemented over HTTP by `gestao-live`; tests substitute an in-memory
//! fake. Every mutation is authoritative on the server, which additionally
//! broadcasts a push message so other connected clients converge.

use std::future::Future;

use crate::{
  dashboard::DashboardData,
  employee::{Employee, EmployeeId, EmployeeInput, PaymentData},
  site::{
    Construction, ConstructionId, ConstructionInput, ConstructionSector,
    Department,
  },
};

/// Abstraction over the REST endpoints.
///
/// All methods return `Send` futures so implementations can be driven from
/// spawned tasks on a multi-threaded runtime.
pub trait Api: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Employees ─────────────────────────────────────────────────────────

  /// Full employee list (envelope already unwrapped).
  fn list_employees(
    &self,
  ) -> impl Future<Output = Result<Vec<Employee>, Self::Error>> + Send + '_;

  fn create_employee<'a>(
    &'a self,
    input: &'a EmployeeInput,
  ) -> impl Future<Output = Result<Employee, Self::Error>> + Send + 'a;

  fn update_employee<'a>(
    &'a self,
    id: EmployeeId,
    input: &'a EmployeeInput,
  ) -> impl Future<Output = Result<Employee, Self::Error>> + Send + 'a;

  fn delete_employee(
    &self,
    id: EmployeeId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Register a (possibly partial) payment and return the updated record.
  fn register_payment<'a>(
    &'a self,
    id: EmployeeId,
    payment: &'a PaymentData,
  ) -> impl Future<Output = Result<Employee, Self::Error>> + Send + 'a;

  // ── Reference data ────────────────────────────────────────────────────

  fn list_departments(
    &self,
  ) -> impl Future<Output = Result<Vec<Department>, Self::Error>> + Send + '_;

  fn list_constructions(
    &self,
  ) -> impl Future<Output = Result<Vec<Construction>, Self::Error>> + Send + '_;

  fn create_construction<'a>(
    &'a self,
    input: &'a ConstructionInput,
  ) -> impl Future<Output = Result<Construction, Self::Error>> + Send + 'a;

  fn update_construction<'a>(
    &'a self,
    id: ConstructionId,
    input: &'a ConstructionInput,
  ) -> impl Future<Output = Result<Construction, Self::Error>> + Send + 'a;

  /// Remove a construction. The server may soft-deactivate it instead when
  /// employees still reference it.
  fn delete_construction(
    &self,
    id: ConstructionId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn list_construction_sectors(
    &self,
    construction_id: ConstructionId,
  ) -> impl Future<Output = Result<Vec<ConstructionSector>, Self::Error>>
  + Send
  + '_;

  // ── Aggregates ────────────────────────────────────────────────────────

  fn dashboard(
    &self,
  ) -> impl Future<Output = Result<DashboardData, Self::Error>> + Send + '_;
}
