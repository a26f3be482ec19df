//! HTTP implementation of [`Api`].

use gestao_core::{
  api::Api,
  dashboard::DashboardData,
  employee::{Employee, EmployeeId, EmployeeInput, PaymentData},
  page::Page,
  site::{
    Construction, ConstructionId, ConstructionInput, ConstructionSector,
    Department,
  },
};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;

use crate::{Error, Result, config::LiveConfig};

/// REST client for the employee-management API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Debug, Clone)]
pub struct ApiClient {
  client:   Client,
  base_url: String,
}

impl ApiClient {
  pub fn new(config: &LiveConfig) -> Result<Self> {
    let client = Client::builder().timeout(config.request_timeout()).build()?;
    Ok(Self {
      client,
      base_url: config.api_url.trim_end_matches('/').to_string(),
    })
  }

  fn url(&self, path: &str) -> String { format!("{}/{}", self.base_url, path) }

  fn request(&self, method: Method, path: &str) -> RequestBuilder {
    self.client.request(method, self.url(path))
  }

  async fn send(
    &self,
    method: Method,
    path: &str,
    req: RequestBuilder,
  ) -> Result<Response> {
    debug!(%method, path, "api request");
    let resp = req.send().await?;
    if !resp.status().is_success() {
      return Err(Error::Status {
        method,
        path: path.to_string(),
        status: resp.status(),
      });
    }
    Ok(resp)
  }

  async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
    let req = self.request(Method::GET, path);
    Ok(self.send(Method::GET, path, req).await?.json().await?)
  }

  /// `GET` a list endpoint, accepting either a paginated envelope or a bare
  /// array.
  async fn list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
    Ok(self.get::<Page<T>>(path).await?.into_vec())
  }

  async fn write<B: Serialize + Sync, T: DeserializeOwned>(
    &self,
    method: Method,
    path: &str,
    body: &B,
  ) -> Result<T> {
    let req = self.request(method.clone(), path).json(body);
    Ok(self.send(method, path, req).await?.json().await?)
  }

  async fn delete(&self, path: &str) -> Result<()> {
    let req = self.request(Method::DELETE, path);
    self.send(Method::DELETE, path, req).await?;
    Ok(())
  }
}

impl Api for ApiClient {
  type Error = Error;

  // ── Employees ─────────────────────────────────────────────────────────────

  /// `GET employees/`
  async fn list_employees(&self) -> Result<Vec<Employee>> {
    self.list("employees/").await
  }

  /// `POST employees/`
  async fn create_employee<'a>(
    &'a self,
    input: &'a EmployeeInput,
  ) -> Result<Employee> {
    self.write(Method::POST, "employees/", input).await
  }

  /// `PUT employees/{id}/`
  async fn update_employee<'a>(
    &'a self,
    id: EmployeeId,
    input: &'a EmployeeInput,
  ) -> Result<Employee> {
    self.write(Method::PUT, &format!("employees/{id}/"), input).await
  }

  /// `DELETE employees/{id}/`
  async fn delete_employee(&self, id: EmployeeId) -> Result<()> {
    self.delete(&format!("employees/{id}/")).await
  }

  /// `POST employees/{id}/register_payment/`
  async fn register_payment<'a>(
    &'a self,
    id: EmployeeId,
    payment: &'a PaymentData,
  ) -> Result<Employee> {
    self
      .write(Method::POST, &format!("employees/{id}/register_payment/"), payment)
      .await
  }

  // ── Reference data ────────────────────────────────────────────────────────

  /// `GET departments/`
  async fn list_departments(&self) -> Result<Vec<Department>> {
    self.list("departments/").await
  }

  /// `GET constructions/`
  async fn list_constructions(&self) -> Result<Vec<Construction>> {
    self.list("constructions/").await
  }

  /// `POST constructions/`
  async fn create_construction<'a>(
    &'a self,
    input: &'a ConstructionInput,
  ) -> Result<Construction> {
    self.write(Method::POST, "constructions/", input).await
  }

  /// `PATCH constructions/{id}/`
  async fn update_construction<'a>(
    &'a self,
    id: ConstructionId,
    input: &'a ConstructionInput,
  ) -> Result<Construction> {
    self
      .write(Method::PATCH, &format!("constructions/{id}/"), input)
      .await
  }

  /// `DELETE constructions/{id}/`
  async fn delete_construction(&self, id: ConstructionId) -> Result<()> {
    self.delete(&format!("constructions/{id}/")).await
  }

  /// `GET construction-sectors/?construction={id}`
  async fn list_construction_sectors(
    &self,
    construction_id: ConstructionId,
  ) -> Result<Vec<ConstructionSector>> {
    self
      .list(&format!("construction-sectors/?construction={construction_id}"))
      .await
  }

  // ── Aggregates ────────────────────────────────────────────────────────────

  /// `GET dashboard/`
  async fn dashboard(&self) -> Result<DashboardData> {
    self.get("dashboard/").await
  }
}
