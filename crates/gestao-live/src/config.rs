//! Live client configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Endpoints and timing for a live session.
///
/// Every field has a default so a partial config file (or none at all)
/// still yields a usable value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveConfig {
  /// WebSocket endpoint for push messages.
  #[serde(default = "default_ws_url")]
  pub ws_url:                String,
  /// Base URL for the REST collaborator, without a trailing slash.
  #[serde(default = "default_api_url")]
  pub api_url:               String,
  /// Fixed delay before each reconnect attempt.
  #[serde(default = "default_reconnect_interval_ms")]
  pub reconnect_interval_ms: u64,
  /// Retries allowed after an unexpected close before giving up.
  #[serde(default = "default_reconnect_attempts")]
  pub reconnect_attempts:    u32,
  #[serde(default = "default_connect_timeout_ms")]
  pub connect_timeout_ms:    u64,
  /// Wait before re-fetching server state after a failed REST mutation.
  #[serde(default = "default_reconcile_delay_ms")]
  pub reconcile_delay_ms:    u64,
  #[serde(default = "default_request_timeout_ms")]
  pub request_timeout_ms:    u64,
}

fn default_ws_url() -> String { "ws://localhost:8000/ws/employees/".into() }
fn default_api_url() -> String { "http://localhost:8000/api/employees".into() }
fn default_reconnect_interval_ms() -> u64 { 3_000 }
fn default_reconnect_attempts() -> u32 { 5 }
fn default_connect_timeout_ms() -> u64 { 10_000 }
fn default_reconcile_delay_ms() -> u64 { 1_500 }
fn default_request_timeout_ms() -> u64 { 30_000 }

impl Default for LiveConfig {
  fn default() -> Self {
    Self {
      ws_url:                default_ws_url(),
      api_url:               default_api_url(),
      reconnect_interval_ms: default_reconnect_interval_ms(),
      reconnect_attempts:    default_reconnect_attempts(),
      connect_timeout_ms:    default_connect_timeout_ms(),
      reconcile_delay_ms:    default_reconcile_delay_ms(),
      request_timeout_ms:    default_request_timeout_ms(),
    }
  }
}

impl LiveConfig {
  pub fn reconnect_interval(&self) -> Duration {
    Duration::from_millis(self.reconnect_interval_ms)
  }

  pub fn connect_timeout(&self) -> Duration {
    Duration::from_millis(self.connect_timeout_ms)
  }

  pub fn reconcile_delay(&self) -> Duration {
    Duration::from_millis(self.reconcile_delay_ms)
  }

  pub fn request_timeout(&self) -> Duration {
    Duration::from_millis(self.request_timeout_ms)
  }

  pub fn with_ws_url(mut self, url: impl Into<String>) -> Self {
    self.ws_url = url.into();
    self
  }

  pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
    self.api_url = url.into();
    self
  }

  pub fn with_reconnect_interval(mut self, interval: Duration) -> Self {
    self.reconnect_interval_ms = interval.as_millis() as u64;
    self
  }

  pub fn with_reconnect_attempts(mut self, attempts: u32) -> Self {
    self.reconnect_attempts = attempts;
    self
  }

  pub fn with_reconcile_delay(mut self, delay: Duration) -> Self {
    self.reconcile_delay_ms = delay.as_millis() as u64;
    self
  }
}
