//! Observable connection state.

use serde::{Deserialize, Serialize};

/// Lifecycle of the single live socket: `Connecting → Open → Closed`.
///
/// `Closed` is followed by an automatic retry unless the manager was torn
/// down or has exhausted its attempts.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
  Connecting,
  Open,
  #[default]
  Closed,
}

impl ConnectionState {
  pub fn is_open(&self) -> bool { matches!(self, Self::Open) }

  /// `true` while a socket is open or being opened.
  pub fn is_active(&self) -> bool {
    matches!(self, Self::Connecting | Self::Open)
  }
}

impl std::fmt::Display for ConnectionState {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Connecting => write!(f, "connecting"),
      Self::Open => write!(f, "connected"),
      Self::Closed => write!(f, "disconnected"),
    }
  }
}
