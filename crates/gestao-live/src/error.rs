//! Error type for `gestao-live`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] gestao_core::Error),

  #[error("could not open {url}: {reason}")]
  Connect { url: String, reason: String },

  #[error("connect to {url} timed out")]
  ConnectTimeout { url: String },

  #[error("socket error: {0}")]
  Socket(#[from] tokio_tungstenite::tungstenite::Error),

  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("{method} {path} → {status}")]
  Status {
    method: reqwest::Method,
    path:   String,
    status: reqwest::StatusCode,
  },

  /// The session actor has stopped; no more events can be applied.
  #[error("live session is closed")]
  SessionClosed,

  /// A mutation reported failure and the refreshed server state confirms
  /// the entity is still there.
  #[error("{entity} {id} is still present after a failed {operation}")]
  StillPresent {
    entity:    &'static str,
    id:        i64,
    operation: &'static str,
  },

  /// A REST mutation failed; the source is the collaborator's own error.
  #[error("{operation} failed: {source}")]
  Rest {
    operation: &'static str,
    #[source]
    source:    Box<dyn std::error::Error + Send + Sync>,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
