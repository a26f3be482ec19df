//! Error types for `gestao-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The frame was not valid JSON, or valid JSON that does not match any
  /// known message shape (including out-of-range enum values).
  #[error("malformed message: {0}")]
  Malformed(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
