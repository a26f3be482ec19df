//! The list envelope used by paginated REST responses.

use serde::{Deserialize, Serialize};

/// A list response that may or may not be wrapped as `{"results": [...]}`.
///
/// Both shapes unwrap to the same `Vec<T>` via [`Page::into_vec`], so callers
/// never branch on the envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Page<T> {
  Wrapped {
    results: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    count:   Option<u64>,
  },
  Bare(Vec<T>),
}

impl<T> Page<T> {
  pub fn into_vec(self) -> Vec<T> {
    match self {
      Self::Wrapped { results, .. } => results,
      Self::Bare(items) => items,
    }
  }
}

impl<T> From<Page<T>> for Vec<T> {
  fn from(page: Page<T>) -> Self { page.into_vec() }
}
