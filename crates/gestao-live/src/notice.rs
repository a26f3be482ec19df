//! Transient user-facing acknowledgements.

use strum::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum NoticeLevel {
  Info,
  Success,
  Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
  pub level:  NoticeLevel,
  pub title:  String,
  pub detail: String,
}

impl Notice {
  pub fn new(
    level: NoticeLevel,
    title: impl Into<String>,
    detail: impl Into<String>,
  ) -> Self {
    Self { level, title: title.into(), detail: detail.into() }
  }

  pub fn info(title: impl Into<String>, detail: impl Into<String>) -> Self {
    Self::new(NoticeLevel::Info, title, detail)
  }

  pub fn success(title: impl Into<String>, detail: impl Into<String>) -> Self {
    Self::new(NoticeLevel::Success, title, detail)
  }

  pub fn error(title: impl Into<String>, detail: impl Into<String>) -> Self {
    Self::new(NoticeLevel::Error, title, detail)
  }
}

impl std::fmt::Display for Notice {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}: {}", self.title, self.detail)
  }
}
