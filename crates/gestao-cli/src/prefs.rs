//! Persisted UI preferences and the directories they live in.

use std::{
  fs, io,
  path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

const PREFS_FILE: &str = "prefs.toml";

/// `$<var>/gestao`, falling back to `~/<fallback>/gestao`.
fn xdg_dir(var: &str, fallback: &str) -> Option<PathBuf> {
  if let Some(dir) = std::env::var_os(var)
    && !dir.is_empty()
  {
    return Some(PathBuf::from(dir).join("gestao"));
  }
  std::env::var_os("HOME")
    .map(|home| PathBuf::from(home).join(fallback).join("gestao"))
}

pub fn config_dir() -> Option<PathBuf> { xdg_dir("XDG_CONFIG_HOME", ".config") }

pub fn state_dir() -> Option<PathBuf> { xdg_dir("XDG_STATE_HOME", ".local/state") }

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prefs {
  #[serde(default)]
  pub sidebar_collapsed: bool,
}

impl Prefs {
  pub fn default_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(PREFS_FILE))
  }

  /// Read preferences from `path`. Missing or unreadable files yield the
  /// defaults.
  pub fn load(path: &Path) -> Self {
    let raw = match fs::read_to_string(path) {
      Ok(raw) => raw,
      Err(e) if e.kind() == io::ErrorKind::NotFound => return Self::default(),
      Err(e) => {
        warn!(path = %path.display(), error = %e, "could not read preferences");
        return Self::default();
      }
    };
    toml::from_str(&raw).unwrap_or_else(|e| {
      warn!(path = %path.display(), error = %e, "ignoring corrupt preferences");
      Self::default()
    })
  }

  pub fn save(&self, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent)
        .with_context(|| format!("creating {}", parent.display()))?;
    }
    let raw = toml::to_string(self).context("serialising preferences")?;
    fs::write(path, raw).with_context(|| format!("writing {}", path.display()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn scratch(name: &str) -> PathBuf {
    std::env::temp_dir()
      .join(format!("gestao-prefs-{}-{name}", std::process::id()))
      .join(PREFS_FILE)
  }

  #[test]
  fn missing_file_gives_defaults() {
    assert_eq!(Prefs::load(&scratch("missing")), Prefs::default());
  }

  #[test]
  fn saved_flag_survives_reload() {
    let path = scratch("roundtrip");
    Prefs { sidebar_collapsed: true }.save(&path).unwrap();
    assert!(Prefs::load(&path).sidebar_collapsed);
    let _ = fs::remove_dir_all(path.parent().unwrap());
  }

  #[test]
  fn corrupt_file_gives_defaults() {
    let path = scratch("corrupt");
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "sidebar_collapsed = \"sometimes\"").unwrap();
    assert_eq!(Prefs::load(&path), Prefs::default());
    let _ = fs::remove_dir_all(path.parent().unwrap());
  }
}
