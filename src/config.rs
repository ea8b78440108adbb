use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;
use crate::schedule::{WeekReference, DEFAULT_EPOCH};

/// Crate configuration: parity epoch plus cache lifetimes.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Any day of the first odd week, usually the academic year's opening
  /// Monday. The parity convention of the whole deployment hangs off this.
  pub week_epoch: NaiveDate,
  pub cache: CacheTtls,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      week_epoch: DEFAULT_EPOCH,
      cache: CacheTtls::default(),
    }
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided (an absent explicit path is an error)
  /// 2. ./timetable.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/timetable/config.yaml
  ///
  /// No file anywhere means defaults — the core must run unconfigured.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self, ConfigError> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(ConfigError::NotFound(p.to_path_buf()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Ok(Self::default()),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("timetable.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("timetable").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
      path: path.to_path_buf(),
      source: e,
    })?;

    serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
      path: path.to_path_buf(),
      source: e,
    })
  }

  /// The week-parity rule this configuration describes.
  pub fn week_reference(&self) -> WeekReference {
    WeekReference::new(self.week_epoch)
  }
}

/// Cache lifetime per data domain, in seconds.
///
/// Defaults reflect volatility: faculties are near-static reference data,
/// lesson timetables barely change within a term, exam schedules shift as
/// the session approaches.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CacheTtls {
  pub faculties_secs: u64,
  pub groups_secs: u64,
  pub lessons_secs: u64,
  pub exams_secs: u64,
}

impl Default for CacheTtls {
  fn default() -> Self {
    Self {
      faculties_secs: 10 * 60,
      groups_secs: 5 * 60,
      lessons_secs: 60 * 60,
      exams_secs: 30 * 60,
    }
  }
}

impl CacheTtls {
  pub fn faculties(&self) -> Duration {
    Duration::from_secs(self.faculties_secs)
  }

  pub fn groups(&self) -> Duration {
    Duration::from_secs(self.groups_secs)
  }

  pub fn lessons(&self) -> Duration {
    Duration::from_secs(self.lessons_secs)
  }

  pub fn exams(&self) -> Duration {
    Duration::from_secs(self.exams_secs)
  }
}
