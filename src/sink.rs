//! Append-only capture log file
//!
//! The destination is resolved once by [`LogSink::init`] and never changes
//! afterwards. Each append opens the file, writes one block and closes it again,
//! so no handle is shared between concurrent flows.

use crate::config::CaptureConfig;
use crate::errors::{new_other_error, Result};
use chrono::Local;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Where captured blocks end up, fixed for the process lifetime
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogDestination {
  /// Log file in the primary directory
  Primary(PathBuf),
  /// Log file in the fallback directory, the primary one was unwritable
  Fallback(PathBuf),
  /// No writable log file; only the console gets output
  ConsoleOnly,
}

impl LogDestination {
  /// Resolved log file path, `None` in console-only mode
  pub fn path(&self) -> Option<&Path> {
    match self {
      LogDestination::Primary(path) | LogDestination::Fallback(path) => Some(path),
      LogDestination::ConsoleOnly => None,
    }
  }
  /// Whether file logging is unavailable
  pub fn is_console_only(&self) -> bool {
    matches!(self, LogDestination::ConsoleOnly)
  }
}

impl fmt::Display for LogDestination {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.path() {
      Some(path) => write!(f, "{}", path.display()),
      None => f.write_str("none"),
    }
  }
}

/// Owner of the capture log file
#[derive(Clone, Debug)]
pub struct LogSink {
  destination: LogDestination,
}

impl LogSink {
  /// Create the log file and write the banner.
  ///
  /// Tries the primary directory, then the fallback directory, and settles on
  /// console-only mode when neither can be written. Never fails.
  pub fn init(config: &CaptureConfig) -> Self {
    let primary = primary_path(config);
    let primary_err = match primary.and_then(|path| write_banner(&path, config).map(|_| path)) {
      Ok(path) => {
        return Self {
          destination: LogDestination::Primary(path),
        }
      }
      Err(err) => err,
    };
    let fallback = fallback_path(config);
    tracing::warn!(
      "cannot initialize capture log in primary directory: {}; trying {}",
      primary_err,
      fallback.display()
    );
    match write_banner(&fallback, config) {
      Ok(()) => Self {
        destination: LogDestination::Fallback(fallback),
      },
      Err(err) => {
        tracing::error!(
          "cannot initialize capture log at {}: {}; file logging disabled, console only",
          fallback.display(),
          err
        );
        Self {
          destination: LogDestination::ConsoleOnly,
        }
      }
    }
  }

  /// Sink bound to an already resolved destination, no banner written
  pub fn with_destination(destination: LogDestination) -> Self {
    Self { destination }
  }

  /// Get the destination
  pub fn destination(&self) -> &LogDestination {
    &self.destination
  }

  /// Append a block to the log file, reporting failure through `tracing`.
  ///
  /// Returns `false` when the write failed or file logging is disabled.
  pub fn append(&self, text: &str) -> bool {
    if self.destination.is_console_only() {
      return false;
    }
    match self.try_append(text) {
      Ok(()) => {
        tracing::debug!("capture log written: {}", self.destination);
        true
      }
      Err(err) => {
        tracing::error!("error writing capture log {}: {}", self.destination, err);
        false
      }
    }
  }

  /// Append a block to the log file
  pub fn try_append(&self, text: &str) -> Result<()> {
    let path = self
      .destination
      .path()
      .ok_or_else(|| new_other_error("file logging disabled"))?;
    let mut file = OpenOptions::new().append(true).create(true).open(path)?;
    file.write_all(text.as_bytes())?;
    Ok(())
  }
}

/// Text written at the top of a fresh log file
pub fn banner(config: &CaptureConfig, path: &Path) -> String {
  let mut banner = String::new();
  banner.push_str(&format!(
    "🔍 COMPLETE TRAFFIC CAPTURE - Started at {}\n",
    Local::now().format("%Y-%m-%d %H:%M:%S%.6f")
  ));
  banner.push_str("📡 Capturing ABSOLUTELY EVERYTHING - NO FILTERS\n");
  banner.push_str(&format!(
    "🚀 OUR BACKEND (TOP PRIORITY): {}\n",
    config.backend_hosts.join(", ")
  ));
  banner.push_str("📋 Capturing ALL headers and ALL content\n");
  banner.push_str(&format!("📁 Log file: {}\n", path.display()));
  banner.push_str(&"=".repeat(80));
  banner.push_str("\n\n");
  banner
}

fn write_banner(path: &Path, config: &CaptureConfig) -> Result<()> {
  let mut file = File::create(path)?;
  file.write_all(banner(config, path).as_bytes())?;
  Ok(())
}

fn primary_path(config: &CaptureConfig) -> Result<PathBuf> {
  let dir = match &config.log_dir {
    Some(dir) => dir.clone(),
    None => std::env::current_exe()?
      .parent()
      .map(Path::to_path_buf)
      .ok_or_else(|| new_other_error("executable has no parent directory"))?,
  };
  Ok(dir.join(&config.log_file_name))
}

fn fallback_path(config: &CaptureConfig) -> PathBuf {
  let dir = match &config.fallback_dir {
    Some(dir) => dir.clone(),
    None => std::env::current_dir().unwrap_or_default(),
  };
  dir.join(&config.log_file_name)
}
