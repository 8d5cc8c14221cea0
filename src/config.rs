//! Capture configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Hosts treated as our own backend unless configured otherwise.
///
/// Matched as substrings of the request host, in this order.
pub const DEFAULT_BACKEND_HOSTS: &[&str] = &[
  "10.0.2.2:3000",  // Android emulator -> host machine
  "192.168.1.",     // typical LAN
  "localhost:3000", // local
  "127.0.0.1:3000", // loopback
];

/// Default log file name, created in the primary or fallback directory.
pub const DEFAULT_LOG_FILE_NAME: &str = "complete_capture.log";

/// Configuration for the capture addon
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
  /// Host substrings that mark a flow as going to our backend
  pub backend_hosts: Vec<String>,
  /// Log file name
  pub log_file_name: String,
  /// Primary log directory; `None` uses the directory of the running executable
  pub log_dir: Option<PathBuf>,
  /// Directory tried when the primary one is unwritable; `None` uses the working directory
  pub fallback_dir: Option<PathBuf>,
  /// Spaces per level when pretty-printing JSON
  pub json_indent: usize,
  /// Characters of response JSON shown on the console before truncating
  pub console_json_limit: usize,
  /// Characters of response text shown on the console before truncating
  pub console_text_limit: usize,
}

impl Default for CaptureConfig {
  fn default() -> Self {
    Self {
      backend_hosts: DEFAULT_BACKEND_HOSTS.iter().map(|h| h.to_string()).collect(),
      log_file_name: DEFAULT_LOG_FILE_NAME.to_string(),
      log_dir: None,
      fallback_dir: None,
      json_indent: 2,
      console_json_limit: 2000,
      console_text_limit: 1000,
    }
  }
}

impl CaptureConfig {
  /// Config that logs into `dir`, keeping the other defaults.
  pub fn with_log_dir(dir: impl Into<PathBuf>) -> Self {
    Self {
      log_dir: Some(dir.into()),
      ..Default::default()
    }
  }
}
