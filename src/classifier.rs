//! Capture decision and presentation tag per flow

use std::fmt;

/// Presentation priority of a flow
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tag {
  /// Traffic to our own backend
  Backend,
  /// Everything else
  Generic,
}

impl Tag {
  /// Marker shown in front of console lines
  pub fn emoji(&self) -> &'static str {
    match self {
      Tag::Backend => "🚀",
      Tag::Generic => "📡",
    }
  }
  /// Value written after `TYPE:` in the log file
  pub fn label(&self) -> &'static str {
    match self {
      Tag::Backend => "🚀 OUR_BACKEND",
      Tag::Generic => "📡 CAPTURED",
    }
  }
}

impl fmt::Display for Tag {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}

/// Outcome of classifying one flow. Not persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CaptureDecision {
  /// Whether the flow gets rendered and logged; always true
  pub capture: bool,
  /// Presentation tag
  pub tag: Tag,
}

/// Tags hosts that contain one of the configured backend identifiers.
#[derive(Clone, Debug, Default)]
pub struct Classifier {
  backend_hosts: Vec<String>,
}

impl Classifier {
  /// Create a classifier over an ordered list of backend host substrings
  pub fn new<I, S>(backend_hosts: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self {
      backend_hosts: backend_hosts.into_iter().map(Into::into).collect(),
    }
  }

  /// Backend host substrings, in match order
  pub fn backend_hosts(&self) -> &[String] {
    &self.backend_hosts
  }

  /// Classify a target host. Every host is captured; only the tag varies.
  pub fn classify(&self, host: &str) -> CaptureDecision {
    let tag = if self.backend_hosts.iter().any(|b| host.contains(b.as_str())) {
      Tag::Backend
    } else {
      Tag::Generic
    };
    CaptureDecision { capture: true, tag }
  }
}
