//! Lifecycle hooks called by the proxy engine

use crate::classifier::Classifier;
use crate::config::CaptureConfig;
use crate::flow::Flow;
use crate::render::Renderer;
use crate::sink::{LogDestination, LogSink};
use std::fmt::Write;
use std::sync::Arc;

/// Destination of the human readable console stream
pub trait Console: Send + Sync {
  /// Print one block
  fn emit(&self, text: &str);
}

/// Console writing to stdout
#[derive(Clone, Copy, Debug, Default)]
pub struct StdoutConsole;

impl Console for StdoutConsole {
  fn emit(&self, text: &str) {
    use std::io::Write;
    // a closed stdout must not take traffic capture down with it
    let _ = writeln!(std::io::stdout().lock(), "{}", text);
  }
}

/// Hooks invoked by the proxy engine once per observed request and response.
///
/// Implementations only read the flow; they can neither block nor modify traffic.
pub trait Addon: Send + Sync {
  /// A request was received from the client
  fn request(&self, flow: &Flow);
  /// The response to `flow.request` was received from the server
  fn response(&self, flow: &Flow);
}

/// Records every flow to the console and the capture log.
pub struct CaptureAddon {
  classifier: Classifier,
  renderer: Renderer,
  sink: LogSink,
  console: Arc<dyn Console>,
}

impl CaptureAddon {
  /// Initialize the capture log and announce the capture on stdout
  pub fn on_load(config: CaptureConfig) -> Self {
    Self::with_console(config, Arc::new(StdoutConsole))
  }

  /// Initialize the capture log and announce the capture on `console`
  pub fn with_console(config: CaptureConfig, console: Arc<dyn Console>) -> Self {
    let sink = LogSink::init(&config);
    let addon = Self {
      classifier: Classifier::new(config.backend_hosts.iter().cloned()),
      renderer: Renderer::new(&config),
      sink,
      console,
    };
    addon.console.emit(&startup_banner(addon.sink.destination()));
    tracing::info!("traffic capture loaded, log file: {}", addon.sink.destination());
    addon
  }

  /// Get the log destination
  pub fn destination(&self) -> &LogDestination {
    self.sink.destination()
  }

  /// Render the request of `flow` and record it
  pub fn on_request(&self, flow: &Flow) {
    let request = flow.request();
    let decision = self.classifier.classify(request.host());
    if !decision.capture {
      return;
    }
    let rendered = self.renderer.render_request(request, decision.tag);
    self.console.emit(&rendered.console);
    self.record(&rendered.file);
  }

  /// Render the response of `flow`, paired with its request, and record it
  pub fn on_response(&self, flow: &Flow) {
    let request = flow.request();
    let Some(response) = flow.response() else {
      tracing::debug!("flow to {} has no response yet", request.url());
      return;
    };
    let decision = self.classifier.classify(request.host());
    if !decision.capture {
      return;
    }
    let rendered = self.renderer.render_response(request, response, decision.tag);
    self.console.emit(&rendered.console);
    self.record(&rendered.file);
  }

  /// Append a block to the log file, reporting a failed write on the console.
  ///
  /// Returns `false` when nothing was written. Never retried.
  fn record(&self, text: &str) -> bool {
    if self.sink.destination().is_console_only() {
      return false;
    }
    match self.sink.try_append(text) {
      Ok(()) => true,
      Err(err) => {
        tracing::error!("error writing capture log {}: {}", self.sink.destination(), err);
        self
          .console
          .emit(&format!("❌ Error writing log {}: {}", self.sink.destination(), err));
        false
      }
    }
  }
}

impl Addon for CaptureAddon {
  fn request(&self, flow: &Flow) {
    self.on_request(flow)
  }

  fn response(&self, flow: &Flow) {
    self.on_response(flow)
  }
}

fn startup_banner(destination: &LogDestination) -> String {
  let mut banner = String::new();
  let _ = writeln!(banner, "🔍 COMPLETE TRAFFIC CAPTURE STARTED");
  let _ = writeln!(banner, "📁 Log file: {}", destination);
  match destination {
    LogDestination::Primary(_) => {}
    LogDestination::Fallback(_) => {
      let _ = writeln!(
        banner,
        "⚠️ Primary log directory not writable, logging to the fallback directory"
      );
    }
    LogDestination::ConsoleOnly => {
      let _ = writeln!(banner, "⚠️ Log file unavailable, capturing to the console only");
    }
  }
  let _ = writeln!(banner, "📡 Capturing ABSOLUTELY EVERYTHING - NO FILTERS");
  let _ = writeln!(banner, "🚀 OUR BACKEND - TOP PRIORITY");
  let _ = writeln!(banner, "📋 ALL headers and ALL content");
  banner.push_str(&"=".repeat(80));
  banner
}

/// Fans engine events out to every registered addon, in registration order
pub struct AddonHandler {
  addons: Vec<Arc<dyn Addon>>,
}

impl AddonHandler {
  /// Create a new addon handler
  pub fn new() -> Self {
    Self { addons: Vec::new() }
  }

  /// Add an addon
  pub fn add_addon(&mut self, addon: Arc<dyn Addon>) {
    self.addons.push(addon);
  }

  /// Pass a request event to all addons
  pub fn process_request(&self, flow: &Flow) {
    for addon in &self.addons {
      addon.request(flow);
    }
  }

  /// Pass a response event to all addons
  pub fn process_response(&self, flow: &Flow) {
    for addon in &self.addons {
      addon.response(flow);
    }
  }

  /// Check if any addons are registered
  pub fn has_addons(&self) -> bool {
    !self.addons.is_empty()
  }
}

impl Default for AddonHandler {
  fn default() -> Self {
    Self::new()
  }
}
