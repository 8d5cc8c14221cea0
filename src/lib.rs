#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! # slinger-capture
//!
//! The `slinger-capture` crate is a passive traffic recorder for a
//! man-in-the-middle proxy. It sees every request and response that the proxy
//! engine intercepts and writes a human readable trace of each exchange to the
//! console and to an append-only log file.
//!
//! - Captures everything, there is no filtering
//! - Traffic to our own backend is tagged so it stands out
//! - JSON bodies are pretty-printed, text is shown as is, anything else as a byte count
//! - Keeps working when the log file cannot be written
//!
//! ## Hooking into a proxy engine
//!
//! The engine owns connections and flows. It hands each [`Flow`] to
//! [`CaptureAddon::on_request`] when the request arrives and to
//! [`CaptureAddon::on_response`] once the response is in.
//!
//! ```rust
//! use slinger_capture::{CaptureAddon, CaptureConfig, CapturedRequest, CapturedResponse, Flow};
//! use slinger_capture::{Method, StatusCode};
//!
//! let dir = std::env::temp_dir();
//! let addon = CaptureAddon::on_load(CaptureConfig::with_log_dir(&dir));
//!
//! let request = CapturedRequest::new(Method::GET, "http://192.168.1.50/api/x", "192.168.1.50");
//! let flow = Flow::new(request);
//! addon.on_request(&flow);
//!
//! let flow = flow.with_response(CapturedResponse::new(StatusCode::OK).with_body("ok"));
//! addon.on_response(&flow);
//! ```
//!
//! Several addons can share the same events through an [`AddonHandler`].
//!
//! ## Log file
//!
//! The log is created next to the running executable unless
//! [`CaptureConfig::log_dir`] says otherwise. When that fails the working
//! directory is tried, and when that fails too only the console gets output.
//! Each request adds a block like
//!
//! ```text
//! ================================================================================
//! TIMESTAMP: 2024-03-09 14:05:07
//! TYPE: 🚀 OUR_BACKEND
//! REQUEST: GET http://192.168.1.50/api/x
//! HOST: 192.168.1.50
//! FULL_URL: http://192.168.1.50/api/x
//! TODOS LOS HEADERS: {}
//! ```
//!
//! and the matching response closes it with `RESPONSE STATUS`, `RESPONSE URL`,
//! `TODOS LOS RESPONSE HEADERS`, the body and a delimiter line.
//!
mod addon;
mod body;
/// Capture decision per host
pub mod classifier;
mod config;
/// Body decoding
pub mod decode;
mod errors;
mod flow;
/// tracing setup
pub mod logging;
/// Console and log file rendering
pub mod render;
mod sink;

pub use addon::{Addon, AddonHandler, CaptureAddon, Console, StdoutConsole};
pub use body::Body;
pub use classifier::{CaptureDecision, Classifier, Tag};
pub use config::{CaptureConfig, DEFAULT_BACKEND_HOSTS, DEFAULT_LOG_FILE_NAME};
pub use decode::DecodedBody;
pub use errors::{DecodeError, Error, Result};
pub use flow::{header_map, CapturedRequest, CapturedResponse, Flow};
pub use http::header;
pub use http::{HeaderMap, Method, StatusCode};
pub use render::{Rendered, Renderer, StatusClass};
pub use sink::{banner, LogDestination, LogSink};
