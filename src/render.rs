//! Console and log file renderings of captured exchanges
//!
//! Every exchange is rendered twice: a console block, where large response
//! bodies are truncated, and a log file block, which is never truncated. The file
//! block labels are fixed so existing log readers keep working.

use crate::classifier::Tag;
use crate::config::CaptureConfig;
use crate::decode::{to_pretty_json, DecodedBody};
use crate::flow::{header_map, CapturedRequest, CapturedResponse};
use chrono::{DateTime, Local};
use http::{HeaderMap, StatusCode};
use serde_json::Value;
use std::fmt::Write;

/// Appended to console bodies that were cut short
pub const TRUNCATION_MARKER: &str = "...";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const FILE_DELIMITER_WIDTH: usize = 80;
const CONSOLE_DELIMITER_WIDTH: usize = 100;

/// Console and log file text for one exchange
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Rendered {
  /// Human readable console block
  pub console: String,
  /// Block appended to the log file
  pub file: String,
}

/// Class of a response status code, shown as a console marker
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusClass {
  /// 2xx
  Success,
  /// 4xx
  ClientError,
  /// 5xx
  ServerError,
  /// anything else
  Informational,
}

impl StatusClass {
  /// Classify a status code
  pub fn of(status: StatusCode) -> Self {
    match status.as_u16() {
      200..=299 => StatusClass::Success,
      400..=499 => StatusClass::ClientError,
      500..=599 => StatusClass::ServerError,
      _ => StatusClass::Informational,
    }
  }
  /// Console marker
  pub fn marker(&self) -> &'static str {
    match self {
      StatusClass::Success => "✅",
      StatusClass::ClientError => "❌",
      StatusClass::ServerError => "💥",
      StatusClass::Informational => "ℹ️",
    }
  }
}

/// Where a body is being rendered
#[derive(Clone, Copy, PartialEq, Eq)]
enum Side {
  Request,
  Response,
}

/// Renders requests and responses into console and log file text.
#[derive(Clone, Debug)]
pub struct Renderer {
  json_indent: usize,
  console_json_limit: usize,
  console_text_limit: usize,
}

impl Default for Renderer {
  fn default() -> Self {
    Renderer::new(&CaptureConfig::default())
  }
}

impl Renderer {
  /// Create a renderer from the capture configuration
  pub fn new(config: &CaptureConfig) -> Self {
    Self {
      json_indent: config.json_indent,
      console_json_limit: config.console_json_limit,
      console_text_limit: config.console_text_limit,
    }
  }

  /// Render a request, stamped with the local clock
  pub fn render_request(&self, request: &CapturedRequest, tag: Tag) -> Rendered {
    self.render_request_at(request, tag, Local::now())
  }

  /// Render a request with a given timestamp
  pub fn render_request_at(
    &self,
    request: &CapturedRequest,
    tag: Tag,
    at: DateTime<Local>,
  ) -> Rendered {
    let timestamp = at.format(TIMESTAMP_FORMAT).to_string();
    let headers = self.headers(request.headers());
    let body = DecodedBody::from_content(
      request.body(),
      &request.content_type(),
      &request.content_encoding(),
    );
    let prefix = match tag {
      Tag::Backend => "OUR_BACKEND",
      Tag::Generic => "CAPTURED",
    };

    let mut console = String::new();
    let _ = writeln!(
      console,
      "\n{} {} [{}] REQUEST: {} {}",
      tag.emoji(),
      prefix,
      timestamp,
      request.method(),
      request.url()
    );
    let _ = writeln!(console, "🏠 Host: {}", request.host());
    let _ = writeln!(console, "🌐 Full URL: {}", request.url());
    let _ = writeln!(console, "📋 Headers: {}", headers);
    if let Some(body) = &body {
      let shown = self.console_body(body, Side::Request);
      let _ = match body {
        DecodedBody::Json(_) => writeln!(console, "📤 JSON Body: {}", shown),
        DecodedBody::Text(_) => writeln!(console, "📤 Body: {}", shown),
        DecodedBody::Binary(_) => writeln!(console, "📤 {}", shown),
      };
    }
    console.push_str(&"-".repeat(CONSOLE_DELIMITER_WIDTH));

    let mut file = String::new();
    let _ = writeln!(file, "\n{}", "=".repeat(FILE_DELIMITER_WIDTH));
    let _ = writeln!(file, "TIMESTAMP: {}", timestamp);
    let _ = writeln!(file, "TYPE: {}", tag.label());
    let _ = writeln!(file, "REQUEST: {} {}", request.method(), request.url());
    let _ = writeln!(file, "HOST: {}", request.host());
    let _ = writeln!(file, "FULL_URL: {}", request.url());
    let _ = writeln!(file, "TODOS LOS HEADERS: {}", headers);
    if let Some(body) = &body {
      let _ = match body {
        DecodedBody::Binary(len) => writeln!(file, "BINARY BODY: {} bytes", len),
        _ => writeln!(file, "BODY: {}", self.file_body(body)),
      };
    }

    Rendered { console, file }
  }

  /// Render a response paired with its request, stamped with the local clock
  pub fn render_response(
    &self,
    request: &CapturedRequest,
    response: &CapturedResponse,
    tag: Tag,
  ) -> Rendered {
    self.render_response_at(request, response, tag, Local::now())
  }

  /// Render a response paired with its request with a given timestamp
  pub fn render_response_at(
    &self,
    request: &CapturedRequest,
    response: &CapturedResponse,
    tag: Tag,
    at: DateTime<Local>,
  ) -> Rendered {
    let timestamp = at.format(TIMESTAMP_FORMAT).to_string();
    let status = response.status_code().as_u16();
    let headers = self.headers(response.headers());
    let body = DecodedBody::from_content(
      response.body(),
      &response.content_type(),
      &response.content_encoding(),
    );
    let prefix = match tag {
      Tag::Backend => "OUR_BACKEND",
      Tag::Generic => "RESPONSE",
    };

    let mut console = String::new();
    let _ = writeln!(
      console,
      "\n{} {} [{}] {} {}: {}",
      tag.emoji(),
      StatusClass::of(response.status_code()).marker(),
      timestamp,
      prefix,
      status,
      request.host()
    );
    let _ = writeln!(console, "📊 Size: {} bytes", response.body().len());
    let _ = writeln!(console, "🌐 URL: {}", request.url());
    let _ = writeln!(console, "📋 Response Headers: {}", headers);
    if let Some(body) = &body {
      let shown = self.console_body(body, Side::Response);
      let _ = match body {
        DecodedBody::Json(_) => writeln!(console, "📦 JSON Response: {}", shown),
        DecodedBody::Text(_) => writeln!(console, "📦 Response Text: {}", shown),
        DecodedBody::Binary(_) => writeln!(console, "📦 {}", shown),
      };
    }
    console.push_str(&"=".repeat(CONSOLE_DELIMITER_WIDTH));

    let mut file = String::new();
    let _ = writeln!(file, "RESPONSE STATUS: {}", status);
    let _ = writeln!(file, "RESPONSE URL: {}", request.url());
    let _ = writeln!(file, "TODOS LOS RESPONSE HEADERS: {}", headers);
    if let Some(body) = &body {
      let _ = match body {
        DecodedBody::Json(_) => writeln!(file, "RESPONSE JSON: {}", self.file_body(body)),
        DecodedBody::Text(_) => writeln!(file, "RESPONSE TEXT: {}", self.file_body(body)),
        DecodedBody::Binary(len) => writeln!(file, "BINARY RESPONSE: {} bytes", len),
      };
    }
    let _ = writeln!(file, "{}\n", "=".repeat(FILE_DELIMITER_WIDTH));

    Rendered { console, file }
  }

  fn headers(&self, headers: &HeaderMap) -> String {
    // a map of strings always serializes
    to_pretty_json(&Value::Object(header_map(headers)), self.json_indent)
      .unwrap_or_else(|_| String::from("{}"))
  }

  fn file_body(&self, body: &DecodedBody) -> String {
    match body {
      DecodedBody::Json(value) => {
        to_pretty_json(value, self.json_indent).unwrap_or_else(|_| value.to_string())
      }
      DecodedBody::Text(text) => text.clone(),
      DecodedBody::Binary(len) => format!("BINARY BODY: {} bytes", len),
    }
  }

  fn console_body(&self, body: &DecodedBody, side: Side) -> String {
    let full = self.file_body(body);
    if side == Side::Request {
      return full;
    }
    match body {
      DecodedBody::Json(_) => truncate(&full, self.console_json_limit),
      DecodedBody::Text(_) => truncate(&full, self.console_text_limit),
      DecodedBody::Binary(_) => full,
    }
  }
}

/// Keep the first `limit` characters of `text`, marking the cut.
pub fn truncate(text: &str, limit: usize) -> String {
  match text.char_indices().nth(limit) {
    Some((end, _)) => format!("{}{}", &text[..end], TRUNCATION_MARKER),
    None => text.to_string(),
  }
}
