//! Flow data handed over by the proxy engine
//!
//! A [`Flow`] pairs one intercepted request with its response once the remote end
//! replies. The engine owns the flow; the capture addon only reads it.

use crate::body::Body;
use http::header::{CONTENT_ENCODING, CONTENT_TYPE, HOST};
use http::{HeaderMap, Method, StatusCode, Uri};
use serde_json::{Map, Value};
use std::fmt;

/// Request side of a flow
#[derive(Clone)]
pub struct CapturedRequest {
  /// HTTP method
  pub method: Method,
  /// Full URL including scheme and authority
  pub url: String,
  /// Target host, port included when the client sent one
  pub host: String,
  /// Request headers
  pub headers: HeaderMap,
  /// Request body, empty when the client sent none
  pub body: Body,
}

impl CapturedRequest {
  /// Create a request with no headers and an empty body
  pub fn new(method: Method, url: impl Into<String>, host: impl Into<String>) -> Self {
    Self {
      method,
      url: url.into(),
      host: host.into(),
      headers: HeaderMap::new(),
      body: Body::empty(),
    }
  }

  /// Replace the headers
  pub fn with_headers(mut self, headers: HeaderMap) -> Self {
    self.headers = headers;
    self
  }

  /// Replace the body
  pub fn with_body(mut self, body: impl Into<Body>) -> Self {
    self.body = body.into();
    self
  }

  /// Get the method
  pub fn method(&self) -> &Method {
    &self.method
  }

  /// Get the full URL
  pub fn url(&self) -> &str {
    &self.url
  }

  /// Get the host
  pub fn host(&self) -> &str {
    &self.host
  }

  /// Get the headers
  pub fn headers(&self) -> &HeaderMap {
    &self.headers
  }

  /// Get the body
  pub fn body(&self) -> &Body {
    &self.body
  }

  /// `content-type` header value, empty when missing
  pub fn content_type(&self) -> String {
    header_str(&self.headers, CONTENT_TYPE)
  }

  /// `content-encoding` header value, empty when missing
  pub fn content_encoding(&self) -> String {
    header_str(&self.headers, CONTENT_ENCODING)
  }
}

impl fmt::Debug for CapturedRequest {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("CapturedRequest")
      .field("method", &self.method)
      .field("url", &self.url)
      .field("host", &self.host)
      .field("headers", &self.headers)
      .field("body", &self.body)
      .finish()
  }
}

impl<B: Into<Body>> From<http::Request<B>> for CapturedRequest {
  fn from(value: http::Request<B>) -> Self {
    let (parts, body) = value.into_parts();
    let host = parts
      .headers
      .get(HOST)
      .and_then(|h| h.to_str().ok())
      .map(|h| h.to_string())
      .or_else(|| parts.uri.authority().map(|a| a.to_string()))
      .unwrap_or_default();
    let url = absolute_url(&parts.uri, &host);
    Self {
      method: parts.method,
      url,
      host,
      headers: parts.headers,
      body: body.into(),
    }
  }
}

/// Response side of a flow
#[derive(Clone)]
pub struct CapturedResponse {
  /// HTTP status code
  pub status: StatusCode,
  /// Response headers
  pub headers: HeaderMap,
  /// Response body, empty when the server sent none
  pub body: Body,
}

impl CapturedResponse {
  /// Create a response with no headers and an empty body
  pub fn new(status: StatusCode) -> Self {
    Self {
      status,
      headers: HeaderMap::new(),
      body: Body::empty(),
    }
  }

  /// Replace the headers
  pub fn with_headers(mut self, headers: HeaderMap) -> Self {
    self.headers = headers;
    self
  }

  /// Replace the body
  pub fn with_body(mut self, body: impl Into<Body>) -> Self {
    self.body = body.into();
    self
  }

  /// Get the `StatusCode`
  pub fn status_code(&self) -> StatusCode {
    self.status
  }

  /// Get the headers
  pub fn headers(&self) -> &HeaderMap {
    &self.headers
  }

  /// Get the body
  pub fn body(&self) -> &Body {
    &self.body
  }

  /// `content-type` header value, empty when missing
  pub fn content_type(&self) -> String {
    header_str(&self.headers, CONTENT_TYPE)
  }

  /// `content-encoding` header value, empty when missing
  pub fn content_encoding(&self) -> String {
    header_str(&self.headers, CONTENT_ENCODING)
  }
}

impl fmt::Debug for CapturedResponse {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("CapturedResponse")
      .field("status", &self.status)
      .field("headers", &self.headers)
      .field("body", &self.body)
      .finish()
  }
}

impl<B: Into<Body>> From<http::Response<B>> for CapturedResponse {
  fn from(value: http::Response<B>) -> Self {
    let (parts, body) = value.into_parts();
    Self {
      status: parts.status,
      headers: parts.headers,
      body: body.into(),
    }
  }
}

/// One intercepted request and, once it arrives, its response
#[derive(Clone, Debug)]
pub struct Flow {
  /// The request
  pub request: CapturedRequest,
  /// The response, `None` until the remote end replies
  pub response: Option<CapturedResponse>,
}

impl Flow {
  /// Flow that has only seen its request so far
  pub fn new(request: CapturedRequest) -> Self {
    Self {
      request,
      response: None,
    }
  }

  /// Attach the response
  pub fn with_response(mut self, response: CapturedResponse) -> Self {
    self.response = Some(response);
    self
  }

  /// Get the request
  pub fn request(&self) -> &CapturedRequest {
    &self.request
  }

  /// Get the response, if any
  pub fn response(&self) -> Option<&CapturedResponse> {
    self.response.as_ref()
  }
}

/// Collapse a header collection into an ordered name -> value map.
///
/// Repeated names keep their first position and join their values with `", "`.
pub fn header_map(headers: &HeaderMap) -> Map<String, Value> {
  let mut map = Map::new();
  for name in headers.keys() {
    let value = headers
      .get_all(name)
      .iter()
      .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
      .collect::<Vec<_>>()
      .join(", ");
    map.insert(name.as_str().to_string(), Value::String(value));
  }
  map
}

fn header_str(headers: &HeaderMap, name: http::header::HeaderName) -> String {
  headers
    .get(name)
    .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
    .unwrap_or_default()
}

fn absolute_url(uri: &Uri, host: &str) -> String {
  if uri.scheme().is_some() || host.is_empty() {
    return uri.to_string();
  }
  let path = uri.path_and_query().map(|p| p.as_str()).unwrap_or("/");
  format!("http://{}{}", host, path)
}
