//! Integration tests for slinger-capture

use slinger_capture::header::{HeaderValue, CONTENT_TYPE};
use slinger_capture::{
  CaptureAddon, CaptureConfig, CapturedRequest, CapturedResponse, Console, Flow, HeaderMap,
  LogDestination, Method, StatusCode,
};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Console that keeps every emitted block
#[derive(Default)]
struct RecordingConsole {
  blocks: Mutex<Vec<String>>,
}

impl Console for RecordingConsole {
  fn emit(&self, text: &str) {
    self.blocks.lock().unwrap().push(text.to_string());
  }
}

impl RecordingConsole {
  fn blocks(&self) -> Vec<String> {
    self.blocks.lock().unwrap().clone()
  }
}

fn config_in(dir: &Path) -> CaptureConfig {
  CaptureConfig {
    log_dir: Some(dir.to_path_buf()),
    fallback_dir: Some(dir.to_path_buf()),
    ..Default::default()
  }
}

fn content_type(value: &'static str) -> HeaderMap {
  let mut headers = HeaderMap::new();
  headers.insert(CONTENT_TYPE, HeaderValue::from_static(value));
  headers
}

fn read_log(addon: &CaptureAddon) -> String {
  std::fs::read_to_string(addon.destination().path().unwrap()).unwrap()
}

#[test]
fn test_backend_request_without_body() {
  let dir = tempfile::tempdir().unwrap();
  let console = Arc::new(RecordingConsole::default());
  let addon = CaptureAddon::with_console(config_in(dir.path()), console.clone());

  let request = CapturedRequest::new(Method::GET, "http://192.168.1.50/api/x", "192.168.1.50");
  addon.on_request(&Flow::new(request));

  let blocks = console.blocks();
  assert_eq!(blocks.len(), 2, "startup banner and one request block");
  assert!(blocks[0].contains("COMPLETE TRAFFIC CAPTURE STARTED"));
  let line = blocks[1].lines().nth(1).unwrap();
  assert!(line.starts_with("🚀 OUR_BACKEND ["));
  assert!(line.ends_with("REQUEST: GET http://192.168.1.50/api/x"));
  assert!(blocks[1].contains("Host: 192.168.1.50"));

  let log = read_log(&addon);
  assert!(log.contains("TYPE: 🚀 OUR_BACKEND\n"));
  assert!(log.contains("REQUEST: GET http://192.168.1.50/api/x\n"));
  assert!(log.contains("HOST: 192.168.1.50\n"));
  assert!(log.contains("FULL_URL: http://192.168.1.50/api/x\n"));
  assert!(!log.contains("BODY"));
}

#[test]
fn test_generic_not_found_response() {
  let dir = tempfile::tempdir().unwrap();
  let console = Arc::new(RecordingConsole::default());
  let addon = CaptureAddon::with_console(config_in(dir.path()), console.clone());

  let request = CapturedRequest::new(Method::GET, "https://example.com/missing", "example.com");
  let response = CapturedResponse::new(StatusCode::NOT_FOUND)
    .with_headers(content_type("text/plain"))
    .with_body("not found");
  let flow = Flow::new(request).with_response(response);
  addon.on_request(&flow);
  addon.on_response(&flow);

  let blocks = console.blocks();
  assert_eq!(blocks.len(), 3);
  assert!(blocks[2].contains("❌"));
  assert!(blocks[2].contains("not found"));

  let log = read_log(&addon);
  assert!(log.contains("TYPE: 📡 CAPTURED\n"));
  assert!(log.contains("RESPONSE STATUS: 404\n"));
  assert!(log.contains("RESPONSE URL: https://example.com/missing\n"));
  assert!(log.contains("RESPONSE TEXT: not found\n"));
}

#[test]
fn test_exchange_block_layout_in_log() {
  let dir = tempfile::tempdir().unwrap();
  let addon =
    CaptureAddon::with_console(config_in(dir.path()), Arc::new(RecordingConsole::default()));

  let request = CapturedRequest::new(Method::POST, "http://10.0.2.2:3000/login", "10.0.2.2:3000")
    .with_headers(content_type("application/json"))
    .with_body(r#"{"user":"driver","pin":1234}"#);
  let response = CapturedResponse::new(StatusCode::OK)
    .with_headers(content_type("application/json"))
    .with_body(r#"{"token":"abc"}"#);
  let flow = Flow::new(request).with_response(response);
  addon.on_request(&flow);
  addon.on_response(&flow);

  let log = read_log(&addon);
  let delimiter = "=".repeat(80);
  let (_banner, block) = log.split_once(&format!("\n{}\n", delimiter)).unwrap();
  let labels: Vec<&str> = block
    .lines()
    .filter_map(|line| line.split_once(": ").map(|(label, _)| label))
    .filter(|label| label.chars().all(|c| c.is_ascii_uppercase() || c == ' ' || c == '_'))
    .collect();
  assert_eq!(
    labels,
    vec![
      "TIMESTAMP",
      "TYPE",
      "REQUEST",
      "HOST",
      "FULL_URL",
      "TODOS LOS HEADERS",
      "BODY",
      "RESPONSE STATUS",
      "RESPONSE URL",
      "TODOS LOS RESPONSE HEADERS",
      "RESPONSE JSON",
    ]
  );
  assert!(block.contains("RESPONSE JSON: {\n  \"token\": \"abc\"\n}\n"));
  assert!(log.ends_with(&format!("{}\n\n", delimiter)));
}

#[test]
fn test_binary_request_body() {
  let dir = tempfile::tempdir().unwrap();
  let console = Arc::new(RecordingConsole::default());
  let addon = CaptureAddon::with_console(config_in(dir.path()), console.clone());

  let body: Vec<u8> = (0u8..=255).rev().collect();
  let request = CapturedRequest::new(Method::PUT, "http://cdn.example.com/blob", "cdn.example.com")
    .with_headers(content_type("application/octet-stream"))
    .with_body(body);
  addon.on_request(&Flow::new(request));

  assert!(console.blocks()[1].contains("BINARY BODY: 256 bytes"));
  assert!(read_log(&addon).contains("BINARY BODY: 256 bytes\n"));
}

#[test]
fn test_degraded_mode_still_prints() {
  let dir = tempfile::tempdir().unwrap();
  let missing = dir.path().join("missing");
  let config = CaptureConfig {
    log_dir: Some(missing.join("primary")),
    fallback_dir: Some(missing.join("fallback")),
    ..Default::default()
  };
  let console = Arc::new(RecordingConsole::default());
  let addon = CaptureAddon::with_console(config, console.clone());
  assert_eq!(addon.destination(), &LogDestination::ConsoleOnly);

  let request = CapturedRequest::new(Method::GET, "http://example.com/", "example.com");
  let response = CapturedResponse::new(StatusCode::INTERNAL_SERVER_ERROR)
    .with_headers(content_type("application/json"))
    .with_body(r#"{"error":"boom"}"#);
  let flow = Flow::new(request).with_response(response);
  addon.on_request(&flow);
  addon.on_response(&flow);

  let blocks = console.blocks();
  assert_eq!(blocks.len(), 3);
  assert!(blocks[2].contains("💥"));
  assert!(blocks[2].contains("\"error\": \"boom\""));
  assert!(!missing.exists());
}

#[test]
fn test_failed_append_is_reported_on_console() {
  let dir = tempfile::tempdir().unwrap();
  let log_dir = dir.path().join("logs");
  std::fs::create_dir(&log_dir).unwrap();
  let console = Arc::new(RecordingConsole::default());
  let addon = CaptureAddon::with_console(
    CaptureConfig {
      log_dir: Some(log_dir.clone()),
      fallback_dir: Some(log_dir.clone()),
      ..Default::default()
    },
    console.clone(),
  );
  assert!(matches!(addon.destination(), LogDestination::Primary(_)));
  std::fs::remove_dir_all(&log_dir).unwrap();

  let request = CapturedRequest::new(Method::GET, "http://example.com/", "example.com");
  let flow = Flow::new(request).with_response(CapturedResponse::new(StatusCode::OK));
  addon.on_request(&flow);
  addon.on_response(&flow);

  let blocks = console.blocks();
  assert_eq!(blocks.len(), 5, "banner, request, error, response, error");
  assert!(blocks[1].contains("REQUEST: GET http://example.com/"));
  assert!(blocks[2].starts_with("❌ Error writing log"));
  assert!(blocks[4].starts_with("❌ Error writing log"));
  assert!(!log_dir.exists());
}

#[test]
fn test_fallback_is_announced_on_console() {
  let dir = tempfile::tempdir().unwrap();
  let console = Arc::new(RecordingConsole::default());
  let addon = CaptureAddon::with_console(
    CaptureConfig {
      log_dir: Some(dir.path().join("missing")),
      fallback_dir: Some(dir.path().to_path_buf()),
      ..Default::default()
    },
    console.clone(),
  );
  let path = dir.path().join("complete_capture.log");
  assert_eq!(addon.destination(), &LogDestination::Fallback(path.clone()));

  let banner = &console.blocks()[0];
  assert!(banner.contains(&format!("📁 Log file: {}", path.display())));
  assert!(banner.contains("⚠️ Primary log directory not writable"));

  addon.on_request(&Flow::new(CapturedRequest::new(
    Method::GET,
    "http://example.com/",
    "example.com",
  )));
  assert_eq!(console.blocks().len(), 2);
  assert!(read_log(&addon).contains("REQUEST: GET http://example.com/\n"));
}

#[test]
fn test_response_without_response_is_ignored() {
  let dir = tempfile::tempdir().unwrap();
  let console = Arc::new(RecordingConsole::default());
  let addon = CaptureAddon::with_console(config_in(dir.path()), console.clone());
  let before = read_log(&addon);

  let flow = Flow::new(CapturedRequest::new(Method::GET, "http://a.test/", "a.test"));
  addon.on_response(&flow);

  assert_eq!(console.blocks().len(), 1);
  assert_eq!(read_log(&addon), before);
}

#[test]
fn test_from_http_types() {
  let dir = tempfile::tempdir().unwrap();
  let addon =
    CaptureAddon::with_console(config_in(dir.path()), Arc::new(RecordingConsole::default()));

  let request = http::Request::builder()
    .method("POST")
    .uri("/api/v1/orders")
    .header("host", "localhost:3000")
    .header("content-type", "application/json")
    .body(br#"{"id":7}"#.to_vec())
    .unwrap();
  let response = http::Response::builder()
    .status(201)
    .header("content-type", "application/json")
    .body(br#"{"created":true}"#.to_vec())
    .unwrap();
  let flow = Flow::new(request.into()).with_response(response.into());
  addon.on_request(&flow);
  addon.on_response(&flow);

  let log = read_log(&addon);
  assert!(log.contains("TYPE: 🚀 OUR_BACKEND\n"));
  assert!(log.contains("REQUEST: POST http://localhost:3000/api/v1/orders\n"));
  assert!(log.contains("BODY: {\n  \"id\": 7\n}\n"));
  assert!(log.contains("RESPONSE STATUS: 201\n"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_flows_each_append_one_block() {
  let dir = tempfile::tempdir().unwrap();
  let addon = Arc::new(CaptureAddon::with_console(
    config_in(dir.path()),
    Arc::new(RecordingConsole::default()),
  ));

  let mut tasks = Vec::new();
  for i in 0..32 {
    let addon = addon.clone();
    tasks.push(tokio::spawn(async move {
      let url = format!("http://example.com/item/{}", i);
      let request = CapturedRequest::new(Method::GET, url, "example.com");
      let flow = Flow::new(request).with_response(CapturedResponse::new(StatusCode::OK));
      addon.on_request(&flow);
      addon.on_response(&flow);
    }));
  }
  for task in tasks {
    task.await.unwrap();
  }

  let log = read_log(&addon);
  assert_eq!(log.matches("TIMESTAMP: ").count(), 32);
  assert_eq!(log.matches("RESPONSE STATUS: 200\n").count(), 32);
  for i in 0..32 {
    assert!(log.contains(&format!("REQUEST: GET http://example.com/item/{}\n", i)));
  }
}
