//! Body decoding: JSON, text, or binary
use crate::errors::DecodeError;
use encoding_rs::{Encoding, UTF_8};
use flate2::read::{GzDecoder, ZlibDecoder};
use mime::Mime;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use std::borrow::Cow;
use std::io::Read;

/// A body as it will be shown in a rendering
#[derive(Clone, Debug, PartialEq)]
pub enum DecodedBody {
  /// Parsed JSON document
  Json(Value),
  /// Decoded text
  Text(String),
  /// Undecodable body, with its length in bytes
  Binary(usize),
}

impl DecodedBody {
  /// Decode a captured body, never failing.
  ///
  /// Returns `None` for an empty body. Any [`DecodeError`] turns into
  /// [`DecodedBody::Binary`] carrying the length of the body as received.
  pub fn from_content(body: &[u8], content_type: &str, content_encoding: &str) -> Option<Self> {
    if body.is_empty() {
      return None;
    }
    let decoded = inflate(body, content_encoding)
      .and_then(|content| decode_body(&content, content_type))
      .unwrap_or_else(|err| {
        tracing::debug!("body shown as binary: {}", err);
        DecodedBody::Binary(body.len())
      });
    Some(decoded)
  }
}

/// Decode body bytes according to the `content-type` header value.
///
/// A content type containing `json` (case-insensitive) must parse as JSON;
/// anything else must decode as text in the declared charset, UTF-8 by default.
pub fn decode_body(body: &[u8], content_type: &str) -> Result<DecodedBody, DecodeError> {
  let text = decode_text(body, content_type)?;
  if content_type.to_ascii_lowercase().contains("json") {
    let value: Value = serde_json::from_str(&text)?;
    Ok(DecodedBody::Json(value))
  } else {
    Ok(DecodedBody::Text(text.into_owned()))
  }
}

/// Strictly decode `body` with the charset named in `content_type`.
pub fn decode_text<'a>(body: &'a [u8], content_type: &str) -> Result<Cow<'a, str>, DecodeError> {
  let charset = content_type
    .parse::<Mime>()
    .ok()
    .and_then(|mime| mime.get_param(mime::CHARSET).map(|c| c.as_str().to_string()));
  let encoding = match charset {
    Some(label) => {
      Encoding::for_label(label.as_bytes()).ok_or(DecodeError::UnknownCharset(label))?
    }
    None => UTF_8,
  };
  encoding
    .decode_without_bom_handling_and_without_replacement(body)
    .ok_or(DecodeError::Malformed(encoding.name()))
}

/// Undo a `content-encoding` of gzip or deflate; identity passes through.
pub fn inflate<'a>(body: &'a [u8], content_encoding: &str) -> Result<Cow<'a, [u8]>, DecodeError> {
  let encoding = content_encoding.trim().to_ascii_lowercase();
  let mut out = Vec::new();
  let read = match encoding.as_str() {
    "" | "identity" => return Ok(Cow::Borrowed(body)),
    "gzip" | "x-gzip" => GzDecoder::new(body).read_to_end(&mut out),
    "deflate" => ZlibDecoder::new(body).read_to_end(&mut out),
    _ => Err(std::io::Error::new(
      std::io::ErrorKind::Unsupported,
      "unsupported content-encoding",
    )),
  };
  match read {
    Ok(_) => Ok(Cow::Owned(out)),
    Err(source) => Err(DecodeError::ContentEncoding { encoding, source }),
  }
}

/// Pretty-print JSON with `indent` spaces per level.
pub fn to_pretty_json(value: &Value, indent: usize) -> Result<String, DecodeError> {
  let indent = " ".repeat(indent);
  let mut out = Vec::new();
  let formatter = PrettyFormatter::with_indent(indent.as_bytes());
  let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
  value.serialize(&mut ser)?;
  String::from_utf8(out).map_err(|_| DecodeError::Malformed("UTF-8"))
}
