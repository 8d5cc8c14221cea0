//! capture error
use thiserror::Error as ThisError;
/// A `Result` alias where the `Err` case is `slinger_capture::Error`.
pub type Result<T> = std::result::Result<T, Error>;
/// The Errors that may occur while capturing traffic.
#[derive(ThisError, Debug)]
pub enum Error {
  /// Error
  #[error(transparent)]
  IO(#[from] std::io::Error),
  /// Unknown Error
  #[error("{0}")]
  Other(String),
}

/// Why a body could not be shown as JSON or text.
#[derive(ThisError, Debug)]
pub enum DecodeError {
  /// `charset` label not known to encoding_rs
  #[error("unknown charset `{0}`")]
  UnknownCharset(String),
  /// bytes are not valid in the declared charset
  #[error("malformed {0} text")]
  Malformed(&'static str),
  /// gzip/deflate stream could not be inflated
  #[error("content-encoding `{encoding}`: {source}")]
  ContentEncoding {
    /// content-encoding header value
    encoding: String,
    /// inflate error
    source: std::io::Error,
  },
  /// body is not valid JSON despite the content-type
  #[error(transparent)]
  Json(#[from] serde_json::Error),
}

pub(crate) fn new_other_error(msg: impl Into<String>) -> Error {
  Error::Other(msg.into())
}
