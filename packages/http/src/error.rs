use std::error::Error as StdError;
use std::fmt;
use std::io;

use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Invalid URL: {message}")]
    InvalidUrl { message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported verb: {verb}")]
    UnsupportedVerb { verb: String },

    #[error("No tokio runtime: {0}")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),
}

/// Error codes attached to transport errors, named after the errno-style
/// codes HTTP clients conventionally report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    /// The host name could not be resolved
    #[serde(rename = "ENOTFOUND")]
    NotFound,
    #[serde(rename = "ECONNREFUSED")]
    ConnectionRefused,
    #[serde(rename = "ECONNRESET")]
    ConnectionReset,
    /// Timed out without a configured timeout to report
    #[serde(rename = "ETIMEDOUT")]
    TimedOut,
    /// The request could not be built (bad URL, bad header, ...)
    #[serde(rename = "EINVAL")]
    InvalidRequest,
    /// The response body could not be parsed
    #[serde(rename = "EPARSE")]
    Parse,
    #[serde(rename = "EUNKNOWN")]
    Unknown,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::NotFound => "ENOTFOUND",
            ErrorCode::ConnectionRefused => "ECONNREFUSED",
            ErrorCode::ConnectionReset => "ECONNRESET",
            ErrorCode::TimedOut => "ETIMEDOUT",
            ErrorCode::InvalidRequest => "EINVAL",
            ErrorCode::Parse => "EPARSE",
            ErrorCode::Unknown => "EUNKNOWN",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error reported by the transport through an `error` notification.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{code}: {message}")]
pub struct TransportError {
    pub code: ErrorCode,
    pub message: String,
}

impl TransportError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub(crate) fn from_reqwest(error: &reqwest::Error) -> Self {
        Self::new(classify(error), chain_message(error))
    }
}

fn classify(error: &reqwest::Error) -> ErrorCode {
    if error.is_builder() {
        return ErrorCode::InvalidRequest;
    }
    if error.is_decode() {
        return ErrorCode::Parse;
    }
    if error.is_timeout() {
        return ErrorCode::TimedOut;
    }

    let mut source = error.source();
    while let Some(err) = source {
        if is_dns_failure(&err.to_string()) {
            return ErrorCode::NotFound;
        }
        if let Some(io_error) = err.downcast_ref::<io::Error>() {
            match io_error.kind() {
                io::ErrorKind::ConnectionRefused => return ErrorCode::ConnectionRefused,
                io::ErrorKind::ConnectionReset
                | io::ErrorKind::ConnectionAborted
                | io::ErrorKind::BrokenPipe => return ErrorCode::ConnectionReset,
                _ => {}
            }
        }
        source = err.source();
    }
    ErrorCode::Unknown
}

// hyper's connector wraps resolver failures as "dns error"; the underlying
// getaddrinfo messages vary by platform.
fn is_dns_failure(message: &str) -> bool {
    const MARKERS: [&str; 5] = [
        "dns error",
        "failed to lookup address",
        "Name or service not known",
        "nodename nor servname",
        "No such host is known",
    ];
    MARKERS.iter().any(|marker| message.contains(marker))
}

fn chain_message(error: &dyn StdError) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(err) = source {
        message.push_str(": ");
        message.push_str(&err.to_string());
        source = err.source();
    }
    message
}
