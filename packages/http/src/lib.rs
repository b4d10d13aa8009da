//! # settle-http
//!
//! HTTP verbs that return futures.
//!
//! A [`Transport`] issues requests and hands back event-emitting request
//! handles. [`Client`] wraps each verb the transport provides so that a call
//! returns a [`Settlement`](settle_core::Settlement) instead:
//!
//! ```ignore
//! use settle_http::{HttpClient, RequestOptions, TransportConfig};
//!
//! let client = HttpClient::from_config(TransportConfig::default())?;
//!
//! match client.get("https://api.example.com/users/123", RequestOptions::new())?.await {
//!     Ok(user) => println!("{}", user),
//!     // Status >= 400: the raw response body
//!     Err(Rejection::Fail(body)) => println!("failed: {}", body),
//!     // DNS, connection and decoding errors carry an errno-style code
//!     Err(Rejection::Error(error)) => println!("{}", error.code),
//!     // Timeout or abort
//!     Err(Rejection::Interrupted(reason)) => println!("{}", reason),
//! }
//! ```
//!
//! ## Verbs
//!
//! `get`, `post`, `put`, `del`, `head` and `patch` take a URL and
//! [`RequestOptions`]. `json`, `postJson` and `putJson` also take the JSON
//! body to send; `json` takes an optional method and defaults to `GET`.

pub mod client;
pub mod config;
pub mod error;
pub mod handle;
pub mod transport;
pub mod types;
pub mod verb;

// Re-export main types
pub use client::{Client, ClientSettlement, HttpClient};
pub use config::TransportConfig;
pub use error::{Error, ErrorCode, TransportError};
pub use handle::{
    AbortHandle, HttpEmitter, HttpHandle, HttpNotification, HttpRejection, HttpSettlement,
};
pub use transport::{ReqwestTransport, RequestFn, Transport};
pub use types::{HttpRequest, HttpResponse, Method, RequestArgs, RequestBody, RequestOptions};
pub use verb::Verb;

pub use settle_core::{adapt, Interrupted, Rejection};
