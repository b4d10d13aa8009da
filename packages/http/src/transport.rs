//! The transport collaborator: issues requests and returns request handles.
//!
//! [`Transport`] is the seam the [`Client`](crate::Client) dispatches
//! through, so it can be backed by reqwest or by a scripted transport in
//! tests.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use serde_json::Value;
use settle_core::{Notification, RequestHandle};
use tokio::runtime::Handle;

use crate::config::TransportConfig;
use crate::error::{Error, ErrorCode, TransportError};
use crate::handle::{HttpHandle, HttpNotification};
use crate::types::{HttpRequest, HttpResponse, RequestArgs, RequestBody};
use crate::verb::Verb;

/// A request-issuing function: takes the call's arguments and returns a live
/// request handle.
pub type RequestFn<H> = Arc<dyn Fn(RequestArgs) -> H + Send + Sync>;

/// Something that can issue requests for some of the [`Verb`]s.
pub trait Transport {
    type Handle: RequestHandle;

    /// The request-issuing function for `verb`, or `None` if this transport
    /// doesn't provide it.
    fn request_fn(&self, verb: Verb) -> Option<RequestFn<Self::Handle>>;
}

/// Transport backed by an async reqwest client.
///
/// Each request runs as its own task on the tokio runtime the transport was
/// created on.
#[derive(Clone)]
pub struct ReqwestTransport {
    inner: Arc<Inner>,
}

struct Inner {
    client: Client,
    config: TransportConfig,
    runtime: Handle,
}

impl ReqwestTransport {
    /// Create a transport on the current tokio runtime.
    pub fn new(config: TransportConfig) -> Result<Self, Error> {
        let runtime = Handle::try_current()?;
        Self::with_runtime(config, runtime)
    }

    pub fn with_runtime(config: TransportConfig, runtime: Handle) -> Result<Self, Error> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            inner: Arc::new(Inner {
                client,
                config,
                runtime,
            }),
        })
    }

    pub fn with_defaults() -> Result<Self, Error> {
        Self::new(TransportConfig::default())
    }

    pub fn config(&self) -> &TransportConfig {
        &self.inner.config
    }

    /// Issue the request a `verb` call with `args` describes.
    pub fn issue(&self, verb: Verb, args: RequestArgs) -> HttpHandle {
        self.send(HttpRequest::from_call(verb, args))
    }

    /// Issue `request`. It is sent once the returned handle is dropped.
    pub fn send(&self, request: HttpRequest) -> HttpHandle {
        let (handle, dispatch) = HttpHandle::new();
        let inner = Arc::clone(&self.inner);

        log::debug!("issuing {:?} {}", request.method, request.url);
        self.inner.runtime.spawn(async move {
            dispatch.run(inner.execute(request)).await;
        });

        handle
    }
}

impl Transport for ReqwestTransport {
    type Handle = HttpHandle;

    fn request_fn(&self, verb: Verb) -> Option<RequestFn<HttpHandle>> {
        let transport = self.clone();
        Some(Arc::new(move |args| transport.issue(verb, args)))
    }
}

impl Inner {
    async fn execute(&self, request: HttpRequest) -> HttpNotification {
        let url = match self.config.resolve(&request.url) {
            Ok(url) => url,
            Err(e) => return invalid(e.to_string()),
        };
        let timeout_ms = request.timeout_ms.or(self.config.timeout_ms);

        let mut headers = HeaderMap::new();
        for (name, value) in self.config.headers.iter().chain(request.headers.iter()) {
            let header_name = match HeaderName::try_from(name.as_str()) {
                Ok(name) => name,
                Err(e) => return invalid(format!("invalid header name '{}': {}", name, e)),
            };
            let header_value = match HeaderValue::try_from(value.as_str()) {
                Ok(value) => value,
                Err(e) => return invalid(format!("invalid value for header '{}': {}", name, e)),
            };
            headers.insert(header_name, header_value);
        }

        let mut req_builder = self.client.request(request.method.into(), url);
        req_builder = req_builder.headers(headers);

        if !request.query.is_empty() {
            req_builder = req_builder.query(&request.query);
        }

        req_builder = match &request.body {
            Some(RequestBody::Text(text)) => req_builder.body(text.clone()),
            Some(RequestBody::Form(fields)) => req_builder.form(fields),
            Some(RequestBody::Json(value)) => req_builder.json(value),
            None => req_builder,
        };

        if let Some(ms) = timeout_ms {
            req_builder = req_builder.timeout(Duration::from_millis(ms));
        }

        let response = match req_builder.send().await {
            Ok(response) => response,
            Err(e) => return failure(&e, timeout_ms),
        };

        let metadata = HttpResponse::from(&response);
        let json = metadata.header("content-type").is_some_and(is_json_mime);
        let body_text = match response.text().await {
            Ok(text) => text,
            Err(e) => return failure(&e, timeout_ms),
        };

        let result = match parse_body(&body_text, json) {
            Ok(result) => result,
            Err(e) => {
                return Notification::Error {
                    error: TransportError::new(ErrorCode::Parse, e.to_string()),
                    response: Some(metadata),
                }
            }
        };

        if metadata.is_failure() {
            log::debug!("{:?} {} failed with {}", request.method, request.url, metadata.status);
            Notification::Fail {
                result,
                response: metadata,
            }
        } else {
            Notification::Success {
                result,
                response: metadata,
            }
        }
    }
}

fn invalid(message: String) -> HttpNotification {
    log::debug!("request could not be built: {}", message);
    Notification::Error {
        error: TransportError::new(ErrorCode::InvalidRequest, message),
        response: None,
    }
}

fn failure(error: &reqwest::Error, timeout_ms: Option<u64>) -> HttpNotification {
    if error.is_timeout() {
        if let Some(ms) = timeout_ms {
            log::debug!("request timed out after {} ms", ms);
            return Notification::Timeout { ms };
        }
    }

    let error = TransportError::from_reqwest(error);
    log::debug!("request failed: {}", error);
    Notification::Error {
        error,
        response: None,
    }
}

fn is_json_mime(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime == "application/json" || mime.ends_with("+json")
}

/// JSON bodies are parsed, anything else is kept as a string. An empty body
/// is `null` whatever its content type.
fn parse_body(text: &str, json: bool) -> Result<Value, serde_json::Error> {
    if text.is_empty() {
        return Ok(Value::Null);
    }
    if json {
        serde_json::from_str(text)
    } else {
        Ok(Value::String(text.to_string()))
    }
}

/// Scripted transport for testing the dispatch table without a network.
#[cfg(test)]
pub mod mock {
    use super::*;
    use crate::handle::HttpEmitter;
    use std::sync::Mutex;

    /// Records every call and hands out emitters the test fires by hand.
    #[derive(Clone)]
    pub struct ScriptedTransport {
        verbs: Vec<Verb>,
        calls: Arc<Mutex<Vec<(Verb, RequestArgs)>>>,
        handles: Arc<Mutex<Vec<HttpEmitter>>>,
    }

    impl ScriptedTransport {
        /// A transport providing every verb.
        pub fn new() -> Self {
            Self::supporting(&Verb::ALL)
        }

        pub fn supporting(verbs: &[Verb]) -> Self {
            Self {
                verbs: verbs.to_vec(),
                calls: Arc::new(Mutex::new(Vec::new())),
                handles: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub fn calls(&self) -> Vec<(Verb, RequestArgs)> {
            self.calls.lock().unwrap().clone()
        }

        /// Emitter behind the most recently issued handle.
        pub fn last_handle(&self) -> HttpEmitter {
            self.handles
                .lock()
                .unwrap()
                .last()
                .cloned()
                .expect("no request issued")
        }

        pub fn ok(body: Value) -> HttpNotification {
            Notification::Success {
                result: body,
                response: HttpResponse {
                    status: 200,
                    status_text: "OK".to_string(),
                    headers: Default::default(),
                },
            }
        }

        pub fn not_found(body: Value) -> HttpNotification {
            Notification::Fail {
                result: body,
                response: HttpResponse {
                    status: 404,
                    status_text: "Not Found".to_string(),
                    headers: Default::default(),
                },
            }
        }
    }

    impl Transport for ScriptedTransport {
        type Handle = HttpEmitter;

        fn request_fn(&self, verb: Verb) -> Option<RequestFn<HttpEmitter>> {
            if !self.verbs.contains(&verb) {
                return None;
            }
            let transport = self.clone();
            Some(Arc::new(move |args| {
                transport.calls.lock().unwrap().push((verb, args));
                let emitter = HttpEmitter::new();
                transport.handles.lock().unwrap().push(emitter.clone());
                emitter
            }))
        }
    }
}
