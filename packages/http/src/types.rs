use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use crate::verb::Verb;

/// HTTP method for requests
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    GET,
    POST,
    PUT,
    DELETE,
    PATCH,
    HEAD,
}

impl From<Method> for http::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::GET => http::Method::GET,
            Method::POST => http::Method::POST,
            Method::PUT => http::Method::PUT,
            Method::DELETE => http::Method::DELETE,
            Method::PATCH => http::Method::PATCH,
            Method::HEAD => http::Method::HEAD,
        }
    }
}

/// A request body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum RequestBody {
    /// Sent as-is
    Text(String),
    /// Sent as `application/x-www-form-urlencoded`
    Form(BTreeMap<String, String>),
    /// Sent as `application/json`
    Json(serde_json::Value),
}

/// Per-call options, layered over the transport's configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct RequestOptions {
    /// Query parameters
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub query: HashMap<String, String>,

    /// Request headers; these win over the transport's default headers
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,

    /// Request body for the non-JSON verbs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<RequestBody>,

    /// Per-request timeout in milliseconds
    #[serde(default, rename = "timeout", skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    pub fn with_data(mut self, data: RequestBody) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }
}

/// The arguments of one verb call, forwarded untouched to the transport.
///
/// `data` and `method` only apply to the JSON verbs: `data` is the JSON body
/// and `method` overrides the method of `json` (which defaults to `GET`).
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct RequestArgs {
    pub url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,

    #[serde(default)]
    pub options: RequestOptions,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<Method>,
}

impl RequestArgs {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }
}

/// A fully resolved HTTP request, ready for a transport to send.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct HttpRequest {
    #[serde(default)]
    pub method: Method,

    /// Absolute URL, or a path relative to the transport's base URL
    pub url: String,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub query: HashMap<String, String>,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<RequestBody>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl HttpRequest {
    /// Resolve the arguments of a `verb` call into a request.
    pub fn from_call(verb: Verb, args: RequestArgs) -> Self {
        let RequestArgs {
            url,
            data,
            options,
            method,
        } = args;

        let mut headers = options.headers;
        let (method, body) = if verb.is_json() {
            let has_content_type = headers
                .keys()
                .any(|name| name.eq_ignore_ascii_case("content-type"));
            if !has_content_type {
                headers.insert("Content-Type".to_string(), "application/json".to_string());
            }
            let method = match verb {
                Verb::Json => method.unwrap_or(Method::GET),
                _ => verb.method(),
            };
            (method, data.map(RequestBody::Json))
        } else {
            (verb.method(), options.data)
        };

        Self {
            method,
            url,
            query: options.query,
            headers,
            body,
            timeout_ms: options.timeout_ms,
        }
    }
}

/// Response metadata delivered alongside a result payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,

    /// Status text (e.g., "OK", "Not Found")
    pub status_text: String,

    /// Response headers keyed by lowercase name, every value in the order
    /// received
    pub headers: HashMap<String, Vec<String>>,
}

impl HttpResponse {
    /// Whether the transport reports this response as a failure.
    pub fn is_failure(&self) -> bool {
        self.status >= 400
    }

    /// First value of the header `name`.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .and_then(|(_, values)| values.first())
            .map(String::as_str)
    }
}

impl From<&reqwest::Response> for HttpResponse {
    fn from(response: &reqwest::Response) -> Self {
        let status = response.status().as_u16();
        let status_text = response
            .status()
            .canonical_reason()
            .unwrap_or("Unknown")
            .to_string();

        let mut headers: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in response.headers() {
            if let Ok(v) = value.to_str() {
                headers
                    .entry(name.to_string())
                    .or_default()
                    .push(v.to_string());
            }
        }

        Self {
            status,
            status_text,
            headers,
        }
    }
}
