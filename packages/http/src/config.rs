//! Transport configuration.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::Error;

fn default_user_agent() -> String {
    format!("settle/{}", env!("CARGO_PKG_VERSION"))
}

/// Defaults applied to every request a [`ReqwestTransport`](crate::ReqwestTransport)
/// issues.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransportConfig {
    /// Relative request URLs are joined onto this
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<Url>,

    /// Timeout for requests that don't set their own
    #[serde(default, rename = "timeout", skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,

    /// Headers sent with every request
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_ms: None,
            headers: HashMap::new(),
            user_agent: default_user_agent(),
        }
    }
}

impl TransportConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let config: Self = serde_json::from_str(json)?;
        if let Some(base_url) = &config.base_url {
            check_base(base_url)?;
        }
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, Error> {
        let base_url = Url::parse(base_url)?;
        check_base(&base_url)?;
        self.base_url = Some(base_url);
        Ok(self)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    /// Add a default header that will be sent with every request
    pub fn with_default_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Resolve a request URL: absolute URLs are used as-is, anything else is
    /// joined onto the base URL.
    pub fn resolve(&self, url: &str) -> Result<Url, Error> {
        match Url::parse(url) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => match &self.base_url {
                Some(base) => Ok(base.join(url)?),
                None => Err(Error::InvalidUrl {
                    message: format!("relative URL '{}' without a base URL", url),
                }),
            },
            Err(e) => Err(e.into()),
        }
    }
}

fn check_base(url: &Url) -> Result<(), Error> {
    if url.cannot_be_a_base() {
        return Err(Error::InvalidUrl {
            message: format!("'{}' cannot be used as a base URL", url),
        });
    }
    Ok(())
}
