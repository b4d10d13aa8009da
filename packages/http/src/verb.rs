use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::Method;

/// The verbs a [`Client`](crate::Client) can expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Verb {
    Get,
    Post,
    Put,
    Del,
    Head,
    Patch,
    /// JSON body, `GET` unless a method is given
    Json,
    PostJson,
    PutJson,
}

impl Verb {
    pub const ALL: [Verb; 9] = [
        Verb::Get,
        Verb::Post,
        Verb::Put,
        Verb::Del,
        Verb::Head,
        Verb::Patch,
        Verb::Json,
        Verb::PostJson,
        Verb::PutJson,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Verb::Get => "get",
            Verb::Post => "post",
            Verb::Put => "put",
            Verb::Del => "del",
            Verb::Head => "head",
            Verb::Patch => "patch",
            Verb::Json => "json",
            Verb::PostJson => "postJson",
            Verb::PutJson => "putJson",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|verb| verb.name() == name)
    }

    /// The HTTP method this verb sends with by default.
    pub fn method(self) -> Method {
        match self {
            Verb::Get | Verb::Json => Method::GET,
            Verb::Post | Verb::PostJson => Method::POST,
            Verb::Put | Verb::PutJson => Method::PUT,
            Verb::Del => Method::DELETE,
            Verb::Head => Method::HEAD,
            Verb::Patch => Method::PATCH,
        }
    }

    /// Whether the verb sends its data argument as a JSON body.
    pub fn is_json(self) -> bool {
        matches!(self, Verb::Json | Verb::PostJson | Verb::PutJson)
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
