//! The verb dispatch table.
//!
//! A [`Client`] probes its transport for each [`Verb`] once, at
//! construction, and exposes only the verbs the transport provides. Every
//! call forwards its arguments to the transport unchanged and adapts the
//! returned handle into a [`Settlement`].

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;
use settle_core::{adapt, RequestHandle, Settlement};

use crate::config::TransportConfig;
use crate::error::Error;
use crate::transport::{ReqwestTransport, RequestFn, Transport};
use crate::types::{Method, RequestArgs, RequestOptions};
use crate::verb::Verb;

type HandleOf<T> = <T as Transport>::Handle;
type ResultOf<T> = <HandleOf<T> as RequestHandle>::Result;
type ErrorOf<T> = <HandleOf<T> as RequestHandle>::Error;
type ResponseOf<T> = <HandleOf<T> as RequestHandle>::Response;

/// The settlement a call through a `Client<T>` returns.
pub type ClientSettlement<T> = Settlement<ResultOf<T>, ErrorOf<T>>;

/// A client over the reqwest transport.
pub type HttpClient = Client<ReqwestTransport>;

/// One function per verb the transport provides, each returning a future.
pub struct Client<T: Transport> {
    verbs: HashMap<Verb, RequestFn<HandleOf<T>>>,
}

impl HttpClient {
    /// Create a client over a reqwest transport on the current tokio runtime.
    pub fn from_config(config: TransportConfig) -> Result<Self, Error> {
        Ok(Self::new(&ReqwestTransport::new(config)?))
    }
}

impl<T> Client<T>
where
    T: Transport,
    ResultOf<T>: Send + 'static,
    ErrorOf<T>: Send + 'static,
    ResponseOf<T>: 'static,
{
    pub fn new(transport: &T) -> Self {
        let mut verbs = HashMap::new();
        for verb in Verb::ALL {
            match transport.request_fn(verb) {
                Some(request_fn) => {
                    verbs.insert(verb, request_fn);
                }
                None => log::debug!("transport does not provide '{}'; skipping", verb),
            }
        }
        Self { verbs }
    }

    /// The verbs this client exposes.
    pub fn verbs(&self) -> Vec<Verb> {
        Verb::ALL
            .into_iter()
            .filter(|verb| self.verbs.contains_key(verb))
            .collect()
    }

    pub fn supports(&self, verb: Verb) -> bool {
        self.verbs.contains_key(&verb)
    }

    /// Call `verb` with `args` and adapt the resulting request handle.
    pub fn call(&self, verb: Verb, args: RequestArgs) -> Result<ClientSettlement<T>, Error> {
        let request_fn = self.verbs.get(&verb).ok_or_else(|| Error::UnsupportedVerb {
            verb: verb.name().to_string(),
        })?;
        Ok(adapt(request_fn(args)))
    }

    fn plain(
        &self,
        verb: Verb,
        url: impl Into<String>,
        options: RequestOptions,
    ) -> Result<ClientSettlement<T>, Error> {
        self.call(verb, RequestArgs::new(url).with_options(options))
    }

    pub fn get(
        &self,
        url: impl Into<String>,
        options: RequestOptions,
    ) -> Result<ClientSettlement<T>, Error> {
        self.plain(Verb::Get, url, options)
    }

    pub fn post(
        &self,
        url: impl Into<String>,
        options: RequestOptions,
    ) -> Result<ClientSettlement<T>, Error> {
        self.plain(Verb::Post, url, options)
    }

    pub fn put(
        &self,
        url: impl Into<String>,
        options: RequestOptions,
    ) -> Result<ClientSettlement<T>, Error> {
        self.plain(Verb::Put, url, options)
    }

    pub fn del(
        &self,
        url: impl Into<String>,
        options: RequestOptions,
    ) -> Result<ClientSettlement<T>, Error> {
        self.plain(Verb::Del, url, options)
    }

    pub fn head(
        &self,
        url: impl Into<String>,
        options: RequestOptions,
    ) -> Result<ClientSettlement<T>, Error> {
        self.plain(Verb::Head, url, options)
    }

    pub fn patch(
        &self,
        url: impl Into<String>,
        options: RequestOptions,
    ) -> Result<ClientSettlement<T>, Error> {
        self.plain(Verb::Patch, url, options)
    }

    /// Send `data` as JSON with `method`, or `GET` if none is given.
    pub fn json(
        &self,
        url: impl Into<String>,
        data: Value,
        options: RequestOptions,
        method: Option<Method>,
    ) -> Result<ClientSettlement<T>, Error> {
        let mut args = RequestArgs::new(url).with_data(data).with_options(options);
        args.method = method;
        self.call(Verb::Json, args)
    }

    pub fn post_json(
        &self,
        url: impl Into<String>,
        data: Value,
        options: RequestOptions,
    ) -> Result<ClientSettlement<T>, Error> {
        let args = RequestArgs::new(url).with_data(data).with_options(options);
        self.call(Verb::PostJson, args)
    }

    pub fn put_json(
        &self,
        url: impl Into<String>,
        data: Value,
        options: RequestOptions,
    ) -> Result<ClientSettlement<T>, Error> {
        let args = RequestArgs::new(url).with_data(data).with_options(options);
        self.call(Verb::PutJson, args)
    }
}

impl<T: Transport> fmt::Debug for Client<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verbs: Vec<&str> = Verb::ALL
            .into_iter()
            .filter(|verb| self.verbs.contains_key(verb))
            .map(Verb::name)
            .collect();
        f.debug_struct("Client").field("verbs", &verbs).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorCode, TransportError};
    use crate::transport::mock::ScriptedTransport;
    use serde_json::json;
    use settle_core::{Interrupted, Notification, Rejection};

    #[test]
    fn exposes_every_verb_the_transport_provides() {
        let client = Client::new(&ScriptedTransport::new());
        assert_eq!(client.verbs(), Verb::ALL.to_vec());
    }

    #[test]
    fn skips_missing_verbs() {
        let transport = ScriptedTransport::supporting(&[Verb::Get, Verb::PostJson]);
        let client = Client::new(&transport);

        assert_eq!(client.verbs(), vec![Verb::Get, Verb::PostJson]);
        assert!(client.supports(Verb::Get));
        assert!(!client.supports(Verb::Del));
        assert_eq!(format!("{:?}", client), r#"Client { verbs: ["get", "postJson"] }"#);
    }

    #[test]
    fn calling_missing_verb_is_an_error() {
        let transport = ScriptedTransport::supporting(&[Verb::Get]);
        let client = Client::new(&transport);

        let err = client.del("/x", RequestOptions::new()).unwrap_err();
        assert!(matches!(err, Error::UnsupportedVerb { ref verb } if verb == "del"));
        assert!(transport.calls().is_empty());
    }

    #[test]
    fn forwards_arguments_unchanged() {
        let transport = ScriptedTransport::new();
        let client = Client::new(&transport);

        let options = RequestOptions::new()
            .with_header("X-Trace", "abc")
            .with_query("page", "1");
        let _settlement = client
            .json("/json", json!([1, 2, 3]), options.clone(), Some(Method::PUT))
            .unwrap();

        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        let (verb, args) = &calls[0];
        assert_eq!(*verb, Verb::Json);
        assert_eq!(args.url, "/json");
        assert_eq!(args.data, Some(json!([1, 2, 3])));
        assert_eq!(args.options, options);
        assert_eq!(args.method, Some(Method::PUT));
    }

    #[test]
    fn each_convenience_calls_its_verb() {
        let transport = ScriptedTransport::new();
        let client = Client::new(&transport);
        let options = RequestOptions::new;

        let _ = client.get("/a", options()).unwrap();
        let _ = client.post("/a", options()).unwrap();
        let _ = client.put("/a", options()).unwrap();
        let _ = client.del("/a", options()).unwrap();
        let _ = client.head("/a", options()).unwrap();
        let _ = client.patch("/a", options()).unwrap();
        let _ = client.json("/a", Value::Null, options(), None).unwrap();
        let _ = client.post_json("/a", Value::Null, options()).unwrap();
        let _ = client.put_json("/a", Value::Null, options()).unwrap();

        let verbs: Vec<Verb> = transport.calls().into_iter().map(|(verb, _)| verb).collect();
        assert_eq!(verbs, Verb::ALL.to_vec());
    }

    #[tokio::test]
    async fn get_resolves_with_result() {
        let transport = ScriptedTransport::new();
        let client = Client::new(&transport);

        let settlement = client.get("/array", RequestOptions::new()).unwrap();
        transport
            .last_handle()
            .emit(ScriptedTransport::ok(json!([1, 2, 3])));

        assert_eq!(settlement.await, Ok(json!([1, 2, 3])));
    }

    #[tokio::test]
    async fn get_rejects_with_failure_body() {
        let transport = ScriptedTransport::new();
        let client = Client::new(&transport);

        let settlement = client.get("/fail", RequestOptions::new()).unwrap();
        transport
            .last_handle()
            .emit(ScriptedTransport::not_found(json!({"message": "request failed"})));

        let rejection = settlement.await.unwrap_err();
        assert_eq!(
            rejection,
            Rejection::Fail(json!({"message": "request failed"}))
        );
    }

    #[tokio::test]
    async fn get_rejects_with_transport_error() {
        let transport = ScriptedTransport::new();
        let client = Client::new(&transport);

        let settlement = client.get("https://nowhere.invalid", RequestOptions::new()).unwrap();
        transport.last_handle().emit(Notification::Error {
            error: TransportError::new(ErrorCode::NotFound, "dns error"),
            response: None,
        });

        let rejection = settlement.await.unwrap_err();
        assert_eq!(
            rejection.transport_error().map(|e| e.code),
            Some(ErrorCode::NotFound)
        );
    }

    #[tokio::test]
    async fn calls_settle_independently() {
        let transport = ScriptedTransport::new();
        let client = Client::new(&transport);

        let first = client.get("/1", RequestOptions::new()).unwrap();
        let first_handle = transport.last_handle();
        let second = client.get("/2", RequestOptions::new()).unwrap();
        let second_handle = transport.last_handle();

        second_handle.emit(Notification::Timeout { ms: 15 });
        first_handle.emit(ScriptedTransport::ok(json!("one")));

        assert_eq!(first.await, Ok(json!("one")));
        assert_eq!(
            second.await.unwrap_err().interrupted(),
            Some(&Interrupted::TimedOut { ms: 15 })
        );
    }
}
