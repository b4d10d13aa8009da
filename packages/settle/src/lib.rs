//! settle: futures for event-emitting HTTP requests.
//!
//! A request handle that reports its outcome through `success`, `fail`,
//! `error`, `timeout` and `abort` notifications becomes a single future with
//! [`adapt`]. [`HttpClient`] applies this to every HTTP verb its transport
//! provides.

pub use settle_core::{
    adapt, Emitter, Interrupted, Listener, Notification, NotificationKind, Outcome, Rejection,
    RequestHandle, Settlement, SettlementState,
};
pub use settle_http::{
    AbortHandle, Client, ClientSettlement, Error, ErrorCode, HttpClient, HttpHandle, HttpRequest,
    HttpResponse, HttpSettlement, Method, ReqwestTransport, RequestArgs, RequestBody,
    RequestFn, RequestOptions, Transport, TransportConfig, TransportError, Verb,
};
