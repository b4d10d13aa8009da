//! The request handle the reqwest transport hands out.

use std::future::Future;
use std::sync::Arc;

use serde_json::Value;
use settle_core::{
    Emitter, Listener, Notification, NotificationKind, Rejection, RequestHandle, Settlement,
};
use tokio::sync::{oneshot, Notify};

use crate::error::TransportError;
use crate::types::HttpResponse;

pub type HttpNotification = Notification<Value, HttpResponse, TransportError>;
pub type HttpEmitter = Emitter<Value, HttpResponse, TransportError>;
pub type HttpSettlement = Settlement<Value, TransportError>;
pub type HttpRejection = Rejection<Value, TransportError>;

/// Handle to one in-flight HTTP request.
///
/// The request is not sent until the handle is dropped, which
/// [`adapt`](settle_core::adapt) does once every listener is attached. Any
/// notification therefore reaches listeners subscribed before the drop.
pub struct HttpHandle {
    emitter: HttpEmitter,
    abort: AbortHandle,
    _release: oneshot::Sender<()>,
}

/// Aborts the request of the handle it was taken from, which then emits an
/// `abort` notification. Aborting a finished request does nothing.
#[derive(Debug, Clone)]
pub struct AbortHandle {
    notify: Arc<Notify>,
}

impl AbortHandle {
    pub fn abort(&self) {
        self.notify.notify_one();
    }
}

/// The transport's side of an [`HttpHandle`].
pub(crate) struct Dispatch {
    emitter: HttpEmitter,
    abort: Arc<Notify>,
    released: oneshot::Receiver<()>,
}

impl HttpHandle {
    pub(crate) fn new() -> (Self, Dispatch) {
        let emitter = HttpEmitter::new();
        let abort = Arc::new(Notify::new());
        let (release, released) = oneshot::channel();

        let handle = Self {
            emitter: emitter.clone(),
            abort: AbortHandle {
                notify: Arc::clone(&abort),
            },
            _release: release,
        };
        let dispatch = Dispatch {
            emitter,
            abort,
            released,
        };
        (handle, dispatch)
    }

    pub fn abort_handle(&self) -> AbortHandle {
        self.abort.clone()
    }
}

impl RequestHandle for HttpHandle {
    type Result = Value;
    type Response = HttpResponse;
    type Error = TransportError;

    fn on(
        &mut self,
        kind: NotificationKind,
        listener: Listener<Value, HttpResponse, TransportError>,
    ) {
        self.emitter.subscribe(kind, listener);
    }
}

impl Dispatch {
    /// Wait for the handle to be released, drive `request` unless aborted
    /// first, and emit the resulting notification.
    pub(crate) async fn run<F>(self, request: F)
    where
        F: Future<Output = HttpNotification>,
    {
        // The sender is never used, so this resolves when the handle drops.
        let _ = self.released.await;

        let notification = tokio::select! {
            biased;
            _ = self.abort.notified() => {
                log::debug!("request aborted");
                Notification::Abort
            }
            notification = request => notification,
        };

        let kind = notification.kind();
        if self.emitter.emit(notification) == 0 {
            log::debug!("'{}' notification had no listeners", kind);
        }
    }
}
