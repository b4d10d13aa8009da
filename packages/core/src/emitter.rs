//! Request handles and a minimal event emitter implementing them.

use std::sync::{Arc, Mutex, PoisonError};

use crate::notification::{Notification, NotificationKind};

/// A callback subscribed to one notification kind.
pub type Listener<T, R, E> = Box<dyn FnMut(Notification<T, R, E>) + Send>;

/// A live handle to one in-flight operation.
///
/// The transport that created the handle emits exactly one terminal
/// notification through it. Listeners subscribed with [`RequestHandle::on`]
/// receive the notifications of their kind.
pub trait RequestHandle {
    type Result;
    type Response;
    type Error;

    /// Subscribe `listener` to notifications of `kind`.
    fn on(
        &mut self,
        kind: NotificationKind,
        listener: Listener<Self::Result, Self::Response, Self::Error>,
    );
}

type SharedListener<T, R, E> = Arc<Mutex<Listener<T, R, E>>>;

/// A cloneable, thread-safe emitter of terminal notifications.
///
/// Clones share one listener registry, so a transport can keep one clone to
/// emit through while handing another out as the request handle.
pub struct Emitter<T, R, E> {
    listeners: Arc<Mutex<Vec<(NotificationKind, SharedListener<T, R, E>)>>>,
}

impl<T, R, E> Clone for Emitter<T, R, E> {
    fn clone(&self) -> Self {
        Self {
            listeners: Arc::clone(&self.listeners),
        }
    }
}

impl<T, R, E> Default for Emitter<T, R, E> {
    fn default() -> Self {
        Self {
            listeners: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl<T, R, E> Emitter<T, R, E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, kind: NotificationKind, listener: Listener<T, R, E>) {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((kind, Arc::new(Mutex::new(listener))));
    }

    /// Number of listeners subscribed to `kind`.
    pub fn listener_count(&self, kind: NotificationKind) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(k, _)| *k == kind)
            .count()
    }

    /// Deliver `notification` to every listener of its kind and return how
    /// many listeners were called.
    ///
    /// Listeners run outside the registry lock, so they may subscribe further
    /// listeners. A listener must not emit back into the emitter it is
    /// currently being called from.
    pub fn emit(&self, notification: Notification<T, R, E>) -> usize
    where
        T: Clone,
        R: Clone,
        E: Clone,
    {
        let kind = notification.kind();
        let matching: Vec<SharedListener<T, R, E>> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        let Some((last, rest)) = matching.split_last() else {
            log::trace!("no listeners for '{}' notification", kind);
            return 0;
        };

        for listener in rest {
            Self::call(listener, notification.clone());
        }
        Self::call(last, notification);

        matching.len()
    }

    fn call(listener: &SharedListener<T, R, E>, notification: Notification<T, R, E>) {
        let mut listener = listener.lock().unwrap_or_else(PoisonError::into_inner);
        listener(notification);
    }
}

impl<T, R, E> RequestHandle for Emitter<T, R, E> {
    type Result = T;
    type Response = R;
    type Error = E;

    fn on(&mut self, kind: NotificationKind, listener: Listener<T, R, E>) {
        self.subscribe(kind, listener);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestEmitter = Emitter<u32, (), String>;

    fn recorder(log: &Arc<Mutex<Vec<String>>>, tag: &'static str) -> Listener<u32, (), String> {
        let log = Arc::clone(log);
        Box::new(move |notification: Notification<u32, (), String>| {
            log.lock()
                .unwrap()
                .push(format!("{}:{}", tag, notification.kind()));
        })
    }

    #[test]
    fn emit_reaches_every_listener_of_kind() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let emitter = TestEmitter::new();
        emitter.subscribe(NotificationKind::Success, recorder(&log, "a"));
        emitter.subscribe(NotificationKind::Success, recorder(&log, "b"));
        emitter.subscribe(NotificationKind::Fail, recorder(&log, "c"));

        let called = emitter.emit(Notification::Success {
            result: 1,
            response: (),
        });

        assert_eq!(called, 2);
        assert_eq!(*log.lock().unwrap(), vec!["a:success", "b:success"]);
    }

    #[test]
    fn emit_without_listeners_is_dropped() {
        let emitter = TestEmitter::new();
        assert_eq!(emitter.emit(Notification::Abort), 0);
    }

    #[test]
    fn clones_share_listeners() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let emitter = TestEmitter::new();
        let mut handle = emitter.clone();
        handle.on(NotificationKind::Timeout, recorder(&log, "t"));

        assert_eq!(emitter.listener_count(NotificationKind::Timeout), 1);
        assert_eq!(emitter.listener_count(NotificationKind::Abort), 0);

        emitter.emit(Notification::Timeout { ms: 10 });
        assert_eq!(*log.lock().unwrap(), vec!["t:timeout"]);
    }

    #[test]
    fn listeners_receive_payload() {
        let seen = Arc::new(Mutex::new(None));
        let emitter = TestEmitter::new();
        {
            let seen = Arc::clone(&seen);
            emitter.subscribe(
                NotificationKind::Error,
                Box::new(move |notification: Notification<u32, (), String>| {
                    if let Notification::Error { error, .. } = notification {
                        *seen.lock().unwrap() = Some(error);
                    }
                }),
            );
        }

        emitter.emit(Notification::Error {
            error: "ECONNRESET".to_string(),
            response: None,
        });
        assert_eq!(seen.lock().unwrap().as_deref(), Some("ECONNRESET"));
    }

    #[test]
    fn emit_from_another_thread() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let emitter = TestEmitter::new();
        emitter.subscribe(NotificationKind::Abort, recorder(&log, "x"));

        let remote = emitter.clone();
        std::thread::spawn(move || remote.emit(Notification::Abort))
            .join()
            .unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["x:abort"]);
    }
}
