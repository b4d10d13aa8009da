//! Adapting a request handle into a [`Settlement`].

use std::sync::Arc;

use crate::emitter::RequestHandle;
use crate::error::{Interrupted, Rejection};
use crate::notification::{Notification, NotificationKind};
use crate::settlement::{Outcome, Settlement};

/// Subscribe to every terminal notification of `handle` and return a future
/// settled by the first one to fire.
///
/// | notification | outcome |
/// |---|---|
/// | `Success { result, .. }` | `Ok(result)` |
/// | `Fail { result, .. }` | `Err(Rejection::Fail(result))` |
/// | `Error { error, .. }` | `Err(Rejection::Error(error))` |
/// | `Timeout { ms }` | `Err(Rejection::Interrupted(Interrupted::TimedOut { ms }))` |
/// | `Abort` | `Err(Rejection::Interrupted(Interrupted::Aborted))` |
///
/// All five listeners are attached before this returns and the handle is
/// dropped afterwards. No timeout is enforced here: a handle that never
/// emits leaves the settlement pending.
pub fn adapt<H>(mut handle: H) -> Settlement<H::Result, H::Error>
where
    H: RequestHandle,
    H::Result: Send + 'static,
    H::Error: Send + 'static,
    H::Response: 'static,
{
    let (settler, settlement) = Settlement::pending();
    let settler = Arc::new(settler);

    for kind in NotificationKind::ALL {
        let settler = Arc::clone(&settler);
        handle.on(
            kind,
            Box::new(move |notification: Notification<H::Result, H::Response, H::Error>| {
                if settler.settle(outcome(notification)) {
                    log::debug!("settled on '{}' notification", kind);
                } else {
                    log::trace!("ignoring '{}' notification after settlement", kind);
                }
            }),
        );
    }

    settlement
}

fn outcome<T, R, E>(notification: Notification<T, R, E>) -> Outcome<T, E> {
    match notification {
        Notification::Success { result, .. } => Ok(result),
        Notification::Fail { result, .. } => Err(Rejection::Fail(result)),
        Notification::Error { error, .. } => Err(Rejection::Error(error)),
        Notification::Timeout { ms } => Err(Interrupted::TimedOut { ms }.into()),
        Notification::Abort => Err(Interrupted::Aborted.into()),
    }
}
