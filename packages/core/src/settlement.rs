use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::error::Rejection;

/// What a settlement resolves to.
pub type Outcome<T, E> = Result<T, Rejection<T, E>>;

/// The state of a settlement
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SettlementState {
    /// No terminal notification observed yet
    Pending,
    /// Settled with a result
    Fulfilled,
    /// Settled with a rejection
    Rejected,
}

impl SettlementState {
    pub fn is_pending(&self) -> bool {
        *self == SettlementState::Pending
    }

    pub fn is_fulfilled(&self) -> bool {
        *self == SettlementState::Fulfilled
    }

    pub fn is_rejected(&self) -> bool {
        *self == SettlementState::Rejected
    }
}

/// The write side of a settlement. Only the first call to `settle` has an
/// effect.
pub(crate) struct Settler<T, E> {
    sender: Mutex<Option<oneshot::Sender<Outcome<T, E>>>>,
    state: Arc<Mutex<SettlementState>>,
}

impl<T, E> Settler<T, E> {
    /// Settle with `outcome`. Returns `false` if already settled.
    pub(crate) fn settle(&self, outcome: Outcome<T, E>) -> bool {
        let mut sender = self.sender.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(sender) = sender.take() else {
            return false;
        };

        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = if outcome.is_ok() {
            SettlementState::Fulfilled
        } else {
            SettlementState::Rejected
        };

        if sender.send(outcome).is_err() {
            log::debug!("settlement was dropped before it settled; discarding outcome");
        }
        true
    }
}

/// A future that settles exactly once, from the first terminal notification
/// of the request handle it was adapted from.
///
/// Dropping a `Settlement` does not cancel the underlying request.
#[must_use = "a settlement does nothing unless awaited"]
pub struct Settlement<T, E> {
    receiver: oneshot::Receiver<Outcome<T, E>>,
    state: Arc<Mutex<SettlementState>>,
    orphaned: bool,
}

impl<T, E> Settlement<T, E> {
    pub(crate) fn pending() -> (Settler<T, E>, Self) {
        let (sender, receiver) = oneshot::channel();
        let state = Arc::new(Mutex::new(SettlementState::Pending));
        let settler = Settler {
            sender: Mutex::new(Some(sender)),
            state: Arc::clone(&state),
        };
        let settlement = Self {
            receiver,
            state,
            orphaned: false,
        };
        (settler, settlement)
    }

    /// Current state, without polling.
    pub fn state(&self) -> SettlementState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_settled(&self) -> bool {
        !self.state().is_pending()
    }
}

impl<T, E> Future for Settlement<T, E> {
    type Output = Outcome<T, E>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if self.orphaned {
            return Poll::Pending;
        }

        match Pin::new(&mut self.receiver).poll(cx) {
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
            Poll::Ready(Err(_)) => {
                // Every listener was released without a terminal notification.
                // There is nothing left that could settle us.
                log::debug!("request handle released its listeners unsettled; staying pending");
                self.orphaned = true;
                Poll::Pending
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<T, E> fmt::Debug for Settlement<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settlement")
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Interrupted;
    use std::time::Duration;

    #[tokio::test]
    async fn settles_with_first_outcome_only() {
        let (settler, settlement) = Settlement::<u32, String>::pending();

        assert!(settler.settle(Ok(1)));
        assert!(!settler.settle(Ok(2)));
        assert!(!settler.settle(Err(Interrupted::Aborted.into())));

        assert_eq!(settlement.state(), SettlementState::Fulfilled);
        assert_eq!(settlement.await, Ok(1));
    }

    #[tokio::test]
    async fn rejection_updates_state() {
        let (settler, settlement) = Settlement::<u32, String>::pending();
        assert!(settlement.state().is_pending());
        assert!(!settlement.is_settled());

        settler.settle(Err(Rejection::Fail(404)));

        assert!(settlement.state().is_rejected());
        assert_eq!(settlement.await, Err(Rejection::Fail(404)));
    }

    #[tokio::test]
    async fn stays_pending_when_settler_dropped() {
        let (settler, settlement) = Settlement::<u32, String>::pending();
        drop(settler);

        let waited = tokio::time::timeout(Duration::from_millis(20), settlement).await;
        assert!(waited.is_err());
    }

    #[test]
    fn settling_after_settlement_dropped_is_harmless() {
        let (settler, settlement) = Settlement::<u32, String>::pending();
        drop(settlement);
        assert!(settler.settle(Ok(3)));
    }

    #[test]
    fn state_serializes_lowercase() {
        let json = serde_json::to_value(SettlementState::Fulfilled).unwrap();
        assert_eq!(json, serde_json::json!("fulfilled"));
        let state: SettlementState = serde_json::from_value(serde_json::json!("rejected")).unwrap();
        assert!(state.is_rejected());
    }

    #[test]
    fn debug_shows_state() {
        let (_settler, settlement) = Settlement::<u32, String>::pending();
        assert_eq!(format!("{:?}", settlement), "Settlement { state: Pending }");
    }
}
