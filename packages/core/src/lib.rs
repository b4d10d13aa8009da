//! # settle-core
//!
//! Turns an event-emitting request handle into a single [`Settlement`]
//! future.
//!
//! A request handle emits exactly one terminal notification: `success`,
//! `fail`, `error`, `timeout` or `abort`. [`adapt`] subscribes to all five
//! and settles on whichever fires first:
//!
//! ```rust
//! use settle_core::{adapt, Emitter, Notification, Rejection};
//!
//! # tokio_test_block(async {
//! let emitter: Emitter<Vec<u32>, u16, String> = Emitter::new();
//! let settlement = adapt(emitter.clone());
//!
//! emitter.emit(Notification::Fail { result: vec![4, 0, 4], response: 404 });
//!
//! assert_eq!(settlement.await, Err(Rejection::Fail(vec![4, 0, 4])));
//! # });
//! # fn tokio_test_block(f: impl std::future::Future<Output = ()>) {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

mod adapter;
mod emitter;
mod error;
mod notification;
mod settlement;

pub use adapter::adapt;
pub use emitter::{Emitter, Listener, RequestHandle};
pub use error::{Interrupted, Rejection};
pub use notification::{Notification, NotificationKind};
pub use settlement::{Outcome, Settlement, SettlementState};
