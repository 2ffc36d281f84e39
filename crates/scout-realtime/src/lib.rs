//! Realtime notification fanout.
//!
//! [`NotificationHub`] keeps subscriber sets per broadcast channel and per
//! watched player; [`RealtimeNotifier`] maps pipeline events onto those scopes.

pub mod error;
pub mod hub;
pub mod notifier;

pub use error::{RealtimeError, RealtimeResult};
pub use hub::{ConnectionId, NotificationHub, OUTBOUND_QUEUE_SIZE};
pub use notifier::RealtimeNotifier;
