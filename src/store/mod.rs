//! Normalized bookmark store.
//!
//! [`state`] holds the pure transition function, [`handle`] wraps it in an
//! explicitly owned container with change subscriptions.

pub mod action;
pub mod handle;
pub mod state;

pub use action::{Action, OpKind};
pub use handle::{Store, Transition};
