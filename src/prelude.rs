//! Prelude module for convenient imports
//!
//! This module re-exports commonly used types and traits for easy access.

// Emitter capabilities
pub use crate::emitter::{Emitter, EventTarget, Listenable, OnceListenable};
// Listeners
#[cfg(feature = "shared")]
pub use crate::listener::SharedListener;
pub use crate::listener::{Listener, ListenerId, LocalListener};
// Subscribers
#[cfg(feature = "shared")]
pub use crate::subscriber::SharedSubscriber;
pub use crate::{
  config::SubscriberConfig,
  dispatch::{AddRemove, Dispatch},
  error::Error,
  subscriber::{LocalSubscriber, SubscriberGuard, TearDown},
};
