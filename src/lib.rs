//! # event-subscriber: reference-counted listener bookkeeping
//!
//! Sits in front of any event emitter and lets callers register the same
//! listener for the same event several times, then remove registrations
//! selectively without detaching a listener that is still wanted, and
//! without ever touching listeners that other code put on the emitter.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::{cell::Cell, rc::Rc};
//! use event_subscriber::{prelude::*, testing::OnOffEmitter};
//!
//! let emitter = Rc::new(OnOffEmitter::default());
//! let subscriber = LocalSubscriber::new(emitter.clone()).unwrap();
//!
//! let seen = Rc::new(Cell::new(0));
//! let c_seen = seen.clone();
//! let listener = LocalListener::new(move |v: &i32| c_seen.set(*v));
//!
//! subscriber.subscribe_once("data", &listener).unwrap();
//! emitter.emit(&"data", &42);
//! emitter.emit(&"data", &7);
//! assert_eq!(seen.get(), 42);
//! ```
//!
//! ## Key Concepts
//!
//! | Type | Description |
//! |------|-------------|
//! | [`LocalSubscriber`] / [`SharedSubscriber`] | Subscribers (single-thread vs thread-safe) |
//! | [`Emitter`] | Capability query: which registration methods an emitter has |
//! | [`Listener`] | A listener handle compared by identity |
//! | [`SubscriptionTable`] | Per-event, per-listener registration counts |
//!
//! ## Feature Flags
//!
//! - **`shared`** (default): `SharedSubscriber`, `SharedListener` and `MutArc`
//! - **`test-util`**: in-memory emitters in [`testing`]
//!
//! [`LocalSubscriber`]: subscriber::LocalSubscriber
//! [`SharedSubscriber`]: subscriber::SharedSubscriber
//! [`Emitter`]: emitter::Emitter
//! [`Listener`]: listener::Listener
//! [`SubscriptionTable`]: table::SubscriptionTable
pub mod config;
pub mod dispatch;
pub mod emitter;
pub mod error;
pub mod listener;
pub mod prelude;
pub mod rc;
pub mod subscriber;
pub mod table;
#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use config::SubscriberConfig;
pub use error::Error;
pub use prelude::*;
