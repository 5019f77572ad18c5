use std::sync::{atomic::AtomicBool, Arc, Mutex};

use crate::{
  dispatch::Dispatch,
  listener::SharedListener,
  rc::{MutArc, RcDeref, RcDerefMut},
  table::SubscriptionTable,
};

/// Thread-safe subscriber.
///
/// The table sits behind a per-subscriber `Mutex`, which is never held while
/// the emitter or a listener runs. One-shot proxies fired concurrently from
/// several threads therefore book their firings one at a time and the counts
/// stay exact.
///
/// A second per-subscriber lock is held from a table update until the
/// emitter call it implies has returned, so a registration in flight on one
/// thread cannot be overtaken by an unsubscribe on another. It is never held
/// while a listener runs.
pub struct SharedSubscriber<Em, E, A: ?Sized> {
  emitter: Arc<Em>,
  table: MutArc<SubscriptionTable<E, SharedListener<A>>>,
  serial: Arc<Mutex<()>>,
  dispatch: Dispatch,
}

impl_subscriber!(
  SharedSubscriber,
  SharedListener,
  WeakSharedListener,
  MutArc,
  Arc,
  Mutex<()>,
  AtomicBool,
  Send,
  Sync
);
