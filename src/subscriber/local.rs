use std::{cell::Cell, rc::Rc};

use crate::{
  dispatch::Dispatch,
  listener::LocalListener,
  rc::{MutRc, RcDeref, RcDerefMut},
  subscriber::SingleThread,
  table::SubscriptionTable,
};

/// Single-threaded subscriber.
///
/// Holds the emitter through an `Rc` and its table in a `RefCell`. Proxies
/// only keep weak references to either, so dropping the subscriber does not
/// keep the emitter alive; registrations already on the emitter stay there
/// unless the subscriber was turned into a guard with
/// `unsubscribe_when_dropped`.
pub struct LocalSubscriber<Em, E, A: ?Sized> {
  emitter: Rc<Em>,
  table: MutRc<SubscriptionTable<E, LocalListener<A>>>,
  serial: Rc<SingleThread>,
  dispatch: Dispatch,
}

impl_subscriber!(
  LocalSubscriber,
  LocalListener,
  WeakLocalListener,
  MutRc,
  Rc,
  SingleThread,
  Cell<bool>
);
