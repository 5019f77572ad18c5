//! Subscribers: reference-counted registrations on top of an emitter.
//!
//! A subscriber wraps one emitter and records every registration made
//! through it in a [`SubscriptionTable`](crate::table::SubscriptionTable).
//! Registering the same listener for the same event again only bumps a
//! count, so the emitter holds exactly one physical registration per
//! (event, listener) pair; bulk removal only ever touches what the table
//! holds, never listeners other code put on the emitter.
//!
//! Two flavours share the same implementation:
//!
//! | Type | State | Listener |
//! |------|-------|----------|
//! | [`LocalSubscriber`] | `Rc` + `RefCell` | [`LocalListener`](crate::listener::LocalListener) |
//! | [`SharedSubscriber`] | `Arc` + `Mutex` | [`SharedListener`](crate::listener::SharedListener) |
//!
//! ```rust
//! use std::{cell::Cell, rc::Rc};
//! use event_subscriber::{prelude::*, testing::OnOffEmitter};
//!
//! let emitter = Rc::new(OnOffEmitter::default());
//! let subscriber = LocalSubscriber::new(emitter.clone()).unwrap();
//!
//! let hits = Rc::new(Cell::new(0));
//! let c_hits = hits.clone();
//! let listener = LocalListener::new(move |_: &()| c_hits.set(c_hits.get() + 1));
//!
//! subscriber
//!   .subscribe("click", &listener)
//!   .unwrap()
//!   .subscribe("click", &listener)
//!   .unwrap();
//! assert_eq!(emitter.listener_count(&"click"), 1);
//!
//! emitter.emit(&"click", &());
//! subscriber.unsubscribe(&"click", &listener).unwrap();
//! emitter.emit(&"click", &());
//! assert_eq!(hits.get(), 1);
//! ```
use std::{
  cell::Cell,
  fmt::Debug,
  ops::Deref,
  sync::{
    atomic::{AtomicBool, Ordering},
    Mutex, MutexGuard, PoisonError,
  },
};

use tracing::{trace, warn};

use crate::{dispatch::Dispatch, emitter::Emitter, error::Error, table::Released};

/// Flag guarding a one-shot proxy whose subscriber is gone.
pub(crate) trait Spend: Default {
  /// Mark as spent, returning whether it already was.
  fn spend(&self) -> bool;
}

impl Spend for Cell<bool> {
  fn spend(&self) -> bool { self.replace(true) }
}

impl Spend for AtomicBool {
  fn spend(&self) -> bool { self.swap(true, Ordering::SeqCst) }
}

/// Keeps the table update of an operation and its emitter call together, so
/// no other operation of the same subscriber lands in between.
///
/// The table lock itself is released before the emitter runs; this lock is
/// the one held across the call.
pub(crate) trait Serial: Default {
  type Guard<'a>
  where
    Self: 'a;
  fn hold(&self) -> Self::Guard<'_>;
}

/// Single-threaded subscribers cannot interleave.
#[derive(Default)]
pub(crate) struct SingleThread;

impl Serial for SingleThread {
  type Guard<'a>
    = &'a SingleThread
  where
    Self: 'a;
  #[inline]
  fn hold(&self) -> &SingleThread { self }
}

impl Serial for Mutex<()> {
  type Guard<'a>
    = MutexGuard<'a, ()>
  where
    Self: 'a;
  #[inline]
  fn hold(&self) -> MutexGuard<'_, ()> { self.lock().unwrap_or_else(PoisonError::into_inner) }
}

/// Bring the emitter in line with a one-shot firing that was already
/// booked in the table.
///
/// Errors cannot reach a caller from inside an emitter callback, so they are
/// logged and dropped.
pub(crate) fn settle_once<E, L, Em>(released: Released<L>, dispatch: Dispatch, emitter: &Em, event: &E)
where
  E: Clone + Debug,
  Em: Emitter<E, L> + ?Sized,
  Em::Err: Debug,
{
  let settled = match released {
    Released::Untracked => Ok(()),
    Released::Retained { proxy, remaining } => {
      trace!(?event, remaining, "one-shot fired, registrations remain");
      // The native once already dropped the proxy; put it back for the rest.
      if dispatch.native_once() {
        dispatch.add_once(emitter, event.clone(), proxy)
      } else {
        Ok(())
      }
    }
    Released::Dropped(proxy) => {
      trace!(?event, "one-shot fired, last registration");
      if dispatch.native_once() {
        Ok(())
      } else {
        dispatch.remove(emitter, event, &proxy)
      }
    }
  };
  if let Err(err) = settled {
    warn!(?event, error = ?err, "one-shot proxy could not settle its registration");
  }
}

/// Deregister every released proxy, returning the first failure.
pub(crate) fn remove_each<E, L, Em>(
  dispatch: Dispatch, emitter: &Em, released: impl IntoIterator<Item = (E, L)>,
) -> Result<(), Error<Em::Err>>
where
  E: Debug,
  Em: Emitter<E, L> + ?Sized,
  Em::Err: Debug,
{
  let mut first = None;
  for (event, proxy) in released {
    if let Err(err) = dispatch.remove(emitter, &event, &proxy) {
      if first.is_none() {
        first = Some(err);
      } else {
        warn!(?event, error = ?err, "further deregistration failed");
      }
    }
  }
  first.map_or(Ok(()), Err)
}

/// Something that can drop every registration it made.
pub trait TearDown {
  fn tear_down(&self);
}

/// An RAII implementation of a "scoped subscriber". When this structure is
/// dropped (falls out of scope), every subscription made through the
/// subscriber is removed from the emitter.
///
/// If you want to drop it immediately, wrap it in its own scope.
#[derive(Debug)]
#[must_use]
pub struct SubscriberGuard<T: TearDown>(pub(crate) T);

impl<T: TearDown> SubscriberGuard<T> {
  pub fn new(subscriber: T) -> SubscriberGuard<T> { SubscriberGuard(subscriber) }
}

impl<T: TearDown> Deref for SubscriberGuard<T> {
  type Target = T;
  fn deref(&self) -> &T { &self.0 }
}

impl<T: TearDown> Drop for SubscriberGuard<T> {
  #[inline]
  fn drop(&mut self) { self.0.tear_down() }
}

macro_rules! impl_subscriber {
  (
    $Subscriber:ident,
    $Listener:ident,
    $WeakListener:ident,
    $RcMut:ident,
    $Ptr:ident,
    $Serial:ty,
    $Spent:ty
    $(, $Bound:ident)*
  ) => {
    impl<Em, E, A> $Subscriber<Em, E, A>
    where
      Em: $crate::emitter::Emitter<E, $Listener<A>> $(+ $Bound)* + 'static,
      Em::Err: std::fmt::Debug,
      E: Eq + std::hash::Hash + Clone + std::fmt::Debug $(+ $Bound)* + 'static,
      A: ?Sized + 'static,
    {
      /// Wrap `emitter` with the default config.
      ///
      /// Fails with [`Error::Unsupported`](crate::Error::Unsupported) when
      /// the emitter has neither add/remove shape.
      pub fn new(emitter: $Ptr<Em>) -> Result<Self, $crate::error::Error<Em::Err>> {
        Self::with_config(emitter, $crate::config::SubscriberConfig::default())
      }

      pub fn with_config(
        emitter: $Ptr<Em>, config: $crate::config::SubscriberConfig,
      ) -> Result<Self, $crate::error::Error<Em::Err>> {
        let dispatch = $crate::dispatch::Dispatch::detect::<E, $Listener<A>, Em>(&*emitter, &config)
          .ok_or($crate::error::Error::Unsupported)?;
        tracing::debug!(?dispatch, "subscriber attached");
        Ok(Self {
          emitter,
          table: $RcMut::own($crate::table::SubscriptionTable::new()),
          serial: $Ptr::new(<$Serial>::default()),
          dispatch,
        })
      }

      /// The wrapped emitter, for anything the subscriber does not track.
      #[inline]
      pub fn emitter(&self) -> &$Ptr<Em> { &self.emitter }

      /// The strategy detected for the emitter.
      #[inline]
      pub fn dispatch(&self) -> $crate::dispatch::Dispatch { self.dispatch }

      /// Register `listener` for `event`.
      ///
      /// Only the first registration of a pair reaches the emitter; repeats
      /// are counted. The first registration also decides the kind: after
      /// `subscribe_once(event, listener)`, a `subscribe` of the same pair
      /// only adds one more firing to the one-shot record.
      pub fn subscribe(
        &self, event: E, listener: &$Listener<A>,
      ) -> Result<&Self, $crate::error::Error<Em::Err>> {
        use $crate::listener::Listener;
        let _serial = self.serialize();
        let acquired =
          self.table.rc_deref_mut().acquire(&event, listener.id(), || listener.clone());
        self.register(event, listener.id(), acquired, false)
      }

      /// Register `listener` to run once per call for the next occurrences
      /// of `event`.
      pub fn subscribe_once(
        &self, event: E, listener: &$Listener<A>,
      ) -> Result<&Self, $crate::error::Error<Em::Err>> {
        use $crate::listener::Listener;
        let _serial = self.serialize();
        let acquired = self.table.rc_deref_mut().acquire(&event, listener.id(), || {
          self.once_proxy(event.clone(), listener.clone())
        });
        self.register(event, listener.id(), acquired, true)
      }

      /// Remove every registration of `listener` for `event` at once.
      /// Unknown pairs are ignored.
      pub fn unsubscribe(
        &self, event: &E, listener: &$Listener<A>,
      ) -> Result<&Self, $crate::error::Error<Em::Err>> {
        use $crate::listener::Listener;
        let _serial = self.serialize();
        let proxy = self.table.rc_deref_mut().release(event, listener.id());
        if let Some(proxy) = proxy {
          tracing::trace!(?event, "unsubscribing listener");
          self.dispatch.remove(&*self.emitter, event, &proxy)?;
        }
        Ok(self)
      }

      /// Remove every registration made through this subscriber for `event`.
      pub fn unsubscribe_event(&self, event: &E) -> Result<&Self, $crate::error::Error<Em::Err>> {
        let _serial = self.serialize();
        let proxies = self.table.rc_deref_mut().release_event(event);
        tracing::debug!(?event, count = proxies.len(), "unsubscribing event");
        $crate::subscriber::remove_each(
          self.dispatch,
          &*self.emitter,
          proxies.into_iter().map(|proxy| (event.clone(), proxy)),
        )?;
        Ok(self)
      }

      /// Remove `listener` from every event it was registered for.
      pub fn unsubscribe_listener(
        &self, listener: &$Listener<A>,
      ) -> Result<&Self, $crate::error::Error<Em::Err>> {
        use $crate::listener::Listener;
        let _serial = self.serialize();
        let released = self.table.rc_deref_mut().release_listener(listener.id());
        tracing::debug!(count = released.len(), "unsubscribing listener from all events");
        $crate::subscriber::remove_each(self.dispatch, &*self.emitter, released)?;
        Ok(self)
      }

      /// Remove every registration made through this subscriber.
      pub fn unsubscribe_all(&self) -> Result<&Self, $crate::error::Error<Em::Err>> {
        let _serial = self.serialize();
        let released = self.table.rc_deref_mut().release_all();
        tracing::debug!(count = released.len(), "unsubscribing all");
        $crate::subscriber::remove_each(self.dispatch, &*self.emitter, released)?;
        Ok(self)
      }

      /// Outstanding registrations of `listener` for `event`.
      pub fn tracked_count(&self, event: &E, listener: &$Listener<A>) -> usize {
        use $crate::listener::Listener;
        self.table.rc_deref().count(event, listener.id())
      }

      /// Events with at least one tracked listener.
      pub fn event_names(&self) -> Vec<E> { self.table.rc_deref().event_names() }

      /// Number of tracked (event, listener) pairs.
      pub fn len(&self) -> usize { self.table.rc_deref().len() }

      pub fn is_empty(&self) -> bool { self.table.rc_deref().is_empty() }

      /// Activates "RAII" behavior: every subscription is removed as soon as
      /// the returned guard goes out of scope.
      pub fn unsubscribe_when_dropped(self) -> $crate::subscriber::SubscriberGuard<Self> {
        $crate::subscriber::SubscriberGuard(self)
      }

      fn register(
        &self, event: E, id: $crate::listener::ListenerId,
        acquired: $crate::table::Acquired<$Listener<A>>, once: bool,
      ) -> Result<&Self, $crate::error::Error<Em::Err>> {
        let proxy = match acquired {
          $crate::table::Acquired::Counted(count) => {
            tracing::trace!(?event, count, once, "listener already registered, kind kept from first");
            return Ok(self);
          }
          $crate::table::Acquired::Fresh(proxy) => proxy,
        };
        tracing::trace!(?event, once, "new registration");
        let added = if once {
          self.dispatch.add_once(&*self.emitter, event.clone(), proxy)
        } else {
          self.dispatch.add(&*self.emitter, event.clone(), proxy)
        };
        if let Err(err) = added {
          self.table.rc_deref_mut().release(&event, id);
          return Err(err);
        }
        Ok(self)
      }

      fn serialize(&self) -> <$Serial as $crate::subscriber::Serial>::Guard<'_> {
        $crate::subscriber::Serial::hold(&*self.serial)
      }

      fn once_proxy(&self, event: E, listener: $Listener<A>) -> $Listener<A> {
        use $crate::{
          listener::Listener,
          subscriber::{Serial, Spend},
        };
        let table = self.table.downgrade();
        let emitter = $Ptr::downgrade(&self.emitter);
        let serial = self.serial.clone();
        let dispatch = self.dispatch;
        let id = listener.id();
        let spent = <$Spent>::default();
        // Filled in below, once the proxy exists.
        let this: $RcMut<Option<$crate::listener::$WeakListener<A>>> = $RcMut::own(None);
        let c_this = this.clone();
        let proxy = $Listener::new(move |args: &A| {
          let proxy = c_this.rc_deref().as_ref().and_then(|weak| weak.upgrade());
          let Some(proxy) = proxy else {
            return;
          };
          let Some(table) = table.upgrade() else {
            // Subscriber dropped: stay one-shot and take the registration down.
            if spent.spend() {
              return;
            }
            if !dispatch.native_once() {
              if let Some(emitter) = emitter.upgrade() {
                if let Err(err) = dispatch.remove(&*emitter, &event, &proxy) {
                  tracing::warn!(?event, error = ?err, "orphaned one-shot proxy stayed registered");
                }
              }
            }
            listener.call(args);
            return;
          };
          {
            let _serial = serial.hold();
            let released = table.rc_deref_mut().release_one(&event, id, &proxy);
            if matches!(released, $crate::table::Released::Untracked) {
              return;
            }
            if let Some(emitter) = emitter.upgrade() {
              $crate::subscriber::settle_once(released, dispatch, &*emitter, &event);
            }
          }
          listener.call(args);
        });
        *this.rc_deref_mut() = Some(proxy.downgrade());
        proxy
      }
    }

    impl<Em, E, A> $crate::subscriber::TearDown for $Subscriber<Em, E, A>
    where
      Em: $crate::emitter::Emitter<E, $Listener<A>> $(+ $Bound)* + 'static,
      Em::Err: std::fmt::Debug,
      E: Eq + std::hash::Hash + Clone + std::fmt::Debug $(+ $Bound)* + 'static,
      A: ?Sized + 'static,
    {
      fn tear_down(&self) {
        if let Err(err) = self.unsubscribe_all() {
          tracing::warn!(error = ?err, "tear down left registrations on the emitter");
        }
      }
    }

    impl<Em, E, A: ?Sized> std::fmt::Debug for $Subscriber<Em, E, A> {
      fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!($Subscriber))
          .field("dispatch", &self.dispatch)
          .finish()
      }
    }
  };
}

pub mod local;
#[cfg(feature = "shared")]
pub mod shared;

pub use local::LocalSubscriber;
#[cfg(feature = "shared")]
pub use shared::SharedSubscriber;
