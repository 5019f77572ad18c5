//! In-memory emitters for tests.
//!
//! Each emitter wraps a [`ListenerRegistry`] and exposes one registration
//! shape. The registry stores physical registrations in order, matches them
//! by listener identity and counts add/remove calls, so tests can check what
//! a subscriber actually did to the emitter.
use std::{
  convert::Infallible,
  ops::Deref,
  sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Mutex, PoisonError,
  },
};

use thiserror::Error;

use crate::{
  emitter::{Emitter, EventTarget, Listenable, OnceListenable},
  listener::Listener,
};

struct Entry<E, L> {
  event: E,
  listener: L,
  once: bool,
}

/// Physical registrations of an emitter.
pub struct ListenerRegistry<E, L> {
  entries: Mutex<Vec<Entry<E, L>>>,
  adds: AtomicUsize,
  removes: AtomicUsize,
}

impl<E, L> Default for ListenerRegistry<E, L> {
  fn default() -> Self {
    Self { entries: Mutex::new(vec![]), adds: AtomicUsize::new(0), removes: AtomicUsize::new(0) }
  }
}

impl<E: PartialEq, L: Clone + PartialEq> ListenerRegistry<E, L> {
  pub fn add(&self, event: E, listener: L, once: bool) {
    self.adds.fetch_add(1, Ordering::SeqCst);
    self.lock().push(Entry { event, listener, once });
  }

  /// Drop the first registration of `listener` for `event`, if any.
  pub fn remove(&self, event: &E, listener: &L) {
    self.removes.fetch_add(1, Ordering::SeqCst);
    let mut entries = self.lock();
    if let Some(pos) = entries
      .iter()
      .position(|e| e.event == *event && e.listener == *listener)
    {
      entries.remove(pos);
    }
  }

  /// Invoke every listener registered for `event`, returning how many ran.
  ///
  /// One-shot registrations are dropped before anything is invoked, and the
  /// registry is unlocked while listeners run so they may add or remove
  /// registrations.
  pub fn emit<A: ?Sized>(&self, event: &E, args: &A) -> usize
  where
    L: Listener<A>,
  {
    let targets: Vec<L> = {
      let mut entries = self.lock();
      let targets = entries
        .iter()
        .filter(|e| e.event == *event)
        .map(|e| e.listener.clone())
        .collect();
      entries.retain(|e| !(e.once && e.event == *event));
      targets
    };
    for listener in &targets {
      listener.call(args);
    }
    targets.len()
  }

  pub fn listener_count(&self, event: &E) -> usize {
    self.lock().iter().filter(|e| e.event == *event).count()
  }

  /// Total registrations across all events.
  pub fn len(&self) -> usize { self.lock().len() }

  pub fn is_empty(&self) -> bool { self.lock().is_empty() }

  /// Number of add or once calls received.
  pub fn add_calls(&self) -> usize { self.adds.load(Ordering::SeqCst) }

  /// Number of remove calls received, including ones that matched nothing.
  pub fn remove_calls(&self) -> usize { self.removes.load(Ordering::SeqCst) }

  fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Entry<E, L>>> {
    self.entries.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

macro_rules! registry_deref {
  ($emitter: ident) => {
    impl<E, L> Default for $emitter<E, L> {
      fn default() -> Self { Self { registry: ListenerRegistry::default() } }
    }

    impl<E, L> Deref for $emitter<E, L> {
      type Target = ListenerRegistry<E, L>;
      fn deref(&self) -> &Self::Target { &self.registry }
    }
  };
}

/// Emitter with `on` / `off`.
pub struct OnOffEmitter<E, L> {
  registry: ListenerRegistry<E, L>,
}

registry_deref!(OnOffEmitter);

impl<E: PartialEq, L: Clone + PartialEq> Listenable<E, L> for OnOffEmitter<E, L> {
  type Err = Infallible;
  fn on(&self, event: E, listener: L) -> Result<(), Infallible> {
    self.registry.add(event, listener, false);
    Ok(())
  }
  fn off(&self, event: &E, listener: &L) -> Result<(), Infallible> {
    self.registry.remove(event, listener);
    Ok(())
  }
}

impl<E: PartialEq, L: Clone + PartialEq> Emitter<E, L> for OnOffEmitter<E, L> {
  type Err = Infallible;
  fn as_listenable(&self) -> Option<&dyn Listenable<E, L, Err = Infallible>> { Some(self) }
}

/// Emitter with `add_event_listener` / `remove_event_listener`, the way a
/// DOM node registers handlers.
pub struct DomTarget<E, L> {
  registry: ListenerRegistry<E, L>,
}

registry_deref!(DomTarget);

impl<E: PartialEq, L: Clone + PartialEq> EventTarget<E, L> for DomTarget<E, L> {
  type Err = Infallible;
  fn add_event_listener(&self, event: E, listener: L) -> Result<(), Infallible> {
    self.registry.add(event, listener, false);
    Ok(())
  }
  fn remove_event_listener(&self, event: &E, listener: &L) -> Result<(), Infallible> {
    self.registry.remove(event, listener);
    Ok(())
  }
}

impl<E: PartialEq, L: Clone + PartialEq> Emitter<E, L> for DomTarget<E, L> {
  type Err = Infallible;
  fn as_event_target(&self) -> Option<&dyn EventTarget<E, L, Err = Infallible>> { Some(self) }
}

/// Emitter with `on` / `off` and a native `once`.
pub struct OnceEmitter<E, L> {
  registry: ListenerRegistry<E, L>,
}

registry_deref!(OnceEmitter);

impl<E: PartialEq, L: Clone + PartialEq> Listenable<E, L> for OnceEmitter<E, L> {
  type Err = Infallible;
  fn on(&self, event: E, listener: L) -> Result<(), Infallible> {
    self.registry.add(event, listener, false);
    Ok(())
  }
  fn off(&self, event: &E, listener: &L) -> Result<(), Infallible> {
    self.registry.remove(event, listener);
    Ok(())
  }
}

impl<E: PartialEq, L: Clone + PartialEq> OnceListenable<E, L> for OnceEmitter<E, L> {
  type Err = Infallible;
  fn once(&self, event: E, listener: L) -> Result<(), Infallible> {
    self.registry.add(event, listener, true);
    Ok(())
  }
}

impl<E: PartialEq, L: Clone + PartialEq> Emitter<E, L> for OnceEmitter<E, L> {
  type Err = Infallible;
  fn as_listenable(&self) -> Option<&dyn Listenable<E, L, Err = Infallible>> { Some(self) }
  fn as_once(&self) -> Option<&dyn OnceListenable<E, L, Err = Infallible>> { Some(self) }
}

/// Emitter exposing both add/remove shapes, each backed by its own registry
/// so tests can tell which one was used. Its `once` belongs to the `on`
/// side.
pub struct HybridEmitter<E, L> {
  pub via_target: ListenerRegistry<E, L>,
  pub via_on: ListenerRegistry<E, L>,
}

impl<E, L> Default for HybridEmitter<E, L> {
  fn default() -> Self {
    Self { via_target: ListenerRegistry::default(), via_on: ListenerRegistry::default() }
  }
}

impl<E: PartialEq, L: Clone + PartialEq> Listenable<E, L> for HybridEmitter<E, L> {
  type Err = Infallible;
  fn on(&self, event: E, listener: L) -> Result<(), Infallible> {
    self.via_on.add(event, listener, false);
    Ok(())
  }
  fn off(&self, event: &E, listener: &L) -> Result<(), Infallible> {
    self.via_on.remove(event, listener);
    Ok(())
  }
}

impl<E: PartialEq, L: Clone + PartialEq> EventTarget<E, L> for HybridEmitter<E, L> {
  type Err = Infallible;
  fn add_event_listener(&self, event: E, listener: L) -> Result<(), Infallible> {
    self.via_target.add(event, listener, false);
    Ok(())
  }
  fn remove_event_listener(&self, event: &E, listener: &L) -> Result<(), Infallible> {
    self.via_target.remove(event, listener);
    Ok(())
  }
}

impl<E: PartialEq, L: Clone + PartialEq> OnceListenable<E, L> for HybridEmitter<E, L> {
  type Err = Infallible;
  fn once(&self, event: E, listener: L) -> Result<(), Infallible> {
    self.via_on.add(event, listener, true);
    Ok(())
  }
}

impl<E: PartialEq, L: Clone + PartialEq> Emitter<E, L> for HybridEmitter<E, L> {
  type Err = Infallible;
  fn as_listenable(&self) -> Option<&dyn Listenable<E, L, Err = Infallible>> { Some(self) }
  fn as_event_target(&self) -> Option<&dyn EventTarget<E, L, Err = Infallible>> { Some(self) }
  fn as_once(&self) -> Option<&dyn OnceListenable<E, L, Err = Infallible>> { Some(self) }
}

/// Error reported by [`FailingEmitter`].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refused {
  #[error("registration refused")]
  Add,
  #[error("deregistration refused")]
  Remove,
}

/// `on` / `off` emitter whose primitives can be switched to fail.
pub struct FailingEmitter<E, L> {
  registry: ListenerRegistry<E, L>,
  pub fail_add: AtomicBool,
  pub fail_remove: AtomicBool,
}

impl<E, L> Default for FailingEmitter<E, L> {
  fn default() -> Self {
    Self {
      registry: ListenerRegistry::default(),
      fail_add: AtomicBool::new(false),
      fail_remove: AtomicBool::new(false),
    }
  }
}

impl<E, L> Deref for FailingEmitter<E, L> {
  type Target = ListenerRegistry<E, L>;
  fn deref(&self) -> &Self::Target { &self.registry }
}

impl<E: PartialEq, L: Clone + PartialEq> Listenable<E, L> for FailingEmitter<E, L> {
  type Err = Refused;
  fn on(&self, event: E, listener: L) -> Result<(), Refused> {
    if self.fail_add.load(Ordering::SeqCst) {
      return Err(Refused::Add);
    }
    self.registry.add(event, listener, false);
    Ok(())
  }
  fn off(&self, event: &E, listener: &L) -> Result<(), Refused> {
    if self.fail_remove.load(Ordering::SeqCst) {
      return Err(Refused::Remove);
    }
    self.registry.remove(event, listener);
    Ok(())
  }
}

impl<E: PartialEq, L: Clone + PartialEq> Emitter<E, L> for FailingEmitter<E, L> {
  type Err = Refused;
  fn as_listenable(&self) -> Option<&dyn Listenable<E, L, Err = Refused>> { Some(self) }
}
