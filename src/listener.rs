//! Listener handles with reference identity.
//!
//! A listener is identified by the allocation it points to, never by what
//! the closure does. Cloning a handle yields the same listener; wrapping two
//! identical closures separately yields two different listeners.
use std::{
  fmt::{Debug, Formatter},
  hash::{Hash, Hasher},
  rc::{Rc, Weak},
};
#[cfg(feature = "shared")]
use std::sync::{Arc, Weak as WeakArc};

/// Identity of a listener allocation.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct ListenerId(usize);

impl ListenerId {
  #[inline]
  fn of<T: ?Sized>(ptr: *const T) -> Self { ListenerId(ptr.cast::<()>() as usize) }
}

/// A callable handle that an emitter can store and invoke.
///
/// `A` is the argument the emitter passes on each occurrence of an event.
/// Emitters that pass several values use a tuple or a struct.
pub trait Listener<A: ?Sized>: Clone {
  fn id(&self) -> ListenerId;

  fn call(&self, args: &A);
}

/// Single-threaded listener.
pub struct LocalListener<A: ?Sized>(Rc<dyn Fn(&A)>);

impl<A: ?Sized> LocalListener<A> {
  pub fn new(f: impl Fn(&A) + 'static) -> Self { LocalListener(Rc::new(f)) }

  pub fn downgrade(&self) -> WeakLocalListener<A> { WeakLocalListener(Rc::downgrade(&self.0)) }
}

/// Non-owning half of a [`LocalListener`].
pub struct WeakLocalListener<A: ?Sized>(Weak<dyn Fn(&A)>);

impl<A: ?Sized> WeakLocalListener<A> {
  pub fn upgrade(&self) -> Option<LocalListener<A>> { self.0.upgrade().map(LocalListener) }
}

impl<A: ?Sized> Listener<A> for LocalListener<A> {
  #[inline]
  fn id(&self) -> ListenerId { ListenerId::of(Rc::as_ptr(&self.0)) }

  #[inline]
  fn call(&self, args: &A) { (self.0)(args) }
}

impl<A: ?Sized> Clone for LocalListener<A> {
  #[inline]
  fn clone(&self) -> Self { LocalListener(self.0.clone()) }
}

/// Thread-safe listener, callable from any thread the emitter fires on.
#[cfg(feature = "shared")]
pub struct SharedListener<A: ?Sized>(Arc<dyn Fn(&A) + Send + Sync>);

#[cfg(feature = "shared")]
impl<A: ?Sized> SharedListener<A> {
  pub fn new(f: impl Fn(&A) + Send + Sync + 'static) -> Self { SharedListener(Arc::new(f)) }

  pub fn downgrade(&self) -> WeakSharedListener<A> { WeakSharedListener(Arc::downgrade(&self.0)) }
}

/// Non-owning half of a [`SharedListener`].
#[cfg(feature = "shared")]
pub struct WeakSharedListener<A: ?Sized>(WeakArc<dyn Fn(&A) + Send + Sync>);

#[cfg(feature = "shared")]
impl<A: ?Sized> WeakSharedListener<A> {
  pub fn upgrade(&self) -> Option<SharedListener<A>> { self.0.upgrade().map(SharedListener) }
}

#[cfg(feature = "shared")]
impl<A: ?Sized> Listener<A> for SharedListener<A> {
  #[inline]
  fn id(&self) -> ListenerId { ListenerId::of(Arc::as_ptr(&self.0)) }

  #[inline]
  fn call(&self, args: &A) { (self.0)(args) }
}

#[cfg(feature = "shared")]
impl<A: ?Sized> Clone for SharedListener<A> {
  #[inline]
  fn clone(&self) -> Self { SharedListener(self.0.clone()) }
}

macro_rules! impl_identity {
  ($listener: ident) => {
    impl<A: ?Sized> PartialEq for $listener<A> {
      #[inline]
      fn eq(&self, other: &Self) -> bool { self.id() == other.id() }
    }

    impl<A: ?Sized> Eq for $listener<A> {}

    impl<A: ?Sized> Hash for $listener<A> {
      fn hash<H: Hasher>(&self, state: &mut H) { self.id().hash(state) }
    }

    impl<A: ?Sized> Debug for $listener<A> {
      fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple(stringify!($listener)).field(&self.id()).finish()
      }
    }
  };
}

impl_identity!(LocalListener);
#[cfg(feature = "shared")]
impl_identity!(SharedListener);

#[cfg(test)]
mod test {
  use super::*;
  use std::cell::Cell;

  #[test]
  fn clones_share_identity() {
    let l = LocalListener::new(|_: &i32| {});
    let c = l.clone();
    assert_eq!(l.id(), c.id());
    assert_eq!(l, c);
  }

  #[test]
  fn identical_closures_are_distinct() {
    let a = LocalListener::new(|_: &()| {});
    let b = LocalListener::new(|_: &()| {});
    assert_ne!(a.id(), b.id());
    assert_ne!(a, b);
  }

  #[test]
  fn call_forwards_arguments() {
    let seen = Rc::new(Cell::new(0));
    let c_seen = seen.clone();
    let l = LocalListener::new(move |(a, b): &(i32, i32)| c_seen.set(a + b));
    l.call(&(2, 3));
    assert_eq!(seen.get(), 5);
  }

  #[test]
  fn unsized_arguments() {
    let seen = Rc::new(Cell::new(0));
    let c_seen = seen.clone();
    let l = LocalListener::<str>::new(move |s| c_seen.set(s.len()));
    l.call("hello");
    assert_eq!(seen.get(), 5);
  }

  #[test]
  fn weak_handle_upgrades_to_same_listener() {
    let l = LocalListener::new(|_: &()| {});
    let weak = l.downgrade();
    assert_eq!(weak.upgrade(), Some(l.clone()));
    drop(l);
    assert!(weak.upgrade().is_none());
  }

  #[cfg(feature = "shared")]
  #[test]
  fn shared_listener_identity() {
    let a = SharedListener::new(|_: &u8| {});
    let b = SharedListener::new(|_: &u8| {});
    assert_eq!(a, a.clone());
    assert_ne!(a, b);
    assert!(format!("{a:?}").starts_with("SharedListener"));
  }
}
