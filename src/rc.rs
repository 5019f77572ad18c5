//! Shared mutable pointers for subscription state.
//!
//! `MutRc` is the single-threaded flavour (`Rc<RefCell<T>>`), `MutArc` the
//! thread-safe one (`Arc<Mutex<T>>`). Both hand out guards through
//! [`RcDeref`] / [`RcDerefMut`] so the bookkeeping code reads the same for
//! either flavour, and both can be downgraded so that proxies registered on
//! an emitter never keep the subscription table alive.
use std::{
  cell::{Ref, RefCell, RefMut},
  rc::{Rc, Weak},
};
#[cfg(feature = "shared")]
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak as WeakArc};

pub trait RcDeref {
  type Target<'a>
  where
    Self: 'a;
  #[allow(clippy::needless_lifetimes)]
  fn rc_deref<'a>(&'a self) -> Self::Target<'a>;
}

pub trait RcDerefMut {
  type Target<'a>
  where
    Self: 'a;
  #[allow(clippy::needless_lifetimes)]
  fn rc_deref_mut<'a>(&'a self) -> Self::Target<'a>;
}

#[derive(Default)]
pub struct MutRc<T>(Rc<RefCell<T>>);

/// Non-owning half of a [`MutRc`].
pub struct WeakMutRc<T>(Weak<RefCell<T>>);

impl<T> MutRc<T> {
  pub fn own(t: T) -> Self { Self(Rc::new(RefCell::new(t))) }

  pub fn downgrade(&self) -> WeakMutRc<T> { WeakMutRc(Rc::downgrade(&self.0)) }
}

impl<T> WeakMutRc<T> {
  pub fn upgrade(&self) -> Option<MutRc<T>> { self.0.upgrade().map(MutRc) }
}

impl<T> RcDeref for MutRc<T> {
  type Target<'a>
    = Ref<'a, T>
  where
    Self: 'a;

  #[inline]
  #[allow(clippy::needless_lifetimes)]
  fn rc_deref<'a>(&'a self) -> Self::Target<'a> { self.0.borrow() }
}

impl<T> RcDerefMut for MutRc<T> {
  type Target<'a>
    = RefMut<'a, T>
  where
    Self: 'a;

  #[inline]
  #[allow(clippy::needless_lifetimes)]
  fn rc_deref_mut<'a>(&'a self) -> Self::Target<'a> { self.0.borrow_mut() }
}

impl<T> Clone for MutRc<T> {
  #[inline]
  fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<T> Clone for WeakMutRc<T> {
  #[inline]
  fn clone(&self) -> Self { Self(self.0.clone()) }
}

#[cfg(feature = "shared")]
#[derive(Default)]
pub struct MutArc<T>(Arc<Mutex<T>>);

/// Non-owning half of a [`MutArc`].
#[cfg(feature = "shared")]
pub struct WeakMutArc<T>(WeakArc<Mutex<T>>);

#[cfg(feature = "shared")]
impl<T> MutArc<T> {
  pub fn own(t: T) -> Self { Self(Arc::new(Mutex::new(t))) }

  pub fn downgrade(&self) -> WeakMutArc<T> { WeakMutArc(Arc::downgrade(&self.0)) }
}

#[cfg(feature = "shared")]
impl<T> WeakMutArc<T> {
  pub fn upgrade(&self) -> Option<MutArc<T>> { self.0.upgrade().map(MutArc) }
}

// A poisoned lock only means a listener panicked elsewhere; the table is
// consistent between statements, so the guard is still usable.
#[cfg(feature = "shared")]
impl<T> RcDeref for MutArc<T> {
  type Target<'a>
    = MutexGuard<'a, T>
  where
    Self: 'a;

  #[inline]
  #[allow(clippy::needless_lifetimes)]
  fn rc_deref<'a>(&'a self) -> Self::Target<'a> {
    self.0.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

#[cfg(feature = "shared")]
impl<T> RcDerefMut for MutArc<T> {
  type Target<'a>
    = MutexGuard<'a, T>
  where
    Self: 'a;

  #[inline]
  #[allow(clippy::needless_lifetimes)]
  fn rc_deref_mut<'a>(&'a self) -> Self::Target<'a> {
    self.0.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

#[cfg(feature = "shared")]
impl<T> Clone for MutArc<T> {
  #[inline]
  fn clone(&self) -> Self { Self(self.0.clone()) }
}

#[cfg(feature = "shared")]
impl<T> Clone for WeakMutArc<T> {
  #[inline]
  fn clone(&self) -> Self { Self(self.0.clone()) }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn weak_rc_does_not_keep_value_alive() {
    let strong = MutRc::own(1);
    let weak = strong.downgrade();
    *weak.upgrade().unwrap().rc_deref_mut() += 1;
    assert_eq!(*strong.rc_deref(), 2);
    drop(strong);
    assert!(weak.upgrade().is_none());
  }

  #[cfg(feature = "shared")]
  #[test]
  fn weak_arc_does_not_keep_value_alive() {
    let strong = MutArc::own(vec![1]);
    let weak = strong.downgrade();
    weak.upgrade().unwrap().rc_deref_mut().push(2);
    assert_eq!(*strong.rc_deref(), vec![1, 2]);
    drop(strong);
    assert!(weak.upgrade().is_none());
  }

  #[cfg(feature = "shared")]
  #[test]
  fn poisoned_arc_is_still_usable() {
    let value = MutArc::own(0);
    let c_value = value.clone();
    let _ = std::thread::spawn(move || {
      let _guard = c_value.rc_deref_mut();
      panic!("poison the lock");
    })
    .join();
    *value.rc_deref_mut() = 7;
    assert_eq!(*value.rc_deref(), 7);
  }
}
