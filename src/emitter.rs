//! Emitter capability traits.
//!
//! An emitter is anything that accepts listener registrations. Emitters come
//! in different shapes, so instead of one trait with every method the crate
//! describes each registration shape as its own capability:
//!
//! | Capability | Methods |
//! |------------|---------|
//! | [`Listenable`] | `on` / `off` |
//! | [`EventTarget`] | `add_event_listener` / `remove_event_listener` |
//! | [`OnceListenable`] | `once` |
//!
//! The wrapped object advertises which of them it actually exposes through
//! [`Emitter`]. Every query defaults to `None`, so an implementation only
//! overrides the capabilities it has:
//!
//! ```rust
//! use std::convert::Infallible;
//! use event_subscriber::prelude::*;
//!
//! struct Button;
//!
//! impl EventTarget<&'static str, LocalListener<()>> for Button {
//!   type Err = Infallible;
//!   fn add_event_listener(
//!     &self, _event: &'static str, _listener: LocalListener<()>,
//!   ) -> Result<(), Infallible> {
//!     Ok(())
//!   }
//!   fn remove_event_listener(
//!     &self, _event: &&'static str, _listener: &LocalListener<()>,
//!   ) -> Result<(), Infallible> {
//!     Ok(())
//!   }
//! }
//!
//! impl Emitter<&'static str, LocalListener<()>> for Button {
//!   type Err = Infallible;
//!   fn as_event_target(
//!     &self,
//!   ) -> Option<&dyn EventTarget<&'static str, LocalListener<()>, Err = Infallible>> {
//!     Some(self)
//!   }
//! }
//! ```
//!
//! Emitters are shared objects: every method takes `&self`, and an emitter
//! must tolerate listeners being added or removed while it is dispatching.

/// `on` / `off` style registration.
pub trait Listenable<E, L> {
  type Err;

  /// Register `listener` for `event`. Adding the same listener twice yields
  /// two registrations.
  fn on(&self, event: E, listener: L) -> Result<(), Self::Err>;

  /// Remove exactly one registration of `listener` for `event`, matched by
  /// identity. A listener that is not registered is ignored.
  fn off(&self, event: &E, listener: &L) -> Result<(), Self::Err>;
}

/// `addEventListener` / `removeEventListener` style registration.
pub trait EventTarget<E, L> {
  type Err;

  fn add_event_listener(&self, event: E, listener: L) -> Result<(), Self::Err>;

  fn remove_event_listener(&self, event: &E, listener: &L) -> Result<(), Self::Err>;
}

/// Native one-shot registration: the emitter drops the registration itself
/// right before the first invocation.
///
/// A pending `once` registration must be removable through
/// [`Listenable::off`]; it is only used alongside `on`/`off`.
pub trait OnceListenable<E, L> {
  type Err;

  fn once(&self, event: E, listener: L) -> Result<(), Self::Err>;
}

/// Capability query over an emitter.
pub trait Emitter<E, L> {
  type Err;

  fn as_listenable(&self) -> Option<&dyn Listenable<E, L, Err = Self::Err>> { None }

  fn as_event_target(&self) -> Option<&dyn EventTarget<E, L, Err = Self::Err>> { None }

  fn as_once(&self) -> Option<&dyn OnceListenable<E, L, Err = Self::Err>> { None }
}
