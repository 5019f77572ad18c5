//! Capability detection and dispatch to the emitter's native primitives.
use std::fmt::Debug;

use tracing::debug;

use crate::{config::SubscriberConfig, emitter::Emitter, error::Error};

/// Which add/remove pair the emitter is driven through.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AddRemove {
  /// `add_event_listener` / `remove_event_listener`.
  EventTarget,
  /// `on` / `off`.
  Listenable,
}

/// The strategy a subscriber settled on for its emitter.
///
/// Detected once, when the subscriber is built. `add_event_listener` wins
/// over `on` when an emitter has both; the native `once` is only used when
/// the emitter has it, the config allows it and `on`/`off` is the pair in
/// use.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Dispatch {
  add_remove: AddRemove,
  native_once: bool,
}

impl Dispatch {
  pub fn detect<E, L, Em>(emitter: &Em, config: &SubscriberConfig) -> Option<Self>
  where
    Em: Emitter<E, L> + ?Sized,
  {
    let add_remove = if emitter.as_event_target().is_some() {
      AddRemove::EventTarget
    } else if emitter.as_listenable().is_some() {
      AddRemove::Listenable
    } else {
      return None;
    };
    // A native once registration is only known to be removable through `off`.
    let native_once =
      add_remove == AddRemove::Listenable && config.native_once && emitter.as_once().is_some();
    Some(Dispatch { add_remove, native_once })
  }

  #[inline]
  pub fn add_remove(&self) -> AddRemove { self.add_remove }

  #[inline]
  pub fn native_once(&self) -> bool { self.native_once }

  pub(crate) fn add<E, L, Em>(&self, emitter: &Em, event: E, listener: L) -> Result<(), Error<Em::Err>>
  where
    E: Debug,
    Em: Emitter<E, L> + ?Sized,
  {
    debug!(?event, via = ?self.add_remove, "registering proxy");
    match self.add_remove {
      AddRemove::EventTarget => emitter
        .as_event_target()
        .ok_or(Error::Unsupported)?
        .add_event_listener(event, listener)
        .map_err(Error::Emitter),
      AddRemove::Listenable => emitter
        .as_listenable()
        .ok_or(Error::Unsupported)?
        .on(event, listener)
        .map_err(Error::Emitter),
    }
  }

  pub(crate) fn remove<E, L, Em>(
    &self, emitter: &Em, event: &E, listener: &L,
  ) -> Result<(), Error<Em::Err>>
  where
    E: Debug,
    Em: Emitter<E, L> + ?Sized,
  {
    debug!(?event, via = ?self.add_remove, "deregistering proxy");
    match self.add_remove {
      AddRemove::EventTarget => emitter
        .as_event_target()
        .ok_or(Error::Unsupported)?
        .remove_event_listener(event, listener)
        .map_err(Error::Emitter),
      AddRemove::Listenable => emitter
        .as_listenable()
        .ok_or(Error::Unsupported)?
        .off(event, listener)
        .map_err(Error::Emitter),
    }
  }

  /// Register a one-shot proxy: through the native `once` when in use,
  /// otherwise through the normal add primitive.
  pub(crate) fn add_once<E, L, Em>(
    &self, emitter: &Em, event: E, listener: L,
  ) -> Result<(), Error<Em::Err>>
  where
    E: Debug,
    Em: Emitter<E, L> + ?Sized,
  {
    if !self.native_once {
      return self.add(emitter, event, listener);
    }
    debug!(?event, "registering proxy through native once");
    emitter
      .as_once()
      .ok_or(Error::Unsupported)?
      .once(event, listener)
      .map_err(Error::Emitter)
  }
}
