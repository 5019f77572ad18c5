//! Error type returned by subscriber operations.
//!
//! The subscriber itself never fails on bookkeeping: unsubscribing an
//! unknown event or listener is a no-op. The only failures are an emitter
//! with no usable registration methods and whatever the emitter's own
//! primitives report, which is passed through untouched.
use thiserror::Error;

#[non_exhaustive]
#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error<E> {
  /// The emitter exposes neither `add_event_listener`/`remove_event_listener`
  /// nor `on`/`off`.
  #[error("emitter exposes no listener registration methods")]
  Unsupported,

  /// An add, remove or once primitive of the emitter failed.
  #[error(transparent)]
  Emitter(E),
}

impl<E> Error<E> {
  /// Returns a short stable label (snake_case) for use in logs.
  pub fn as_label(&self) -> &'static str {
    match self {
      Error::Unsupported => "emitter_unsupported",
      Error::Emitter(_) => "emitter_failed",
    }
  }

  /// The emitter's error, if this is one.
  pub fn into_emitter_error(self) -> Option<E> {
    match self {
      Error::Emitter(err) => Some(err),
      Error::Unsupported => None,
    }
  }
}
