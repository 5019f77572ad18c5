/// Tuning knobs for a subscriber.
///
/// # Example
/// ```
/// use event_subscriber::SubscriberConfig;
///
/// let cfg = SubscriberConfig::default().with_native_once(false);
/// assert!(!cfg.native_once);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubscriberConfig {
  /// Register one-shot proxies through the emitter's own `once` when it has
  /// one. When `false`, one-shot proxies go through the normal add primitive
  /// and remove themselves.
  pub native_once: bool,
}

impl Default for SubscriberConfig {
  fn default() -> Self { Self { native_once: true } }
}

impl SubscriberConfig {
  pub fn with_native_once(mut self, native_once: bool) -> Self {
    self.native_once = native_once;
    self
  }
}
