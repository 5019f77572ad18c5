//! The event subscription table.
//!
//! Maps every event to the listeners subscribed to it through one
//! subscriber, each with a registration count and the proxy that was handed
//! to the emitter. The table only does bookkeeping; deciding when to touch
//! the emitter is left to the caller, driven by what each operation returns.
use std::{collections::HashMap, hash::Hash};

use smallvec::SmallVec;

use crate::listener::ListenerId;

struct Record<L> {
  count: usize,
  proxy: L,
}

/// Outcome of registering a listener.
#[derive(Debug, PartialEq, Eq)]
pub enum Acquired<L> {
  /// First registration of the pair: `L` must now be added to the emitter.
  Fresh(L),
  /// The pair was already registered; its count went up to the given value.
  Counted(usize),
}

/// Outcome of retiring a single registration.
#[derive(Debug, PartialEq, Eq)]
pub enum Released<L> {
  /// The pair was not tracked.
  Untracked,
  /// Registrations remain; the proxy stays on the emitter.
  Retained { proxy: L, remaining: usize },
  /// That was the last registration; the record is gone.
  Dropped(L),
}

/// Registrations of one subscriber, keyed by event then listener identity.
///
/// Events with no records are pruned, so every event the table reports has
/// at least one listener with a count of one or more.
pub struct SubscriptionTable<E, L> {
  events: HashMap<E, SmallVec<[(ListenerId, Record<L>); 2]>>,
}

impl<E, L> Default for SubscriptionTable<E, L> {
  fn default() -> Self { Self { events: HashMap::new() } }
}

impl<E, L> SubscriptionTable<E, L>
where
  E: Eq + Hash + Clone,
  L: Clone,
{
  pub fn new() -> Self { Self::default() }

  /// Count one more registration of `id` for `event`. `proxy` is only called
  /// when the pair is new.
  pub fn acquire(&mut self, event: &E, id: ListenerId, proxy: impl FnOnce() -> L) -> Acquired<L> {
    let records = self.events.entry(event.clone()).or_default();
    if let Some((_, record)) = records.iter_mut().find(|(i, _)| *i == id) {
      record.count += 1;
      return Acquired::Counted(record.count);
    }
    let proxy = proxy();
    records.push((id, Record { count: 1, proxy: proxy.clone() }));
    Acquired::Fresh(proxy)
  }

  /// Retire one registration of `id` for `event` on behalf of `proxy`.
  ///
  /// A record registered through a different proxy belongs to a later
  /// subscription of the same listener and is left untouched.
  pub fn release_one(&mut self, event: &E, id: ListenerId, proxy: &L) -> Released<L>
  where
    L: PartialEq,
  {
    let Some(records) = self.events.get_mut(event) else {
      return Released::Untracked;
    };
    let Some(pos) = records
      .iter()
      .position(|(i, r)| *i == id && r.proxy == *proxy)
    else {
      return Released::Untracked;
    };
    let record = &mut records[pos].1;
    record.count -= 1;
    if record.count > 0 {
      return Released::Retained { proxy: record.proxy.clone(), remaining: record.count };
    }
    let (_, record) = records.remove(pos);
    self.prune(event);
    Released::Dropped(record.proxy)
  }

  /// Drop the record of `id` for `event` whatever its count, returning the
  /// proxy that was registered for it.
  pub fn release(&mut self, event: &E, id: ListenerId) -> Option<L> {
    let records = self.events.get_mut(event)?;
    let pos = records.iter().position(|(i, _)| *i == id)?;
    let (_, record) = records.remove(pos);
    self.prune(event);
    Some(record.proxy)
  }

  /// Drop every record of `event`.
  pub fn release_event(&mut self, event: &E) -> Vec<L> {
    self
      .events
      .remove(event)
      .map(|records| records.into_iter().map(|(_, r)| r.proxy).collect())
      .unwrap_or_default()
  }

  /// Drop the records of `id` across all events.
  pub fn release_listener(&mut self, id: ListenerId) -> Vec<(E, L)> {
    let mut released = vec![];
    for (event, records) in self.events.iter_mut() {
      if let Some(pos) = records.iter().position(|(i, _)| *i == id) {
        let (_, record) = records.remove(pos);
        released.push((event.clone(), record.proxy));
      }
    }
    self.events.retain(|_, records| !records.is_empty());
    released
  }

  /// Drop every record.
  pub fn release_all(&mut self) -> Vec<(E, L)> {
    self
      .events
      .drain()
      .flat_map(|(event, records)| {
        records
          .into_iter()
          .map(move |(_, r)| (event.clone(), r.proxy))
      })
      .collect()
  }

  /// Registration count of `id` for `event`, zero when untracked.
  pub fn count(&self, event: &E, id: ListenerId) -> usize {
    self
      .events
      .get(event)
      .and_then(|records| records.iter().find(|(i, _)| *i == id))
      .map_or(0, |(_, r)| r.count)
  }

  /// Events with at least one tracked listener.
  pub fn event_names(&self) -> Vec<E> { self.events.keys().cloned().collect() }

  /// Number of tracked (event, listener) pairs.
  pub fn len(&self) -> usize { self.events.values().map(|records| records.len()).sum() }

  #[inline]
  pub fn is_empty(&self) -> bool { self.events.is_empty() }

  fn prune(&mut self, event: &E) {
    if self.events.get(event).is_some_and(|records| records.is_empty()) {
      self.events.remove(event);
    }
  }
}
