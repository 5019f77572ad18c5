//! Integration tests for event-subscriber
//!
//! Drives subscribers through the public API against the bundled test
//! emitters and against an emitter defined here, the way an embedding
//! application would.

use std::{
  cell::{Cell, RefCell},
  rc::Rc,
};

use event_subscriber::{
  prelude::*,
  testing::{DomTarget, OnOffEmitter},
};
use thiserror::Error as ThisError;

// A process-signal hub: `on`/`off` plus a native `once`, keyed by an enum,
// refusing handlers for signals that cannot be caught.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Signal {
  Int,
  Term,
  Kill,
}

#[derive(ThisError, Debug, PartialEq, Eq)]
#[error("{0:?} cannot be caught")]
struct Uncatchable(Signal);

type Handler = LocalListener<i32>;

#[derive(Default)]
struct SignalHub {
  handlers: RefCell<Vec<(Signal, Handler, bool)>>,
}

impl SignalHub {
  fn raise(&self, signal: Signal, code: i32) {
    let targets: Vec<Handler> = {
      let mut handlers = self.handlers.borrow_mut();
      let targets = handlers
        .iter()
        .filter(|(s, ..)| *s == signal)
        .map(|(_, h, _)| h.clone())
        .collect();
      handlers.retain(|(s, _, once)| !(*once && *s == signal));
      targets
    };
    for h in targets {
      h.call(&code);
    }
  }

  fn handler_count(&self, signal: Signal) -> usize {
    self.handlers.borrow().iter().filter(|(s, ..)| *s == signal).count()
  }

  fn check(signal: Signal) -> Result<(), Uncatchable> {
    if signal == Signal::Kill {
      Err(Uncatchable(signal))
    } else {
      Ok(())
    }
  }
}

impl Listenable<Signal, Handler> for SignalHub {
  type Err = Uncatchable;
  fn on(&self, event: Signal, listener: Handler) -> Result<(), Uncatchable> {
    Self::check(event)?;
    self.handlers.borrow_mut().push((event, listener, false));
    Ok(())
  }
  fn off(&self, event: &Signal, listener: &Handler) -> Result<(), Uncatchable> {
    let mut handlers = self.handlers.borrow_mut();
    if let Some(pos) = handlers.iter().position(|(s, h, _)| s == event && h == listener) {
      handlers.remove(pos);
    }
    Ok(())
  }
}

impl OnceListenable<Signal, Handler> for SignalHub {
  type Err = Uncatchable;
  fn once(&self, event: Signal, listener: Handler) -> Result<(), Uncatchable> {
    Self::check(event)?;
    self.handlers.borrow_mut().push((event, listener, true));
    Ok(())
  }
}

impl Emitter<Signal, Handler> for SignalHub {
  type Err = Uncatchable;
  fn as_listenable(&self) -> Option<&dyn Listenable<Signal, Handler, Err = Uncatchable>> {
    Some(self)
  }
  fn as_once(&self) -> Option<&dyn OnceListenable<Signal, Handler, Err = Uncatchable>> {
    Some(self)
  }
}

fn tally() -> (Handler, Rc<RefCell<Vec<i32>>>) {
  let seen = Rc::new(RefCell::new(Vec::new()));
  let c_seen = seen.clone();
  (LocalListener::new(move |code: &i32| c_seen.borrow_mut().push(*code)), seen)
}

#[test]
fn test_n_subscribes_then_one_unsubscribe() {
  for n in 1..=5 {
    let hub = Rc::new(SignalHub::default());
    let sub = LocalSubscriber::new(hub.clone()).unwrap();
    let (f, seen) = tally();
    for _ in 0..n {
      sub.subscribe(Signal::Int, &f).unwrap();
    }
    assert_eq!(hub.handler_count(Signal::Int), 1);
    sub.unsubscribe(&Signal::Int, &f).unwrap();
    hub.raise(Signal::Int, 2);
    assert!(seen.borrow().is_empty(), "n = {n}");
    assert_eq!(hub.handler_count(Signal::Int), 0);
  }
}

#[test]
fn test_once_with_native_primitive() {
  let hub = Rc::new(SignalHub::default());
  let sub = LocalSubscriber::new(hub.clone()).unwrap();
  assert!(sub.dispatch().native_once());
  let (f, seen) = tally();
  sub.subscribe_once(Signal::Term, &f).unwrap();
  hub.raise(Signal::Term, 15);
  hub.raise(Signal::Term, 15);
  assert_eq!(*seen.borrow(), vec![15]);
  assert!(sub.is_empty());
}

#[test]
fn test_emitter_error_is_propagated_unchanged() {
  let hub = Rc::new(SignalHub::default());
  let sub = LocalSubscriber::new(hub.clone()).unwrap();
  let (f, _) = tally();
  let err = sub.subscribe(Signal::Kill, &f).unwrap_err();
  assert_eq!(err.to_string(), "Kill cannot be caught");
  assert_eq!(err.into_emitter_error(), Some(Uncatchable(Signal::Kill)));
  assert_eq!(sub.tracked_count(&Signal::Kill, &f), 0);

  let err = sub.subscribe_once(Signal::Kill, &f).unwrap_err();
  assert_eq!(err, Error::Emitter(Uncatchable(Signal::Kill)));
  assert!(sub.is_empty());
}

#[test]
fn test_unsubscribe_all_keeps_direct_registrations() {
  let hub = Rc::new(SignalHub::default());
  let sub = LocalSubscriber::new(hub.clone()).unwrap();
  let (direct, direct_seen) = tally();
  hub.on(Signal::Int, direct).unwrap();
  let (f, seen) = tally();
  sub
    .subscribe(Signal::Int, &f)
    .unwrap()
    .subscribe(Signal::Term, &f)
    .unwrap()
    .unsubscribe_all()
    .unwrap();
  hub.raise(Signal::Int, 2);
  hub.raise(Signal::Term, 15);
  assert!(seen.borrow().is_empty());
  assert_eq!(*direct_seen.borrow(), vec![2]);
}

#[test]
fn test_chaining_leaves_nothing_tracked() {
  let emitter = Rc::new(OnOffEmitter::default());
  let sub = LocalSubscriber::new(emitter.clone()).unwrap();
  let f1 = LocalListener::new(|_: &()| {});
  let f2 = LocalListener::new(|_: &()| {});
  let returned = sub
    .subscribe("a", &f1)
    .unwrap()
    .subscribe("b", &f2)
    .unwrap()
    .unsubscribe_event(&"a")
    .unwrap()
    .unsubscribe_all()
    .unwrap();
  assert!(std::ptr::eq(returned, &sub));
  assert!(sub.event_names().is_empty());
  assert!(emitter.is_empty());
}

#[test]
fn test_click_scenario_on_event_target() {
  let node = Rc::new(DomTarget::default());
  let sub = LocalSubscriber::new(node.clone()).unwrap();
  let clicks = Rc::new(Cell::new(0));
  let c_clicks = clicks.clone();
  let f = LocalListener::new(move |_: &(u16, u16)| c_clicks.set(c_clicks.get() + 1));

  sub.subscribe("click", &f).unwrap();
  sub.subscribe("click", &f).unwrap();
  assert_eq!(sub.tracked_count(&"click", &f), 2);
  sub.unsubscribe(&"click", &f).unwrap();
  assert_eq!(sub.tracked_count(&"click", &f), 0);
  assert_eq!(node.remove_calls(), 1);

  node.emit(&"click", &(10, 20));
  assert_eq!(clicks.get(), 0);
}

#[test]
fn test_guard_scopes_subscriptions() {
  let emitter = Rc::new(OnOffEmitter::default());
  let (f, seen) = tally();
  {
    let guard = LocalSubscriber::new(emitter.clone())
      .unwrap()
      .unsubscribe_when_dropped();
    guard.subscribe("data", &f).unwrap();
    emitter.emit(&"data", &1);
  }
  emitter.emit(&"data", &2);
  assert_eq!(*seen.borrow(), vec![1]);
}

#[cfg(feature = "shared")]
#[test]
fn test_shared_subscriber_with_threads() {
  use std::{
    sync::{
      atomic::{AtomicUsize, Ordering},
      Arc,
    },
    thread,
  };

  let emitter = Arc::new(OnOffEmitter::<&'static str, SharedListener<usize>>::default());
  let sub = Arc::new(SharedSubscriber::new(emitter.clone()).unwrap());
  let total = Arc::new(AtomicUsize::new(0));
  let c_total = total.clone();
  let f = SharedListener::new(move |v: &usize| {
    c_total.fetch_add(*v, Ordering::SeqCst);
  });

  let handles: Vec<_> = (0..4)
    .map(|_| {
      let sub = sub.clone();
      let f = f.clone();
      thread::spawn(move || {
        sub.subscribe("sum", &f).unwrap();
      })
    })
    .collect();
  for h in handles {
    h.join().unwrap();
  }
  assert_eq!(sub.tracked_count(&"sum", &f), 4);
  assert_eq!(emitter.listener_count(&"sum"), 1);

  emitter.emit(&"sum", &5);
  sub.unsubscribe(&"sum", &f).unwrap();
  emitter.emit(&"sum", &5);
  assert_eq!(total.load(Ordering::SeqCst), 5);
}
