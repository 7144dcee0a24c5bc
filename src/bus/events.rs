use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use anyhow::Result;
use tracing::warn;

use crate::arcade::game::{ArcadeEvent, ArcadeSummary};
use crate::session::mode::TestMode;
use crate::session::result::TestResult;
use crate::session::test::CommittedWord;

/// Everything that crosses component boundaries.
#[derive(Clone, Debug, PartialEq)]
pub enum BusEvent {
    TestStarted(TestMode),
    WordCommitted(CommittedWord),
    TestCompleted(TestResult),
    TestReset(TestMode),
    Arcade(ArcadeEvent),
    /// The player left a running arcade game.
    ArcadeExited(ArcadeSummary),
    HistoryCleared,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener<E> = Rc<RefCell<dyn FnMut(&E) -> Result<()>>>;

struct BusInner<E> {
    next_id: u64,
    listeners: Vec<(SubscriptionId, Listener<E>)>,
    queue: VecDeque<E>,
    delivering: bool,
}

/// Single-threaded publish/subscribe.
///
/// Delivery goes to the subscribers present when an event starts delivering,
/// in subscription order. A failing listener is logged and the rest still
/// run. Events published from inside a listener are queued and delivered
/// after the current one finishes.
pub struct EventBus<E> {
    inner: Rc<RefCell<BusInner<E>>>,
}

impl<E> Clone for EventBus<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> EventBus<E> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(BusInner {
                next_id: 0,
                listeners: Vec::new(),
                queue: VecDeque::new(),
                delivering: false,
            })),
        }
    }

    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: FnMut(&E) -> Result<()> + 'static,
    {
        let mut inner = self.inner.borrow_mut();
        let id = SubscriptionId(inner.next_id);
        inner.next_id += 1;
        let listener: Listener<E> = Rc::new(RefCell::new(listener));
        inner.listeners.push((id, listener));
        id
    }

    /// Returns false if the id was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let before = inner.listeners.len();
        inner.listeners.retain(|(sid, _)| *sid != id);
        inner.listeners.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    pub fn publish(&self, event: E) {
        {
            let mut inner = self.inner.borrow_mut();
            inner.queue.push_back(event);
            if inner.delivering {
                return;
            }
            inner.delivering = true;
        }

        loop {
            let next = {
                let mut inner = self.inner.borrow_mut();
                match inner.queue.pop_front() {
                    Some(event) => {
                        let snapshot: Vec<(SubscriptionId, Listener<E>)> = inner
                            .listeners
                            .iter()
                            .map(|(id, l)| (*id, Rc::clone(l)))
                            .collect();
                        Some((event, snapshot))
                    }
                    None => {
                        inner.delivering = false;
                        None
                    }
                }
            };
            let Some((event, snapshot)) = next else {
                break;
            };
            for (id, listener) in snapshot {
                let outcome = match listener.try_borrow_mut() {
                    Ok(mut f) => (&mut *f)(&event),
                    Err(_) => continue,
                };
                if let Err(e) = outcome {
                    warn!(subscriber = id.0, error = %e, "event listener failed");
                }
            }
        }
    }
}
