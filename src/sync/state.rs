//! Observable latest-value slots
//!
//! A slot holds the most recent [`LoadState`] of one logical request stream
//! (the list screen, the detail screen). Each request takes a [`Ticket`] from
//! [`StateSlot::begin`]; when it finishes it may only publish if no newer
//! request has begun since. Out-of-order completions are dropped instead of
//! overwriting newer state.

use serde::Serialize;
use tokio::sync::watch;

/// Progress of a request as seen by the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum LoadState<T> {
    Loading,
    Success(T),
    Error(String),
}

impl<T> LoadState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn success(&self) -> Option<&T> {
        match self {
            LoadState::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            LoadState::Error(msg) => Some(msg),
            _ => None,
        }
    }
}

/// Generation number handed out by [`StateSlot::begin`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

/// Value observed by slot subscribers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot<T> {
    pub generation: u64,
    pub state: LoadState<T>,
}

pub struct StateSlot<T> {
    tx: watch::Sender<Snapshot<T>>,
}

impl<T: Clone> Default for StateSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> StateSlot<T> {
    /// New slot at generation 0 in the Loading state
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Snapshot {
            generation: 0,
            state: LoadState::Loading,
        });
        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot<T>> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> LoadState<T> {
        self.tx.borrow().state.clone()
    }

    /// Ticket for the request currently owning the slot, without starting a
    /// new one. Used by follow-up work such as loading another page.
    pub fn ticket(&self) -> Ticket {
        Ticket(self.tx.borrow().generation)
    }

    /// Ticket of the current request if, and only if, it ended in Success.
    /// State and generation come from the same read.
    pub fn success_ticket(&self) -> Option<Ticket> {
        let snapshot = self.tx.borrow();
        match snapshot.state {
            LoadState::Success(_) => Some(Ticket(snapshot.generation)),
            _ => None,
        }
    }

    /// Start a new request: bump the generation and emit Loading.
    pub fn begin(&self) -> Ticket {
        let mut generation = 0;
        self.tx.send_modify(|snapshot| {
            snapshot.generation += 1;
            snapshot.state = LoadState::Loading;
            generation = snapshot.generation;
        });
        Ticket(generation)
    }

    /// Store `state` if `ticket` is still the latest request. Returns whether
    /// the state was stored.
    pub fn publish(&self, ticket: Ticket, state: LoadState<T>) -> bool {
        let published = self.tx.send_if_modified(|snapshot| {
            if snapshot.generation == ticket.0 {
                snapshot.state = state;
                true
            } else {
                false
            }
        });

        if !published {
            tracing::debug!(
                "Discarding stale result for generation {} (current {})",
                ticket.0,
                self.tx.borrow().generation
            );
        }
        published
    }
}
