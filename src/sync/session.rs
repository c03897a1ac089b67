//! Sessions: what the presentation layer drives.
//!
//! Each session owns a [`StateSlot`] that emits Loading followed by exactly
//! one terminal state per request. A newer request supersedes older ones;
//! their late results are dropped by the slot's generation check.

use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tracing::debug;

use super::pager::{PageOutcome, Pager};
use super::state::{LoadState, Snapshot, StateSlot};
use super::synchronizer::Synchronizer;
use crate::models::{CharacterFilter, CharacterRecord};

pub type ListState = LoadState<Vec<CharacterRecord>>;

/// The character list: query, load more, refresh.
pub struct BrowseSession {
    sync: Arc<Synchronizer>,
    pager: Mutex<Pager>,
    slot: StateSlot<Vec<CharacterRecord>>,
}

impl BrowseSession {
    pub fn new(sync: Arc<Synchronizer>) -> Self {
        Self {
            sync,
            pager: Mutex::new(Pager::new()),
            slot: StateSlot::new(),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot<Vec<CharacterRecord>>> {
        self.slot.subscribe()
    }

    pub fn state(&self) -> ListState {
        self.slot.current()
    }

    /// `(current_page, has_next_page)` of the pager
    pub async fn position(&self) -> (u32, bool) {
        let pager = self.pager.lock().await;
        (pager.current_page(), pager.has_next_page())
    }

    /// Run a fresh query. Resets paging to page 1 when it succeeds.
    pub async fn query(&self, filter: &CharacterFilter) -> ListState {
        let ticket = self.slot.begin();

        match self.sync.query(filter).await {
            Ok(items) => {
                let mut pager = self.pager.lock().await;
                if self.slot.publish(ticket, LoadState::Success(items.clone())) {
                    pager.reset(items.clone());
                }
                LoadState::Success(items)
            }
            Err(e) => {
                let state = LoadState::Error(e.to_string());
                self.slot.publish(ticket, state.clone());
                state
            }
        }
    }

    /// Append the next page to the current list. Only acts while the list is
    /// showing a successful result; failures leave it as is.
    ///
    /// The pager is not locked during the fetch. If a query lands in the
    /// meantime the fetched page is dropped.
    pub async fn load_next_page(&self) -> PageOutcome {
        let Some(ticket) = self.slot.success_ticket() else {
            return PageOutcome::Skipped;
        };
        let Some(page) = self.pager.lock().await.next_page() else {
            return PageOutcome::Skipped;
        };

        let result = self.sync.fetch_page(page).await;

        // Queries publish and reset under this lock, so the generation check
        // and the append cannot interleave with one
        let mut pager = self.pager.lock().await;
        if self.slot.ticket() != ticket {
            debug!("Page {} arrived after a newer query, dropped", page);
            return PageOutcome::Superseded;
        }

        let outcome = pager.apply(page, result);
        if let PageOutcome::Appended(_) = outcome {
            self.slot.publish(ticket, LoadState::Success(pager.items().to_vec()));
        }
        outcome
    }

    /// Rebuild the cache, then re-run `filter` against it.
    pub async fn refresh(&self, filter: &CharacterFilter) -> ListState {
        let ticket = self.slot.begin();

        match self.sync.refresh().await {
            Ok(count) => {
                debug!("Refresh wrote {} characters, reloading list", count);
                self.query(filter).await
            }
            Err(e) => {
                let state = LoadState::Error(format!("Refresh failed: {}", e));
                self.slot.publish(ticket, state.clone());
                state
            }
        }
    }
}

/// A single character's detail view.
pub struct DetailSession {
    sync: Arc<Synchronizer>,
    slot: StateSlot<CharacterRecord>,
}

impl DetailSession {
    pub fn new(sync: Arc<Synchronizer>) -> Self {
        Self {
            sync,
            slot: StateSlot::new(),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot<CharacterRecord>> {
        self.slot.subscribe()
    }

    pub fn state(&self) -> LoadState<CharacterRecord> {
        self.slot.current()
    }

    pub async fn load(&self, id: i64) -> LoadState<CharacterRecord> {
        let ticket = self.slot.begin();

        let state = match self.sync.fetch_one(id).await {
            Ok(record) => LoadState::Success(record),
            Err(e) => LoadState::Error(e.to_string()),
        };
        self.slot.publish(ticket, state.clone());
        state
    }
}
