use tracing::debug;

use super::synchronizer::Synchronizer;
use crate::error::SyncResult;
use crate::models::CharacterRecord;

/// What a `load_next_page` call did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    /// The page had this many records and was appended
    Appended(usize),
    /// The page was empty; no further pages will be requested
    Exhausted,
    /// Nothing was requested because there is no next page
    Skipped,
    /// The request failed; list and page counter are unchanged
    Failed,
    /// A newer query replaced the list while the page was loading; the page
    /// was dropped
    Superseded,
}

/// Accumulates successive pages into one growing list.
#[derive(Debug, Clone)]
pub struct Pager {
    items: Vec<CharacterRecord>,
    current_page: u32,
    has_next_page: bool,
}

impl Default for Pager {
    fn default() -> Self {
        Self::new()
    }
}

impl Pager {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            current_page: 1,
            has_next_page: true,
        }
    }

    /// Restart at page 1 with `items` as the first page
    pub fn reset(&mut self, items: Vec<CharacterRecord>) {
        self.items = items;
        self.current_page = 1;
        self.has_next_page = true;
    }

    pub fn items(&self) -> &[CharacterRecord] {
        &self.items
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn has_next_page(&self) -> bool {
        self.has_next_page
    }

    /// The page a "load more" would request, or `None` once exhausted
    pub fn next_page(&self) -> Option<u32> {
        self.has_next_page.then(|| self.current_page + 1)
    }

    /// Fold the result of fetching `page` into the list. A result for any
    /// page other than [`Pager::next_page`] is ignored and reported as
    /// skipped. Errors leave list and counter untouched.
    pub fn apply(&mut self, page: u32, result: SyncResult<Vec<CharacterRecord>>) -> PageOutcome {
        if self.next_page() != Some(page) {
            debug!("Result for page {} no longer expected", page);
            return PageOutcome::Skipped;
        }

        match result {
            Ok(records) if records.is_empty() => {
                debug!("Page {} is empty, no more pages", page);
                self.has_next_page = false;
                PageOutcome::Exhausted
            }
            Ok(records) => {
                let count = records.len();
                self.items.extend(records);
                self.current_page = page;
                PageOutcome::Appended(count)
            }
            Err(e) => {
                debug!("Loading page {} failed: {}", page, e);
                PageOutcome::Failed
            }
        }
    }

    /// Request the page after `current_page` and fold it into the list.
    /// Errors are swallowed so that a failed "load more" never disturbs what
    /// is already loaded.
    pub async fn load_next_page(&mut self, sync: &Synchronizer) -> PageOutcome {
        match self.next_page() {
            Some(page) => {
                let result = sync.fetch_page(page).await;
                self.apply(page, result)
            }
            None => PageOutcome::Skipped,
        }
    }
}
