//! Synchronizer
//!
//! Decides, per request, whether to read from the remote API or from the
//! local store, and keeps the store roughly in line with the remote:
//!
//! - list queries are network-first; only unfiltered pages are written back
//! - single lookups are cache-first
//! - refresh replaces the whole cache, or leaves it untouched on failure

use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::client::RemoteSource;
use crate::error::{SyncError, SyncResult};
use crate::models::{CachedCharacter, Character, CharacterFilter, CharacterRecord};
use crate::reachability::Reachability;
use crate::store::LocalStore;

/// Tunables for the synchronizer
#[derive(Clone, Debug)]
pub struct SyncConfig {
    /// Window size when paging through the cache offline; 0 acts as 1
    pub page_size: u32,
    /// Upper bound on pages fetched by a full refresh; 0 acts as 1
    pub refresh_page_cap: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            page_size: 20,
            refresh_page_cap: 5,
        }
    }
}

pub struct Synchronizer {
    store: Arc<Mutex<LocalStore>>,
    remote: Arc<dyn RemoteSource>,
    reachability: Arc<dyn Reachability>,
    config: SyncConfig,
}

impl Synchronizer {
    pub fn new(
        store: Arc<Mutex<LocalStore>>,
        remote: Arc<dyn RemoteSource>,
        reachability: Arc<dyn Reachability>,
        config: SyncConfig,
    ) -> Self {
        Self {
            store,
            remote,
            reachability,
            config,
        }
    }

    pub fn store(&self) -> Arc<Mutex<LocalStore>> {
        self.store.clone()
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// List characters matching `filter`.
    ///
    /// Online, the first remote page is returned and, for the unfiltered
    /// browse only, written to the cache. Offline or on remote failure the
    /// cache is searched with the same predicate; a remote failure with no
    /// cached match is returned as the error. Offline against an empty store
    /// fails with [`SyncError::CacheEmpty`].
    pub async fn query(&self, filter: &CharacterFilter) -> SyncResult<Vec<CharacterRecord>> {
        let remote_error = if self.reachability.is_available().await {
            match self.remote.list(1, filter).await {
                Ok(page) => {
                    if filter.is_empty() {
                        if let Err(e) = self.persist(&page.results).await {
                            warn!("Failed to cache {} characters: {}", page.results.len(), e);
                        }
                    }
                    return Ok(page.results.into_iter().map(CharacterRecord::from).collect());
                }
                // A filtered search with no matches is answered with 404
                Err(e) if e.is_not_found() && !filter.is_empty() => {
                    debug!("No remote matches for {:?}", filter);
                    return Ok(Vec::new());
                }
                Err(e) => {
                    warn!("Remote query failed, falling back to cache: {}", e);
                    Some(e)
                }
            }
        } else {
            debug!("Offline, answering query from cache");
            None
        };

        let store = self.store.lock().await;
        let cached = store.search(filter)?;
        if cached.is_empty() {
            if let Some(e) = remote_error {
                return Err(SyncError::Remote(e));
            }
            // An empty store has no last-known-good list to offer
            if store.count()? == 0 {
                return Err(SyncError::CacheEmpty);
            }
        }
        Ok(cached.into_iter().map(CharacterRecord::from).collect())
    }

    /// One unfiltered page for the pager.
    ///
    /// Online pages come from the remote and are cached; a 404 means the
    /// page lies past the end and reads as empty. Offline pages are
    /// positional windows over the whole cache.
    pub async fn fetch_page(&self, page: u32) -> SyncResult<Vec<CharacterRecord>> {
        if self.reachability.is_available().await {
            let page = match self.remote.list(page, &CharacterFilter::default()).await {
                Ok(page) => page,
                Err(e) if e.is_not_found() => {
                    debug!("Page {} past the end", page);
                    return Ok(Vec::new());
                }
                Err(e) => return Err(e.into()),
            };
            if let Err(e) = self.persist(&page.results).await {
                warn!("Failed to cache page: {}", e);
            }
            return Ok(page.results.into_iter().map(CharacterRecord::from).collect());
        }

        let cached = self.store.lock().await.page(page, self.config.page_size.max(1))?;
        Ok(cached.into_iter().map(CharacterRecord::from).collect())
    }

    /// Look up one character, cache first.
    pub async fn fetch_one(&self, id: i64) -> SyncResult<CharacterRecord> {
        if let Some(cached) = self.store.lock().await.get_by_id(id)? {
            debug!("Character {} served from cache", id);
            return Ok(CharacterRecord::Cached(cached));
        }

        if !self.reachability.is_available().await {
            return Err(SyncError::NotInCache(id));
        }

        let character = self.remote.get_by_id(id).await?;
        self.store
            .lock()
            .await
            .insert(&CachedCharacter::project(&character))?;
        Ok(CharacterRecord::Remote(character))
    }

    /// Rebuild the cache from the remote.
    ///
    /// Pages are accumulated first; the cache is replaced in one transaction
    /// only after every page arrived. Any remote error, 404 included, aborts
    /// before the store is touched. At least one page is always fetched.
    /// Returns the number of records written.
    pub async fn refresh(&self) -> SyncResult<usize> {
        if !self.reachability.is_available().await {
            return Err(SyncError::Unreachable);
        }

        let cap = self.config.refresh_page_cap.max(1);
        let unfiltered = CharacterFilter::default();
        let mut characters: Vec<Character> = Vec::new();
        let mut page = 1;
        let mut has_next = true;

        while has_next && page <= cap {
            let response = self.remote.list(page, &unfiltered).await.map_err(|e| {
                warn!("Refresh aborted at page {}: {}", page, e);
                e
            })?;
            debug!("Refresh page {}: {} characters", page, response.results.len());

            characters.extend(response.results);
            has_next = response.next_page_exists;
            page += 1;
        }

        if has_next {
            info!(
                "Refresh stopped at the {}-page cap with more pages available",
                cap
            );
        }

        let now = Utc::now();
        let records: Vec<CachedCharacter> = characters
            .iter()
            .map(|c| CachedCharacter::project_at(c, now))
            .collect();

        let mut store = self.store.lock().await;
        store.replace_all(&records)?;
        store.set_last_refresh_at(now.timestamp_millis())?;

        info!("Cache refreshed with {} characters", records.len());
        Ok(records.len())
    }

    async fn persist(&self, characters: &[Character]) -> SyncResult<()> {
        if characters.is_empty() {
            return Ok(());
        }
        let records: Vec<CachedCharacter> = characters.iter().map(CachedCharacter::project).collect();
        self.store.lock().await.insert_all(&records)?;
        debug!("Cached {} characters", records.len());
        Ok(())
    }
}
