//! Common test utilities
//!
//! Provides shared helpers for:
//! - Building characters and cached records
//! - A scripted in-memory remote source that counts its calls
//! - Wiring a synchronizer over an in-memory store

#![allow(dead_code)]

use async_trait::async_trait;
use randm::models::NamedRef;
use randm::{
    CachedCharacter, Character, CharacterFilter, CharacterPage, LocalStore, ManualReachability,
    RemoteError, RemoteSource, SyncConfig, Synchronizer,
};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::Mutex;

pub fn sample_character(id: i64, name: &str, status: &str, species: &str, gender: &str) -> Character {
    Character {
        id,
        name: name.to_string(),
        status: status.to_string(),
        species: species.to_string(),
        kind: String::new(),
        gender: gender.to_string(),
        origin: NamedRef {
            name: "Earth (C-137)".to_string(),
            url: "https://rickandmortyapi.com/api/location/1".to_string(),
        },
        location: NamedRef {
            name: "Citadel of Ricks".to_string(),
            url: "https://rickandmortyapi.com/api/location/3".to_string(),
        },
        image: format!("https://rickandmortyapi.com/api/character/avatar/{}.jpeg", id),
        episode: vec!["https://rickandmortyapi.com/api/episode/1".to_string()],
        url: format!("https://rickandmortyapi.com/api/character/{}", id),
        created: "2017-11-04T18:48:46.250Z".to_string(),
    }
}

/// `count` human characters numbered from `first`, alternating Alive/Dead
pub fn numbered(first: i64, count: usize) -> Vec<Character> {
    (0..count as i64)
        .map(|i| {
            let id = first + i;
            let status = if id % 2 == 0 { "Dead" } else { "Alive" };
            sample_character(id, &format!("Character {}", id), status, "Human", "Male")
        })
        .collect()
}

pub fn cached(character: &Character) -> CachedCharacter {
    CachedCharacter::project(character)
}

/// Scripted remote: page `n` of the unfiltered list is `pages[n - 1]`, pages
/// past the end are empty. Filtered lists are evaluated over all pages and
/// returned as a single page. With [`FakeRemote::answering_404`] empty
/// answers become HTTP 404 errors, as the real API sends them.
#[derive(Default)]
pub struct FakeRemote {
    pages: Vec<Vec<Character>>,
    failing_pages: StdMutex<HashSet<u32>>,
    fail_all: StdMutex<bool>,
    empty_as_404: bool,
    list_calls: AtomicUsize,
    get_calls: AtomicUsize,
    requested: StdMutex<Vec<u32>>,
}

impl FakeRemote {
    pub fn new(pages: Vec<Vec<Character>>) -> Self {
        Self {
            pages,
            ..Default::default()
        }
    }

    pub fn answering_404(mut self) -> Self {
        self.empty_as_404 = true;
        self
    }

    fn empty_page(&self) -> Result<CharacterPage, RemoteError> {
        if self.empty_as_404 {
            return Err(RemoteError::Http {
                status: 404,
                message: "character: There is nothing here".to_string(),
            });
        }
        Ok(CharacterPage::empty())
    }

    /// Every call fails with a connection error
    pub fn failing() -> Self {
        let remote = Self::default();
        remote.set_fail_all(true);
        remote
    }

    pub fn fail_page(&self, page: u32) {
        self.failing_pages.lock().unwrap().insert(page);
    }

    pub fn set_fail_all(&self, fail: bool) {
        *self.fail_all.lock().unwrap() = fail;
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.list_calls() + self.get_calls()
    }

    pub fn requested_pages(&self) -> Vec<u32> {
        self.requested.lock().unwrap().clone()
    }

    fn all(&self) -> impl Iterator<Item = &Character> {
        self.pages.iter().flatten()
    }
}

#[async_trait]
impl RemoteSource for FakeRemote {
    async fn list(&self, page: u32, filter: &CharacterFilter) -> Result<CharacterPage, RemoteError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.requested.lock().unwrap().push(page);

        if *self.fail_all.lock().unwrap() || self.failing_pages.lock().unwrap().contains(&page) {
            return Err(RemoteError::Connection("connection refused".to_string()));
        }

        if !filter.is_empty() {
            if page > 1 {
                return self.empty_page();
            }
            let results: Vec<Character> = self
                .all()
                .filter(|c| filter.matches(&c.name, &c.status, &c.species, &c.gender))
                .cloned()
                .collect();
            if results.is_empty() {
                return self.empty_page();
            }
            return Ok(CharacterPage {
                results,
                next_page_exists: false,
            });
        }

        if page == 0 {
            return self.empty_page();
        }
        let index = page as usize;
        match self.pages.get(index - 1) {
            Some(results) => Ok(CharacterPage {
                results: results.clone(),
                next_page_exists: index < self.pages.len(),
            }),
            None => self.empty_page(),
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Character, RemoteError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);

        if *self.fail_all.lock().unwrap() {
            return Err(RemoteError::Connection("connection refused".to_string()));
        }

        self.all()
            .find(|c| c.id == id)
            .cloned()
            .ok_or(RemoteError::NotFound(id))
    }
}

pub struct Harness {
    pub sync: Arc<Synchronizer>,
    pub remote: Arc<FakeRemote>,
    pub network: Arc<ManualReachability>,
    pub store: Arc<Mutex<LocalStore>>,
}

impl Harness {
    pub fn new(remote: FakeRemote, online: bool) -> Self {
        Self::with_config(remote, online, SyncConfig::default())
    }

    pub fn with_config(remote: FakeRemote, online: bool, config: SyncConfig) -> Self {
        let store = Arc::new(Mutex::new(
            LocalStore::open_in_memory().expect("Failed to open in-memory store"),
        ));
        let remote = Arc::new(remote);
        let network = Arc::new(ManualReachability::new(online));
        let sync = Arc::new(Synchronizer::new(
            store.clone(),
            remote.clone(),
            network.clone(),
            config,
        ));
        Self {
            sync,
            remote,
            network,
            store,
        }
    }

    pub async fn seed(&self, characters: &[Character]) {
        let records: Vec<CachedCharacter> = characters.iter().map(cached).collect();
        self.store.lock().await.insert_all(&records).unwrap();
    }

    pub async fn cached_ids(&self) -> Vec<i64> {
        self.store
            .lock()
            .await
            .get_all()
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect()
    }
}
