//! randm
//!
//! Offline-first client for the Rick and Morty character API. Remote results
//! are mirrored into a local SQLite store so the list, search and detail
//! views keep working without a network.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use tokio::sync::Mutex;
//! use randm::{BrowseSession, CharacterFilter, ClientBuilder, LocalStore, SyncConfig, Synchronizer, TcpProbe};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ClientBuilder::default().build()?;
//!     let probe = TcpProbe::for_url(client.base_url(), Duration::from_millis(1500))?;
//!     let store = Arc::new(Mutex::new(LocalStore::open_default("randm")?));
//!
//!     let sync = Arc::new(Synchronizer::new(store, Arc::new(client), Arc::new(probe), SyncConfig::default()));
//!     let browse = BrowseSession::new(sync);
//!
//!     let state = browse.query(&CharacterFilter::default().with_status("alive")).await;
//!     println!("{:?}", state);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod reachability;
pub mod store;
pub mod sync;

pub use client::{ClientBuilder, HttpClient, RemoteSource, DEFAULT_API_URL};
pub use config::Config;
pub use error::{RemoteError, SyncError, SyncResult};
pub use models::{CachedCharacter, Character, CharacterFilter, CharacterPage, CharacterRecord};
pub use reachability::{ManualReachability, Reachability, TcpProbe};
pub use store::LocalStore;
pub use sync::{
    BrowseSession, DetailSession, LoadState, PageOutcome, Pager, StateSlot, SyncConfig, Synchronizer,
};
