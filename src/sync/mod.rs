//! Online/offline reconciliation
//!
//! This module provides:
//! - `Synchronizer`: network-first queries with cache fallback, cache-first
//!   lookups, and replace-all refresh
//! - `Pager`: "load more" accumulation over successive pages
//! - `StateSlot`: latest-value slots with generation tokens
//! - `BrowseSession` / `DetailSession`: the operations a UI drives

pub mod pager;
pub mod session;
pub mod state;
pub mod synchronizer;

pub use pager::{PageOutcome, Pager};
pub use session::{BrowseSession, DetailSession, ListState};
pub use state::{LoadState, Snapshot, StateSlot, Ticket};
pub use synchronizer::{SyncConfig, Synchronizer};
