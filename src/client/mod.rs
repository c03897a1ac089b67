//! Remote Source: the character API as seen by the synchronizer.

mod builder;
mod http_client;

pub use builder::ClientBuilder;
pub use http_client::HttpClient;

use crate::error::RemoteError;
use crate::models::{Character, CharacterFilter, CharacterPage};

/// Public endpoint of the Rick and Morty API
pub const DEFAULT_API_URL: &str = "https://rickandmortyapi.com/api/";

/// Source of remote character data.
#[async_trait::async_trait]
pub trait RemoteSource: Send + Sync {
    /// Fetch one page of characters (pages start at 1)
    async fn list(&self, page: u32, filter: &CharacterFilter) -> Result<CharacterPage, RemoteError>;

    /// Fetch a single character
    async fn get_by_id(&self, id: i64) -> Result<Character, RemoteError>;
}
