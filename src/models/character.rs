//! Remote-shaped character entities as served by the public API.

use serde::{Deserialize, Serialize};

/// A named reference to another API resource (origin or location).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRef {
    pub name: String,
    pub url: String,
}

/// Full character record returned by the remote API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub id: i64,
    pub name: String,
    /// Alive, Dead or unknown; transmitted as free text
    pub status: String,
    pub species: String,
    /// Sub-species or variant; often empty
    #[serde(rename = "type", default)]
    pub kind: String,
    pub gender: String,
    pub origin: NamedRef,
    pub location: NamedRef,
    pub image: String,
    #[serde(default)]
    pub episode: Vec<String>,
    pub url: String,
    /// ISO-8601 creation timestamp, kept verbatim
    pub created: String,
}

/// Pagination envelope of the list endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    pub count: u32,
    pub pages: u32,
    pub next: Option<String>,
    pub prev: Option<String>,
}

/// Raw list response: `{ "info": {...}, "results": [...] }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub info: PageInfo,
    pub results: Vec<Character>,
}

/// One page of characters as seen by the synchronizer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharacterPage {
    pub results: Vec<Character>,
    pub next_page_exists: bool,
}

impl CharacterPage {
    /// The empty terminal page
    pub fn empty() -> Self {
        Self::default()
    }
}

impl From<ApiResponse> for CharacterPage {
    fn from(response: ApiResponse) -> Self {
        Self {
            next_page_exists: response.info.next.is_some(),
            results: response.results,
        }
    }
}
