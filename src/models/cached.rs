//! Local cache projection and the record type handed to callers.
//!
//! The cache keeps a flattened, lossy copy of each character: origin and
//! location collapse to their names, `episode` and `url` are dropped. Reading
//! back from the cache therefore yields a [`CharacterRecord::Cached`], never a
//! full [`Character`].

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::character::Character;

/// Flattened row stored in the local record store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedCharacter {
    pub id: i64,
    pub name: String,
    pub status: String,
    pub species: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub gender: String,
    pub image: String,
    pub origin_name: String,
    pub location_name: String,
    pub created: String,
    /// When this row was projected for writing
    pub last_updated: DateTime<Utc>,
}

impl CachedCharacter {
    /// Project a remote character for storage, stamping the current time.
    pub fn project(character: &Character) -> Self {
        Self::project_at(character, Utc::now())
    }

    /// Project with an explicit timestamp.
    pub fn project_at(character: &Character, at: DateTime<Utc>) -> Self {
        Self {
            id: character.id,
            name: character.name.clone(),
            status: character.status.clone(),
            species: character.species.clone(),
            kind: character.kind.clone(),
            gender: character.gender.clone(),
            image: character.image.clone(),
            origin_name: character.origin.name.clone(),
            location_name: character.location.name.clone(),
            created: character.created.clone(),
            last_updated: at,
        }
    }

    pub fn last_updated_millis(&self) -> i64 {
        self.last_updated.timestamp_millis()
    }

    /// Rebuild the timestamp from the millisecond column, falling back to the epoch.
    pub fn timestamp_from_millis(millis: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(millis).single().unwrap_or_default()
    }
}

/// A character as returned to callers, tagged with where it came from.
///
/// `Remote` carries the complete entity. `Cached` carries only what the local
/// store keeps; accessors for the dropped fields return `None` for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", content = "character", rename_all = "snake_case")]
pub enum CharacterRecord {
    Remote(Character),
    Cached(CachedCharacter),
}

impl CharacterRecord {
    pub fn id(&self) -> i64 {
        match self {
            Self::Remote(c) => c.id,
            Self::Cached(c) => c.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Remote(c) => &c.name,
            Self::Cached(c) => &c.name,
        }
    }

    pub fn status(&self) -> &str {
        match self {
            Self::Remote(c) => &c.status,
            Self::Cached(c) => &c.status,
        }
    }

    pub fn species(&self) -> &str {
        match self {
            Self::Remote(c) => &c.species,
            Self::Cached(c) => &c.species,
        }
    }

    pub fn kind(&self) -> &str {
        match self {
            Self::Remote(c) => &c.kind,
            Self::Cached(c) => &c.kind,
        }
    }

    pub fn gender(&self) -> &str {
        match self {
            Self::Remote(c) => &c.gender,
            Self::Cached(c) => &c.gender,
        }
    }

    pub fn image(&self) -> &str {
        match self {
            Self::Remote(c) => &c.image,
            Self::Cached(c) => &c.image,
        }
    }

    pub fn origin_name(&self) -> &str {
        match self {
            Self::Remote(c) => &c.origin.name,
            Self::Cached(c) => &c.origin_name,
        }
    }

    pub fn location_name(&self) -> &str {
        match self {
            Self::Remote(c) => &c.location.name,
            Self::Cached(c) => &c.location_name,
        }
    }

    pub fn created(&self) -> &str {
        match self {
            Self::Remote(c) => &c.created,
            Self::Cached(c) => &c.created,
        }
    }

    pub fn origin_url(&self) -> Option<&str> {
        match self {
            Self::Remote(c) => Some(&c.origin.url),
            Self::Cached(_) => None,
        }
    }

    pub fn location_url(&self) -> Option<&str> {
        match self {
            Self::Remote(c) => Some(&c.location.url),
            Self::Cached(_) => None,
        }
    }

    pub fn episode(&self) -> Option<&[String]> {
        match self {
            Self::Remote(c) => Some(&c.episode),
            Self::Cached(_) => None,
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Remote(c) => Some(&c.url),
            Self::Cached(_) => None,
        }
    }

    /// True when the record came from the local cache and lacks detail fields.
    pub fn is_partial(&self) -> bool {
        matches!(self, Self::Cached(_))
    }
}

impl From<Character> for CharacterRecord {
    fn from(character: Character) -> Self {
        Self::Remote(character)
    }
}

impl From<CachedCharacter> for CharacterRecord {
    fn from(cached: CachedCharacter) -> Self {
        Self::Cached(cached)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NamedRef;

    fn morty() -> Character {
        Character {
            id: 2,
            name: "Morty Smith".to_string(),
            status: "Alive".to_string(),
            species: "Human".to_string(),
            kind: String::new(),
            gender: "Male".to_string(),
            origin: NamedRef {
                name: "unknown".to_string(),
                url: String::new(),
            },
            location: NamedRef {
                name: "Citadel of Ricks".to_string(),
                url: "https://rickandmortyapi.com/api/location/3".to_string(),
            },
            image: "https://rickandmortyapi.com/api/character/avatar/2.jpeg".to_string(),
            episode: vec!["https://rickandmortyapi.com/api/episode/1".to_string()],
            url: "https://rickandmortyapi.com/api/character/2".to_string(),
            created: "2017-11-04T18:50:21.651Z".to_string(),
        }
    }

    #[test]
    fn test_projection_keeps_scalars_and_names() {
        let at = CachedCharacter::timestamp_from_millis(1_700_000_000_000);
        let cached = CachedCharacter::project_at(&morty(), at);

        assert_eq!(cached.id, 2);
        assert_eq!(cached.name, "Morty Smith");
        assert_eq!(cached.location_name, "Citadel of Ricks");
        assert_eq!(cached.origin_name, "unknown");
        assert_eq!(cached.last_updated_millis(), 1_700_000_000_000);
    }

    #[test]
    fn test_cached_record_reports_missing_detail() {
        let record = CharacterRecord::from(CachedCharacter::project(&morty()));

        assert!(record.is_partial());
        assert_eq!(record.location_name(), "Citadel of Ricks");
        assert_eq!(record.episode(), None);
        assert_eq!(record.url(), None);
        assert_eq!(record.location_url(), None);
    }

    #[test]
    fn test_remote_record_keeps_legitimately_empty_fields() {
        // An empty origin URL from the API is data, not absence
        let record = CharacterRecord::from(morty());

        assert!(!record.is_partial());
        assert_eq!(record.origin_url(), Some(""));
        assert_eq!(record.episode().map(|e| e.len()), Some(1));
    }
}
