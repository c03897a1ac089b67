//! Character entities: the remote shape, the cached projection, and filters.

pub mod cached;
pub mod character;
pub mod filter;

pub use cached::{CachedCharacter, CharacterRecord};
pub use character::{ApiResponse, Character, CharacterPage, NamedRef, PageInfo};
pub use filter::CharacterFilter;
