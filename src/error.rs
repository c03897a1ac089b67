use thiserror::Error;

/// Failures talking to the remote character API.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Character {0} not found on server")]
    NotFound(i64),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Failures surfaced by the synchronizer.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Network unavailable")]
    Unreachable,

    #[error("Character {0} not found in cache")]
    NotInCache(i64),

    #[error("No cached characters available offline")]
    CacheEmpty,

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("Store error: {0}")]
    Store(#[from] rusqlite::Error),
}

pub type SyncResult<T> = Result<T, SyncError>;

impl RemoteError {
    /// The server answered 404, or the single lookup found nothing.
    ///
    /// The list endpoint uses 404 both for "no matches" and for pages past
    /// the end; callers decide which reading applies.
    pub fn is_not_found(&self) -> bool {
        matches!(self, RemoteError::Http { status: 404, .. } | RemoteError::NotFound(_))
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            RemoteError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            RemoteError::Http {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            RemoteError::Connection(err.to_string())
        }
    }
}

impl From<url::ParseError> for RemoteError {
    fn from(err: url::ParseError) -> Self {
        RemoteError::InvalidUrl(err.to_string())
    }
}
