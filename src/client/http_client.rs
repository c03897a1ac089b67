use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

use super::RemoteSource;
use crate::error::RemoteError;
use crate::models::{ApiResponse, Character, CharacterFilter, CharacterPage};

/// reqwest-backed client for the character API.
#[derive(Clone)]
pub struct HttpClient {
    base_url: Url,
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new(base_url: &str) -> Result<Self, RemoteError> {
        Self::with_timeout(base_url, Duration::from_secs(30))
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(4)
            .user_agent(concat!("randm/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RemoteError::Connection(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: normalize_base(base_url)?,
            client,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// GET `path` relative to the base URL and decode the JSON body. Any
    /// non-success status, 404 included, is an `Http` error.
    async fn get_json<T>(&self, path: &str, query: &[(&str, String)]) -> Result<T, RemoteError>
    where
        T: DeserializeOwned,
    {
        let url = self.base_url.join(path)?;
        tracing::debug!("GET {} {:?}", url, query);

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| RemoteError::Connection(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(RemoteError::Http {
                status: status.as_u16(),
                message: format!("{}: {}", path, error_text),
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| RemoteError::Decode(format!("Failed to read response: {}", e)))?;

        serde_json::from_str(&text).map_err(|e| RemoteError::Decode(format!("{} for {}", e, path)))
    }
}

#[async_trait]
impl RemoteSource for HttpClient {
    async fn list(&self, page: u32, filter: &CharacterFilter) -> Result<CharacterPage, RemoteError> {
        let mut query = vec![("page", page.to_string())];
        query.extend(
            filter
                .query_pairs()
                .into_iter()
                .map(|(k, v)| (k, v.to_string())),
        );

        let response: ApiResponse = self.get_json("character", &query).await?;
        Ok(CharacterPage::from(response))
    }

    async fn get_by_id(&self, id: i64) -> Result<Character, RemoteError> {
        match self.get_json(&format!("character/{}", id), &[]).await {
            Err(RemoteError::Http { status: 404, .. }) => Err(RemoteError::NotFound(id)),
            other => other,
        }
    }
}

/// Parse the base URL and make sure relative joins land under it.
fn normalize_base(base_url: &str) -> Result<Url, RemoteError> {
    let trimmed = base_url.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{}/", trimmed)
    };

    let url = Url::parse(&with_slash)?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(RemoteError::InvalidUrl(format!("unsupported scheme '{}'", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let client = HttpClient::new("https://rickandmortyapi.com/api").unwrap();
        assert_eq!(client.base_url().as_str(), "https://rickandmortyapi.com/api/");
        assert_eq!(
            client.base_url().join("character/1").unwrap().as_str(),
            "https://rickandmortyapi.com/api/character/1"
        );
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        assert!(matches!(
            HttpClient::new("ftp://example.com/api"),
            Err(RemoteError::InvalidUrl(_))
        ));
        assert!(HttpClient::new("not a url").is_err());
    }
}
