use std::time::Duration;

use super::{HttpClient, DEFAULT_API_URL};
use crate::error::RemoteError;

pub struct ClientBuilder {
    addr: String,
    timeout_ms: Option<u64>,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

impl ClientBuilder {
    pub fn new(addr: &str) -> Self {
        Self {
            addr: addr.to_string(),
            timeout_ms: None,
        }
    }

    pub fn timeout_ms(mut self, ms: u64) -> Self {
        self.timeout_ms = Some(ms);
        self
    }

    pub fn build(self) -> Result<HttpClient, RemoteError> {
        match self.timeout_ms {
            Some(ms) => HttpClient::with_timeout(&self.addr, Duration::from_millis(ms)),
            None => HttpClient::new(&self.addr),
        }
    }
}
