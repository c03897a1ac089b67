//! Point-in-time network reachability checks.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::net::TcpStream;
use url::Url;

use crate::error::RemoteError;

/// "Can the network be used right now?" Consulted before every remote call.
#[async_trait]
pub trait Reachability: Send + Sync {
    async fn is_available(&self) -> bool;
}

/// Reachability decided by the caller, e.g. a forced offline mode.
#[derive(Debug)]
pub struct ManualReachability {
    online: AtomicBool,
}

impl ManualReachability {
    pub fn new(online: bool) -> Self {
        Self {
            online: AtomicBool::new(online),
        }
    }

    pub fn set_online(&self, online: bool) {
        let was = self.online.swap(online, Ordering::SeqCst);
        if was != online {
            if online {
                tracing::info!("Going online");
            } else {
                tracing::warn!("Going offline - reads will use the local cache");
            }
        }
    }
}

#[async_trait]
impl Reachability for ManualReachability {
    async fn is_available(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }
}

/// Opens a TCP connection to the API host and reports whether it succeeded
/// within the timeout.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    host: String,
    port: u16,
    timeout: Duration,
}

impl TcpProbe {
    pub fn new(host: impl Into<String>, port: u16, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            port,
            timeout,
        }
    }

    /// Probe the host and port the given API base URL points at.
    pub fn for_url(url: &Url, timeout: Duration) -> Result<Self, RemoteError> {
        let host = url
            .host_str()
            .ok_or_else(|| RemoteError::InvalidUrl(format!("no host in {}", url)))?;
        let port = url
            .port_or_known_default()
            .ok_or_else(|| RemoteError::InvalidUrl(format!("no port for {}", url)))?;
        Ok(Self::new(host, port, timeout))
    }

    pub fn target(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[async_trait]
impl Reachability for TcpProbe {
    async fn is_available(&self) -> bool {
        let target = self.target();
        match tokio::time::timeout(self.timeout, TcpStream::connect(&target)).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                tracing::debug!("Reachability probe to {} failed: {}", target, e);
                false
            }
            Err(_) => {
                tracing::debug!("Reachability probe to {} timed out", target);
                false
            }
        }
    }
}
