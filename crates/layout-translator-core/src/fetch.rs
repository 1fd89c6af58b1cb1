//! Downloading source PDFs by URL.

use std::time::Duration;

use bytes::Bytes;
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// Default wall-clock bound on a download, in seconds
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 180;

/// HTTP client for fetching source documents.
#[derive(Clone)]
pub struct SourceFetcher {
    client: Client,
    timeout: Duration,
}

impl SourceFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Fetch(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, timeout })
    }

    pub fn with_default_timeout() -> Result<Self> {
        Self::new(Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS))
    }

    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// GET `url` and return the body. Non-2xx responses are errors.
    pub async fn fetch(&self, url: &str) -> Result<Bytes> {
        let url = url.trim();
        if url.is_empty() {
            return Err(Error::Fetch("source URL is empty".to_string()));
        }

        debug!("Fetching {}", url);
        let response = self.client.get(url).send().await.map_err(|e| map_reqwest(&e, url))?;

        let status = response.status();
        if !status.is_success() {
            warn!("Fetch of {} returned {}", url, status);
            return Err(Error::Fetch(format!("HTTP {status} from {url}")));
        }

        let body = response.bytes().await.map_err(|e| map_reqwest(&e, url))?;
        info!("Fetched {} bytes from {}", body.len(), url);
        Ok(body)
    }
}

fn map_reqwest(e: &reqwest::Error, url: &str) -> Error {
    if e.is_timeout() {
        warn!("Fetch of {} timed out", url);
        Error::FetchTimeout
    } else {
        Error::Fetch(format!("{url}: {e}"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_url_rejected() {
        let fetcher = SourceFetcher::with_default_timeout().unwrap();
        let err = fetcher.fetch("  ").await.unwrap_err();
        assert!(err.is_fetch());
    }

    #[tokio::test]
    async fn test_connection_failure_is_fetch_error() {
        let fetcher = SourceFetcher::new(Duration::from_secs(2)).unwrap();
        let err = fetcher.fetch("http://127.0.0.1:9/doc.pdf").await.unwrap_err();
        assert!(err.is_fetch(), "unexpected error: {err}");
    }

    #[test]
    fn test_default_timeout() {
        let fetcher = SourceFetcher::with_default_timeout().unwrap();
        assert_eq!(fetcher.timeout(), Duration::from_secs(180));
    }
}
