//! HTTP retrieval of playlist text
//!
//! Each source pipeline owns its own [`HttpFetcher`] (and therefore its
//! own connection pool); nothing is shared across workers. The client and
//! its connections are released when the fetcher goes out of scope on any
//! exit path.

use async_trait::async_trait;
use reqwest::Client;

use crate::config::RequestConfig;
use crate::errors::{AppResult, SourceError};

/// Seam for retrieving raw playlist text
#[async_trait]
pub trait TextFetcher: Send + Sync {
    async fn fetch_text(&self, url: &str) -> Result<String, SourceError>;
}

/// Fetcher backed by a dedicated `reqwest` client
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(request: &RequestConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(request.timeout())
            .user_agent(request.user_agent.clone())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl TextFetcher for HttpFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, SourceError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SourceError::from_request(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        // Playlists in the wild declare charsets unreliably; decode as
        // UTF-8 and let invalid sequences degrade to replacement chars
        let bytes = response
            .bytes()
            .await
            .map_err(|e| SourceError::from_request(url, e))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
