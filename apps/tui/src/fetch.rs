use std::time::Duration;

use dashboard_core::LoadError;
use reqwest::Client;

/// Reads resources from `http(s)://` URLs or the local filesystem.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Default for Fetcher {
    fn default() -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }
}

impl Fetcher {
    pub async fn fetch(&self, location: String) -> Result<Vec<u8>, LoadError> {
        if is_remote(&location) {
            self.fetch_remote(location).await
        } else {
            tracing::debug!(path = %location, "reading local resource");
            tokio::fs::read(&location)
                .await
                .map_err(|error| LoadError::fetch(&location, error))
        }
    }

    async fn fetch_remote(&self, location: String) -> Result<Vec<u8>, LoadError> {
        tracing::debug!(url = %location, "fetching remote resource");
        let body = self
            .client
            .get(&location)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|error| LoadError::fetch(&location, error))?
            .bytes()
            .await
            .map_err(|error| LoadError::fetch(&location, error))?;
        Ok(body.to_vec())
    }
}

pub fn is_remote(location: &str) -> bool {
    let lower = location.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
