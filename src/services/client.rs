use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode, Url};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP {0}")]
    Http(StatusCode),
    #[error("Malformed response: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Fetches the body of a successful GET.
#[async_trait]
pub trait SearchTransport {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError>;
}

pub struct OpenLibraryClient {
    client: Client,
}

impl OpenLibraryClient {
    pub fn new() -> Self {
        Self::with_client(Client::new())
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Default for OpenLibraryClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchTransport for OpenLibraryClient {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http(status));
        }

        Ok(response.text().await?)
    }
}
