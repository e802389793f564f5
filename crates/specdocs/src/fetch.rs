//! Retrieval of remote specification documents.

use bytes::Bytes;
use reqwest::Client;
use thiserror::Error;

/// User-Agent sent with every outbound request.
pub const USER_AGENT: &str = concat!("specdocs/", env!("CARGO_PKG_VERSION"));

/// Errors that can occur while retrieving a document.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection, DNS, TLS or URL errors before a response arrived.
    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),

    /// The response arrived but its body could not be read in full.
    #[error("failed to read response body: {0}")]
    Read(#[source] reqwest::Error),
}

/// Fetches documents with a single shared HTTP client.
///
/// No retries and no custom timeouts: a slow origin holds the request open
/// until the client defaults give up.
#[derive(Debug, Clone)]
pub struct SpecFetcher {
    client: Client,
}

impl SpecFetcher {
    /// Build the shared client.
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { client })
    }

    /// GET `url` and return the full response body.
    ///
    /// Non-success statuses are not errors. Whatever the origin sent becomes
    /// the document, and the later stages decide what to make of it.
    pub async fn fetch(&self, url: &str) -> Result<Bytes, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(FetchError::Request)?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(
                status = status.as_u16(),
                "spec host returned a non-success status, using the body as the document"
            );
        }

        response.bytes().await.map_err(FetchError::Read)
    }
}
