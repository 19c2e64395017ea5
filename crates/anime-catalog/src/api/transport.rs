//! The "fetch JSON resource" capability the fetchers are built on.

use reqwest::{header, Client, Url};
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Status and body of a completed HTTP exchange
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

/// Something that can GET a URL and hand back the raw response.
///
/// An `Err` means no status could be obtained (connect failure, timeout,
/// body read failure). Non-2xx statuses are returned as `Ok`.
pub trait Transport {
    fn get(&self, url: Url) -> impl Future<Output = Result<RawResponse, String>> + Send;
}

/// reqwest-backed transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration, user_agent: &str) -> reqwest::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    async fn get(&self, url: Url) -> Result<RawResponse, String> {
        debug!(url = %url, "Sending request");

        let response = self
            .client
            .get(url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| e.to_string())?;

        Ok(RawResponse { status, body })
    }
}
