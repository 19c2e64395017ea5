//! Jikan API client: endpoint routing, status classification, and decoding.

use super::error::{FetchError, StatusClass};
use super::transport::{HttpTransport, Transport};
use super::types::*;
use anyhow::{bail, Context, Result};
use reqwest::Url;
use serde::de::DeserializeOwned;
use shared::JikanConfig;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Free-text query plus genre filter for list requests
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub query: String,
    pub genres: Vec<u32>,
}

impl ListQuery {
    pub fn new(query: impl Into<String>, genres: Vec<u32>) -> Self {
        Self {
            query: query.into(),
            genres,
        }
    }

    /// Whether the search endpoint applies instead of the ranked one
    pub fn is_filtered(&self) -> bool {
        !self.query.is_empty() || !self.genres.is_empty()
    }
}

/// Jikan API v4 client
pub struct JikanClient<T = HttpTransport> {
    /// Underlying transport
    transport: T,
    /// Base URL for Jikan API
    base_url: Url,
    /// Page size for list requests
    page_limit: u32,
}

impl JikanClient<HttpTransport> {
    /// Create a reqwest-backed client from the `[jikan]` config section
    pub fn from_config(config: &JikanConfig) -> Result<Self> {
        let transport = HttpTransport::new(
            Duration::from_secs(config.timeout_seconds),
            &config.user_agent,
        )
        .context("Failed to create HTTP client")?;

        Self::new(&config.base_url, config.page_limit, transport)
    }
}

impl<T: Transport> JikanClient<T> {
    /// Create a new Jikan client over the given transport
    pub fn new(base_url: &str, page_limit: u32, transport: T) -> Result<Self> {
        let base_url =
            Url::parse(base_url).with_context(|| format!("Invalid base URL: {}", base_url))?;
        if base_url.cannot_be_a_base() {
            bail!("Base URL cannot carry a path: {}", base_url);
        }

        Ok(Self {
            transport,
            base_url,
            page_limit,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, FetchError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::Transport(format!("Invalid base URL: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// URL for a single title's full record
    pub fn anime_full_url(&self, id: &str) -> Result<Url, FetchError> {
        self.endpoint(&["anime", id, "full"])
    }

    /// URL for one page of a list: search when filtered, ranked otherwise
    pub fn list_url(&self, query: &ListQuery, page: u32) -> Result<Url, FetchError> {
        let mut url = if query.is_filtered() {
            self.endpoint(&["anime"])?
        } else {
            self.endpoint(&["top", "anime"])?
        };

        {
            let mut pairs = url.query_pairs_mut();
            if !query.query.is_empty() {
                pairs.append_pair("q", &query.query);
            }
            if !query.genres.is_empty() {
                let genres = query
                    .genres
                    .iter()
                    .map(u32::to_string)
                    .collect::<Vec<_>>()
                    .join(",");
                pairs.append_pair("genres", &genres);
            }
            pairs
                .append_pair("page", &page.to_string())
                .append_pair("limit", &self.page_limit.to_string());
        }

        Ok(url)
    }

    pub fn genres_url(&self) -> Result<Url, FetchError> {
        self.endpoint(&["genres", "anime"])
    }

    /// Issue one GET and classify the outcome
    async fn get<R: DeserializeOwned>(&self, url: Url) -> Result<R, FetchError> {
        debug!(url = %url, "Making API request");

        let response = self.transport.get(url.clone()).await.map_err(|e| {
            warn!(url = %url, error = %e, "Request error");
            FetchError::Transport(e)
        })?;

        if let Some(err) = StatusClass::of(response.status).into_error() {
            warn!(url = %url, status = response.status, "Request failed");
            return Err(err);
        }

        serde_json::from_str::<R>(&response.body).map_err(|e| {
            warn!(url = %url, error = %e, "Failed to parse response");
            FetchError::Transport(format!("Failed to parse response: {}", e))
        })
    }

    /// Fetch full anime details by identifier
    pub async fn get_anime_full(&self, id: &str) -> Result<AnimeDetails, FetchError> {
        debug!(id = id, "Fetching anime details");
        let response: DataResponse<AnimeDetails> = self.get(self.anime_full_url(id)?).await?;
        Ok(response.data)
    }

    /// Fetch one page of ranked or searched anime
    pub async fn get_anime_list(
        &self,
        query: &ListQuery,
        page: u32,
    ) -> Result<PaginatedResponse<AnimeSummary>, FetchError> {
        debug!(query = %query.query, genres = ?query.genres, page = page, "Fetching anime list");
        self.get(self.list_url(query, page)?).await
    }

    /// Fetch the genre taxonomy
    pub async fn get_genres(&self) -> Result<Vec<Genre>, FetchError> {
        info!("Fetching anime genres");
        let response: PaginatedResponse<Genre> = self.get(self.genres_url()?).await?;
        Ok(response.data)
    }
}
