//! Observable fetch state shared by the list and detail fetchers.

use crate::api::{AnimeDetails, AnimeSummary, Genre, ListQuery};
use serde::Serialize;

/// Lifecycle of a fetch site
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum FetchStatus {
    #[default]
    Idle,
    LoadingInitial,
    LoadingMore,
    Error(String),
    Success,
}

impl FetchStatus {
    pub fn is_loading(&self) -> bool {
        matches!(self, FetchStatus::LoadingInitial | FetchStatus::LoadingMore)
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            FetchStatus::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// State of the detail page
#[derive(Debug, Clone, Default, Serialize)]
pub struct DetailState {
    /// Identifier of the most recent request
    pub id: Option<String>,
    pub status: FetchStatus,
    pub anime: Option<AnimeDetails>,
    /// Rate-limit retries spent on the current identifier
    pub retry_count: u32,
}

/// One list request, kept so a failed request can be re-issued
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRequest {
    pub query: ListQuery,
    pub page: u32,
    pub append: bool,
}

/// State of the list page
#[derive(Debug, Clone, Serialize)]
pub struct ListState {
    pub items: Vec<AnimeSummary>,
    /// Last page committed to `items`
    pub page: u32,
    pub has_more: bool,
    pub status: FetchStatus,
    /// Query that produced `items`
    #[serde(skip)]
    pub query: ListQuery,
    #[serde(skip)]
    pub last_request: Option<ListRequest>,
    pub available_genres: Vec<Genre>,
}

impl Default for ListState {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            page: 0,
            has_more: true,
            status: FetchStatus::Idle,
            query: ListQuery::default(),
            last_request: None,
            available_genres: Vec::new(),
        }
    }
}
