//! Anime catalog library for browsing and inspecting Jikan API data.
//!
//! This library provides a list fetcher (ranked browse, search, "load more"
//! pagination) and a detail fetcher (one title, retried while rate limited)
//! on top of a typed Jikan API v4 client.

pub mod api;
pub mod detail;
pub mod guard;
pub mod list;
pub mod scroll;
pub mod state;

pub use api::{FetchError, HttpTransport, JikanClient, ListQuery, Transport};
pub use detail::{DetailFetcher, RetryPolicy};
pub use list::{resolve_genres, ListFetcher, ListPage, LIST_ERROR_MESSAGE, POPULAR_GENRES};
pub use scroll::{scroll_progress, ScrollDirection, ScrollFlags, ScrollTracker};
pub use state::{DetailState, FetchStatus, ListState};
