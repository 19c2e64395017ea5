//! Error types and HTTP outcome classification for the Jikan client.

use reqwest::StatusCode;

/// Terminal outcome of a fetch that did not produce data.
///
/// The `Display` text is what a presentation layer shows to the user.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The upstream answered 404.
    #[error("Anime not found")]
    NotFound,
    /// The upstream answered 429.
    #[error("Too many requests. Please try again in a few seconds.")]
    RateLimited,
    /// Any other non-success status.
    #[error("Failed to fetch anime details: {status}")]
    Http { status: u16 },
    /// No status was obtainable, or the body did not parse.
    #[error("Failed to load anime details")]
    Transport(String),
    /// A newer request on the same fetcher took over before this one settled.
    #[error("Request superseded by a newer request")]
    Superseded,
}

impl FetchError {
    /// Only rate limiting is worth retrying automatically
    pub fn is_retryable(&self) -> bool {
        matches!(self, FetchError::RateLimited)
    }
}

/// Classification of a completed HTTP exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Success,
    NotFound,
    RateLimited,
    Other(u16),
}

impl StatusClass {
    pub fn of(status: u16) -> Self {
        match StatusCode::from_u16(status) {
            Ok(code) if code.is_success() => StatusClass::Success,
            Ok(StatusCode::NOT_FOUND) => StatusClass::NotFound,
            Ok(StatusCode::TOO_MANY_REQUESTS) => StatusClass::RateLimited,
            _ => StatusClass::Other(status),
        }
    }

    /// The error this class maps to, or `None` for success
    pub fn into_error(self) -> Option<FetchError> {
        match self {
            StatusClass::Success => None,
            StatusClass::NotFound => Some(FetchError::NotFound),
            StatusClass::RateLimited => Some(FetchError::RateLimited),
            StatusClass::Other(status) => Some(FetchError::Http { status }),
        }
    }
}
