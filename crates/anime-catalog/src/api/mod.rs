//! Jikan API v4 client implementation.
//!
//! This module provides the typed client the fetchers sit on, the transport
//! seam it issues requests through, and the HTTP outcome classification
//! shared by every endpoint.

pub mod client;
pub mod error;
pub mod transport;
pub mod types;

pub use client::{JikanClient, ListQuery};
pub use error::{FetchError, StatusClass};
pub use transport::{HttpTransport, RawResponse, Transport};
pub use types::*;
