//! Jikan API v4 response types.
//!
//! These types mirror the JSON the catalog reads from the Jikan API. Every
//! descriptive field is optional because Jikan returns `null` for many titles.

use chrono::{DateTime, Datelike};
use serde::{Deserialize, Serialize};

/// Paginated list envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

impl<T> PaginatedResponse<T> {
    /// Whether the upstream reports another page after this one
    pub fn has_next_page(&self) -> bool {
        self.pagination
            .as_ref()
            .map(|p| p.has_next_page)
            .unwrap_or(false)
    }
}

/// Single-entity envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataResponse<T> {
    pub data: T,
}

/// Pagination metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination {
    pub has_next_page: bool,
    #[serde(default)]
    pub current_page: Option<u32>,
    #[serde(default)]
    pub last_visible_page: Option<u32>,
}

/// Genre taxonomy entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genre {
    pub mal_id: u32,
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub count: Option<u32>,
}

/// Anime card as returned by the ranked and search endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimeSummary {
    pub mal_id: u32,
    pub title: String,
    #[serde(default)]
    pub images: AnimeImages,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub episodes: Option<u32>,
    #[serde(default)]
    pub aired: Aired,
    #[serde(default)]
    pub genres: Vec<MalEntity>,
}

impl AnimeSummary {
    pub fn poster_url(&self) -> Option<&str> {
        self.images.large_image_url()
    }

    pub fn start_year(&self) -> Option<i32> {
        self.aired.start_year()
    }
}

/// Full anime details from `/anime/{id}/full`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimeDetails {
    pub mal_id: u32,
    pub title: String,
    #[serde(default)]
    pub images: AnimeImages,

    #[serde(default)]
    pub synopsis: Option<String>,

    // Scores and rankings
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub scored_by: Option<u32>,
    #[serde(default)]
    pub rank: Option<u32>,
    #[serde(default)]
    pub popularity: Option<u32>,
    #[serde(default)]
    pub members: Option<u32>,
    #[serde(default)]
    pub favorites: Option<u32>,

    // Airing
    #[serde(default)]
    pub episodes: Option<u32>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub aired: Aired,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub rating: Option<String>,

    #[serde(default)]
    pub genres: Vec<MalEntity>,
    #[serde(default)]
    pub studios: Vec<MalEntity>,

    #[serde(default)]
    pub trailer: Option<Trailer>,
}

impl AnimeDetails {
    pub fn poster_url(&self) -> Option<&str> {
        self.images.large_image_url()
    }

    pub fn start_year(&self) -> Option<i32> {
        self.aired.start_year()
    }
}

/// Anime images
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnimeImages {
    #[serde(default)]
    pub jpg: Option<ImageSet>,
    #[serde(default)]
    pub webp: Option<ImageSet>,
}

impl AnimeImages {
    /// Large poster URL, preferring jpg over webp
    pub fn large_image_url(&self) -> Option<&str> {
        self.jpg
            .as_ref()
            .and_then(ImageSet::large)
            .or_else(|| self.webp.as_ref().and_then(ImageSet::large))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageSet {
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub small_image_url: Option<String>,
    #[serde(default)]
    pub large_image_url: Option<String>,
}

impl ImageSet {
    /// Large image URL, ignoring empty strings
    fn large(&self) -> Option<&str> {
        self.large_image_url.as_deref().filter(|url| !url.is_empty())
    }
}

/// Aired dates (RFC 3339 timestamps)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Aired {
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub string: Option<String>,
}

impl Aired {
    /// Year the title started airing
    pub fn start_year(&self) -> Option<i32> {
        let from = self.from.as_deref()?;
        DateTime::parse_from_rfc3339(from).ok().map(|dt| dt.year())
    }
}

/// Trailer reference
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Trailer {
    #[serde(default)]
    pub youtube_id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// MAL entity (genre, studio, producer, etc.)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MalEntity {
    pub mal_id: u32,
    #[serde(rename = "type", default)]
    pub entity_type: Option<String>,
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
}
