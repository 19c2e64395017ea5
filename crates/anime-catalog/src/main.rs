//! Anime catalog CLI application.

use anime_catalog::api::{AnimeDetails, AnimeSummary, Genre};
use anime_catalog::{
    resolve_genres, scroll_progress, DetailFetcher, JikanClient, ListFetcher, RetryPolicy,
    ScrollFlags, ScrollTracker, POPULAR_GENRES,
};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use shared::{Config, LogConfig, ScrollConfig};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Browse the top-ranked anime
    Top {
        /// Number of pages to load
        #[arg(short, long, default_value_t = 1)]
        pages: u32,
    },
    /// Search anime by title and genre
    Search {
        /// Free-text query
        #[arg(short, long, default_value = "")]
        query: String,

        /// Genre name to filter by (repeatable)
        #[arg(short, long = "genre")]
        genres: Vec<String>,

        /// Number of pages to load
        #[arg(short, long, default_value_t = 1)]
        pages: u32,
    },
    /// Show full details for one anime
    Detail {
        /// MyAnimeList identifier
        id: u32,
    },
    /// List the genre taxonomy
    Genres,
    /// Replay scroll offsets and print the page chrome flags for each
    Scroll {
        /// Vertical offsets in pixels, in the order they were observed
        #[arg(required = true, allow_negative_numbers = true)]
        offsets: Vec<f64>,

        /// Total page height, enables the progress column
        #[arg(long)]
        page_height: Option<f64>,

        /// Viewport height used for progress
        #[arg(long, default_value_t = 1000.0)]
        viewport: f64,
    },
}

#[derive(Serialize)]
struct ScrollSample {
    offset: f64,
    #[serde(flatten)]
    flags: ScrollFlags,
    #[serde(skip_serializing_if = "Option::is_none")]
    progress: Option<f64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = Config::from_file(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    // Initialize logging
    let mut log_config =
        LogConfig::from_settings(&config.logging, &config.log_dir(), "anime-catalog");
    if args.verbose {
        log_config.default_level = tracing::Level::DEBUG;
    }
    shared::logging::init(log_config)?;

    info!(config_file = %args.config.display(), "Loaded configuration");

    match args.command {
        Command::Top { pages } => {
            let fetcher = ListFetcher::new(jikan_client(&config)?);
            let items = load_pages(&fetcher, "", &[], pages).await?;
            print_list(&items, args.json)?;
        }
        Command::Search {
            query,
            genres,
            pages,
        } => {
            let fetcher = ListFetcher::new(jikan_client(&config)?);
            let genre_ids = if genres.is_empty() {
                Vec::new()
            } else {
                let available = fetcher.fetch_genres().await;
                let ids = resolve_genres(&available, &genres);
                if ids.is_empty() {
                    warn!(genres = ?genres, "No requested genre matched the taxonomy");
                }
                ids
            };
            let items = load_pages(&fetcher, &query, &genre_ids, pages).await?;
            print_list(&items, args.json)?;
        }
        Command::Detail { id } => {
            let fetcher = DetailFetcher::new(
                jikan_client(&config)?,
                RetryPolicy::from_config(&config.jikan),
            );
            let anime = fetcher
                .fetch_detail(&id.to_string())
                .await
                .with_context(|| format!("Failed to fetch anime {}", id))?;
            print_details(&anime, args.json)?;
        }
        Command::Genres => {
            let fetcher = ListFetcher::new(jikan_client(&config)?);
            let genres = fetcher.fetch_genres().await;
            print_genres(&genres, args.json)?;
        }
        Command::Scroll {
            offsets,
            page_height,
            viewport,
        } => {
            let samples = replay_scroll(&config.scroll, &offsets, page_height, viewport);
            print_scroll(&samples, args.json)?;
        }
    }

    Ok(())
}

fn jikan_client(config: &Config) -> Result<Arc<JikanClient>> {
    let client =
        JikanClient::from_config(&config.jikan).context("Failed to create Jikan client")?;
    Ok(Arc::new(client))
}

/// Load the first page, then follow "load more" until `pages` or the end
async fn load_pages(
    fetcher: &ListFetcher,
    query: &str,
    genres: &[u32],
    pages: u32,
) -> Result<Vec<AnimeSummary>> {
    fetcher
        .fetch_list(query, genres, 1, false)
        .await
        .context("Failed to load anime list")?;

    for _ in 1..pages {
        match fetcher.load_more().await {
            Some(result) => {
                result.context("Failed to load more anime")?;
            }
            None => break,
        }
    }

    let state = fetcher.state();
    info!(
        items = state.items.len(),
        page = state.page,
        has_more = state.has_more,
        "List loaded"
    );
    Ok(state.items)
}

fn replay_scroll(
    config: &ScrollConfig,
    offsets: &[f64],
    page_height: Option<f64>,
    viewport: f64,
) -> Vec<ScrollSample> {
    let mut tracker = ScrollTracker::new(config.clone());
    offsets
        .iter()
        .map(|&offset| ScrollSample {
            offset,
            flags: tracker.on_scroll(offset),
            progress: page_height.map(|height| scroll_progress(offset, height, viewport)),
        })
        .collect()
}

fn print_scroll(samples: &[ScrollSample], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(samples)?);
        return Ok(());
    }

    for sample in samples {
        let progress = sample
            .progress
            .map(|p| format!("  {:>5.1}%", p))
            .unwrap_or_default();
        println!(
            "{:>8.1}  {:<4}  scroll-top={:<5}  search-bar={:<5}{}",
            sample.offset,
            format!("{:?}", sample.flags.direction).to_lowercase(),
            sample.flags.show_scroll_top,
            sample.flags.show_search_bar,
            progress
        );
    }
    Ok(())
}

fn print_list(items: &[AnimeSummary], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(items)?);
        return Ok(());
    }

    for anime in items {
        let year = anime
            .start_year()
            .map(|y| y.to_string())
            .unwrap_or_else(|| "?".to_string());
        let score = anime
            .score
            .map(|s| format!("{:.1}", s))
            .unwrap_or_else(|| "-".to_string());
        println!("{:>6}  {}  ({}, score {})", anime.mal_id, anime.title, year, score);
    }
    Ok(())
}

fn print_details(anime: &AnimeDetails, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(anime)?);
        return Ok(());
    }

    let names = |entities: &[anime_catalog::api::MalEntity]| {
        entities
            .iter()
            .map(|e| e.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };

    println!("{} (#{})", anime.title, anime.mal_id);
    if let Some(score) = anime.score {
        println!("Score:      {:.2} ({} votes)", score, anime.scored_by.unwrap_or(0));
    }
    if let Some(rank) = anime.rank {
        println!("Rank:       #{}", rank);
    }
    if let Some(popularity) = anime.popularity {
        println!("Popularity: #{}", popularity);
    }
    if let Some(episodes) = anime.episodes {
        println!("Episodes:   {}", episodes);
    }
    if let Some(status) = &anime.status {
        println!("Status:     {}", status);
    }
    if let Some(aired) = &anime.aired.string {
        println!("Aired:      {}", aired);
    }
    if !anime.genres.is_empty() {
        println!("Genres:     {}", names(&anime.genres));
    }
    if !anime.studios.is_empty() {
        println!("Studios:    {}", names(&anime.studios));
    }
    if let Some(url) = anime.trailer.as_ref().and_then(|t| t.url.as_deref()) {
        println!("Trailer:    {}", url);
    }
    if let Some(poster) = anime.poster_url() {
        println!("Poster:     {}", poster);
    }
    if let Some(synopsis) = &anime.synopsis {
        println!();
        println!("{}", synopsis);
    }
    Ok(())
}

fn print_genres(genres: &[Genre], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(genres)?);
        return Ok(());
    }

    println!("Popular: {}", POPULAR_GENRES.join(", "));
    for genre in genres {
        println!("{:>4}  {} ({})", genre.mal_id, genre.name, genre.count.unwrap_or(0));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anime_catalog::ScrollDirection;

    #[test]
    fn test_replay_scroll_uses_configured_thresholds() {
        let config = ScrollConfig {
            scroll_top_threshold: 300.0,
            search_bar_threshold: 50.0,
        };

        let samples = replay_scroll(&config, &[60.0, 400.0, 10.0], Some(2000.0), 1000.0);
        assert_eq!(samples.len(), 3);

        assert!(samples[0].flags.show_search_bar);
        assert!(!samples[0].flags.show_scroll_top);
        assert!(samples[1].flags.show_scroll_top);
        assert_eq!(samples[1].flags.direction, ScrollDirection::Down);
        assert_eq!(samples[1].progress, Some(40.0));
        assert_eq!(samples[2].flags.direction, ScrollDirection::Up);
        assert!(!samples[2].flags.show_search_bar);

        let without_progress = replay_scroll(&config, &[60.0], None, 1000.0);
        assert_eq!(without_progress[0].progress, None);
    }
}
