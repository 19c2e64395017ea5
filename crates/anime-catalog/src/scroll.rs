//! Scroll-derived UI flags, recomputed from offsets on every position change.

use serde::Serialize;
use shared::ScrollConfig;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollDirection {
    #[default]
    Down,
    Up,
}

/// Flags the page chrome reacts to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScrollFlags {
    pub direction: ScrollDirection,
    pub show_scroll_top: bool,
    pub show_search_bar: bool,
}

impl ScrollFlags {
    /// Flags for a move from `previous` to `offset`
    pub fn update(config: &ScrollConfig, previous: f64, offset: f64) -> Self {
        let direction = if offset > previous {
            ScrollDirection::Down
        } else {
            ScrollDirection::Up
        };

        Self {
            direction,
            show_scroll_top: offset > config.scroll_top_threshold,
            show_search_bar: offset > config.search_bar_threshold,
        }
    }
}

/// Tracks the last offset so callers only report the new one
#[derive(Debug, Clone, Default)]
pub struct ScrollTracker {
    config: ScrollConfig,
    last_offset: f64,
    flags: ScrollFlags,
}

impl ScrollTracker {
    pub fn new(config: ScrollConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn on_scroll(&mut self, offset: f64) -> ScrollFlags {
        self.flags = ScrollFlags::update(&self.config, self.last_offset, offset);
        self.last_offset = offset;
        self.flags
    }

    pub fn flags(&self) -> ScrollFlags {
        self.flags
    }
}

/// Percentage of the page scrolled, clamped to `[0, 100]`.
///
/// A page that fits the viewport reports 0.
pub fn scroll_progress(scroll_top: f64, scroll_height: f64, client_height: f64) -> f64 {
    let scrollable = scroll_height - client_height;
    if scrollable <= 0.0 {
        return 0.0;
    }
    (scroll_top / scrollable * 100.0).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thresholds() {
        let config = ScrollConfig::default();

        let flags = ScrollFlags::update(&config, 0.0, 50.0);
        assert!(!flags.show_search_bar);
        assert!(!flags.show_scroll_top);

        let flags = ScrollFlags::update(&config, 0.0, 101.0);
        assert!(flags.show_search_bar);
        assert!(!flags.show_scroll_top);

        let flags = ScrollFlags::update(&config, 0.0, 500.0);
        assert!(!flags.show_scroll_top);

        let flags = ScrollFlags::update(&config, 0.0, 501.0);
        assert!(flags.show_scroll_top);
    }

    #[test]
    fn test_direction() {
        let config = ScrollConfig::default();
        assert_eq!(
            ScrollFlags::update(&config, 10.0, 20.0).direction,
            ScrollDirection::Down
        );
        assert_eq!(
            ScrollFlags::update(&config, 20.0, 10.0).direction,
            ScrollDirection::Up
        );
        // Not moving counts as up
        assert_eq!(
            ScrollFlags::update(&config, 20.0, 20.0).direction,
            ScrollDirection::Up
        );
    }

    #[test]
    fn test_tracker_follows_offsets() {
        let mut tracker = ScrollTracker::new(ScrollConfig::default());
        assert_eq!(tracker.on_scroll(600.0).direction, ScrollDirection::Down);
        assert!(tracker.flags().show_scroll_top);

        let flags = tracker.on_scroll(80.0);
        assert_eq!(flags.direction, ScrollDirection::Up);
        assert!(!flags.show_search_bar);
        assert!(!flags.show_scroll_top);
    }

    #[test]
    fn test_progress() {
        assert_eq!(scroll_progress(0.0, 2000.0, 1000.0), 0.0);
        assert_eq!(scroll_progress(500.0, 2000.0, 1000.0), 50.0);
        assert_eq!(scroll_progress(1000.0, 2000.0, 1000.0), 100.0);
        assert_eq!(scroll_progress(1200.0, 2000.0, 1000.0), 100.0);
        assert_eq!(scroll_progress(100.0, 800.0, 1000.0), 0.0);
    }
}
