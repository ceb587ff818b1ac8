use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunables for aggregation, ranking and pagination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Hard cap on candidates fetched per request, across all sources.
    pub max_candidates: usize,
    /// Minimum candidate fetch so the ranker can reorder even page 1.
    pub min_candidate_fetch: usize,
    /// Candidates fetched per requested item; gives the ranker freedom to
    /// reorder beyond raw recency order.
    pub overfetch_factor: usize,
    /// Upper bound on page_size accepted by get_feed.
    pub max_page_size: usize,
    /// Per-source deadline; a source that misses it contributes nothing.
    pub source_timeout_secs: u64,
    /// Default lookback for the trending feed when the caller gives no window.
    pub trending_window_hours: i64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            max_candidates: 500,
            min_candidate_fetch: 100,
            overfetch_factor: 3,
            max_page_size: 50,
            source_timeout_secs: 5,
            trending_window_hours: 24,
        }
    }
}

impl FeedConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_candidates: env_parse("FEED_MAX_CANDIDATES", defaults.max_candidates),
            min_candidate_fetch: env_parse("FEED_MIN_CANDIDATE_FETCH", defaults.min_candidate_fetch),
            overfetch_factor: env_parse("FEED_OVERFETCH_FACTOR", defaults.overfetch_factor),
            max_page_size: env_parse("FEED_MAX_PAGE_SIZE", defaults.max_page_size),
            source_timeout_secs: env_parse("FEED_SOURCE_TIMEOUT_SECS", defaults.source_timeout_secs),
            trending_window_hours: env_parse(
                "FEED_TRENDING_WINDOW_HOURS",
                defaults.trending_window_hours,
            ),
        }
    }

    pub fn source_timeout(&self) -> Duration {
        Duration::from_secs(self.source_timeout_secs)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FeedConfig::default();
        assert_eq!(config.max_page_size, 50);
        assert_eq!(config.max_candidates, 500);
        assert!(config.overfetch_factor >= 1);
        assert_eq!(config.source_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_env_parse_falls_back_on_missing() {
        assert_eq!(env_parse("FEED_TEST_MISSING_VAR_XYZ", 42usize), 42);
    }
}
