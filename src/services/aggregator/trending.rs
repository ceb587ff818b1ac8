use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

use super::SourceStrategy;
use crate::config::FeedConfig;
use crate::error::{FeedError, Result};
use crate::models::{ContentUnit, FeedFilter, FeedType, TimeRange};
use crate::sources::ContentSource;

/// Platform-wide trending content, independent of the viewer's graph.
///
/// The source returns units pre-sorted by raw interaction count
/// (`reactions * 1 + comments * 2`); the strategy preserves that order.
pub struct TrendingStrategy {
    content: Arc<dyn ContentSource>,
    config: FeedConfig,
}

impl TrendingStrategy {
    pub fn new(content: Arc<dyn ContentSource>, config: FeedConfig) -> Self {
        Self { content, config }
    }
}

#[async_trait]
impl SourceStrategy for TrendingStrategy {
    fn feed_type(&self) -> FeedType {
        FeedType::Trending
    }

    async fn fetch(&self, filter: &FeedFilter, _viewer_id: Uuid) -> Result<Vec<ContentUnit>> {
        // Caller-specified window wins; default is the configured lookback.
        let window = if filter.date_from.is_some() || filter.date_to.is_some() {
            filter.window()
        } else {
            TimeRange::new(
                Some(Utc::now() - Duration::hours(self.config.trending_window_hours)),
                None,
            )
        };

        self.content
            .fetch_trending(&window)
            .await
            .map_err(|e| FeedError::AllSourcesFailed(format!("trending: {e}")))
    }
}
