use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use super::SourceStrategy;
use crate::error::{FeedError, Result};
use crate::models::{ContentUnit, FeedFilter, FeedType};
use crate::sources::{ContentSource, SocialGraph};

/// Personal posts by pets the viewer follows, newest first.
///
/// Resolution chain: viewer -> owned pets -> followed pets -> posts.
/// A viewer who follows nobody gets an empty feed, not an error.
pub struct FollowingStrategy {
    content: Arc<dyn ContentSource>,
    graph: Arc<dyn SocialGraph>,
}

impl FollowingStrategy {
    pub fn new(content: Arc<dyn ContentSource>, graph: Arc<dyn SocialGraph>) -> Self {
        Self { content, graph }
    }
}

#[async_trait]
impl SourceStrategy for FollowingStrategy {
    fn feed_type(&self) -> FeedType {
        FeedType::Following
    }

    async fn fetch(&self, filter: &FeedFilter, viewer_id: Uuid) -> Result<Vec<ContentUnit>> {
        let owned = self
            .graph
            .owned_pet_ids(viewer_id)
            .await
            .map_err(|e| FeedError::AllSourcesFailed(format!("owned pets: {e}")))?;

        let followed = self
            .graph
            .followed_pet_ids(&owned)
            .await
            .map_err(|e| FeedError::AllSourcesFailed(format!("follow graph: {e}")))?;

        if followed.is_empty() {
            debug!(viewer_id = %viewer_id, "viewer follows no pets, empty following feed");
            return Ok(Vec::new());
        }

        let mut units = self
            .content
            .fetch_personal_posts(&followed, &filter.window())
            .await
            .map_err(|e| FeedError::AllSourcesFailed(format!("personal posts: {e}")))?;

        units.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(units)
    }
}
