use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use super::SourceStrategy;
use crate::error::{FeedError, Result};
use crate::models::{ContentUnit, FeedFilter, FeedType};
use crate::sources::{ContentSource, SocialGraph};

/// Group posts from the viewer's groups, or from one explicitly requested
/// group, newest first.
pub struct GroupsStrategy {
    content: Arc<dyn ContentSource>,
    graph: Arc<dyn SocialGraph>,
}

impl GroupsStrategy {
    pub fn new(content: Arc<dyn ContentSource>, graph: Arc<dyn SocialGraph>) -> Self {
        Self { content, graph }
    }
}

#[async_trait]
impl SourceStrategy for GroupsStrategy {
    fn feed_type(&self) -> FeedType {
        FeedType::Groups
    }

    async fn fetch(&self, filter: &FeedFilter, viewer_id: Uuid) -> Result<Vec<ContentUnit>> {
        let group_ids = match filter.group_id {
            Some(group_id) => vec![group_id],
            None => self
                .graph
                .member_group_ids(viewer_id)
                .await
                .map_err(|e| FeedError::AllSourcesFailed(format!("group memberships: {e}")))?,
        };

        if group_ids.is_empty() {
            debug!(viewer_id = %viewer_id, "viewer belongs to no groups, empty groups feed");
            return Ok(Vec::new());
        }

        let mut units = self
            .content
            .fetch_group_posts(&group_ids, &filter.window(), false)
            .await
            .map_err(|e| FeedError::AllSourcesFailed(format!("group posts: {e}")))?;

        units.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(units)
    }
}
