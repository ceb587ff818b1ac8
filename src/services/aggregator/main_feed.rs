use async_trait::async_trait;
use std::sync::Arc;
use tokio::time::timeout;
use tracing::warn;
use uuid::Uuid;

use super::SourceStrategy;
use crate::config::FeedConfig;
use crate::error::{degrade_to_empty, FeedError, Result};
use crate::models::{ContentUnit, FeedFilter, FeedType};
use crate::sources::ContentSource;

/// The default feed: recent personal posts (excluding the viewer's own)
/// merged with public-group posts, `created_at` descending.
///
/// The two sources are independent and fetched concurrently, each under
/// its own deadline. A timed-out source contributes nothing ("degrade by
/// omission") and is not a failure; a hard error from one source degrades
/// to the other; hard errors from both abort the request.
pub struct MainStrategy {
    content: Arc<dyn ContentSource>,
    config: FeedConfig,
}

impl MainStrategy {
    pub fn new(content: Arc<dyn ContentSource>, config: FeedConfig) -> Self {
        Self { content, config }
    }
}

#[async_trait]
impl SourceStrategy for MainStrategy {
    fn feed_type(&self) -> FeedType {
        FeedType::Main
    }

    async fn fetch(&self, filter: &FeedFilter, viewer_id: Uuid) -> Result<Vec<ContentUnit>> {
        let window = filter.window();
        let deadline = self.config.source_timeout();

        let personal_fut = timeout(deadline, self.content.fetch_personal_posts(&[], &window));
        let group_fut = timeout(deadline, self.content.fetch_group_posts(&[], &window, true));

        let (personal_res, group_res) = tokio::join!(personal_fut, group_fut);

        let mut failures: Vec<FeedError> = Vec::new();
        let mut completed_sources = 0usize;
        let mut failed_sources = 0usize;

        let mut merged: Vec<ContentUnit> = Vec::new();

        match personal_res {
            Ok(result) => {
                completed_sources += 1;
                let (units, err) = degrade_to_empty("personal-posts", result);
                if let Some(err) = err {
                    failed_sources += 1;
                    failures.push(err);
                }
                // The main feed never shows the viewer their own posts.
                merged.extend(units.into_iter().filter(|u| u.author_id != viewer_id));
            }
            Err(_) => {
                warn!(source = "personal-posts", timeout_secs = self.config.source_timeout_secs,
                      "source timed out, omitting from main feed");
            }
        }

        match group_res {
            Ok(result) => {
                completed_sources += 1;
                let (units, err) = degrade_to_empty("public-group-posts", result);
                if let Some(err) = err {
                    failed_sources += 1;
                    failures.push(err);
                }
                merged.extend(units);
            }
            Err(_) => {
                warn!(source = "public-group-posts", timeout_secs = self.config.source_timeout_secs,
                      "source timed out, omitting from main feed");
            }
        }

        if completed_sources > 0 && failed_sources == completed_sources {
            let detail = failures
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(FeedError::AllSourcesFailed(detail));
        }

        merged.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(merged)
    }
}
