//! Candidate aggregation.
//!
//! One `SourceStrategy` per feed type, keyed in a table so adding a feed
//! type means adding a strategy, not editing a branch chain. The
//! aggregator runs the strategy, applies the request filter as
//! independent AND predicates, dedupes by unit id and bounds the result.

mod following;
mod groups;
mod main_feed;
mod trending;

pub use following::FollowingStrategy;
pub use groups::GroupsStrategy;
pub use main_feed::MainStrategy;
pub use trending::TrendingStrategy;

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::FeedConfig;
use crate::error::{FeedError, Result};
use crate::models::{ContentUnit, FeedFilter, FeedType};
use crate::sources::{ContentSource, SocialGraph};

/// One candidate-fetch policy per feed type.
#[async_trait]
pub trait SourceStrategy: Send + Sync {
    fn feed_type(&self) -> FeedType;

    /// Fetch raw candidates for the viewer. A strategy whose every
    /// underlying source failed hard returns `AllSourcesFailed`; partial
    /// failures degrade to a smaller candidate set.
    async fn fetch(&self, filter: &FeedFilter, viewer_id: Uuid) -> Result<Vec<ContentUnit>>;
}

pub struct Aggregator {
    strategies: HashMap<FeedType, Box<dyn SourceStrategy>>,
}

impl Aggregator {
    pub fn new(
        content: Arc<dyn ContentSource>,
        graph: Arc<dyn SocialGraph>,
        config: FeedConfig,
    ) -> Self {
        let strategies: Vec<Box<dyn SourceStrategy>> = vec![
            Box::new(MainStrategy::new(content.clone(), config.clone())),
            Box::new(FollowingStrategy::new(content.clone(), graph.clone())),
            Box::new(GroupsStrategy::new(content.clone(), graph)),
            Box::new(TrendingStrategy::new(content, config)),
        ];
        Self {
            strategies: strategies.into_iter().map(|s| (s.feed_type(), s)).collect(),
        }
    }

    /// Produce the unranked candidate list for a request, newest first
    /// (trending keeps its interaction-count order), at most `limit`
    /// units, no duplicate ids.
    pub async fn aggregate(
        &self,
        filter: &FeedFilter,
        viewer_id: Uuid,
        limit: usize,
    ) -> Result<Vec<ContentUnit>> {
        filter.validate()?;

        let strategy = self
            .strategies
            .get(&filter.feed_type)
            .ok_or_else(|| FeedError::Internal(format!("no strategy for {}", filter.feed_type.as_str())))?;

        let fetched = strategy.fetch(filter, viewer_id).await?;
        let fetched_count = fetched.len();

        let mut candidates = dedupe_by_id(apply_filters(fetched, filter));
        candidates.truncate(limit);

        info!(
            feed_type = filter.feed_type.as_str(),
            viewer_id = %viewer_id,
            fetched = fetched_count,
            candidates = candidates.len(),
            "aggregation complete"
        );

        Ok(candidates)
    }
}

/// Independent AND predicates; an absent filter field constrains nothing.
fn apply_filters(units: Vec<ContentUnit>, filter: &FeedFilter) -> Vec<ContentUnit> {
    let location_needle = filter
        .location
        .as_deref()
        .filter(|l| !l.is_empty())
        .map(str::to_lowercase);

    let before = units.len();
    let filtered: Vec<ContentUnit> = units
        .into_iter()
        .filter(|unit| {
            if let Some(kinds) = &filter.content_kinds {
                if !kinds.is_empty() && !kinds.contains(&unit.kind) {
                    return false;
                }
            }
            if let Some(pet_id) = filter.pet_id {
                if unit.pet_id != Some(pet_id) {
                    return false;
                }
            }
            if let Some(group_id) = filter.group_id {
                if unit.group_id != Some(group_id) {
                    return false;
                }
            }
            if let Some(needle) = &location_needle {
                match &unit.location {
                    Some(loc) if loc.to_lowercase().contains(needle) => {}
                    _ => return false,
                }
            }
            if let Some(tags) = &filter.tags {
                if !tags.is_empty() && !unit.tags.iter().any(|t| tags.contains(t)) {
                    return false;
                }
            }
            true
        })
        .collect();

    if filtered.len() != before {
        debug!(before, after = filtered.len(), "filter predicates applied");
    }
    filtered
}

/// First occurrence wins; later duplicates (a unit reachable through two
/// sources) are dropped.
fn dedupe_by_id(units: Vec<ContentUnit>) -> Vec<ContentUnit> {
    let mut seen: HashSet<Uuid> = HashSet::with_capacity(units.len());
    units.into_iter().filter(|u| seen.insert(u.id)).collect()
}
