//! Feed composition: the sole public entry point of the engine.
//!
//! `get_feed` runs aggregation, ranking, pagination and enrichment end to
//! end: validate → over-fetch candidates → rank the full set → slice the
//! requested page → enrich survivors → assemble the response with a
//! continuation cursor. Pagination consistency across pages is
//! best-effort; content changing between page fetches is an accepted
//! trade-off, not a bug.

use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, TimeZone, Utc};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::FeedConfig;
use crate::error::{FeedError, Result};
use crate::models::{EnrichedPost, FeedFilter, FeedPage, RankedItem};
use crate::services::aggregator::Aggregator;
use crate::services::ranking::Ranker;
use crate::sources::{Enricher, SignalProvider};

pub struct FeedService {
    aggregator: Aggregator,
    ranker: Ranker,
    enricher: Arc<dyn Enricher>,
    signals: Arc<dyn SignalProvider>,
    config: FeedConfig,
}

impl FeedService {
    pub fn new(
        aggregator: Aggregator,
        ranker: Ranker,
        enricher: Arc<dyn Enricher>,
        signals: Arc<dyn SignalProvider>,
        config: FeedConfig,
    ) -> Self {
        Self { aggregator, ranker, enricher, signals, config }
    }

    /// Serve one feed page. `page` is 1-based; `page_size` must be in
    /// `1..=max_page_size`. Out-of-range values are rejected, never
    /// clamped.
    pub async fn get_feed(
        &self,
        filter: &FeedFilter,
        viewer_id: Uuid,
        page: usize,
        page_size: usize,
    ) -> Result<FeedPage> {
        let started = Instant::now();

        if page < 1 {
            return Err(FeedError::InvalidFilter("page must be >= 1".to_string()));
        }
        if page_size < 1 || page_size > self.config.max_page_size {
            return Err(FeedError::InvalidFilter(format!(
                "page_size must be between 1 and {}, got {page_size}",
                self.config.max_page_size
            )));
        }

        // Fetch beyond the page so ranking can reorder past raw recency,
        // under a hard cap to keep a deep page from scanning the store.
        // Saturating math: an absurdly deep page pins the limit at the cap
        // and lands on the empty-page path instead of overflowing.
        let candidate_limit = page
            .saturating_mul(page_size)
            .saturating_mul(self.config.overfetch_factor)
            .max(self.config.min_candidate_fetch)
            .min(self.config.max_candidates);

        let candidates = self.aggregator.aggregate(filter, viewer_id, candidate_limit).await?;
        let ranked = self.ranker.rank_batch(candidates, viewer_id).await;

        let total_items = ranked.len();
        let total_pages = total_items.div_ceil(page_size);
        let has_more = page < total_pages;

        let start = page.saturating_sub(1).saturating_mul(page_size);
        let page_items: &[RankedItem] = if start >= ranked.len() {
            &[]
        } else {
            &ranked[start..start.saturating_add(page_size).min(ranked.len())]
        };

        let items = self.enrich_page(page_items, viewer_id).await;

        // The cursor names the last item the caller actually received; if
        // enrichment dropped the whole page, fall back to the ranked slice
        // so a has_more page never comes back cursorless.
        let next_cursor = if has_more {
            items
                .last()
                .map(|post| post.created_at)
                .or_else(|| page_items.last().map(|item| item.unit.created_at))
                .map(encode_cursor)
        } else {
            None
        };

        let processing_time_ms = started.elapsed().as_millis() as u64;
        info!(
            feed_type = filter.feed_type.as_str(),
            viewer_id = %viewer_id,
            page,
            page_size,
            total_items,
            returned = items.len(),
            has_more,
            processing_time_ms,
            "feed page served"
        );

        Ok(FeedPage {
            items,
            total_items,
            page,
            total_pages,
            has_more,
            next_cursor,
            processing_time_ms,
        })
    }

    /// Enrich the selected items; a failure for one item drops that item
    /// and keeps the page.
    async fn enrich_page(&self, items: &[RankedItem], viewer_id: Uuid) -> Vec<EnrichedPost> {
        let mut enriched = Vec::with_capacity(items.len());
        for item in items {
            match self.enrich_item(item, viewer_id).await {
                Ok(post) => enriched.push(post),
                Err(e) => {
                    let err = FeedError::EnrichmentFailure(e.to_string());
                    warn!(unit_id = %item.unit.id, error = %err, "enrichment failed, dropping item");
                }
            }
        }
        enriched
    }

    async fn enrich_item(&self, item: &RankedItem, viewer_id: Uuid) -> anyhow::Result<EnrichedPost> {
        let unit = &item.unit;

        let author = self.enricher.author_preview(unit.author_id).await?;
        let pet = match unit.pet_id {
            Some(pet_id) => Some(self.enricher.pet_preview(pet_id).await?),
            None => None,
        };
        let group = match unit.group_id {
            Some(group_id) => Some(self.enricher.group_preview(group_id).await?),
            None => None,
        };
        let counts = self.signals.engagement_counts(unit.id).await?;
        let viewer_state = self.enricher.viewer_state(viewer_id, unit.id).await?;

        Ok(EnrichedPost {
            id: unit.id,
            kind: unit.kind,
            body: unit.body.clone(),
            location: unit.location.clone(),
            created_at: unit.created_at,
            media_refs: unit.media_refs.clone(),
            relevance_score: item.relevance_score,
            like_count: counts.likes,
            comment_count: counts.comments,
            author,
            pet,
            group,
            is_liked: viewer_state.is_liked,
            is_shared: viewer_state.is_shared,
        })
    }
}

/// Opaque continuation token: base64 over the millisecond timestamp of
/// the last item on the page.
pub fn encode_cursor(last_created_at: DateTime<Utc>) -> String {
    general_purpose::STANDARD.encode(last_created_at.timestamp_millis().to_string())
}

/// Decode a cursor produced by `encode_cursor`. Callers resuming a feed
/// walk pass the decoded timestamp as `date_to` on the next request.
pub fn decode_cursor(cursor: &str) -> Result<DateTime<Utc>> {
    let bytes = general_purpose::STANDARD
        .decode(cursor)
        .map_err(|_| FeedError::InvalidFilter("invalid cursor encoding".to_string()))?;
    let millis: i64 = String::from_utf8(bytes)
        .map_err(|_| FeedError::InvalidFilter("invalid cursor payload".to_string()))?
        .parse()
        .map_err(|_| FeedError::InvalidFilter("invalid cursor value".to_string()))?;
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| FeedError::InvalidFilter("cursor timestamp out of range".to_string()))
}
