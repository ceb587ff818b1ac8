use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Kind of feed-eligible content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentKind {
    PersonalPost,
    GroupPost,
}

/// A candidate feed entry as read from a content source.
///
/// Immutable once handed to the engine: aggregation, ranking and
/// enrichment never mutate source content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentUnit {
    pub id: Uuid,
    pub kind: ContentKind,
    pub author_id: Uuid,
    pub pet_id: Option<Uuid>,
    pub group_id: Option<Uuid>,
    pub body: String,
    pub location: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub media_refs: Vec<String>,
}

/// High-level source policy for a feed request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedType {
    #[default]
    Main,
    Following,
    Groups,
    Trending,
}

impl FeedType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedType::Main => "main",
            FeedType::Following => "following",
            FeedType::Groups => "groups",
            FeedType::Trending => "trending",
        }
    }
}

/// Optional time window for content fetches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl TimeRange {
    pub fn new(from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Self {
        Self { from, to }
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        if let Some(from) = self.from {
            if ts < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if ts > to {
                return false;
            }
        }
        true
    }
}

/// Per-request feed query. Absent fields mean "no constraint".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedFilter {
    #[serde(default)]
    pub feed_type: FeedType,
    pub content_kinds: Option<HashSet<ContentKind>>,
    pub pet_id: Option<Uuid>,
    pub group_id: Option<Uuid>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    pub tags: Option<HashSet<String>>,
    pub location: Option<String>,
}

impl FeedFilter {
    pub fn window(&self) -> TimeRange {
        TimeRange::new(self.date_from, self.date_to)
    }

    /// Reject malformed filters instead of silently correcting them.
    pub fn validate(&self) -> Result<(), crate::error::FeedError> {
        if let (Some(from), Some(to)) = (self.date_from, self.date_to) {
            if from > to {
                return Err(crate::error::FeedError::InvalidFilter(format!(
                    "date_from {from} is after date_to {to}"
                )));
            }
        }
        Ok(())
    }
}

/// The five independent ranking signals, each in `[0, 1]`.
///
/// Recomputed on every ranking pass; the recency term makes cached values
/// stale within seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RankingFactors {
    pub time_factor: f64,
    pub engagement_score: f64,
    pub author_score: f64,
    pub affinity_score: f64,
    pub content_score: f64,
}

/// A content unit paired with its composite relevance score.
#[derive(Debug, Clone)]
pub struct RankedItem {
    pub unit: ContentUnit,
    pub relevance_score: f64,
    pub factors: RankingFactors,
}

/// Raw likes/comments tallies for one content unit.
#[derive(Debug, Clone, Copy, Default)]
pub struct EngagementCounts {
    pub likes: u32,
    pub comments: u32,
}

/// Author reputation aggregated across all pets the author owns.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthorReputation {
    pub followers: u32,
    pub post_count: u32,
}

/// Viewer-to-author closeness signals over the last 30 days.
#[derive(Debug, Clone, Copy, Default)]
pub struct ViewerAffinity {
    /// Any one of the viewer's pets follows the content's pet.
    pub follows: bool,
    pub likes_30d: u32,
    pub comments_30d: u32,
}

/// Display data for a content author.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorPreview {
    pub author_id: Uuid,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// Display data for the pet a post is about.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PetPreview {
    pub pet_id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub species: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// Display data for the group a post was published in.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupPreview {
    pub group_id: Uuid,
    pub name: String,
    pub is_public: bool,
}

/// What the viewer has already done with a content unit.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerState {
    pub is_liked: bool,
    pub is_shared: bool,
}

/// A fully enriched feed item, ready for the response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedPost {
    pub id: Uuid,
    pub kind: ContentKind,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub media_refs: Vec<String>,
    pub relevance_score: f64,
    pub like_count: u32,
    pub comment_count: u32,
    pub author: AuthorPreview,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pet: Option<PetPreview>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<GroupPreview>,
    pub is_liked: bool,
    pub is_shared: bool,
}

/// One page of ranked, enriched feed content.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPage {
    pub items: Vec<EnrichedPost>,
    pub total_items: usize,
    pub page: usize,
    pub total_pages: usize,
    pub has_more: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
    pub processing_time_ms: u64,
}
