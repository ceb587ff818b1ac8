//! The five ranking factor formulas and their composite combination.
//!
//! All functions are pure and take the batch timestamp explicitly, so a
//! ranking pass scores every candidate against one frozen "now" and tests
//! can replay exact values.

use chrono::{DateTime, Utc};

use crate::models::{
    AuthorReputation, ContentUnit, EngagementCounts, RankingFactors, ViewerAffinity,
};

/// Composite weights. Fixed constants: changing any of these changes
/// observable ranking order.
pub const WEIGHT_TIME: f64 = 0.30;
pub const WEIGHT_ENGAGEMENT: f64 = 0.25;
pub const WEIGHT_AUTHOR: f64 = 0.15;
pub const WEIGHT_AFFINITY: f64 = 0.20;
pub const WEIGHT_CONTENT: f64 = 0.10;

/// Damping divisor in the log decay. At 1h of age the factor is ~0.878;
/// at 24h ~0.608; at a week ~0.494.
const TIME_DECAY_DAMPING: f64 = 5.0;

/// Engagement saturates at 100 weighted interactions.
const ENGAGEMENT_CAP: f64 = 100.0;

/// Logarithmic recency decay in `[0, 1]`.
///
/// `1 / (1 + ln(1 + age_hours) / 5)` decays much slower than exponential
/// decay, so day-old content is dampened rather than buried while fresh
/// content still wins.
pub fn time_factor(created_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    // Future timestamps (clock skew) score as brand new.
    let age_secs = (now - created_at).num_seconds().max(0) as f64;
    let age_hours = age_secs / 3600.0;
    1.0 / (1.0 + (1.0 + age_hours).ln() / TIME_DECAY_DAMPING)
}

/// Weighted interaction volume, saturating at 100. Comments weigh double:
/// they signal deeper engagement than a reaction.
pub fn engagement_score(counts: &EngagementCounts) -> f64 {
    let weighted = counts.likes as f64 + counts.comments as f64 * 2.0;
    weighted.clamp(0.0, ENGAGEMENT_CAP) / ENGAGEMENT_CAP
}

/// Author reputation: 70% audience size (saturating at 1000 followers),
/// 30% output volume (saturating at 100 posts). Both tallies are
/// aggregated across all pets the author owns.
pub fn author_score(reputation: &AuthorReputation) -> f64 {
    let follower_part = (reputation.followers as f64 / 1000.0).clamp(0.0, 1.0);
    let post_part = (reputation.post_count as f64 / 100.0).clamp(0.0, 1.0);
    0.7 * follower_part + 0.3 * post_part
}

/// Viewer-to-author affinity: a 0.5 follow bonus (a single following pet
/// suffices, never double counted) plus up to 0.5 from 30-day interaction
/// history.
pub fn affinity_score(affinity: &ViewerAffinity) -> f64 {
    let follow_part = if affinity.follows { 0.5 } else { 0.0 };
    let interactions = affinity.likes_30d as f64 + affinity.comments_30d as f64 * 2.0;
    let history_part = (interactions / 20.0).clamp(0.0, 0.5);
    (follow_part + history_part).clamp(0.0, 1.0)
}

/// Intrinsic content quality: additive bonuses for substantive text,
/// media, a location tag, and a positive-feedback micro-bonus; capped at 1.
pub fn content_score(unit: &ContentUnit, counts: &EngagementCounts) -> f64 {
    let mut score = 0.0;
    let body_len = unit.body.chars().count();
    if body_len > 50 {
        score += 0.2;
    }
    if body_len > 200 {
        score += 0.2;
    }
    if !unit.media_refs.is_empty() {
        score += 0.3;
    }
    if unit.location.as_deref().is_some_and(|l| !l.is_empty()) {
        score += 0.2;
    }
    let likes = counts.likes as f64;
    score += 0.1 * (likes / (likes + 1.0));
    score.min(1.0)
}

/// Combine the five factors into the composite relevance score in `[0, 1]`.
pub fn composite_score(factors: &RankingFactors) -> f64 {
    let score = WEIGHT_TIME * factors.time_factor
        + WEIGHT_ENGAGEMENT * factors.engagement_score
        + WEIGHT_AUTHOR * factors.author_score
        + WEIGHT_AFFINITY * factors.affinity_score
        + WEIGHT_CONTENT * factors.content_score;
    score.clamp(0.0, 1.0)
}

/// Compute all five factors for one `(unit, viewer)` pair.
pub fn compute_factors(
    unit: &ContentUnit,
    counts: &EngagementCounts,
    reputation: &AuthorReputation,
    affinity: &ViewerAffinity,
    now: DateTime<Utc>,
) -> RankingFactors {
    RankingFactors {
        time_factor: time_factor(unit.created_at, now),
        engagement_score: engagement_score(counts),
        author_score: author_score(reputation),
        affinity_score: affinity_score(affinity),
        content_score: content_score(unit, counts),
    }
}
