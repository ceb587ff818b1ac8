//! Relevance ranking.
//!
//! A batch pass snapshots "now" once, fans out one scoring future per
//! candidate (scoring is read-only with no cross-item dependency, so the
//! fan-out needs no locking: `join_all` keeps results index-ordered), and
//! sorts descending by score with a deterministic created_at tie-break.

pub mod factors;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::{ContentUnit, RankedItem, RankingFactors};
use crate::sources::SignalProvider;

pub struct Ranker {
    signals: Arc<dyn SignalProvider>,
}

impl Ranker {
    pub fn new(signals: Arc<dyn SignalProvider>) -> Self {
        Self { signals }
    }

    /// Score one unit for one viewer against an explicit timestamp.
    ///
    /// Propagates signal failures; `rank_batch` converts those into a
    /// zero score instead of aborting the batch.
    pub async fn score_at(
        &self,
        unit: &ContentUnit,
        viewer_id: Uuid,
        now: DateTime<Utc>,
    ) -> anyhow::Result<(f64, RankingFactors)> {
        let counts = self.signals.engagement_counts(unit.id).await?;
        let reputation = self.signals.author_reputation(unit.author_id).await?;
        let affinity = self.signals.viewer_affinity(viewer_id, unit.author_id).await?;

        let factors = factors::compute_factors(unit, &counts, &reputation, &affinity, now);
        Ok((factors::composite_score(&factors), factors))
    }

    /// Score every candidate and return them highest first.
    ///
    /// Infallible: a unit whose signals cannot be fetched scores 0.0 so
    /// one malformed item never keeps the rest of the feed from
    /// rendering. Ties are broken by `created_at` descending so repeated
    /// pagination over the same data is reproducible.
    pub async fn rank_batch(&self, units: Vec<ContentUnit>, viewer_id: Uuid) -> Vec<RankedItem> {
        if units.is_empty() {
            return Vec::new();
        }

        // One "now" for the whole pass; per-item clocks would make equal
        // inputs score unequally within a single batch.
        let now = Utc::now();

        let scored = join_all(units.iter().map(|unit| self.score_at(unit, viewer_id, now))).await;

        let mut ranked: Vec<RankedItem> = units
            .into_iter()
            .zip(scored)
            .map(|(unit, result)| match result {
                Ok((relevance_score, factors)) => RankedItem { unit, relevance_score, factors },
                Err(e) => {
                    let err = crate::error::FeedError::ScoringFailure(e.to_string());
                    warn!(unit_id = %unit.id, error = %err, "scoring failed, defaulting to 0.0");
                    RankedItem {
                        unit,
                        relevance_score: 0.0,
                        factors: RankingFactors::default(),
                    }
                }
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.relevance_score
                .total_cmp(&a.relevance_score)
                .then_with(|| b.unit.created_at.cmp(&a.unit.created_at))
        });

        debug!(
            viewer_id = %viewer_id,
            count = ranked.len(),
            top_score = ranked.first().map(|r| r.relevance_score),
            "ranking pass complete"
        );

        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AuthorReputation, ContentKind, EngagementCounts, ViewerAffinity};
    use async_trait::async_trait;
    use chrono::Duration;
    use std::collections::HashMap;

    /// Signal fake with per-unit engagement and a set of failing units.
    struct FakeSignals {
        engagement: HashMap<Uuid, EngagementCounts>,
        failing_units: Vec<Uuid>,
        followed_authors: Vec<Uuid>,
    }

    impl FakeSignals {
        fn empty() -> Self {
            Self {
                engagement: HashMap::new(),
                failing_units: vec![],
                followed_authors: vec![],
            }
        }
    }

    #[async_trait]
    impl SignalProvider for FakeSignals {
        async fn engagement_counts(&self, unit_id: Uuid) -> anyhow::Result<EngagementCounts> {
            if self.failing_units.contains(&unit_id) {
                anyhow::bail!("engagement store unavailable");
            }
            Ok(self.engagement.get(&unit_id).copied().unwrap_or_default())
        }

        async fn author_reputation(&self, _author_id: Uuid) -> anyhow::Result<AuthorReputation> {
            Ok(AuthorReputation::default())
        }

        async fn viewer_affinity(
            &self,
            _viewer_id: Uuid,
            author_id: Uuid,
        ) -> anyhow::Result<ViewerAffinity> {
            Ok(ViewerAffinity {
                follows: self.followed_authors.contains(&author_id),
                likes_30d: 0,
                comments_30d: 0,
            })
        }
    }

    fn unit_with_age(hours: i64) -> ContentUnit {
        ContentUnit {
            id: Uuid::new_v4(),
            kind: ContentKind::PersonalPost,
            author_id: Uuid::new_v4(),
            pet_id: None,
            group_id: None,
            body: "a walk in the park".to_string(),
            location: None,
            tags: vec![],
            created_at: Utc::now() - Duration::hours(hours),
            media_refs: vec![],
        }
    }

    #[tokio::test]
    async fn test_rank_batch_orders_by_score_descending() {
        let ranker = Ranker::new(Arc::new(FakeSignals::empty()));
        let units = vec![unit_with_age(48), unit_with_age(1), unit_with_age(12)];
        let one_hour_id = units[1].id;

        let ranked = ranker.rank_batch(units, Uuid::new_v4()).await;

        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].unit.id, one_hour_id);
        assert!(ranked[0].relevance_score >= ranked[1].relevance_score);
        assert!(ranked[1].relevance_score >= ranked[2].relevance_score);
    }

    #[tokio::test]
    async fn test_rank_batch_tie_break_newest_first() {
        // Identical signals and identical age buckets differing only in
        // created_at by minutes still get a deterministic order.
        let ranker = Ranker::new(Arc::new(FakeSignals::empty()));
        let now = Utc::now();
        let mut older = unit_with_age(0);
        older.created_at = now - Duration::hours(5);
        let mut newer = unit_with_age(0);
        newer.created_at = now - Duration::hours(5) + Duration::minutes(1);
        let newer_id = newer.id;

        // Scores differ minutely through the time factor; the newer unit
        // must come first either via score or via the tie-break.
        let ranked = ranker.rank_batch(vec![older, newer], Uuid::new_v4()).await;
        assert_eq!(ranked[0].unit.id, newer_id);
    }

    #[tokio::test]
    async fn test_rank_batch_exact_tie_break_on_equal_scores() {
        // Future timestamps (clock skew) both clamp the time factor to
        // exactly 1.0 and every other signal is identical, so the two
        // units score bit-equal and only the created_at tie-break can
        // order them.
        let ranker = Ranker::new(Arc::new(FakeSignals::empty()));
        let now = Utc::now();
        let mut older = unit_with_age(0);
        older.created_at = now + Duration::hours(1);
        let mut newer = unit_with_age(0);
        newer.created_at = now + Duration::hours(2);
        let newer_id = newer.id;

        let ranked = ranker.rank_batch(vec![newer.clone(), older.clone()], Uuid::new_v4()).await;
        assert_eq!(
            ranked[0].relevance_score.to_bits(),
            ranked[1].relevance_score.to_bits(),
            "setup must produce an exact score tie"
        );
        assert_eq!(ranked[0].unit.id, newer_id);

        // Same outcome regardless of input order.
        let ranked = ranker.rank_batch(vec![older, newer], Uuid::new_v4()).await;
        assert_eq!(ranked[0].unit.id, newer_id);
    }

    #[tokio::test]
    async fn test_rank_batch_scoring_failure_defaults_to_zero() {
        let good = unit_with_age(2);
        let bad = unit_with_age(1);
        let signals = FakeSignals {
            engagement: HashMap::new(),
            failing_units: vec![bad.id],
            followed_authors: vec![],
        };
        let bad_id = bad.id;
        let ranker = Ranker::new(Arc::new(signals));

        let ranked = ranker.rank_batch(vec![good, bad], Uuid::new_v4()).await;

        assert_eq!(ranked.len(), 2, "a failing unit must not abort the batch");
        assert_eq!(ranked[1].unit.id, bad_id);
        assert_eq!(ranked[1].relevance_score, 0.0);
        assert!(ranked[0].relevance_score > 0.0);
    }

    #[tokio::test]
    async fn test_rank_batch_follow_boost_reorders() {
        let older_followed = unit_with_age(10);
        let newer_stranger = unit_with_age(8);
        let signals = FakeSignals {
            engagement: HashMap::new(),
            failing_units: vec![],
            followed_authors: vec![older_followed.author_id],
        };
        let followed_id = older_followed.id;
        let ranker = Ranker::new(Arc::new(signals));

        let ranked = ranker
            .rank_batch(vec![newer_stranger, older_followed], Uuid::new_v4())
            .await;

        // 0.5 affinity * 0.20 weight outweighs two hours of extra decay.
        assert_eq!(ranked[0].unit.id, followed_id);
    }

    #[tokio::test]
    async fn test_rank_batch_empty() {
        let ranker = Ranker::new(Arc::new(FakeSignals::empty()));
        let ranked = ranker.rank_batch(vec![], Uuid::new_v4()).await;
        assert!(ranked.is_empty());
    }

    #[tokio::test]
    async fn test_scores_stay_in_unit_interval() {
        let mut unit = unit_with_age(0);
        unit.body = "x".repeat(500);
        unit.media_refs = vec!["m".into()];
        unit.location = Some("park".into());
        let mut engagement = HashMap::new();
        engagement.insert(unit.id, EngagementCounts { likes: 1_000_000, comments: 1_000_000 });
        let signals = FakeSignals {
            engagement,
            failing_units: vec![],
            followed_authors: vec![unit.author_id],
        };
        let ranker = Ranker::new(Arc::new(signals));

        let ranked = ranker.rank_batch(vec![unit], Uuid::new_v4()).await;
        let score = ranked[0].relevance_score;
        assert!((0.0..=1.0).contains(&score), "score out of range: {score}");
    }
}
