//! Collaborator seams between the feed engine and the rest of the
//! platform. The engine never touches a database or a wire protocol:
//! candidate content, social-graph lookups, engagement signals and
//! enrichment previews all come through these traits, injected into the
//! services at construction time.
//!
//! Methods return `anyhow::Result` so implementors can surface whatever
//! store or transport error they hit; the engine itself decides whether
//! a failure degrades or aborts.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{
    AuthorPreview, AuthorReputation, ContentUnit, EngagementCounts, GroupPreview, PetPreview,
    TimeRange, ViewerAffinity, ViewerState,
};

/// Reads candidate content units from the backing store.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Personal posts authored by the given pets, newest first.
    ///
    /// An empty `author_pet_ids` slice means no author constraint: recent
    /// posts across all authors. The main feed relies on this.
    async fn fetch_personal_posts(
        &self,
        author_pet_ids: &[Uuid],
        window: &TimeRange,
    ) -> anyhow::Result<Vec<ContentUnit>>;

    /// Group posts from the given groups, newest first. An empty
    /// `group_ids` slice means all groups; `public_only` restricts to
    /// publicly visible groups.
    async fn fetch_group_posts(
        &self,
        group_ids: &[Uuid],
        window: &TimeRange,
        public_only: bool,
    ) -> anyhow::Result<Vec<ContentUnit>>;

    /// Content pre-sorted by raw interaction count
    /// (`reactions * 1 + comments * 2`), highest first.
    async fn fetch_trending(&self, window: &TimeRange) -> anyhow::Result<Vec<ContentUnit>>;
}

/// Follow/membership graph lookups.
#[async_trait]
pub trait SocialGraph: Send + Sync {
    /// Pets owned by the given user.
    async fn owned_pet_ids(&self, owner_id: Uuid) -> anyhow::Result<Vec<Uuid>>;

    /// Pets followed by any of the given pets.
    async fn followed_pet_ids(&self, viewer_pet_ids: &[Uuid]) -> anyhow::Result<Vec<Uuid>>;

    /// Groups the given user belongs to.
    async fn member_group_ids(&self, user_id: Uuid) -> anyhow::Result<Vec<Uuid>>;
}

/// Engagement and affinity signals consumed by the ranker.
#[async_trait]
pub trait SignalProvider: Send + Sync {
    async fn engagement_counts(&self, unit_id: Uuid) -> anyhow::Result<EngagementCounts>;

    /// Reputation aggregated across every pet the author owns.
    async fn author_reputation(&self, author_id: Uuid) -> anyhow::Result<AuthorReputation>;

    /// Viewer-to-author closeness: follow state plus 30-day interaction
    /// history.
    async fn viewer_affinity(
        &self,
        viewer_id: Uuid,
        author_id: Uuid,
    ) -> anyhow::Result<ViewerAffinity>;
}

/// Preview data resolved at page-assembly time.
#[async_trait]
pub trait Enricher: Send + Sync {
    async fn author_preview(&self, author_id: Uuid) -> anyhow::Result<AuthorPreview>;

    async fn pet_preview(&self, pet_id: Uuid) -> anyhow::Result<PetPreview>;

    async fn group_preview(&self, group_id: Uuid) -> anyhow::Result<GroupPreview>;

    /// Whether the viewer has already liked/shared the unit.
    async fn viewer_state(&self, viewer_id: Uuid, unit_id: Uuid) -> anyhow::Result<ViewerState>;
}
