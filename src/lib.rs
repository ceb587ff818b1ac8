//! Feed aggregation and relevance-ranking engine for the Pawfeed pet
//! social network.
//!
//! The engine gathers candidate content (personal posts, group posts,
//! trending content) through injected collaborator traits, merges them
//! per feed-type policy, scores each candidate with five weighted
//! signals, and serves ranked, enriched, cursor-paginated feed pages.

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod sources;

pub use config::FeedConfig;
pub use error::{FeedError, Result};
pub use models::{
    ContentKind, ContentUnit, EnrichedPost, FeedFilter, FeedPage, FeedType, RankedItem,
    RankingFactors, TimeRange,
};
pub use services::{Aggregator, FeedService, Ranker};
pub use sources::{ContentSource, Enricher, SignalProvider, SocialGraph};
