//! Error taxonomy for the feed engine.
//!
//! Only two classes ever reach the caller of `get_feed`: invalid input
//! (`InvalidFilter`) and total source failure (`AllSourcesFailed`).
//! Everything else degrades locally: a failed source contributes nothing,
//! a failed scoring pass scores zero, a failed enrichment drops one item.

use thiserror::Error;
use tracing::warn;

pub type Result<T> = std::result::Result<T, FeedError>;

#[derive(Error, Debug, Clone)]
pub enum FeedError {
    /// Malformed request input: bad date range, out-of-range page or
    /// page size, undecodable cursor. Never silently corrected.
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    /// One content source failed. Internal bookkeeping while other
    /// sources may still deliver; surfaces only as `AllSourcesFailed`.
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    /// Every content source for the request failed. Retriable.
    #[error("All content sources failed: {0}")]
    AllSourcesFailed(String),

    /// Per-item enrichment failure. Logged, the item is dropped.
    #[error("Enrichment failed: {0}")]
    EnrichmentFailure(String),

    /// Per-item scoring failure. Logged, the item scores 0.0.
    #[error("Scoring failed: {0}")]
    ScoringFailure(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl FeedError {
    /// HTTP-equivalent status code for transport adapters.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidFilter(_) => 400,
            Self::SourceUnavailable(_) => 503,
            Self::AllSourcesFailed(_) => 503,
            Self::EnrichmentFailure(_) => 500,
            Self::ScoringFailure(_) => 500,
            Self::Internal(_) => 500,
        }
    }

    /// Whether the caller may usefully retry the request as-is.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::SourceUnavailable(_) | Self::AllSourcesFailed(_))
    }
}

/// Consolidated degrade-on-partial-failure policy: convert a failed
/// branch into an empty contribution, keeping the failure visible in the
/// log and in the returned error slot for all-sources accounting.
pub fn degrade_to_empty<T>(
    source: &str,
    result: anyhow::Result<Vec<T>>,
) -> (Vec<T>, Option<FeedError>) {
    match result {
        Ok(items) => (items, None),
        Err(e) => {
            warn!(source, error = %e, "content source failed, degrading to empty");
            (Vec::new(), Some(FeedError::SourceUnavailable(format!("{source}: {e}"))))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(FeedError::InvalidFilter("x".into()).status_code(), 400);
        assert_eq!(FeedError::AllSourcesFailed("x".into()).status_code(), 503);
        assert_eq!(FeedError::Internal("x".into()).status_code(), 500);
    }

    #[test]
    fn test_retryable_classes() {
        assert!(FeedError::AllSourcesFailed("x".into()).is_retryable());
        assert!(FeedError::SourceUnavailable("x".into()).is_retryable());
        assert!(!FeedError::InvalidFilter("x".into()).is_retryable());
        assert!(!FeedError::ScoringFailure("x".into()).is_retryable());
    }

    #[test]
    fn test_degrade_to_empty_keeps_items_on_ok() {
        let (items, err) = degrade_to_empty("personal", Ok(vec![1, 2, 3]));
        assert_eq!(items, vec![1, 2, 3]);
        assert!(err.is_none());
    }

    #[test]
    fn test_degrade_to_empty_converts_failure() {
        let (items, err) =
            degrade_to_empty::<i32>("groups", Err(anyhow::anyhow!("connection refused")));
        assert!(items.is_empty());
        assert!(matches!(err, Some(FeedError::SourceUnavailable(_))));
    }
}
