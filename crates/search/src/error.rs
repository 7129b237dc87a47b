use recall_protocol::{ContentKind, UnknownKind};
use recall_store::StoreError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

/// Failures a search request can surface. Validation variants are raised
/// before any collaborator call; collaborator variants are fatal to the
/// whole request so callers are never handed a partially searched corpus.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Invalid type filter: {0}")]
    InvalidFilter(#[from] UnknownKind),

    #[error("Invalid RRF constant k={0} (must be positive)")]
    InvalidFusionConstant(f32),

    #[error("Embedding failed: {0}")]
    Embedding(StoreError),

    #[error("Scoring source failed for {kind}: {error}")]
    ScoringSource {
        kind: ContentKind,
        error: StoreError,
    },

    #[error("Hydration failed for {kind}: {error}")]
    Hydration {
        kind: ContentKind,
        error: StoreError,
    },
}
