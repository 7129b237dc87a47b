//! # Recall Store
//!
//! Collaborator capabilities consumed by the retrieval core, plus local
//! in-memory implementations with JSON snapshot persistence:
//!
//! - [`Embedder`] — query/content embedding ([`HashEmbedder`])
//! - [`Summarizer`] — ingest-time summaries ([`ExtractiveSummarizer`],
//!   [`TruncatingSummarizer`], [`SummarizerChain`])
//! - [`LexicalSource`] — full-text relevance ranking ([`MemoryLexicalIndex`])
//! - [`VectorSource`] — nearest-neighbor ranking ([`MemoryVectorIndex`])
//! - [`RecordStore`] — bulk record reads ([`MemoryRecordStore`])
//!
//! The retrieval core only depends on the traits; the memory-backed
//! implementations exist to exercise the seams and back the CLI. A real
//! deployment would bind the same traits to an external FTS + ANN engine.

mod embedder;
mod error;
mod lexical;
mod records;
mod summarizer;
mod text;
mod vector;

pub use embedder::{
    cosine_similarity, shared_embedder, Embedder, EmbedderProvider, HashEmbedder,
    DEFAULT_DIMENSION,
};
pub use error::{Result, StoreError};
pub use lexical::{LexicalSource, MemoryLexicalIndex};
pub use records::{MemoryRecordStore, RecordStore};
pub use summarizer::{
    build_summarizer, ExtractiveSummarizer, Summarizer, SummarizerChain, SummarizerProvider,
    TruncatingSummarizer,
};
pub use vector::{MemoryVectorIndex, VectorSource};

/// Upper bound on candidates returned per collection by either scoring
/// source. Fixed per collection regardless of the search filter.
pub const CANDIDATE_LIMIT: usize = 50;
