//! # Recall Service
//!
//! Process-level wiring for the recall engine: explicit [`Settings`]
//! built once at startup, the ingestion pipeline (summarize + embed +
//! index on create), and the [`RecallService`] facade the request layer
//! talks to. HTTP framing and status mapping live outside this workspace.

mod config;
mod error;
mod ingest;
mod service;

pub use config::{
    EmbeddingSettings, LimitSettings, SearchSettings, Settings, SummarizerSettings,
};
pub use error::{Result, ServiceError};
pub use ingest::Ingestor;
pub use service::RecallService;
