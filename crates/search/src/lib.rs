//! # Recall Search
//!
//! The hybrid retrieval core: reciprocal rank fusion over lexical and
//! vector candidate lists, a request-scoped orchestrator, and result
//! hydration.
//!
//! ## Pipeline
//!
//! ```text
//! query text
//!     ├──> lexical source (per collection)  ──┐
//!     └──> embed once ──> vector source ──────┤
//!                                             v
//!                               RRF fusion (one global pass)
//!                                             │
//!                                   top-K namespaced ids
//!                                             v
//!                              hydrator (bulk fetch, fused order)
//! ```
//!
//! Everything here is a pure function of the request plus the two
//! read-only scoring collaborators; no state is shared across requests.

mod error;
mod fusion;
mod hybrid;
mod hydrate;

pub use error::{Result, SearchError};
pub use fusion::{RrfFusion, DEFAULT_RRF_K};
pub use hybrid::{HybridRetriever, MAX_QUERY_CHARS, RESULT_LIMIT};
pub use hydrate::Hydrator;
