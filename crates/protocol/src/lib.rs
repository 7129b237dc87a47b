//! # Recall Protocol
//!
//! Shared data types for the recall hybrid-retrieval workspace: content
//! kinds, namespaced identifiers, stored records, and search results.
//!
//! This crate is intentionally logic-free beyond parsing/formatting so the
//! store, search, and service crates agree on one vocabulary.

mod records;

pub use records::{Document, Note, Record, SearchResponse, SearchResult};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The content collections recall indexes and searches.
///
/// Documents and meeting notes share a numeric id space per collection, so
/// every cross-collection operation goes through [`NamespacedId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Document,
    Note,
}

impl ContentKind {
    /// Every known collection, in stable order.
    pub const ALL: [ContentKind; 2] = [ContentKind::Document, ContentKind::Note];

    /// Stable tag used as the namespace prefix and the wire `type` value.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Note => "note",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown content type '{0}' (expected 'document' or 'note')")]
pub struct UnknownKind(pub String);

impl FromStr for ContentKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "document" => Ok(Self::Document),
            "note" => Ok(Self::Note),
            other => Err(UnknownKind(other.to_string())),
        }
    }
}

/// A record id tagged with its collection, e.g. `document:5`.
///
/// Documents and notes may reuse the same numeric id, so fusion and
/// hydration operate on namespaced ids to keep the id spaces disjoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NamespacedId {
    pub kind: ContentKind,
    pub id: i64,
}

impl NamespacedId {
    #[must_use]
    pub const fn new(kind: ContentKind, id: i64) -> Self {
        Self { kind, id }
    }
}

impl fmt::Display for NamespacedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.tag(), self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid namespaced id '{0}' (expected '<type>:<id>')")]
pub struct ParseNamespacedIdError(pub String);

impl FromStr for NamespacedId {
    type Err = ParseNamespacedIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, id) = s
            .split_once(':')
            .ok_or_else(|| ParseNamespacedIdError(s.to_string()))?;
        let kind = kind
            .parse::<ContentKind>()
            .map_err(|_| ParseNamespacedIdError(s.to_string()))?;
        let id = id
            .parse::<i64>()
            .map_err(|_| ParseNamespacedIdError(s.to_string()))?;
        Ok(Self { kind, id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn kind_parses_known_tags() {
        assert_eq!("document".parse::<ContentKind>(), Ok(ContentKind::Document));
        assert_eq!("note".parse::<ContentKind>(), Ok(ContentKind::Note));
    }

    #[test]
    fn kind_rejects_unknown_tags() {
        let err = "folder".parse::<ContentKind>().unwrap_err();
        assert_eq!(err, UnknownKind("folder".to_string()));
    }

    #[test]
    fn namespaced_id_round_trips() {
        let id = NamespacedId::new(ContentKind::Note, 42);
        assert_eq!(id.to_string(), "note:42");
        assert_eq!("note:42".parse::<NamespacedId>(), Ok(id));
    }

    #[test]
    fn namespaced_id_rejects_malformed_input() {
        assert!("42".parse::<NamespacedId>().is_err());
        assert!("folder:42".parse::<NamespacedId>().is_err());
        assert!("note:abc".parse::<NamespacedId>().is_err());
    }

    #[test]
    fn colliding_raw_ids_stay_distinct() {
        let doc = NamespacedId::new(ContentKind::Document, 5);
        let note = NamespacedId::new(ContentKind::Note, 5);
        assert_ne!(doc, note);
        assert_ne!(doc.to_string(), note.to_string());
    }
}
