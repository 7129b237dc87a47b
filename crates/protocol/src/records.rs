use crate::ContentKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored client document. Owned by the record store; the retrieval core
/// only ever reads these fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: i64,
    pub tenant_id: i64,
    pub client_id: i64,
    pub title: String,
    pub content: String,
    pub summary: String,
    pub created_at: DateTime<Utc>,
}

/// A stored meeting note. Notes have no title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: i64,
    pub tenant_id: i64,
    pub client_id: i64,
    pub content: String,
    pub summary: String,
    pub created_at: DateTime<Utc>,
}

/// Either stored record shape, for collection-generic reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Record {
    Document(Document),
    Note(Note),
}

impl Record {
    #[must_use]
    pub const fn kind(&self) -> ContentKind {
        match self {
            Self::Document(_) => ContentKind::Document,
            Self::Note(_) => ContentKind::Note,
        }
    }

    #[must_use]
    pub const fn id(&self) -> i64 {
        match self {
            Self::Document(doc) => doc.id,
            Self::Note(note) => note.id,
        }
    }

    #[must_use]
    pub const fn client_id(&self) -> i64 {
        match self {
            Self::Document(doc) => doc.client_id,
            Self::Note(note) => note.client_id,
        }
    }

    #[must_use]
    pub fn title(&self) -> Option<&str> {
        match self {
            Self::Document(doc) => Some(doc.title.as_str()),
            Self::Note(_) => None,
        }
    }

    #[must_use]
    pub fn content(&self) -> &str {
        match self {
            Self::Document(doc) => &doc.content,
            Self::Note(note) => &note.content,
        }
    }

    #[must_use]
    pub fn summary(&self) -> &str {
        match self {
            Self::Document(doc) => &doc.summary,
            Self::Note(note) => &note.summary,
        }
    }

    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        match self {
            Self::Document(doc) => doc.created_at,
            Self::Note(note) => note.created_at,
        }
    }
}

impl From<Document> for Record {
    fn from(doc: Document) -> Self {
        Self::Document(doc)
    }
}

impl From<Note> for Record {
    fn from(note: Note) -> Self {
        Self::Note(note)
    }
}

/// One hydrated search hit, immutable for the lifetime of a response.
///
/// `score` is the fused RRF score, commensurable across collections and
/// across lexical-only / vector-only / both-source hits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: ContentKind,
    pub client_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub content: String,
    pub summary: String,
    pub created_at: DateTime<Utc>,
    pub score: f32,
}

impl SearchResult {
    /// Attach a fused score to a hydrated record.
    #[must_use]
    pub fn from_record(record: Record, score: f32) -> Self {
        Self {
            id: record.id(),
            kind: record.kind(),
            client_id: record.client_id(),
            title: record.title().map(ToString::to_string),
            content: record.content().to_string(),
            summary: record.summary().to_string(),
            created_at: record.created_at(),
            score,
        }
    }
}

/// The full response for one search request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    #[serde(rename = "type")]
    pub kind: Option<ContentKind>,
    pub results: Vec<SearchResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_doc() -> Document {
        Document {
            id: 7,
            tenant_id: 1,
            client_id: 3,
            title: "Q3 review".to_string(),
            content: "Portfolio rebalancing discussion".to_string(),
            summary: "Rebalancing".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn record_accessors_cover_both_shapes() {
        let record = Record::from(sample_doc());
        assert_eq!(record.kind(), ContentKind::Document);
        assert_eq!(record.id(), 7);
        assert_eq!(record.title(), Some("Q3 review"));

        let note = Record::Note(Note {
            id: 7,
            tenant_id: 1,
            client_id: 3,
            content: "Follow up next week".to_string(),
            summary: "Follow up".to_string(),
            created_at: Utc::now(),
        });
        assert_eq!(note.kind(), ContentKind::Note);
        assert_eq!(note.title(), None);
    }

    #[test]
    fn record_json_is_tagged_by_type() {
        let json = serde_json::to_value(Record::from(sample_doc())).unwrap();
        assert_eq!(json["type"], "document");
    }

    #[test]
    fn search_result_omits_missing_title() {
        let record = Record::Note(Note {
            id: 1,
            tenant_id: 1,
            client_id: 2,
            content: "x".to_string(),
            summary: "x".to_string(),
            created_at: Utc::now(),
        });
        let json = serde_json::to_value(SearchResult::from_record(record, 0.5)).unwrap();
        assert!(json.get("title").is_none());
        assert_eq!(json["type"], "note");
    }
}
