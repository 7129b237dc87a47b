use crate::error::Result;
use async_trait::async_trait;
use chrono::Utc;
use recall_protocol::{ContentKind, Document, Note, Record};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{PoisonError, RwLock};

/// Bulk record reads for hydration. Result order is unspecified; the
/// hydrator reorders by fused rank. Ids without a stored record are
/// simply absent from the result.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn fetch_by_ids(
        &self,
        kind: ContentKind,
        tenant_id: i64,
        ids: &[i64],
    ) -> Result<Vec<Record>>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct RecordsInner {
    documents: HashMap<i64, Document>,
    notes: HashMap<i64, Note>,
    next_document_id: i64,
    next_note_id: i64,
}

/// In-memory record store with JSON snapshot persistence. Records are
/// immutable once inserted; ids are assigned monotonically per collection.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    inner: RwLock<RecordsInner>,
}

impl MemoryRecordStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_document(
        &self,
        tenant_id: i64,
        client_id: i64,
        title: String,
        content: String,
        summary: String,
    ) -> Document {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.next_document_id += 1;
        let document = Document {
            id: inner.next_document_id,
            tenant_id,
            client_id,
            title,
            content,
            summary,
            created_at: Utc::now(),
        };
        inner.documents.insert(document.id, document.clone());
        document
    }

    pub fn insert_note(
        &self,
        tenant_id: i64,
        client_id: i64,
        content: String,
        summary: String,
    ) -> Note {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.next_note_id += 1;
        let note = Note {
            id: inner.next_note_id,
            tenant_id,
            client_id,
            content,
            summary,
            created_at: Utc::now(),
        };
        inner.notes.insert(note.id, note.clone());
        note
    }

    #[must_use]
    pub fn get(&self, kind: ContentKind, tenant_id: i64, id: i64) -> Option<Record> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        match kind {
            ContentKind::Document => inner
                .documents
                .get(&id)
                .filter(|doc| doc.tenant_id == tenant_id)
                .cloned()
                .map(Record::Document),
            ContentKind::Note => inner
                .notes
                .get(&id)
                .filter(|note| note.tenant_id == tenant_id)
                .cloned()
                .map(Record::Note),
        }
    }

    pub fn len(&self, kind: ContentKind) -> usize {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        match kind {
            ContentKind::Document => inner.documents.len(),
            ContentKind::Note => inner.notes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.documents.is_empty() && inner.notes.is_empty()
    }

    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let data = {
            let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
            serde_json::to_string_pretty(&*inner)?
        };
        tokio::fs::write(path.as_ref(), data).await?;
        log::info!("Record store saved to {:?}", path.as_ref());
        Ok(())
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = tokio::fs::read_to_string(path.as_ref()).await?;
        let inner: RecordsInner = serde_json::from_str(&data)?;
        log::info!(
            "Record store loaded from {:?} ({} documents, {} notes)",
            path.as_ref(),
            inner.documents.len(),
            inner.notes.len()
        );
        Ok(Self {
            inner: RwLock::new(inner),
        })
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn fetch_by_ids(
        &self,
        kind: ContentKind,
        tenant_id: i64,
        ids: &[i64],
    ) -> Result<Vec<Record>> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let records = ids
            .iter()
            .filter_map(|id| match kind {
                ContentKind::Document => inner
                    .documents
                    .get(id)
                    .filter(|doc| doc.tenant_id == tenant_id)
                    .cloned()
                    .map(Record::Document),
                ContentKind::Note => inner
                    .notes
                    .get(id)
                    .filter(|note| note.tenant_id == tenant_id)
                    .cloned()
                    .map(Record::Note),
            })
            .collect();
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ids_are_assigned_per_collection() {
        let store = MemoryRecordStore::new();
        let doc = store.insert_document(1, 2, "t".into(), "c".into(), "s".into());
        let note = store.insert_note(1, 2, "c".into(), "s".into());
        assert_eq!(doc.id, 1);
        assert_eq!(note.id, 1);

        let second = store.insert_document(1, 2, "t2".into(), "c".into(), "s".into());
        assert_eq!(second.id, 2);
    }

    #[tokio::test]
    async fn fetch_skips_missing_and_foreign_tenant_ids() {
        let store = MemoryRecordStore::new();
        let mine = store.insert_document(1, 2, "mine".into(), "c".into(), "s".into());
        let theirs = store.insert_document(9, 2, "theirs".into(), "c".into(), "s".into());

        let records = store
            .fetch_by_ids(ContentKind::Document, 1, &[mine.id, theirs.id, 999])
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id(), mine.id);
    }

    #[tokio::test]
    async fn get_respects_kind_and_tenant() {
        let store = MemoryRecordStore::new();
        let doc = store.insert_document(1, 2, "t".into(), "c".into(), "s".into());

        assert!(store.get(ContentKind::Document, 1, doc.id).is_some());
        assert!(store.get(ContentKind::Note, 1, doc.id).is_none());
        assert!(store.get(ContentKind::Document, 9, doc.id).is_none());
    }

    #[tokio::test]
    async fn snapshot_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.json");

        let store = MemoryRecordStore::new();
        store.insert_document(1, 2, "title".into(), "content".into(), "summary".into());
        store.insert_note(1, 2, "note body".into(), "note".into());
        store.save(&path).await.unwrap();

        let restored = MemoryRecordStore::load(&path).await.unwrap();
        assert_eq!(restored.len(ContentKind::Document), 1);
        assert_eq!(restored.len(ContentKind::Note), 1);

        // Id allocation continues after the snapshot.
        let doc = restored.insert_document(1, 2, "next".into(), "c".into(), "s".into());
        assert_eq!(doc.id, 2);
    }
}
