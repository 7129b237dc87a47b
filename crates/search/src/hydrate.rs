use crate::error::{Result, SearchError};
use recall_protocol::{ContentKind, NamespacedId, Record, SearchResult};
use recall_store::RecordStore;
use std::collections::HashMap;
use std::sync::Arc;

/// Maps fused top-K ids back to full records.
///
/// One bulk fetch per collection, then reassembly in the exact order
/// fusion produced; hydration never re-sorts. A fused id whose record has
/// vanished between scoring and hydration is dropped silently, so the
/// result may be shorter than requested.
pub struct Hydrator {
    store: Arc<dyn RecordStore>,
    tenant_id: i64,
}

impl Hydrator {
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>, tenant_id: i64) -> Self {
        Self { store, tenant_id }
    }

    pub async fn hydrate(&self, ranked: &[(NamespacedId, f32)]) -> Result<Vec<SearchResult>> {
        let mut ids_by_kind: HashMap<ContentKind, Vec<i64>> = HashMap::new();
        for (nid, _) in ranked {
            ids_by_kind.entry(nid.kind).or_default().push(nid.id);
        }

        let mut records: HashMap<NamespacedId, Record> = HashMap::with_capacity(ranked.len());
        for kind in ContentKind::ALL {
            let Some(ids) = ids_by_kind.get(&kind) else {
                continue;
            };
            let fetched = self
                .store
                .fetch_by_ids(kind, self.tenant_id, ids)
                .await
                .map_err(|error| SearchError::Hydration { kind, error })?;
            for record in fetched {
                records.insert(NamespacedId::new(kind, record.id()), record);
            }
        }

        let mut results = Vec::with_capacity(ranked.len());
        for (nid, score) in ranked {
            match records.remove(nid) {
                Some(record) => results.push(SearchResult::from_record(record, *score)),
                None => log::debug!("Dropping fused id {nid}: no backing record"),
            }
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recall_store::MemoryRecordStore;

    fn store_with_two_docs() -> Arc<MemoryRecordStore> {
        let store = MemoryRecordStore::new();
        store.insert_document(1, 2, "first".into(), "c1".into(), "s1".into());
        store.insert_document(1, 2, "second".into(), "c2".into(), "s2".into());
        store.insert_note(1, 2, "note body".into(), "note".into());
        Arc::new(store)
    }

    #[tokio::test]
    async fn preserves_fused_order_across_kinds() {
        let hydrator = Hydrator::new(store_with_two_docs(), 1);
        let ranked = vec![
            (NamespacedId::new(ContentKind::Note, 1), 0.9),
            (NamespacedId::new(ContentKind::Document, 2), 0.8),
            (NamespacedId::new(ContentKind::Document, 1), 0.7),
        ];

        let results = hydrator.hydrate(&ranked).await.unwrap();
        let kinds: Vec<ContentKind> = results.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![ContentKind::Note, ContentKind::Document, ContentKind::Document]
        );
        assert_eq!(results[1].title.as_deref(), Some("second"));
        assert!((results[0].score - 0.9).abs() < 1e-6);
    }

    #[tokio::test]
    async fn drops_ids_without_backing_records() {
        let hydrator = Hydrator::new(store_with_two_docs(), 1);
        let ranked = vec![
            (NamespacedId::new(ContentKind::Document, 1), 0.9),
            (NamespacedId::new(ContentKind::Document, 404), 0.8),
            (NamespacedId::new(ContentKind::Note, 1), 0.7),
        ];

        let results = hydrator.hydrate(&ranked).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, 1);
        assert_eq!(results[1].kind, ContentKind::Note);
    }

    #[tokio::test]
    async fn empty_ranking_hydrates_to_empty() {
        let hydrator = Hydrator::new(store_with_two_docs(), 1);
        let results = hydrator.hydrate(&[]).await.unwrap();
        assert!(results.is_empty());
    }
}
