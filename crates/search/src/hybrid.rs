use crate::error::{Result, SearchError};
use crate::fusion::RrfFusion;
use crate::hydrate::Hydrator;
use recall_protocol::{ContentKind, NamespacedId, SearchResult};
use recall_store::{Embedder, LexicalSource, RecordStore, VectorSource};
use std::sync::Arc;

/// Fused results returned per request.
pub const RESULT_LIMIT: usize = 20;

/// Longest accepted query, in characters.
pub const MAX_QUERY_CHARS: usize = 1000;

/// Request-scoped orchestrator for one hybrid search.
///
/// Per enabled collection it collects up to the source cap of lexical and
/// vector candidates, tags them with the collection namespace, fuses all
/// candidate lists in ONE global pass, and hydrates the top-K. Fusing per
/// collection and concatenating would bias the ranking toward whichever
/// collection came first, so each (collection, source) list enters the
/// single fusion call as its own ranked list.
///
/// The query embedding is computed exactly once per request. Lexical
/// scoring has no dependency on it, so lexical runs concurrently with
/// embedding + vector scoring; fusion starts only once both candidate
/// sets are complete.
pub struct HybridRetriever {
    embedder: Arc<dyn Embedder>,
    lexical: Arc<dyn LexicalSource>,
    vector: Arc<dyn VectorSource>,
    hydrator: Hydrator,
    fusion: RrfFusion,
    tenant_id: i64,
    limit: usize,
}

impl HybridRetriever {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        lexical: Arc<dyn LexicalSource>,
        vector: Arc<dyn VectorSource>,
        store: Arc<dyn RecordStore>,
        tenant_id: i64,
    ) -> Self {
        Self {
            embedder,
            lexical,
            vector,
            hydrator: Hydrator::new(store, tenant_id),
            fusion: RrfFusion::default(),
            tenant_id,
            limit: RESULT_LIMIT,
        }
    }

    #[must_use]
    pub fn with_fusion(mut self, fusion: RrfFusion) -> Self {
        self.fusion = fusion;
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Run one search. Validation happens before any collaborator call;
    /// a failing collaborator fails the whole request.
    pub async fn search(
        &self,
        query: &str,
        filter: Option<ContentKind>,
    ) -> Result<Vec<SearchResult>> {
        if query.trim().is_empty() {
            return Err(SearchError::InvalidQuery("query cannot be empty".to_string()));
        }
        if query.chars().count() > MAX_QUERY_CHARS {
            return Err(SearchError::InvalidQuery(format!(
                "query exceeds {MAX_QUERY_CHARS} characters"
            )));
        }

        let kinds: Vec<ContentKind> = match filter {
            Some(kind) => vec![kind],
            None => ContentKind::ALL.to_vec(),
        };
        log::debug!("Hybrid search: query='{query}', collections={kinds:?}");

        let lexical_task = async {
            let mut lists = Vec::with_capacity(kinds.len());
            for &kind in &kinds {
                let hits = self
                    .lexical
                    .search_lexical(kind, query, self.tenant_id)
                    .await
                    .map_err(|error| SearchError::ScoringSource { kind, error })?;
                lists.push(namespaced(kind, hits));
            }
            Ok::<_, SearchError>(lists)
        };

        let vector_task = async {
            let embedding = self
                .embedder
                .embed(query)
                .await
                .map_err(SearchError::Embedding)?;
            let mut lists = Vec::with_capacity(kinds.len());
            for &kind in &kinds {
                // Distances ascend, so closest-first already is best-first;
                // fusion only consumes the rank order.
                let hits = self
                    .vector
                    .search_vector(kind, &embedding, self.tenant_id)
                    .await
                    .map_err(|error| SearchError::ScoringSource { kind, error })?;
                lists.push(namespaced(kind, hits));
            }
            Ok::<_, SearchError>(lists)
        };

        let (lexical_lists, vector_lists) = tokio::try_join!(lexical_task, vector_task)?;

        let mut lists = lexical_lists;
        lists.extend(vector_lists);
        let mut fused = self.fusion.fuse(&lists);
        fused.truncate(self.limit);
        log::debug!("Fused {} candidates into top {}", lists.iter().map(Vec::len).sum::<usize>(), fused.len());

        let results = self.hydrator.hydrate(&fused).await?;
        log::info!("Hybrid search completed: {} results", results.len());
        Ok(results)
    }
}

fn namespaced(kind: ContentKind, hits: Vec<(i64, f32)>) -> Vec<(NamespacedId, f32)> {
    hits.into_iter()
        .map(|(id, score)| (NamespacedId::new(kind, id), score))
        .collect()
}
