use crate::config::Settings;
use crate::error::Result;
use crate::ingest::Ingestor;
use recall_protocol::{ContentKind, Document, Note, Record, SearchResponse};
use recall_search::{HybridRetriever, RrfFusion, SearchError};
use recall_store::{
    build_summarizer, shared_embedder, MemoryLexicalIndex, MemoryRecordStore, MemoryVectorIndex,
};
use std::path::Path;
use std::sync::Arc;

const RECORDS_FILE: &str = "records.json";
const LEXICAL_FILE: &str = "lexical.json";
const VECTORS_FILE: &str = "vectors.json";

/// The capability surface exposed to the request layer: ingestion plus
/// hybrid search over the stored corpus. Providers are selected from
/// [`Settings`] once at construction; nothing here branches on provider
/// names per request.
pub struct RecallService {
    settings: Settings,
    store: Arc<MemoryRecordStore>,
    lexical: Arc<MemoryLexicalIndex>,
    vector: Arc<MemoryVectorIndex>,
    ingestor: Ingestor,
    retriever: HybridRetriever,
}

impl RecallService {
    pub fn new(settings: Settings) -> Result<Self> {
        let store = Arc::new(MemoryRecordStore::new());
        let lexical = Arc::new(MemoryLexicalIndex::new());
        let vector = Arc::new(MemoryVectorIndex::new(settings.embedding.dimension));
        Self::with_components(settings, store, lexical, vector)
    }

    fn with_components(
        settings: Settings,
        store: Arc<MemoryRecordStore>,
        lexical: Arc<MemoryLexicalIndex>,
        vector: Arc<MemoryVectorIndex>,
    ) -> Result<Self> {
        let embedder = shared_embedder(settings.embedding.provider, settings.embedding.dimension);
        let summarizer = build_summarizer(
            settings.summarizer.provider,
            settings.summarizer.sentence_count,
        );
        let fusion = RrfFusion::new(settings.search.rrf_k)?;

        let retriever = HybridRetriever::new(
            embedder.clone(),
            lexical.clone(),
            vector.clone(),
            store.clone(),
            settings.tenant_id,
        )
        .with_fusion(fusion)
        .with_limit(settings.search.result_limit);

        let ingestor = Ingestor::new(
            embedder,
            summarizer,
            store.clone(),
            lexical.clone(),
            vector.clone(),
            settings.tenant_id,
            settings.limits.max_content_chars,
        );

        Ok(Self {
            settings,
            store,
            lexical,
            vector,
            ingestor,
            retriever,
        })
    }

    /// Open a service over a data directory, loading snapshots when they
    /// exist and starting empty otherwise.
    pub async fn open(data_dir: impl AsRef<Path>, settings: Settings) -> Result<Self> {
        let dir = data_dir.as_ref();
        if !dir.join(RECORDS_FILE).exists() {
            log::info!("No snapshots in {dir:?}, starting with an empty corpus");
            return Self::new(settings);
        }

        let store = Arc::new(MemoryRecordStore::load(dir.join(RECORDS_FILE)).await?);
        let lexical = Arc::new(MemoryLexicalIndex::load(dir.join(LEXICAL_FILE)).await?);
        let vector = Arc::new(
            MemoryVectorIndex::load(dir.join(VECTORS_FILE), settings.embedding.dimension).await?,
        );
        Self::with_components(settings, store, lexical, vector)
    }

    /// Snapshot the corpus and both indexes into the data directory.
    pub async fn save(&self, data_dir: impl AsRef<Path>) -> Result<()> {
        let dir = data_dir.as_ref();
        tokio::fs::create_dir_all(dir).await?;
        self.store.save(dir.join(RECORDS_FILE)).await?;
        self.lexical.save(dir.join(LEXICAL_FILE)).await?;
        self.vector.save(dir.join(VECTORS_FILE)).await?;
        Ok(())
    }

    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    pub async fn create_document(
        &self,
        client_id: i64,
        title: &str,
        content: &str,
    ) -> Result<Document> {
        self.ingestor.create_document(client_id, title, content).await
    }

    pub async fn create_note(&self, client_id: i64, content: &str) -> Result<Note> {
        self.ingestor.create_note(client_id, content).await
    }

    #[must_use]
    pub fn get(&self, kind: ContentKind, id: i64) -> Option<Record> {
        self.store.get(kind, self.settings.tenant_id, id)
    }

    /// Hybrid search over the stored corpus. `type_filter` accepts the
    /// wire tags `document` / `note`; anything else is an invalid filter.
    pub async fn search(
        &self,
        query: &str,
        type_filter: Option<&str>,
    ) -> Result<SearchResponse> {
        let kind = type_filter
            .map(str::parse::<ContentKind>)
            .transpose()
            .map_err(SearchError::from)?;

        let results = self.retriever.search(query, kind).await?;
        Ok(SearchResponse {
            query: query.to_string(),
            kind,
            results,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;

    async fn seeded_service() -> RecallService {
        let service = RecallService::new(Settings::default()).unwrap();
        service
            .create_document(
                2,
                "Retirement plan",
                "Retirement portfolio allocation. Shift toward bonds over five years.",
            )
            .await
            .unwrap();
        service
            .create_document(2, "Groceries policy", "Corporate card rules for meals and travel.")
            .await
            .unwrap();
        service
            .create_note(2, "Client asked about retirement timelines during the call.")
            .await
            .unwrap();
        service
    }

    #[tokio::test]
    async fn search_finds_matching_records_across_kinds() {
        let service = seeded_service().await;

        let response = service.search("retirement", None).await.unwrap();
        assert_eq!(response.query, "retirement");
        assert!(response.results.len() >= 2);

        let kinds: Vec<ContentKind> = response.results.iter().map(|r| r.kind).collect();
        assert!(kinds.contains(&ContentKind::Document));
        assert!(kinds.contains(&ContentKind::Note));

        // Lexically matching records outrank the vector-only grocery doc.
        assert_ne!(response.results[0].title.as_deref(), Some("Groceries policy"));

        for window in response.results.windows(2) {
            assert!(window[0].score >= window[1].score);
        }
    }

    #[tokio::test]
    async fn type_filter_limits_results() {
        let service = seeded_service().await;

        let response = service.search("retirement", Some("note")).await.unwrap();
        assert_eq!(response.kind, Some(ContentKind::Note));
        assert!(response
            .results
            .iter()
            .all(|r| r.kind == ContentKind::Note));
        assert!(!response.results.is_empty());
    }

    #[tokio::test]
    async fn unknown_filter_is_rejected_before_searching() {
        let service = seeded_service().await;
        let err = service.search("retirement", Some("folder")).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Search(SearchError::InvalidFilter(_))
        ));
    }

    #[tokio::test]
    async fn blank_query_is_rejected() {
        let service = seeded_service().await;
        let err = service.search("  ", None).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Search(SearchError::InvalidQuery(_))
        ));
    }

    #[tokio::test]
    async fn snapshots_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();

        let service = seeded_service().await;
        service.save(dir.path()).await.unwrap();

        let reopened = RecallService::open(dir.path(), Settings::default())
            .await
            .unwrap();
        let response = reopened.search("retirement", None).await.unwrap();
        assert!(!response.results.is_empty());

        let doc = reopened.get(ContentKind::Document, 1).unwrap();
        assert_eq!(doc.title(), Some("Retirement plan"));
    }

    #[tokio::test]
    async fn open_without_snapshots_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let service = RecallService::open(dir.path(), Settings::default())
            .await
            .unwrap();
        let response = service.search("anything", None).await.unwrap();
        assert!(response.results.is_empty());
    }
}
