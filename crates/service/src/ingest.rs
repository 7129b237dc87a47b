use crate::error::{Result, ServiceError};
use recall_protocol::{ContentKind, Document, Note};
use recall_store::{
    Embedder, MemoryLexicalIndex, MemoryRecordStore, MemoryVectorIndex, Summarizer,
};
use std::sync::Arc;

/// Ingestion pipeline: validate, summarize, embed, persist, index.
///
/// Every stored record gets a generated summary and an embedding at
/// create time; the lexical and vector indexes are updated in the same
/// call so a record is searchable as soon as ingestion returns.
pub struct Ingestor {
    embedder: Arc<dyn Embedder>,
    summarizer: Arc<dyn Summarizer>,
    store: Arc<MemoryRecordStore>,
    lexical: Arc<MemoryLexicalIndex>,
    vector: Arc<MemoryVectorIndex>,
    tenant_id: i64,
    max_content_chars: usize,
}

impl Ingestor {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        summarizer: Arc<dyn Summarizer>,
        store: Arc<MemoryRecordStore>,
        lexical: Arc<MemoryLexicalIndex>,
        vector: Arc<MemoryVectorIndex>,
        tenant_id: i64,
        max_content_chars: usize,
    ) -> Self {
        Self {
            embedder,
            summarizer,
            store,
            lexical,
            vector,
            tenant_id,
            max_content_chars,
        }
    }

    fn validate_content(&self, content: &str) -> Result<()> {
        if content.trim().is_empty() {
            return Err(ServiceError::InvalidContent(
                "content cannot be empty".to_string(),
            ));
        }
        if content.chars().count() > self.max_content_chars {
            return Err(ServiceError::InvalidContent(format!(
                "content exceeds {} characters",
                self.max_content_chars
            )));
        }
        Ok(())
    }

    pub async fn create_document(
        &self,
        client_id: i64,
        title: &str,
        content: &str,
    ) -> Result<Document> {
        if title.trim().is_empty() {
            return Err(ServiceError::InvalidContent(
                "document title cannot be empty".to_string(),
            ));
        }
        self.validate_content(content)?;

        let summary = self.summarizer.summarize(content).await?;
        let embedding = self.embedder.embed(content).await?;

        let document = self.store.insert_document(
            self.tenant_id,
            client_id,
            title.to_string(),
            content.to_string(),
            summary,
        );
        self.lexical
            .index(ContentKind::Document, document.id, self.tenant_id, content);
        self.vector
            .upsert(ContentKind::Document, document.id, self.tenant_id, embedding)?;

        log::info!(
            "Ingested document {} for client {client_id}",
            document.id
        );
        Ok(document)
    }

    pub async fn create_note(&self, client_id: i64, content: &str) -> Result<Note> {
        self.validate_content(content)?;

        let summary = self.summarizer.summarize(content).await?;
        let embedding = self.embedder.embed(content).await?;

        let note =
            self.store
                .insert_note(self.tenant_id, client_id, content.to_string(), summary);
        self.lexical
            .index(ContentKind::Note, note.id, self.tenant_id, content);
        self.vector
            .upsert(ContentKind::Note, note.id, self.tenant_id, embedding)?;

        log::info!("Ingested note {} for client {client_id}", note.id);
        Ok(note)
    }
}
