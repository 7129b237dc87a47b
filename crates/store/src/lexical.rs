use crate::error::Result;
use crate::text::tokenize;
use crate::CANDIDATE_LIMIT;
use async_trait::async_trait;
use recall_protocol::ContentKind;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{PoisonError, RwLock};

/// Full-text scoring source: relevance-ranked `(id, score)` pairs for one
/// collection, best first, at most [`CANDIDATE_LIMIT`] of them.
#[async_trait]
pub trait LexicalSource: Send + Sync {
    async fn search_lexical(
        &self,
        kind: ContentKind,
        query: &str,
        tenant_id: i64,
    ) -> Result<Vec<(i64, f32)>>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct KindPostings {
    /// term -> record id -> term frequency
    postings: HashMap<String, HashMap<i64, u32>>,
    /// record id -> tenant id
    docs: HashMap<i64, i64>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct LexicalInner {
    kinds: HashMap<ContentKind, KindPostings>,
}

/// In-memory inverted index with tf-idf relevance scoring.
///
/// Stands in for an external FTS engine behind [`LexicalSource`]. Ties in
/// relevance resolve by ascending record id so rankings are reproducible.
pub struct MemoryLexicalIndex {
    inner: RwLock<LexicalInner>,
    limit: usize,
}

impl Default for MemoryLexicalIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryLexicalIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::with_limit(CANDIDATE_LIMIT)
    }

    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        Self {
            inner: RwLock::new(LexicalInner::default()),
            limit,
        }
    }

    /// Index (or re-index) one record's text.
    pub fn index(&self, kind: ContentKind, id: i64, tenant_id: i64, text: &str) {
        let mut inner = self
            .inner
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let entry = inner.kinds.entry(kind).or_default();

        // Drop stale postings when a record is re-indexed.
        if entry.docs.contains_key(&id) {
            for docs in entry.postings.values_mut() {
                docs.remove(&id);
            }
            entry.postings.retain(|_, docs| !docs.is_empty());
        }

        for term in tokenize(text) {
            *entry
                .postings
                .entry(term)
                .or_default()
                .entry(id)
                .or_insert(0) += 1;
        }
        entry.docs.insert(id, tenant_id);
    }

    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let data = {
            let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
            serde_json::to_string_pretty(&*inner)?
        };
        tokio::fs::write(path.as_ref(), data).await?;
        log::info!("Lexical index saved to {:?}", path.as_ref());
        Ok(())
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = tokio::fs::read_to_string(path.as_ref()).await?;
        let inner: LexicalInner = serde_json::from_str(&data)?;
        log::info!("Lexical index loaded from {:?}", path.as_ref());
        Ok(Self {
            inner: RwLock::new(inner),
            limit: CANDIDATE_LIMIT,
        })
    }
}

#[async_trait]
impl LexicalSource for MemoryLexicalIndex {
    async fn search_lexical(
        &self,
        kind: ContentKind,
        query: &str,
        tenant_id: i64,
    ) -> Result<Vec<(i64, f32)>> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let Some(entry) = inner.kinds.get(&kind) else {
            return Ok(Vec::new());
        };

        let total_docs = entry.docs.len() as f32;
        let terms: HashSet<String> = tokenize(query).into_iter().collect();

        let mut scores: HashMap<i64, f32> = HashMap::new();
        for term in &terms {
            let Some(docs) = entry.postings.get(term) else {
                continue;
            };
            let idf = (1.0 + total_docs / docs.len() as f32).ln();
            for (&id, &tf) in docs {
                if entry.docs.get(&id) != Some(&tenant_id) {
                    continue;
                }
                *scores.entry(id).or_insert(0.0) += tf as f32 * idf;
            }
        }

        let mut ranked: Vec<(i64, f32)> = scores.into_iter().collect();
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        ranked.truncate(self.limit);

        log::debug!(
            "Lexical search '{query}' ({kind}): {} candidates",
            ranked.len()
        );
        Ok(ranked)
    }
}
