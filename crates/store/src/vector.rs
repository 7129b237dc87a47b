use crate::embedder::cosine_similarity;
use crate::error::{Result, StoreError};
use crate::CANDIDATE_LIMIT;
use async_trait::async_trait;
use recall_protocol::ContentKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{PoisonError, RwLock};

/// Nearest-neighbor scoring source: `(id, distance)` pairs for one
/// collection, closest first, at most [`CANDIDATE_LIMIT`] of them.
#[async_trait]
pub trait VectorSource: Send + Sync {
    async fn search_vector(
        &self,
        kind: ContentKind,
        query: &[f32],
        tenant_id: i64,
    ) -> Result<Vec<(i64, f32)>>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct VectorEntry {
    id: i64,
    tenant_id: i64,
    vector: Vec<f32>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct VectorInner {
    kinds: HashMap<ContentKind, Vec<VectorEntry>>,
}

/// Brute-force cosine-distance index.
///
/// Stands in for an external ANN engine behind [`VectorSource`]. Distance
/// is `1 - cosine_similarity`, so lower is closer; equal distances resolve
/// by ascending record id.
pub struct MemoryVectorIndex {
    inner: RwLock<VectorInner>,
    dimension: usize,
    limit: usize,
}

impl MemoryVectorIndex {
    #[must_use]
    pub fn new(dimension: usize) -> Self {
        Self::with_limit(dimension, CANDIDATE_LIMIT)
    }

    #[must_use]
    pub fn with_limit(dimension: usize, limit: usize) -> Self {
        Self {
            inner: RwLock::new(VectorInner::default()),
            dimension,
            limit,
        }
    }

    #[must_use]
    pub const fn dimension(&self) -> usize {
        self.dimension
    }

    fn check_dimension(&self, vector: &[f32]) -> Result<()> {
        if vector.len() != self.dimension {
            return Err(StoreError::InvalidDimension {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        Ok(())
    }

    /// Insert or replace one record's embedding.
    pub fn upsert(
        &self,
        kind: ContentKind,
        id: i64,
        tenant_id: i64,
        vector: Vec<f32>,
    ) -> Result<()> {
        self.check_dimension(&vector)?;
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let entries = inner.kinds.entry(kind).or_default();
        entries.retain(|entry| entry.id != id);
        entries.push(VectorEntry {
            id,
            tenant_id,
            vector,
        });
        Ok(())
    }

    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let data = {
            let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
            serde_json::to_string_pretty(&*inner)?
        };
        tokio::fs::write(path.as_ref(), data).await?;
        log::info!("Vector index saved to {:?}", path.as_ref());
        Ok(())
    }

    pub async fn load(path: impl AsRef<Path>, dimension: usize) -> Result<Self> {
        let data = tokio::fs::read_to_string(path.as_ref()).await?;
        let inner: VectorInner = serde_json::from_str(&data)?;
        for entries in inner.kinds.values() {
            if let Some(bad) = entries.iter().find(|e| e.vector.len() != dimension) {
                return Err(StoreError::InvalidDimension {
                    expected: dimension,
                    actual: bad.vector.len(),
                });
            }
        }
        log::info!("Vector index loaded from {:?}", path.as_ref());
        Ok(Self {
            inner: RwLock::new(inner),
            dimension,
            limit: CANDIDATE_LIMIT,
        })
    }
}

#[async_trait]
impl VectorSource for MemoryVectorIndex {
    async fn search_vector(
        &self,
        kind: ContentKind,
        query: &[f32],
        tenant_id: i64,
    ) -> Result<Vec<(i64, f32)>> {
        self.check_dimension(query)?;

        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let Some(entries) = inner.kinds.get(&kind) else {
            return Ok(Vec::new());
        };

        let mut ranked: Vec<(i64, f32)> = entries
            .iter()
            .filter(|entry| entry.tenant_id == tenant_id)
            .map(|entry| (entry.id, 1.0 - cosine_similarity(query, &entry.vector)))
            .collect();
        ranked.sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        ranked.truncate(self.limit);

        log::debug!("Vector search ({kind}): {} candidates", ranked.len());
        Ok(ranked)
    }
}
