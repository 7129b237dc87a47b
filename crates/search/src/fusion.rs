use crate::error::{Result, SearchError};
use std::collections::HashMap;
use std::hash::Hash;

/// Default smoothing constant. Dampens the advantage of rank 1 in a short
/// list over rank 1 in a long one.
pub const DEFAULT_RRF_K: f32 = 60.0;

/// Reciprocal Rank Fusion over any number of ranked candidate lists.
///
/// Each input list is ordered best-first; raw scores are ignored, only
/// rank position matters. An item at 1-based rank `r` contributes
/// `1 / (k + r)` per list it appears in, and contributions accumulate
/// across lists. Output is every distinct id sorted by cumulative score
/// descending.
///
/// Rank-based fusion sidesteps score normalization entirely: lexical
/// relevance and vector distance live on incomparable scales, and either
/// source may return degenerate scores (all zero, all equal) without
/// affecting the fused ranking.
///
/// Tie-break: equal cumulative scores order by ascending id, so output is
/// deterministic regardless of map iteration order.
#[derive(Debug, Clone, Copy)]
pub struct RrfFusion {
    k: f32,
}

impl RrfFusion {
    /// `k` must be positive.
    pub fn new(k: f32) -> Result<Self> {
        if k.is_nan() || k <= 0.0 {
            return Err(SearchError::InvalidFusionConstant(k));
        }
        Ok(Self { k })
    }

    #[must_use]
    pub const fn k(&self) -> f32 {
        self.k
    }

    /// Fuse ranked lists into one globally ranked list.
    ///
    /// O(M log M) in the total candidate count M, dominated by the final
    /// sort. Empty input lists contribute nothing; fusing only empty lists
    /// yields an empty result.
    #[must_use]
    pub fn fuse<I>(&self, lists: &[Vec<(I, f32)>]) -> Vec<(I, f32)>
    where
        I: Clone + Eq + Hash + Ord,
    {
        let mut scores: HashMap<I, f32> = HashMap::new();
        for list in lists {
            for (rank, (id, _raw)) in list.iter().enumerate() {
                *scores.entry(id.clone()).or_insert(0.0) += 1.0 / (self.k + rank as f32 + 1.0);
            }
        }

        let mut fused: Vec<(I, f32)> = scores.into_iter().collect();
        fused.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        fused
    }
}

impl Default for RrfFusion {
    fn default() -> Self {
        Self { k: DEFAULT_RRF_K }
    }
}
