use crate::{FlatIndex, IndexError};
use std::cmp::Ordering;

/// Offset used to pad search results when the index holds fewer than `k`
/// vectors. Callers filter these entries out before resolving documents.
pub const SENTINEL_OFFSET: i64 = -1;

/// Chunk size for SIMD-optimized operations
const SIMD_CHUNK_SIZE: usize = 32;

/// Result entry for a similarity query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchHit {
    /// Insertion offset of the matched vector, or [`SENTINEL_OFFSET`] for padding.
    pub offset: i64,
    /// Squared L2 distance to the query (lower is closer). `f32::INFINITY` for padding.
    pub distance: f32,
}

impl SearchHit {
    /// Whether this entry is padding rather than a real match.
    pub fn is_sentinel(&self) -> bool {
        self.offset == SENTINEL_OFFSET
    }
}

/// Provides exhaustive nearest-neighbor retrieval.
impl FlatIndex {
    /// Compute squared Euclidean distance between two equal-length vectors.
    /// Uses chunked processing for better auto-vectorization.
    #[inline]
    fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
        let len = a.len();
        let chunks = len / SIMD_CHUNK_SIZE;
        let remainder = len % SIMD_CHUNK_SIZE;

        let mut acc = 0.0_f32;

        // Process full chunks
        for chunk_idx in 0..chunks {
            let offset = chunk_idx * SIMD_CHUNK_SIZE;
            acc += Self::squared_l2_chunk(
                &a[offset..offset + SIMD_CHUNK_SIZE],
                &b[offset..offset + SIMD_CHUNK_SIZE],
            );
        }

        // Process remainder
        if remainder > 0 {
            let offset = chunks * SIMD_CHUNK_SIZE;
            acc += Self::squared_l2_chunk(&a[offset..], &b[offset..]);
        }

        acc
    }

    /// Accumulate squared differences for a chunk with auto-vectorization hints
    #[inline(always)]
    fn squared_l2_chunk(a: &[f32], b: &[f32]) -> f32 {
        a.iter()
            .zip(b.iter())
            .map(|(&x, &y)| {
                let d = x - y;
                d * d
            })
            .sum()
    }

    /// Exhaustive top-k search by squared L2 distance.
    ///
    /// Always returns exactly `k` entries: real matches first, ordered by
    /// ascending distance with ties broken toward the lower offset, then
    /// sentinel padding when the index holds fewer than `k` vectors.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>, IndexError> {
        if k == 0 {
            return Err(IndexError::InvalidQuery(
                "k must be greater than zero".into(),
            ));
        }
        if query.len() != self.dimension {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let count = self.size();
        let mut hits = Vec::with_capacity(count.max(k));
        for offset in 0..count {
            let start = offset * self.dimension;
            let row = &self.vectors[start..start + self.dimension];
            hits.push(SearchHit {
                offset: offset as i64,
                distance: Self::squared_l2(query, row),
            });
        }

        // Sort by ascending distance; ties are broken by the lower offset so
        // repeated runs over the same artifact rank identically.
        hits.sort_unstable_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.offset.cmp(&b.offset))
        });
        hits.truncate(k);
        while hits.len() < k {
            hits.push(SearchHit {
                offset: SENTINEL_OFFSET,
                distance: f32::INFINITY,
            });
        }
        Ok(hits)
    }
}
