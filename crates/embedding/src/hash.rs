//! Offline deterministic embeddings via feature hashing.
//!
//! Each lowercase alphanumeric token is hashed into one of `dimension`
//! buckets with a sign taken from the hash's high bit. Texts sharing tokens
//! end up with correlated vectors, which approximates token-overlap cosine
//! similarity well enough for tests, CI, and air-gapped deployments. The same
//! text and config always produce the same vector.

use crate::config::EmbedConfig;
use crate::normalize::l2_normalize_in_place;
use fxhash::hash64;

pub(crate) fn hash_embedding(text: &str, cfg: &EmbedConfig) -> Vec<f32> {
    let mut vector = vec![0.0_f32; cfg.dimension];
    for token in tokenize(text) {
        let h = hash64(token.as_bytes());
        let bucket = (h % cfg.dimension as u64) as usize;
        let sign = if h & (1 << 63) == 0 { 1.0 } else { -1.0 };
        vector[bucket] += sign;
    }
    if cfg.normalize {
        l2_normalize_in_place(&mut vector);
    }
    vector
}

/// Lowercased alphanumeric runs; punctuation and whitespace split tokens.
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(|token| token.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(dimension: usize, normalize: bool) -> EmbedConfig {
        EmbedConfig {
            provider: "hash".to_string(),
            dimension,
            normalize,
            ..EmbedConfig::default()
        }
    }

    #[test]
    fn same_text_same_vector() {
        let cfg = config(128, true);
        assert_eq!(
            hash_embedding("an identical sentence", &cfg),
            hash_embedding("an identical sentence", &cfg)
        );
    }

    #[test]
    fn token_order_does_not_matter() {
        let cfg = config(128, true);
        assert_eq!(
            hash_embedding("alpha beta gamma", &cfg),
            hash_embedding("gamma alpha beta", &cfg)
        );
    }

    #[test]
    fn case_and_punctuation_are_folded_away() {
        let cfg = config(128, true);
        assert_eq!(
            hash_embedding("FAISS!", &cfg),
            hash_embedding("faiss", &cfg)
        );
    }

    #[test]
    fn different_texts_differ() {
        let cfg = config(256, true);
        assert_ne!(
            hash_embedding("completely unrelated words here", &cfg),
            hash_embedding("another disjoint set of tokens", &cfg)
        );
    }

    #[test]
    fn output_respects_dimension() {
        for dimension in [8, 64, 1536] {
            let cfg = config(dimension, true);
            assert_eq!(hash_embedding("some text", &cfg).len(), dimension);
        }
    }

    #[test]
    fn normalized_vectors_have_unit_length() {
        let cfg = config(64, true);
        let v = hash_embedding("the quick brown fox jumps over the lazy dog", &cfg);
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4);
    }

    #[test]
    fn empty_text_is_a_zero_vector() {
        let cfg = config(32, true);
        let v = hash_embedding("", &cfg);
        assert_eq!(v, vec![0.0; 32]);
    }

    #[test]
    fn unnormalized_counts_accumulate() {
        let cfg = config(16, false);
        let v = hash_embedding("token token token", &cfg);
        let total: f32 = v.iter().map(|x| x.abs()).sum();
        assert!((total - 3.0).abs() < f32::EPSILON);
    }
}
