//! Text embedding backends and vector similarity

use crate::config::{EmbeddingBackend, EmbeddingConfig};
use crate::error::Result;
use anyhow::Context;
use crate::processing::text_processor::tokenize;
use log::info;
use model2vec_rs::model::StaticModel;
use siphasher::sip::SipHasher13;
use std::hash::{Hash, Hasher};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// A sentence embedder shared by the snapshot builder and request scoring
pub trait Embedder: Send + Sync {
    fn name(&self) -> &str;

    fn dimension(&self) -> usize;

    fn embed(&self, texts: &[String]) -> Vec<Vec<f32>>;

    fn embed_one(&self, text: &str) -> Vec<f32> {
        self.embed(&[text.to_string()]).pop().unwrap_or_default()
    }
}

/// Static Model2Vec embeddings loaded from a local folder or the Hugging Face Hub
pub struct Model2VecEmbedder {
    model: StaticModel,
    model_name: String,
    dimension: usize,
}

impl Model2VecEmbedder {
    pub fn load(model: &str) -> Result<Self> {
        let start_time = Instant::now();
        info!("Loading Model2Vec embedding model: {}", model);

        let static_model = StaticModel::from_pretrained(Path::new(model), None, None, None)
            .with_context(|| format!("Failed to load model '{}'", model))?;

        let dimension = static_model.encode_single("dimension probe").len();
        info!("Model loaded in {:.2?} ({} dimensions)", start_time.elapsed(), dimension);

        Ok(Self {
            model: static_model,
            model_name: model.to_string(),
            dimension,
        })
    }
}

impl Embedder for Model2VecEmbedder {
    fn name(&self) -> &str {
        &self.model_name
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, texts: &[String]) -> Vec<Vec<f32>> {
        if texts.is_empty() {
            return Vec::new();
        }
        self.model.encode(texts)
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        self.model.encode_single(text)
    }
}

// Changing either key changes every vector this embedder produces.
const HASH_SEED_K0: u64 = 0x5eed_0f5c_4e3e_0001;
const HASH_SEED_K1: u64 = 0x5eed_0f5c_4e3e_0002;

/// Deterministic feature-hashing embedder: no model files, no network.
///
/// Tokens and token bigrams are hashed into signed buckets and the result is
/// L2-normalized, so texts sharing vocabulary land close together.
pub struct HashingEmbedder {
    dimension: usize,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    fn hash(&self, feature: &str) -> u64 {
        let mut hasher = SipHasher13::new_with_keys(HASH_SEED_K0, HASH_SEED_K1);
        feature.hash(&mut hasher);
        hasher.finish()
    }

    fn add_feature(&self, vector: &mut [f32], feature: &str, weight: f32) {
        let h = self.hash(feature);
        let idx = (h % self.dimension as u64) as usize;
        // high bit decides the sign so it stays independent of the bucket
        let sign = if h >> 63 == 0 { 1.0 } else { -1.0 };
        vector[idx] += sign * weight;
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];
        let tokens = tokenize(text);

        for token in &tokens {
            self.add_feature(&mut vector, token, 1.0);
        }
        for pair in tokens.windows(2) {
            self.add_feature(&mut vector, &format!("{} {}", pair[0], pair[1]), 0.5);
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        vector
    }
}

impl Embedder for HashingEmbedder {
    fn name(&self) -> &str {
        "hashing"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, texts: &[String]) -> Vec<Vec<f32>> {
        texts.iter().map(|t| self.embed_text(t)).collect()
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        self.embed_text(text)
    }
}

/// Build the configured embedding backend
pub fn build_embedder(config: &EmbeddingConfig) -> Result<Arc<dyn Embedder>> {
    match config.backend {
        EmbeddingBackend::Model2vec => Ok(Arc::new(Model2VecEmbedder::load(&config.model)?)),
        EmbeddingBackend::Hashing => Ok(Arc::new(HashingEmbedder::new(config.dimension))),
    }
}

/// Cosine similarity; 0 for empty, zero-norm, or mismatched vectors
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        (dot_product / (norm_a * norm_b)).clamp(-1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hashing_vectors_are_normalized() {
        let embedder = HashingEmbedder::new(64);
        let v = embedder.embed_one("crop insurance for small farmers");

        assert_eq!(v.len(), 64);
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5, "norm was {}", norm);
    }

    #[test]
    fn test_hashing_is_deterministic() {
        let a = HashingEmbedder::new(128).embed_one("post matric scholarship");
        let b = HashingEmbedder::new(128).embed_one("post matric scholarship");
        assert_eq!(a, b);
    }

    #[test]
    fn test_shared_vocabulary_scores_higher() {
        let embedder = HashingEmbedder::new(256);
        let query = embedder.embed_one("farmer needs crop loan");
        let related = embedder.embed_one("crop loan scheme for every farmer");
        let unrelated = embedder.embed_one("scholarship for engineering students");

        assert!(cosine_similarity(&query, &related) > cosine_similarity(&query, &unrelated));
    }

    #[test]
    fn test_empty_text_embeds_to_zero_vector() {
        let embedder = HashingEmbedder::new(16);
        let v = embedder.embed_one("");
        assert!(v.iter().all(|x| *x == 0.0));
        assert_eq!(cosine_similarity(&v, &embedder.embed_one("pension")), 0.0);
    }

    #[test]
    fn test_cosine_edge_cases() {
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0]), 0.0);
        assert!((cosine_similarity(&[1.0, 2.0], &[2.0, 4.0]) - 1.0).abs() < 1e-6);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-6);
    }
}
