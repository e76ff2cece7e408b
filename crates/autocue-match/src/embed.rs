//! The embedding capability injected into the matcher.
//!
//! Production builds load a sentence-embedding ONNX model; tests use a
//! deterministic hash embedder so no model files are required.

use crate::MatchError;

/// Injected sentence-embedding capability: one method, fixed dimension.
pub trait Embedder: Send {
    fn embed(&self, text: &str) -> Result<Vec<f32>, MatchError>;

    fn dim(&self) -> usize;

    /// Embed many texts. Engines with a batched path override this.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, MatchError> {
        texts.iter().map(|t| self.embed(t)).collect()
    }
}

/// Cosine similarity of two equal-length vectors. `None` on length mismatch
/// or zero-magnitude input.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f32> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b) {
        dot += x as f64 * y as f64;
        norm_a += x as f64 * x as f64;
        norm_b += y as f64 * y as f64;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return None;
    }
    Some((dot / (norm_a.sqrt() * norm_b.sqrt())) as f32)
}

/// Deterministic embedder for tests: character-position hashing into a
/// normalized vector. Identical strings embed identically, so cosine
/// self-similarity is 1 up to rounding.
pub struct HashEmbedder {
    dim: usize,
}

impl HashEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim: dim.max(1) }
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(384)
    }
}

impl Embedder for HashEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, MatchError> {
        let mut embedding = vec![0.0f32; self.dim];
        for (i, c) in text.chars().enumerate() {
            let idx = (c as usize + i) % self.dim;
            embedding[idx] += 1.0;
        }

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut embedding {
                *v /= norm;
            }
        }
        Ok(embedding)
    }

    fn dim(&self) -> usize {
        self.dim
    }
}

#[cfg(feature = "onnx")]
pub use onnx::{EmbeddingConfig, OrtEmbedder};

#[cfg(feature = "onnx")]
mod onnx {
    use std::path::Path;

    use ndarray::Array2;
    use ort::{GraphOptimizationLevel, Session};
    use tokenizers::Tokenizer;

    use super::Embedder;
    use crate::MatchError;

    #[derive(Debug, Clone)]
    pub struct EmbeddingConfig {
        /// Maximum sequence length
        pub max_seq_len: usize,
        /// Embedding dimension
        pub embedding_dim: usize,
        /// L2-normalize the pooled embeddings
        pub normalize: bool,
        /// ONNX output tensor name; models differ ("last_hidden_state",
        /// "sentence_embedding", ...)
        pub output_name: String,
    }

    impl Default for EmbeddingConfig {
        fn default() -> Self {
            Self {
                max_seq_len: 128,
                embedding_dim: 384,
                normalize: true,
                output_name: "last_hidden_state".to_string(),
            }
        }
    }

    /// Sentence embedder over an ONNX transformer: tokenize, run the session,
    /// mean-pool the hidden states and L2-normalize.
    pub struct OrtEmbedder {
        session: Session,
        tokenizer: Tokenizer,
        config: EmbeddingConfig,
    }

    impl OrtEmbedder {
        pub fn new(
            model_path: impl AsRef<Path>,
            tokenizer_path: impl AsRef<Path>,
            config: EmbeddingConfig,
        ) -> Result<Self, MatchError> {
            let session = Session::builder()
                .map_err(|e| MatchError::Model(e.to_string()))?
                .with_optimization_level(GraphOptimizationLevel::Level3)
                .map_err(|e| MatchError::Model(e.to_string()))?
                .with_intra_threads(2)
                .map_err(|e| MatchError::Model(e.to_string()))?
                .commit_from_file(model_path)
                .map_err(|e| MatchError::Model(e.to_string()))?;

            let tokenizer = Tokenizer::from_file(tokenizer_path)
                .map_err(|e| MatchError::Model(e.to_string()))?;

            Ok(Self {
                session,
                tokenizer,
                config,
            })
        }

        fn embed_batch_internal(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, MatchError> {
            let batch_size = texts.len();

            let encodings = self
                .tokenizer
                .encode_batch(texts.to_vec(), true)
                .map_err(|e| MatchError::Embedding(e.to_string()))?;

            let mut input_ids = vec![0i64; batch_size * self.config.max_seq_len];
            let mut attention_mask = vec![0i64; batch_size * self.config.max_seq_len];
            let mut token_type_ids = vec![0i64; batch_size * self.config.max_seq_len];

            for (i, encoding) in encodings.iter().enumerate() {
                let ids = encoding.get_ids();
                let mask = encoding.get_attention_mask();
                let types = encoding.get_type_ids();

                let len = ids.len().min(self.config.max_seq_len);
                let offset = i * self.config.max_seq_len;

                for j in 0..len {
                    input_ids[offset + j] = ids[j] as i64;
                    attention_mask[offset + j] = mask[j] as i64;
                    token_type_ids[offset + j] = types[j] as i64;
                }
            }

            let input_ids =
                Array2::from_shape_vec((batch_size, self.config.max_seq_len), input_ids)
                    .map_err(|e| MatchError::Embedding(e.to_string()))?;
            let attention_mask =
                Array2::from_shape_vec((batch_size, self.config.max_seq_len), attention_mask)
                    .map_err(|e| MatchError::Embedding(e.to_string()))?;
            let token_type_ids =
                Array2::from_shape_vec((batch_size, self.config.max_seq_len), token_type_ids)
                    .map_err(|e| MatchError::Embedding(e.to_string()))?;

            let outputs = self
                .session
                .run(
                    ort::inputs![
                        "input_ids" => input_ids.view(),
                        "attention_mask" => attention_mask.view(),
                        "token_type_ids" => token_type_ids.view(),
                    ]
                    .map_err(|e| MatchError::Model(e.to_string()))?,
                )
                .map_err(|e| MatchError::Model(e.to_string()))?;

            let last_hidden = outputs
                .get(self.config.output_name.as_str())
                .ok_or_else(|| {
                    MatchError::Model(format!(
                        "Missing output tensor: {}",
                        self.config.output_name
                    ))
                })?
                .try_extract_tensor::<f32>()
                .map_err(|e| MatchError::Model(e.to_string()))?;

            let hidden_view = last_hidden.view();

            let mut embeddings = Vec::with_capacity(batch_size);
            for i in 0..batch_size {
                let seq_len = encodings[i].get_ids().len().min(self.config.max_seq_len);
                let mut embedding = vec![0.0f32; self.config.embedding_dim];

                for j in 0..seq_len {
                    for k in 0..self.config.embedding_dim {
                        embedding[k] += hidden_view[[i, j, k]];
                    }
                }
                for v in &mut embedding {
                    *v /= seq_len.max(1) as f32;
                }

                if self.config.normalize {
                    let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
                    if norm > 0.0 {
                        for v in &mut embedding {
                            *v /= norm;
                        }
                    }
                }

                embeddings.push(embedding);
            }

            Ok(embeddings)
        }
    }

    impl Embedder for OrtEmbedder {
        fn embed(&self, text: &str) -> Result<Vec<f32>, MatchError> {
            let embeddings = self.embed_batch_internal(&[text])?;
            embeddings
                .into_iter()
                .next()
                .ok_or_else(|| MatchError::Embedding("empty batch result".to_string()))
        }

        fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, MatchError> {
            let mut all = Vec::with_capacity(texts.len());
            for batch in texts.chunks(32) {
                all.extend(self.embed_batch_internal(batch)?);
            }
            Ok(all)
        }

        fn dim(&self) -> usize {
            self.config.embedding_dim
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_embedder_is_normalized_and_deterministic() {
        let embedder = HashEmbedder::default();
        let a = embedder.embed("the ability to say no").unwrap();
        let b = embedder.embed("the ability to say no").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 384);

        let norm: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 0.01);
    }

    #[test]
    fn cosine_self_similarity_is_one() {
        let embedder = HashEmbedder::default();
        let a = embedder.embed("have you ever struggled").unwrap();
        let sim = cosine_similarity(&a, &a).unwrap();
        assert!((sim - 1.0).abs() < 1e-5);
    }

    #[test]
    fn cosine_rejects_mismatched_or_zero_vectors() {
        assert!(cosine_similarity(&[1.0, 0.0], &[1.0]).is_none());
        assert!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]).is_none());
        assert!(cosine_similarity(&[], &[]).is_none());
    }

    #[test]
    fn cosine_orthogonal_is_zero() {
        let sim = cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).unwrap();
        assert!(sim.abs() < 1e-6);
    }
}
