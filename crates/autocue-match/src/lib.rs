//! Hybrid similarity matching between ASR hypotheses and script chunks.
//!
//! The fused score is a weighted sum of semantic similarity (embedding
//! cosine) and phonetic similarity (grouped word-level edit distance),
//! weighted toward the phonetic side: speech-to-text substitutions are
//! phonetic near-misses far more often than paraphrases.

pub mod cache;
pub mod embed;
pub mod matcher;
pub mod phonetic;

pub use cache::LruCache;
pub use embed::{cosine_similarity, Embedder, HashEmbedder};
#[cfg(feature = "onnx")]
pub use embed::{EmbeddingConfig, OrtEmbedder};
pub use matcher::{MatcherConfig, RankedChunk, SpeechMatcher};
pub use phonetic::PhoneticScorer;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MatchError {
    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Corpus has no chunks to match against")]
    EmptyCorpus,
}
