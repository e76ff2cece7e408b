use std::sync::Arc;

use autocue_script::{normalize, ScriptCorpus};
use autocue_telemetry::PipelineMetrics;
use tracing::{debug, warn};

use crate::cache::LruCache;
use crate::embed::{cosine_similarity, Embedder};
use crate::phonetic::PhoneticScorer;
use crate::MatchError;

#[derive(Debug, Clone)]
pub struct MatcherConfig {
    /// Weight of the semantic component in the fused score.
    pub semantic_weight: f32,
    /// Weight of the phonetic component in the fused score.
    pub phonetic_weight: f32,
    /// Ranked chunks retained per call.
    pub top_k: usize,
    /// Bound on the query-embedding cache.
    pub query_cache_entries: usize,
    /// Bound on the word-distance memo.
    pub word_cache_entries: usize,
    /// Bound on the per-(query, chunk) sentence-score memo.
    pub sentence_cache_entries: usize,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            semantic_weight: 0.4,
            phonetic_weight: 0.6,
            top_k: 5,
            query_cache_entries: 4096,
            word_cache_entries: 65_536,
            sentence_cache_entries: 65_536,
        }
    }
}

/// One ranked candidate from a match call.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedChunk {
    pub chunk_index: u32,
    pub score: f32,
    pub semantic: f32,
    pub phonetic: f32,
}

/// Hybrid matcher: ranks every chunk in the corpus against a query under
/// `semantic_weight · sem + phonetic_weight · phon`, both components in
/// [0, 1]. Chunk embeddings and token lists are precomputed at session start;
/// query embeddings and phonetic scores are memoized in bounded LRU caches,
/// which stay hot because consecutive ASR partials repeat the same strings.
pub struct SpeechMatcher {
    config: MatcherConfig,
    corpus: Arc<ScriptCorpus>,
    embedder: Box<dyn Embedder>,
    chunk_embeddings: Vec<Vec<f32>>,
    chunk_tokens: Vec<Vec<String>>,
    phonetic: PhoneticScorer,
    query_embeddings: LruCache<String, Arc<Vec<f32>>>,
    sentence_scores: LruCache<(String, u32), f32>,
    metrics: Option<PipelineMetrics>,
}

impl SpeechMatcher {
    pub fn new(
        corpus: Arc<ScriptCorpus>,
        embedder: Box<dyn Embedder>,
        config: MatcherConfig,
    ) -> Result<Self, MatchError> {
        if corpus.chunks().is_empty() {
            return Err(MatchError::EmptyCorpus);
        }

        let chunk_texts: Vec<&str> = corpus.chunks().iter().map(|c| c.chunk.as_str()).collect();
        let chunk_embeddings = embedder.embed_batch(&chunk_texts)?;
        let chunk_tokens: Vec<Vec<String>> = corpus
            .chunks()
            .iter()
            .map(|c| c.tokens().map(str::to_owned).collect())
            .collect();

        debug!(
            chunks = chunk_embeddings.len(),
            dim = embedder.dim(),
            "Chunk embeddings precomputed"
        );

        Ok(Self {
            phonetic: PhoneticScorer::new(config.word_cache_entries),
            query_embeddings: LruCache::new(config.query_cache_entries),
            sentence_scores: LruCache::new(config.sentence_cache_entries),
            config,
            corpus,
            embedder,
            chunk_embeddings,
            chunk_tokens,
            metrics: None,
        })
    }

    pub fn with_metrics(mut self, metrics: PipelineMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Rank the whole corpus against `query` and keep the `top_k` best,
    /// ties broken by the earlier chunk index. An empty (post-normalization)
    /// query yields no candidates. If the embedder fails, the call degrades
    /// to a phonetic-only ranking.
    pub fn best_matches(&mut self, query: &str) -> Vec<RankedChunk> {
        let query = normalize(query);
        if query.is_empty() {
            return Vec::new();
        }
        let query_tokens: Vec<String> = query.split_whitespace().map(str::to_owned).collect();

        let query_embedding = self.query_embedding(&query);

        let mut ranked: Vec<RankedChunk> = Vec::with_capacity(self.chunk_tokens.len());
        for index in 0..self.chunk_tokens.len() {
            let phonetic = self.sentence_score(&query, &query_tokens, index);
            let (semantic, score) = match &query_embedding {
                Some(embedding) => {
                    let semantic = cosine_similarity(embedding, &self.chunk_embeddings[index])
                        .unwrap_or(0.0)
                        .clamp(0.0, 1.0);
                    (
                        semantic,
                        self.config.semantic_weight * semantic
                            + self.config.phonetic_weight * phonetic,
                    )
                }
                None => (0.0, phonetic),
            };
            ranked.push(RankedChunk {
                chunk_index: index as u32,
                score,
                semantic,
                phonetic,
            });
        }

        ranked.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.chunk_index.cmp(&b.chunk_index))
        });
        ranked.truncate(self.config.top_k);
        ranked
    }

    pub fn corpus(&self) -> &Arc<ScriptCorpus> {
        &self.corpus
    }

    fn query_embedding(&mut self, query: &str) -> Option<Arc<Vec<f32>>> {
        if let Some(cached) = self.query_embeddings.get(&query.to_owned()) {
            return Some(cached.clone());
        }
        match self.embedder.embed(query) {
            Ok(embedding) => {
                let embedding = Arc::new(embedding);
                self.query_embeddings
                    .insert(query.to_owned(), embedding.clone());
                Some(embedding)
            }
            Err(e) => {
                warn!("Query embedding failed, falling back to phonetic-only: {e}");
                if let Some(metrics) = &self.metrics {
                    PipelineMetrics::increment(&metrics.embed_fallbacks);
                }
                None
            }
        }
    }

    fn sentence_score(&mut self, query: &str, query_tokens: &[String], index: usize) -> f32 {
        let key = (query.to_owned(), index as u32);
        if let Some(&score) = self.sentence_scores.get(&key) {
            return score;
        }
        let score = self
            .phonetic
            .sentence_score(query_tokens, &self.chunk_tokens[index]);
        self.sentence_scores.insert(key, score);
        score
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autocue_script::test_fixture::{fixture_chunks, fixture_transcripts};
    use crate::embed::HashEmbedder;

    /// Embeds fine at startup (batch path) but fails per-query.
    struct FlakyEmbedder {
        inner: HashEmbedder,
    }

    impl Embedder for FlakyEmbedder {
        fn embed(&self, _text: &str) -> Result<Vec<f32>, MatchError> {
            Err(MatchError::Embedding("model unavailable".into()))
        }

        fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, MatchError> {
            texts.iter().map(|t| self.inner.embed(t)).collect()
        }

        fn dim(&self) -> usize {
            self.inner.dim()
        }
    }

    fn matcher() -> SpeechMatcher {
        let corpus = Arc::new(
            ScriptCorpus::from_parts(fixture_transcripts(), fixture_chunks()).unwrap(),
        );
        SpeechMatcher::new(corpus, Box::new(HashEmbedder::default()), MatcherConfig::default())
            .unwrap()
    }

    #[test]
    fn exact_chunk_text_ranks_first_with_full_score() {
        let mut m = matcher();
        let ranked = m.best_matches("the ability to say no have you");
        assert_eq!(ranked[0].chunk_index, 0);
        assert!((ranked[0].phonetic - 1.0).abs() < 1e-6);
        assert!((ranked[0].semantic - 1.0).abs() < 1e-4);
        assert!(ranked[0].score > 0.99);
    }

    #[test]
    fn empty_query_returns_nothing() {
        let mut m = matcher();
        assert!(m.best_matches("").is_empty());
        assert!(m.best_matches("?!,").is_empty());
    }

    #[test]
    fn returns_at_most_top_k() {
        let mut m = matcher();
        let ranked = m.best_matches("say no to someone");
        assert_eq!(ranked.len(), 5);
    }

    #[test]
    fn scores_are_bounded() {
        let mut m = matcher();
        for query in ["the ability", "zzz qqq xxx", "or perhaps you couldnt"] {
            for candidate in m.best_matches(query) {
                assert!((0.0..=1.0).contains(&candidate.score), "{candidate:?}");
                assert!((0.0..=1.0).contains(&candidate.semantic));
                assert!((0.0..=1.0).contains(&candidate.phonetic));
            }
        }
    }

    #[test]
    fn ties_break_toward_earlier_chunk() {
        let mut m = matcher();
        // A query matching nothing scores all chunks poorly but equally
        // enough that ordering must stay deterministic.
        let ranked = m.best_matches("zzz");
        for pair in ranked.windows(2) {
            assert!(
                pair[0].score > pair[1].score
                    || pair[0].chunk_index < pair[1].chunk_index
            );
        }
    }

    #[test]
    fn embedder_failure_degrades_to_phonetic_only() {
        let corpus = Arc::new(
            ScriptCorpus::from_parts(fixture_transcripts(), fixture_chunks()).unwrap(),
        );
        let mut m = SpeechMatcher::new(
            corpus,
            Box::new(FlakyEmbedder {
                inner: HashEmbedder::default(),
            }),
            MatcherConfig::default(),
        )
        .unwrap();

        let ranked = m.best_matches("the ability to say no have you");
        assert_eq!(ranked[0].chunk_index, 0);
        assert_eq!(ranked[0].semantic, 0.0);
        // Phonetic-only: the fused score is the raw phonetic score.
        assert!((ranked[0].score - ranked[0].phonetic).abs() < 1e-6);
        assert!((ranked[0].phonetic - 1.0).abs() < 1e-6);
    }

    #[test]
    fn phonetic_dominates_for_stt_near_misses() {
        // "hence" for "hands": the phonetic component keeps the true window
        // on top of the fused ranking.
        let transcripts = vec![autocue_script::TranscriptItem {
            transcript_index: 0,
            transcript_id: "t0".into(),
            transcript: "benefit from it let me see your hands pause for reaction".into(),
            early_forward: false,
        }];
        let chunks = autocue_script::test_fixture::sliding_chunks(&transcripts);
        let corpus = Arc::new(ScriptCorpus::from_parts(transcripts, chunks).unwrap());
        let mut m = SpeechMatcher::new(
            corpus.clone(),
            Box::new(HashEmbedder::default()),
            MatcherConfig::default(),
        )
        .unwrap();

        let ranked = m.best_matches("from it let me see your hence");
        let top = &ranked[0];
        assert_eq!(
            corpus.chunk_at(top.chunk_index).unwrap().chunk,
            "from it let me see your hands"
        );
        assert!(top.phonetic >= 0.7, "phonetic {0} too low", top.phonetic);
    }

    #[test]
    fn repeated_queries_hit_the_caches() {
        let mut m = matcher();
        let first = m.best_matches("tried to say no to someone or");
        let second = m.best_matches("tried to say no to someone or");
        assert_eq!(first, second);
    }
}
