use std::sync::Arc;
use std::time::{Duration, Instant};

use autocue_match::SpeechMatcher;
use autocue_script::{normalize, ScriptCorpus};
use tracing::debug;

/// What the pipeline should do with the presentation position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Stay,
    Forward {
        /// New transcript index after the move.
        target: u32,
        /// Slides to advance: `target - previous position`.
        steps: u32,
    },
}

/// Structured report for one processed hypothesis.
#[derive(Debug, Clone)]
pub struct NavigationOutcome {
    pub decision: Decision,
    /// The normalized, window-truncated query that was matched.
    pub query: String,
    pub matched_chunk_id: Option<String>,
    pub matched_transcript_id: Option<String>,
    /// Top suggestions as (fused score, chunk id), best first.
    pub suggestions: Vec<(f32, String)>,
    pub elapsed: Duration,
}

impl NavigationOutcome {
    fn stay(query: String, elapsed: Duration) -> Self {
        Self {
            decision: Decision::Stay,
            query,
            matched_chunk_id: None,
            matched_transcript_id: None,
            suggestions: Vec::new(),
            elapsed,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NavigatorConfig {
    /// Hypotheses are matched on their last this-many normalized words,
    /// mirroring the chunk window.
    pub query_window_words: usize,
    /// Optional confidence floor: fused top scores below it decide `Stay`.
    /// Off by default, as in the reference behavior.
    pub min_score: Option<f32>,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            query_window_words: autocue_script::CHUNK_WINDOW_WORDS,
            min_score: None,
        }
    }
}

/// Reconciles noisy partial hypotheses with the presentation position.
///
/// The position is monotonically non-decreasing for the whole session: a
/// backward match means the speaker repeated earlier words and is never a
/// reason to rewind. When in doubt the navigator stays put.
pub struct RealtimeNavigator {
    corpus: Arc<ScriptCorpus>,
    matcher: SpeechMatcher,
    config: NavigatorConfig,
    current_idx: u32,
    last_forward_chunk_id: Option<String>,
}

impl RealtimeNavigator {
    pub fn new(corpus: Arc<ScriptCorpus>, matcher: SpeechMatcher, config: NavigatorConfig) -> Self {
        Self {
            corpus,
            matcher,
            config,
            current_idx: 0,
            last_forward_chunk_id: None,
        }
    }

    pub fn current_index(&self) -> u32 {
        self.current_idx
    }

    pub fn config(&self) -> &NavigatorConfig {
        &self.config
    }

    /// Manual forward nudge from the keyboard; clamped to the last slide.
    pub fn nudge_forward(&mut self) -> u32 {
        let last = self.corpus.transcripts().len() as u32 - 1;
        if self.current_idx < last {
            self.current_idx += 1;
        }
        self.current_idx
    }

    /// Process one ASR hypothesis and decide `Stay` or `Forward`.
    pub fn process_hypothesis(&mut self, raw: &str) -> NavigationOutcome {
        let started = Instant::now();

        let normalized = normalize(raw);
        let words: Vec<&str> = normalized.split_whitespace().collect();
        let window_start = words.len().saturating_sub(self.config.query_window_words);
        let query = words[window_start..].join(" ");
        if query.is_empty() {
            return NavigationOutcome::stay(query, started.elapsed());
        }

        let ranked = self.matcher.best_matches(&query);
        let Some(top) = ranked.first() else {
            return NavigationOutcome::stay(query, started.elapsed());
        };

        let suggestions: Vec<(f32, String)> = ranked
            .iter()
            .take(3)
            .filter_map(|r| {
                self.corpus
                    .chunk_at(r.chunk_index)
                    .map(|c| (r.score, c.chunk_id.clone()))
            })
            .collect();

        let Some(chunk) = self.corpus.chunk_at(top.chunk_index) else {
            return NavigationOutcome::stay(query, started.elapsed());
        };
        let chunk = chunk.clone();

        if let Some(floor) = self.config.min_score {
            if top.score < floor {
                debug!(
                    score = top.score,
                    floor, "Top match below confidence floor, staying"
                );
                let mut outcome = NavigationOutcome::stay(query, started.elapsed());
                outcome.suggestions = suggestions;
                return outcome;
            }
        }

        let decision = self.decide(&chunk);
        if let Decision::Forward { target, .. } = decision {
            self.current_idx = target;
            self.last_forward_chunk_id = Some(chunk.chunk_id.clone());
        }

        NavigationOutcome {
            decision,
            query,
            matched_chunk_id: Some(chunk.chunk_id.clone()),
            matched_transcript_id: Some(chunk.first_source().to_owned()),
            suggestions,
            elapsed: started.elapsed(),
        }
    }

    /// The three-case decision over the matched chunk.
    fn decide(&self, matched: &autocue_script::Chunk) -> Decision {
        // A straddling chunk belongs to the transcript of its first word.
        let Some(expected_idx) = self.corpus.transcript_index_of(matched.first_source()) else {
            return Decision::Stay;
        };
        let is_current_source = expected_idx == self.current_idx;

        let next_chunk = self.corpus.chunk_at(matched.chunk_index + 1);
        let is_next_source_different = next_chunk
            .map(|next| next.first_source() != matched.first_source())
            .unwrap_or(false);

        let Some(current_transcript) = self.corpus.transcript_at(self.current_idx) else {
            return Decision::Stay;
        };

        // Acting twice on the same chunk would double-advance past a
        // boundary the actuator already crossed.
        if self.last_forward_chunk_id.as_deref() == Some(matched.chunk_id.as_str()) {
            return Decision::Stay;
        }

        let transcript_count = self.corpus.transcripts().len() as u32;

        if is_current_source
            && current_transcript.early_forward
            && is_next_source_different
            && self.current_idx + 1 < transcript_count
        {
            // The speaker reached the last window before a fluid boundary.
            return Decision::Forward {
                target: self.current_idx + 1,
                steps: 1,
            };
        }

        if !is_current_source && expected_idx > self.current_idx {
            // The speaker is already ahead; jump to where they are.
            return Decision::Forward {
                target: expected_idx,
                steps: expected_idx - self.current_idx,
            };
        }

        // Mid-slide, backward match, or nowhere to go.
        Decision::Stay
    }
}
