use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Shared metrics for cross-thread pipeline monitoring.
///
/// Every counter is relaxed: the values are diagnostics, not synchronization.
#[derive(Clone, Default)]
pub struct PipelineMetrics {
    // Capture / VAD gate
    pub frames_captured: Arc<AtomicU64>,
    pub frames_gated_silence: Arc<AtomicU64>,
    pub frames_enqueued: Arc<AtomicU64>,
    pub audio_queue_dropped: Arc<AtomicU64>,
    pub ring_overflows: Arc<AtomicU64>,
    pub read_errors: Arc<AtomicU64>,
    pub vad_errors: Arc<AtomicU64>,

    // Recognition
    pub partials_emitted: Arc<AtomicU64>,
    pub partials_deduped: Arc<AtomicU64>,
    pub speech_queue_dropped: Arc<AtomicU64>,
    pub asr_errors: Arc<AtomicU64>,

    // Navigation
    pub hypotheses_processed: Arc<AtomicU64>,
    pub hypotheses_skipped_short: Arc<AtomicU64>,
    pub decisions_stay: Arc<AtomicU64>,
    pub decisions_forward: Arc<AtomicU64>,
    pub actuator_errors: Arc<AtomicU64>,

    // Matcher
    pub embed_fallbacks: Arc<AtomicU64>,
}

impl PipelineMetrics {
    pub fn increment(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(counter: &AtomicU64) -> u64 {
        counter.load(Ordering::Relaxed)
    }

    /// One-line summary for periodic stats logging.
    pub fn summary(&self) -> String {
        format!(
            "captured={} gated={} enqueued={} audio_drop={} partials={} dedup={} speech_drop={} \
             hyps={} stay={} forward={} asr_err={} read_err={} embed_fallback={}",
            Self::get(&self.frames_captured),
            Self::get(&self.frames_gated_silence),
            Self::get(&self.frames_enqueued),
            Self::get(&self.audio_queue_dropped),
            Self::get(&self.partials_emitted),
            Self::get(&self.partials_deduped),
            Self::get(&self.speech_queue_dropped),
            Self::get(&self.hypotheses_processed),
            Self::get(&self.decisions_stay),
            Self::get(&self.decisions_forward),
            Self::get(&self.asr_errors),
            Self::get(&self.read_errors),
            Self::get(&self.embed_fallbacks),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_are_shared_between_clones() {
        let metrics = PipelineMetrics::default();
        let other = metrics.clone();
        PipelineMetrics::increment(&metrics.frames_captured);
        PipelineMetrics::increment(&other.frames_captured);
        assert_eq!(PipelineMetrics::get(&metrics.frames_captured), 2);
    }

    #[test]
    fn summary_mentions_every_headline_counter() {
        let metrics = PipelineMetrics::default();
        PipelineMetrics::increment(&metrics.decisions_forward);
        let summary = metrics.summary();
        assert!(summary.contains("forward=1"));
        assert!(summary.contains("captured=0"));
    }
}
