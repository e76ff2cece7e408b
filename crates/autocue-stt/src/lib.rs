//! Streaming speech-to-text abstractions.
//!
//! The pipeline consumes *partial* hypotheses: incrementally refined
//! transcriptions of the ongoing utterance. Engines are stateful across
//! frames within an utterance and are owned exclusively by the recognizer
//! worker thread.

pub mod mock;
pub mod types;

pub use mock::MockTranscriber;
pub use types::{TranscriptionConfig, TranscriptionEvent};

use std::sync::atomic::{AtomicU64, Ordering};

static UTTERANCE_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Generate a unique utterance ID.
pub fn next_utterance_id() -> u64 {
    UTTERANCE_ID_COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// Core streaming transcription interface.
///
/// Errors are strings: the engines sit at an FFI boundary and their failure
/// detail does not survive translation anyway.
pub trait Transcriber: Send {
    /// Feed 16 kHz, mono, S16LE PCM samples for one frame.
    ///
    /// May or may not produce an event; partial events are idempotent
    /// snapshots that supersede earlier partials of the same utterance.
    fn accept_frame(&mut self, pcm: &[i16]) -> Result<Option<TranscriptionEvent>, String>;

    /// Signal end of input for the current utterance and get the final
    /// result, if any.
    fn finalize_utterance(&mut self) -> Result<Option<TranscriptionEvent>, String>;

    /// Reset engine state for a new utterance.
    fn reset(&mut self) -> Result<(), String>;
}
