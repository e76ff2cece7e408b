use std::collections::VecDeque;

use crate::types::TranscriptionEvent;
use crate::{next_utterance_id, Transcriber};

/// Scripted transcriber for tests: emits one queued event per accepted frame.
pub struct MockTranscriber {
    queued: VecDeque<TranscriptionEvent>,
    utterance_id: u64,
    frames_accepted: u64,
}

impl MockTranscriber {
    pub fn new() -> Self {
        Self {
            queued: VecDeque::new(),
            utterance_id: next_utterance_id(),
            frames_accepted: 0,
        }
    }

    /// Queue a partial hypothesis to be emitted on a future frame.
    pub fn push_partial(&mut self, text: &str) {
        self.queued.push_back(TranscriptionEvent::Partial {
            utterance_id: self.utterance_id,
            text: text.to_owned(),
        });
    }

    pub fn push_final(&mut self, text: &str) {
        self.queued.push_back(TranscriptionEvent::Final {
            utterance_id: self.utterance_id,
            text: text.to_owned(),
        });
    }

    pub fn frames_accepted(&self) -> u64 {
        self.frames_accepted
    }
}

impl Default for MockTranscriber {
    fn default() -> Self {
        Self::new()
    }
}

impl Transcriber for MockTranscriber {
    fn accept_frame(&mut self, _pcm: &[i16]) -> Result<Option<TranscriptionEvent>, String> {
        self.frames_accepted += 1;
        Ok(self.queued.pop_front())
    }

    fn finalize_utterance(&mut self) -> Result<Option<TranscriptionEvent>, String> {
        self.utterance_id = next_utterance_id();
        Ok(self.queued.pop_front())
    }

    fn reset(&mut self) -> Result<(), String> {
        self.queued.clear();
        self.utterance_id = next_utterance_id();
        Ok(())
    }
}
