use autocue_stt::{next_utterance_id, Transcriber, TranscriptionConfig, TranscriptionEvent};
use tracing::warn;
use vosk::{CompleteResult, DecodingState, Model, Recognizer};

pub struct VoskTranscriber {
    recognizer: Recognizer,
    config: TranscriptionConfig,
    current_utterance_id: u64,
}

impl VoskTranscriber {
    /// Create a new VoskTranscriber with the given configuration.
    ///
    /// Model load failure is fatal to the session.
    pub fn new(config: TranscriptionConfig, sample_rate: f32) -> Result<Self, String> {
        // Vosk works best with 16kHz input
        if (sample_rate - 16000.0).abs() > 0.1 {
            warn!(
                "VoskTranscriber: Sample rate {}Hz differs from expected 16000Hz. \
                This may affect transcription quality.",
                sample_rate
            );
        }

        if !std::path::Path::new(&config.model_path).exists() {
            return Err(format!(
                "Vosk model not found at '{}'. Set VOSK_MODEL_PATH or pass --model-path.",
                config.model_path
            ));
        }

        let model = Model::new(&config.model_path)
            .ok_or_else(|| format!("Failed to load Vosk model from: {}", config.model_path))?;

        let mut recognizer = Recognizer::new(&model, sample_rate).ok_or_else(|| {
            format!(
                "Failed to create Vosk recognizer with sample rate: {}",
                sample_rate
            )
        })?;

        recognizer.set_max_alternatives(config.max_alternatives as u16);
        recognizer.set_words(false);
        recognizer.set_partial_words(false);

        Ok(Self {
            recognizer,
            config,
            current_utterance_id: next_utterance_id(),
        })
    }

    pub fn config(&self) -> &TranscriptionConfig {
        &self.config
    }

    fn parse_complete_result(result: CompleteResult, utterance_id: u64) -> Option<TranscriptionEvent> {
        let text = match result {
            CompleteResult::Single(single) => single.text.to_string(),
            CompleteResult::Multiple(multiple) => multiple
                .alternatives
                .first()
                .map(|alt| alt.text.to_string())
                .unwrap_or_default(),
        };
        if text.trim().is_empty() {
            None
        } else {
            Some(TranscriptionEvent::Final { utterance_id, text })
        }
    }
}

impl Transcriber for VoskTranscriber {
    fn accept_frame(&mut self, pcm: &[i16]) -> Result<Option<TranscriptionEvent>, String> {
        let state = self
            .recognizer
            .accept_waveform(pcm)
            .map_err(|e| format!("Vosk waveform acceptance failed: {:?}", e))?;

        match state {
            DecodingState::Finalized => {
                // Speech segment complete; the utterance id rolls over.
                let result = self.recognizer.result();
                let event = Self::parse_complete_result(result, self.current_utterance_id);
                self.current_utterance_id = next_utterance_id();
                Ok(event)
            }
            DecodingState::Running => {
                if !self.config.partial_results {
                    return Ok(None);
                }
                let partial = self.recognizer.partial_result();
                let text = partial.partial.trim();
                if text.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(TranscriptionEvent::Partial {
                        utterance_id: self.current_utterance_id,
                        text: text.to_string(),
                    }))
                }
            }
            DecodingState::Failed => Ok(Some(TranscriptionEvent::Error {
                code: "VOSK_DECODE_FAILED".to_string(),
                message: "Vosk recognition failed for current frame".to_string(),
            })),
        }
    }

    fn finalize_utterance(&mut self) -> Result<Option<TranscriptionEvent>, String> {
        let final_result = self.recognizer.final_result();
        let event = Self::parse_complete_result(final_result, self.current_utterance_id);
        self.current_utterance_id = next_utterance_id();
        Ok(event)
    }

    fn reset(&mut self) -> Result<(), String> {
        // Vosk has no explicit reset; draining the final result clears state.
        let _ = self.recognizer.final_result();
        self.current_utterance_id = next_utterance_id();
        Ok(())
    }
}
