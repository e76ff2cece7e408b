//! Core types for speech-to-text functionality.

/// Transcription event types
#[derive(Debug, Clone, PartialEq)]
pub enum TranscriptionEvent {
    /// Partial transcription result (ongoing speech)
    Partial { utterance_id: u64, text: String },
    /// Final transcription result (speech segment complete)
    Final { utterance_id: u64, text: String },
    /// Transcription error
    Error { code: String, message: String },
}

/// Transcription configuration
#[derive(Debug, Clone)]
pub struct TranscriptionConfig {
    /// Path to model directory
    pub model_path: String,
    /// Emit partial recognition results
    pub partial_results: bool,
    /// Maximum alternatives in results
    pub max_alternatives: u32,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        let model_path = std::env::var("VOSK_MODEL_PATH")
            .unwrap_or_else(|_| "models/vosk-model-small-en-us-0.15".to_string());

        Self {
            model_path,
            partial_results: true,
            max_alternatives: 1,
        }
    }
}
