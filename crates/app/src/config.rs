use std::path::{Path, PathBuf};

use serde::Deserialize;

use autocue_foundation::AppError;
use autocue_match::MatcherConfig;
use autocue_vad::UnifiedVadConfig;

use crate::navigator::NavigatorConfig;
use crate::pipeline::PipelineConfig;

/// Session configuration. Every field has a spec'd default; the CLI overrides
/// the interesting ones.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Data-set name; resolves `data/{user}/{user}_transcript.json` and
    /// `data/{user}/{user}_chunks.json`.
    pub user: String,
    pub data_dir: PathBuf,
    /// Input device name; host default when empty.
    pub device: Option<String>,
    /// ASR model directory.
    pub asr_model_path: String,
    /// Sentence-embedding model identifier (ONNX model file).
    pub embedding_model_path: String,
    pub embedding_tokenizer_path: String,
    pub vad: VadConfigSection,
    pub semantic_weight: f32,
    pub phonetic_weight: f32,
    pub top_k: usize,
    pub min_score: Option<f32>,
    pub audio_queue_frames: usize,
    pub speech_queue_hypotheses: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VadConfigSection {
    pub aggressiveness: u8,
    pub energy_fallback: bool,
}

impl Default for VadConfigSection {
    fn default() -> Self {
        Self {
            aggressiveness: 2,
            energy_fallback: false,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            user: "demo".to_string(),
            data_dir: PathBuf::from("data"),
            device: None,
            asr_model_path: std::env::var("VOSK_MODEL_PATH")
                .unwrap_or_else(|_| "models/vosk-model-small-en-us-0.15".to_string()),
            embedding_model_path: "models/paraphrase-mpnet-base-v2/model.onnx".to_string(),
            embedding_tokenizer_path: "models/paraphrase-mpnet-base-v2/tokenizer.json".to_string(),
            vad: VadConfigSection {
                aggressiveness: 2,
                energy_fallback: false,
            },
            semantic_weight: 0.4,
            phonetic_weight: 0.6,
            top_k: 5,
            min_score: None,
            audio_queue_frames: 64,
            speech_queue_hypotheses: 16,
        }
    }
}

impl AppConfig {
    pub fn transcripts_path(&self) -> PathBuf {
        self.user_file("transcript")
    }

    pub fn chunks_path(&self) -> PathBuf {
        self.user_file("chunks")
    }

    fn user_file(&self, suffix: &str) -> PathBuf {
        Path::new(&self.data_dir)
            .join(&self.user)
            .join(format!("{}_{}.json", self.user, suffix))
    }

    pub fn matcher_config(&self) -> MatcherConfig {
        MatcherConfig {
            semantic_weight: self.semantic_weight,
            phonetic_weight: self.phonetic_weight,
            top_k: self.top_k,
            ..MatcherConfig::default()
        }
    }

    pub fn navigator_config(&self) -> NavigatorConfig {
        NavigatorConfig {
            min_score: self.min_score,
            ..NavigatorConfig::default()
        }
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        let mut config = PipelineConfig {
            audio_queue_frames: self.audio_queue_frames,
            speech_queue_hypotheses: self.speech_queue_hypotheses,
            ..PipelineConfig::default()
        };
        config.streamer.device = self.device.clone();
        config
    }

    pub fn vad_config(&self) -> Result<UnifiedVadConfig, AppError> {
        Ok(UnifiedVadConfig {
            aggressiveness: autocue_vad::Aggressiveness::new(self.vad.aggressiveness)
                .map_err(AppError::Config)?,
            mode: if self.vad.energy_fallback {
                autocue_vad::VadMode::Energy
            } else {
                autocue_vad::VadMode::WebRtc
            },
            ..UnifiedVadConfig::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_paths_follow_the_user_layout() {
        let config = AppConfig {
            user: "nehir".into(),
            ..AppConfig::default()
        };
        assert_eq!(
            config.transcripts_path(),
            PathBuf::from("data/nehir/nehir_transcript.json")
        );
        assert_eq!(
            config.chunks_path(),
            PathBuf::from("data/nehir/nehir_chunks.json")
        );
    }

    #[test]
    fn defaults_match_the_runtime_contract() {
        let config = AppConfig::default();
        assert_eq!(config.semantic_weight, 0.4);
        assert_eq!(config.phonetic_weight, 0.6);
        assert_eq!(config.top_k, 5);
        assert_eq!(config.audio_queue_frames, 64);
        assert_eq!(config.speech_queue_hypotheses, 16);
        assert_eq!(config.vad.aggressiveness, 2);
        assert!(config.min_score.is_none());
    }

    #[test]
    fn bad_aggressiveness_is_a_config_error() {
        let config = AppConfig {
            vad: VadConfigSection {
                aggressiveness: 9,
                energy_fallback: false,
            },
            ..AppConfig::default()
        };
        assert!(config.vad_config().is_err());
    }
}
