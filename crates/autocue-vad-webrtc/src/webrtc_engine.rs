use autocue_vad::{Aggressiveness, VadEngine, SAMPLE_RATE_HZ, SUBFRAME_SIZE_SAMPLES};
use webrtc_vad::{SampleRate, Vad, VadMode};

/// WebRTC (GMM) voice activity detector behind the [`VadEngine`] trait.
///
/// The engine consumes 20 ms subframes at 16 kHz, matching the classifier's
/// supported frame sizes.
pub struct WebRtcEngine {
    vad: Vad,
    aggressiveness: Aggressiveness,
}

// The fvad state is owned exclusively by this struct and only touched through
// `&mut self`.
unsafe impl Send for WebRtcEngine {}

impl WebRtcEngine {
    pub fn new(aggressiveness: Aggressiveness) -> Result<Self, String> {
        let mode = match aggressiveness.level() {
            0 => VadMode::Quality,
            1 => VadMode::LowBitrate,
            2 => VadMode::Aggressive,
            3 => VadMode::VeryAggressive,
            other => return Err(format!("unsupported VAD aggressiveness: {}", other)),
        };
        Ok(Self {
            vad: Vad::new_with_rate_and_mode(SampleRate::Rate16kHz, mode),
            aggressiveness,
        })
    }

    pub fn aggressiveness(&self) -> Aggressiveness {
        self.aggressiveness
    }
}

impl VadEngine for WebRtcEngine {
    fn is_speech(&mut self, subframe: &[i16]) -> Result<bool, String> {
        if subframe.len() != SUBFRAME_SIZE_SAMPLES {
            return Err(format!(
                "WebRTC VAD requires {} samples, got {}",
                SUBFRAME_SIZE_SAMPLES,
                subframe.len()
            ));
        }
        self.vad
            .is_voice_segment(subframe)
            .map_err(|_| "WebRTC VAD rejected the subframe".to_string())
    }

    fn reset(&mut self) {
        self.vad.reset();
        let mode = match self.aggressiveness.level() {
            0 => VadMode::Quality,
            1 => VadMode::LowBitrate,
            2 => VadMode::Aggressive,
            _ => VadMode::VeryAggressive,
        };
        self.vad.set_mode(mode);
    }

    fn required_sample_rate(&self) -> u32 {
        SAMPLE_RATE_HZ
    }

    fn required_subframe_samples(&self) -> usize {
        SUBFRAME_SIZE_SAMPLES
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_creates_with_every_aggressiveness() {
        for level in 0..=3 {
            let aggressiveness = Aggressiveness::new(level).unwrap();
            let engine = WebRtcEngine::new(aggressiveness).unwrap();
            assert_eq!(engine.required_subframe_samples(), 320);
        }
    }

    #[test]
    fn silence_subframe_is_not_speech() {
        let mut engine = WebRtcEngine::new(Aggressiveness::default()).unwrap();
        let silence = vec![0i16; SUBFRAME_SIZE_SAMPLES];
        assert!(!engine.is_speech(&silence).unwrap());
    }

    #[test]
    fn wrong_subframe_size_is_rejected() {
        let mut engine = WebRtcEngine::new(Aggressiveness::default()).unwrap();
        assert!(engine.is_speech(&[0i16; 160]).is_err());
    }
}
