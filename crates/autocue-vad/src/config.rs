use serde::{Deserialize, Serialize};

use super::constants::{SAMPLE_RATE_HZ, SUBFRAME_SIZE_SAMPLES};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum VadMode {
    /// WebRTC GMM-based VAD, the production default.
    WebRtc,
    /// Energy threshold fallback, kept for tests and devices without the
    /// native engine.
    Energy,
}

impl Default for VadMode {
    fn default() -> Self {
        Self::WebRtc
    }
}

/// WebRTC VAD aggressiveness on the engine's 0–3 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Aggressiveness(u8);

impl Aggressiveness {
    pub fn new(level: u8) -> Result<Self, String> {
        if level > 3 {
            return Err(format!("VAD aggressiveness must be 0..=3, got {}", level));
        }
        Ok(Self(level))
    }

    pub fn level(self) -> u8 {
        self.0
    }
}

impl Default for Aggressiveness {
    fn default() -> Self {
        Self(2)
    }
}

impl TryFrom<u8> for Aggressiveness {
    type Error = String;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        Self::new(level)
    }
}

impl From<Aggressiveness> for u8 {
    fn from(a: Aggressiveness) -> u8 {
        a.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnergyConfig {
    /// Subframes at or above this level count as speech.
    pub threshold_dbfs: f32,
}

impl Default for EnergyConfig {
    fn default() -> Self {
        Self {
            threshold_dbfs: -45.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnifiedVadConfig {
    pub mode: VadMode,
    pub aggressiveness: Aggressiveness,
    pub energy: EnergyConfig,
}

impl UnifiedVadConfig {
    pub fn sample_rate_hz(&self) -> u32 {
        SAMPLE_RATE_HZ
    }

    pub fn subframe_size_samples(&self) -> usize {
        SUBFRAME_SIZE_SAMPLES
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggressiveness_rejects_out_of_range() {
        assert!(Aggressiveness::new(3).is_ok());
        assert!(Aggressiveness::new(4).is_err());
    }

    #[test]
    fn default_matches_reference_settings() {
        let cfg = UnifiedVadConfig::default();
        assert_eq!(cfg.mode, VadMode::WebRtc);
        assert_eq!(cfg.aggressiveness.level(), 2);
        assert_eq!(cfg.subframe_size_samples(), 320);
    }
}
