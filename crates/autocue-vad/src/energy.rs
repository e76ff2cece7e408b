use crate::config::EnergyConfig;
use crate::constants::{SAMPLE_RATE_HZ, SUBFRAME_SIZE_SAMPLES};
use crate::engine::VadEngine;

pub struct EnergyCalculator {
    epsilon: f32,
}

impl EnergyCalculator {
    pub fn new() -> Self {
        Self { epsilon: 1e-10 }
    }

    pub fn calculate_rms(&self, frame: &[i16]) -> f32 {
        if frame.is_empty() {
            return 0.0;
        }

        let sum_squares: i64 = frame
            .iter()
            .map(|&sample| {
                let s = sample as i64;
                s * s
            })
            .sum();

        let mean_square = sum_squares as f64 / frame.len() as f64;
        (mean_square.sqrt() / 32768.0) as f32
    }

    pub fn rms_to_dbfs(&self, rms: f32) -> f32 {
        if rms <= self.epsilon {
            return -100.0;
        }
        20.0 * rms.log10()
    }

    pub fn calculate_dbfs(&self, frame: &[i16]) -> f32 {
        self.rms_to_dbfs(self.calculate_rms(frame))
    }
}

impl Default for EnergyCalculator {
    fn default() -> Self {
        Self::new()
    }
}

/// Threshold VAD over subframe energy. Deterministic and dependency-free,
/// which also makes it the engine of choice in tests.
pub struct EnergyEngine {
    calculator: EnergyCalculator,
    threshold_dbfs: f32,
}

impl EnergyEngine {
    pub fn new(config: EnergyConfig) -> Self {
        Self {
            calculator: EnergyCalculator::new(),
            threshold_dbfs: config.threshold_dbfs,
        }
    }
}

impl VadEngine for EnergyEngine {
    fn is_speech(&mut self, subframe: &[i16]) -> Result<bool, String> {
        if subframe.len() != SUBFRAME_SIZE_SAMPLES {
            return Err(format!(
                "Energy VAD requires {} samples, got {}",
                SUBFRAME_SIZE_SAMPLES,
                subframe.len()
            ));
        }
        Ok(self.calculator.calculate_dbfs(subframe) >= self.threshold_dbfs)
    }

    fn reset(&mut self) {}

    fn required_sample_rate(&self) -> u32 {
        SAMPLE_RATE_HZ
    }

    fn required_subframe_samples(&self) -> usize {
        SUBFRAME_SIZE_SAMPLES
    }
}
