pub mod config;
pub mod constants;
pub mod energy;
pub mod engine;

pub use config::{Aggressiveness, EnergyConfig, UnifiedVadConfig, VadMode};
pub use constants::{
    FRAME_DURATION_MS, FRAME_SIZE_SAMPLES, SAMPLE_RATE_HZ, SUBFRAME_DURATION_MS,
    SUBFRAME_SIZE_SAMPLES,
};
pub use energy::{EnergyCalculator, EnergyEngine};
pub use engine::VadEngine;
