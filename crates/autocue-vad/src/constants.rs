/// Capture sample rate. The whole pipeline runs at 16 kHz mono S16LE.
pub const SAMPLE_RATE_HZ: u32 = 16_000;

/// Duration of one gated pipeline frame.
pub const FRAME_DURATION_MS: u32 = 200;

/// Samples per pipeline frame (200 ms at 16 kHz).
pub const FRAME_SIZE_SAMPLES: usize = (SAMPLE_RATE_HZ as usize * FRAME_DURATION_MS as usize) / 1000;

/// Duration of one VAD classification subframe.
pub const SUBFRAME_DURATION_MS: u32 = 20;

/// Samples per VAD subframe (20 ms at 16 kHz).
pub const SUBFRAME_SIZE_SAMPLES: usize =
    (SAMPLE_RATE_HZ as usize * SUBFRAME_DURATION_MS as usize) / 1000;
