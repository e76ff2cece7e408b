use std::time::Instant;

/// One speech-bearing frame of mono 16 kHz S16LE PCM, stamped at capture.
#[derive(Debug, Clone)]
pub struct AudioFrame {
    pub samples: Vec<i16>,
    pub captured_at: Instant,
}

impl AudioFrame {
    pub fn duration_ms(&self, sample_rate_hz: u32) -> u64 {
        (self.samples.len() as u64 * 1000) / sample_rate_hz as u64
    }
}
