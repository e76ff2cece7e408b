/// A trait for Voice Activity Detection (VAD) engines.
///
/// Engines classify one subframe at a time; the frame-level gate (speech if
/// any subframe is voiced, plus hangover) lives in the audio streamer so
/// engines stay interchangeable.
pub trait VadEngine: Send {
    /// Classify a single subframe of `required_subframe_samples()` samples.
    fn is_speech(&mut self, subframe: &[i16]) -> Result<bool, String>;

    fn reset(&mut self);

    fn required_sample_rate(&self) -> u32;

    fn required_subframe_samples(&self) -> usize;
}
