mod vosk_transcriber;

pub use vosk_transcriber::VoskTranscriber;
