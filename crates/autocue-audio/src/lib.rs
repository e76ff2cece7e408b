pub mod capture;
pub mod frame;
pub mod ring_buffer;
pub mod streamer;

pub use capture::AudioCaptureThread;
pub use frame::AudioFrame;
pub use ring_buffer::{AudioConsumer, AudioProducer, AudioRingBuffer};
pub use streamer::{AudioStreamer, StreamerConfig};
