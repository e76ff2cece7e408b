use rtrb::{Consumer, Producer, RingBuffer};
use tracing::warn;

/// Audio ring buffer using rtrb (real-time safe, lock-free SPSC).
///
/// The producer lives in the audio device callback; the consumer in the
/// streamer's gate thread.
pub struct AudioRingBuffer {
    producer: Producer<i16>,
    consumer: Consumer<i16>,
}

impl AudioRingBuffer {
    pub fn new(capacity: usize) -> Self {
        let (producer, consumer) = RingBuffer::new(capacity);
        Self { producer, consumer }
    }

    pub fn split(self) -> (AudioProducer, AudioConsumer) {
        (
            AudioProducer {
                producer: self.producer,
            },
            AudioConsumer {
                consumer: self.consumer,
            },
        )
    }
}

/// Producer half, for the audio callback. Non-blocking.
pub struct AudioProducer {
    producer: Producer<i16>,
}

impl AudioProducer {
    /// Write samples; returns how many fit. A short write means the consumer
    /// is behind and the remainder is lost.
    pub fn write(&mut self, samples: &[i16]) -> usize {
        let writable = samples.len().min(self.producer.slots());
        if writable < samples.len() {
            warn!(
                "Audio ring overflow: dropping {} samples",
                samples.len() - writable
            );
        }
        if writable == 0 {
            return 0;
        }

        let mut chunk = match self.producer.write_chunk(writable) {
            Ok(chunk) => chunk,
            Err(_) => return 0,
        };
        let (first, second) = chunk.as_mut_slices();
        let split = first.len();
        first.copy_from_slice(&samples[..split]);
        second.copy_from_slice(&samples[split..writable]);
        chunk.commit_all();
        writable
    }
}

/// Consumer half, for the gate thread. Non-blocking.
pub struct AudioConsumer {
    consumer: Consumer<i16>,
}

impl AudioConsumer {
    /// Read up to `buffer.len()` samples; returns how many were read.
    pub fn read(&mut self, buffer: &mut [i16]) -> usize {
        let readable = buffer.len().min(self.consumer.slots());
        if readable == 0 {
            return 0;
        }

        let chunk = match self.consumer.read_chunk(readable) {
            Ok(chunk) => chunk,
            Err(_) => return 0,
        };
        let (first, second) = chunk.as_slices();
        let split = first.len();
        buffer[..split].copy_from_slice(first);
        buffer[split..readable].copy_from_slice(second);
        chunk.commit_all();
        readable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_preserves_samples() {
        let (mut producer, mut consumer) = AudioRingBuffer::new(64).split();
        let written = producer.write(&[1, 2, 3, 4]);
        assert_eq!(written, 4);

        let mut out = [0i16; 8];
        let read = consumer.read(&mut out);
        assert_eq!(read, 4);
        assert_eq!(&out[..4], &[1, 2, 3, 4]);
    }

    #[test]
    fn overflow_is_a_short_write() {
        let (mut producer, mut consumer) = AudioRingBuffer::new(4).split();
        assert_eq!(producer.write(&[1, 2, 3, 4, 5, 6]), 4);

        let mut out = [0i16; 8];
        assert_eq!(consumer.read(&mut out), 4);
        assert_eq!(&out[..4], &[1, 2, 3, 4]);
    }

    #[test]
    fn empty_read_returns_zero() {
        let (_producer, mut consumer) = AudioRingBuffer::new(4).split();
        let mut out = [0i16; 4];
        assert_eq!(consumer.read(&mut out), 0);
    }

    #[test]
    fn wrapping_reads_stay_in_order() {
        let (mut producer, mut consumer) = AudioRingBuffer::new(4).split();
        let mut out = [0i16; 4];

        producer.write(&[1, 2, 3]);
        assert_eq!(consumer.read(&mut out[..3]), 3);
        // The next write wraps around the ring's end.
        producer.write(&[4, 5, 6]);
        assert_eq!(consumer.read(&mut out[..3]), 3);
        assert_eq!(&out[..3], &[4, 5, 6]);
    }
}
