use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Sender, TrySendError};
use tracing::{debug, info, warn};

use autocue_foundation::AudioError;
use autocue_telemetry::PipelineMetrics;
use autocue_vad::{VadEngine, FRAME_SIZE_SAMPLES, SAMPLE_RATE_HZ, SUBFRAME_SIZE_SAMPLES};

use crate::capture::AudioCaptureThread;
use crate::frame::AudioFrame;
use crate::ring_buffer::AudioRingBuffer;

#[derive(Debug, Clone)]
pub struct StreamerConfig {
    /// Input device name; `None` picks the host default.
    pub device: Option<String>,
    pub frame_size_samples: usize,
    pub subframe_size_samples: usize,
    /// Silent frames forwarded after a speech frame, to absorb VAD flicker
    /// inside a natural utterance.
    pub hangover_frames: u32,
    /// Ring capacity between the device callback and the gate thread.
    pub ring_capacity_samples: usize,
}

impl Default for StreamerConfig {
    fn default() -> Self {
        Self {
            device: None,
            frame_size_samples: FRAME_SIZE_SAMPLES,
            subframe_size_samples: SUBFRAME_SIZE_SAMPLES,
            hangover_frames: 1,
            ring_capacity_samples: SAMPLE_RATE_HZ as usize, // one second
        }
    }
}

/// Frame-based microphone capture with VAD gating.
///
/// `start` opens the device and spawns the gate thread, which assembles
/// fixed-duration frames from the capture ring, classifies each one and
/// forwards speech-bearing frames into the bounded audio queue. On a full
/// queue the newest frame is dropped and counted; capture itself never
/// blocks. `start` is idempotent; `stop` drains and joins.
pub struct AudioStreamer {
    config: StreamerConfig,
    audio_tx: Sender<AudioFrame>,
    metrics: PipelineMetrics,
    vad: Option<Box<dyn VadEngine>>,
    worker: Option<Worker>,
}

struct Worker {
    capture: AudioCaptureThread,
    gate: JoinHandle<Box<dyn VadEngine>>,
    running: Arc<AtomicBool>,
}

impl AudioStreamer {
    pub fn new(
        config: StreamerConfig,
        vad: Box<dyn VadEngine>,
        audio_tx: Sender<AudioFrame>,
        metrics: PipelineMetrics,
    ) -> Self {
        Self {
            config,
            audio_tx,
            metrics,
            vad: Some(vad),
            worker: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    /// Begin capture. A second call while running is a no-op; device-open
    /// failure is fatal to the session.
    pub fn start(&mut self) -> Result<(), AudioError> {
        if self.worker.is_some() {
            return Ok(());
        }

        let vad = self
            .vad
            .take()
            .ok_or_else(|| AudioError::Fatal("VAD engine missing".into()))?;

        let (producer, consumer) = AudioRingBuffer::new(self.config.ring_capacity_samples).split();
        let capture =
            AudioCaptureThread::spawn(self.config.device.clone(), producer, self.metrics.clone())?;

        let running = Arc::new(AtomicBool::new(true));
        let gate = GateWorker {
            config: self.config.clone(),
            consumer,
            vad,
            audio_tx: self.audio_tx.clone(),
            metrics: self.metrics.clone(),
            running: running.clone(),
        };
        let gate = thread::Builder::new()
            .name("audio-gate".to_string())
            .spawn(move || gate.run())
            .map_err(|e| AudioError::Fatal(format!("failed to spawn gate thread: {e}")))?;

        self.worker = Some(Worker {
            capture,
            gate,
            running,
        });
        info!("Audio streamer started");
        Ok(())
    }

    /// Stop capture, drain the gate thread and recover the VAD engine for
    /// the next `start`. Safe to call when already stopped.
    pub fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        worker.running.store(false, Ordering::Relaxed);
        worker.capture.stop();
        match worker.gate.join() {
            Ok(mut vad) => {
                vad.reset();
                self.vad = Some(vad);
            }
            Err(_) => warn!("Gate thread panicked; VAD engine lost"),
        }
        info!("Audio streamer stopped");
    }
}

impl Drop for AudioStreamer {
    fn drop(&mut self) {
        self.stop();
    }
}

struct GateWorker {
    config: StreamerConfig,
    consumer: crate::ring_buffer::AudioConsumer,
    vad: Box<dyn VadEngine>,
    audio_tx: Sender<AudioFrame>,
    metrics: PipelineMetrics,
    running: Arc<AtomicBool>,
}

impl GateWorker {
    fn run(mut self) -> Box<dyn VadEngine> {
        let frame_size = self.config.frame_size_samples;
        let mut pending: Vec<i16> = Vec::with_capacity(frame_size * 2);
        let mut scratch = vec![0i16; frame_size];
        let mut hangover_left = 0u32;

        while self.running.load(Ordering::Relaxed) {
            let read = self.consumer.read(&mut scratch);
            if read == 0 {
                thread::sleep(Duration::from_millis(5));
                continue;
            }
            pending.extend_from_slice(&scratch[..read]);

            while pending.len() >= frame_size {
                let samples: Vec<i16> = pending.drain(..frame_size).collect();
                let captured_at = Instant::now();
                PipelineMetrics::increment(&self.metrics.frames_captured);

                let is_speech = self.classify(&samples);
                let forward = if is_speech {
                    hangover_left = self.config.hangover_frames;
                    true
                } else if hangover_left > 0 {
                    hangover_left -= 1;
                    true
                } else {
                    false
                };

                if !forward {
                    PipelineMetrics::increment(&self.metrics.frames_gated_silence);
                    continue;
                }

                match self.audio_tx.try_send(AudioFrame {
                    samples,
                    captured_at,
                }) {
                    Ok(()) => PipelineMetrics::increment(&self.metrics.frames_enqueued),
                    Err(TrySendError::Full(_)) => {
                        // Backpressure: drop the newest frame, never block
                        // capture.
                        PipelineMetrics::increment(&self.metrics.audio_queue_dropped);
                    }
                    Err(TrySendError::Disconnected(_)) => {
                        debug!("Audio queue disconnected; gate thread exiting");
                        return self.vad;
                    }
                }
            }
        }
        self.vad
    }

    /// A frame is speech when any of its subframes is voiced. A subframe the
    /// engine cannot classify counts as silence.
    fn classify(&mut self, frame: &[i16]) -> bool {
        let subframe = self.config.subframe_size_samples;
        for window in frame.chunks_exact(subframe) {
            match self.vad.is_speech(window) {
                Ok(true) => return true,
                Ok(false) => {}
                Err(e) => {
                    warn!("VAD error, treating subframe as silence: {e}");
                    PipelineMetrics::increment(&self.metrics.vad_errors);
                }
            }
        }
        false
    }
}
