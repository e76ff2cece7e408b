use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, SampleRate, StreamConfig};
use tracing::{info, warn};

use autocue_foundation::AudioError;
use autocue_telemetry::PipelineMetrics;
use autocue_vad::SAMPLE_RATE_HZ;

use crate::ring_buffer::AudioProducer;

/// A dedicated OS thread owning the cpal input stream.
///
/// cpal streams are not `Send`, so the stream is created and dropped on the
/// thread itself; `spawn` blocks on a handshake so a device that cannot be
/// opened fails the session at startup.
pub struct AudioCaptureThread {
    handle: Option<JoinHandle<()>>,
    running: Arc<AtomicBool>,
}

impl AudioCaptureThread {
    pub fn spawn(
        device_name: Option<String>,
        mut producer: AudioProducer,
        metrics: PipelineMetrics,
    ) -> Result<Self, AudioError> {
        let running = Arc::new(AtomicBool::new(true));
        let thread_running = running.clone();
        let (ready_tx, ready_rx) = mpsc::channel::<Result<(), AudioError>>();

        let handle = thread::Builder::new()
            .name("audio-capture".to_string())
            .spawn(move || {
                let stream = match build_input_stream(device_name.as_deref(), producer, &metrics) {
                    Ok(stream) => stream,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };

                if let Err(e) = stream.play() {
                    let _ = ready_tx.send(Err(AudioError::PlayStream(e)));
                    return;
                }
                let _ = ready_tx.send(Ok(()));
                info!("Audio capture running");

                while thread_running.load(Ordering::Relaxed) {
                    thread::sleep(Duration::from_millis(50));
                }
                drop(stream);
                info!("Audio capture stopped");
            })
            .map_err(|e| AudioError::Fatal(format!("failed to spawn capture thread: {e}")))?;

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Self {
                handle: Some(handle),
                running,
            }),
            Ok(Err(e)) => {
                let _ = handle.join();
                Err(e)
            }
            Err(_) => {
                let _ = handle.join();
                Err(AudioError::Fatal("capture thread died during startup".into()))
            }
        }
    }

    pub fn stop(mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for AudioCaptureThread {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn build_input_stream(
    device_name: Option<&str>,
    mut producer: AudioProducer,
    metrics: &PipelineMetrics,
) -> Result<cpal::Stream, AudioError> {
    let host = cpal::default_host();

    let device = match device_name {
        Some(name) => host
            .input_devices()
            .map_err(|e| AudioError::Fatal(format!("cannot enumerate input devices: {e}")))?
            .find(|d| d.name().map(|n| n == name).unwrap_or(false))
            .ok_or_else(|| AudioError::DeviceNotFound {
                name: Some(name.to_string()),
            })?,
        None => host
            .default_input_device()
            .ok_or(AudioError::DeviceNotFound { name: None })?,
    };
    info!("Using input device: {:?}", device.name().ok());

    let supported = device
        .supported_input_configs()?
        .find(|cfg| {
            cfg.sample_format() == SampleFormat::I16
                && cfg.min_sample_rate().0 <= SAMPLE_RATE_HZ
                && cfg.max_sample_rate().0 >= SAMPLE_RATE_HZ
        })
        .ok_or_else(|| AudioError::FormatNotSupported {
            format: format!("{} Hz S16LE", SAMPLE_RATE_HZ),
        })?;
    let channels = supported.channels();
    let config = StreamConfig {
        channels,
        sample_rate: SampleRate(SAMPLE_RATE_HZ),
        buffer_size: cpal::BufferSize::Default,
    };

    // The producer moves into the data callback; the error callback only
    // counts, transient read errors never stop the stream.
    let mut mono_scratch: Vec<i16> = Vec::new();
    let data_metrics = metrics.clone();
    let error_metrics = metrics.clone();

    let stream = device.build_input_stream(
        &config,
        move |data: &[i16], _info: &cpal::InputCallbackInfo| {
            let samples = if channels == 1 {
                data
            } else {
                // Interleaved multi-channel input: keep the first channel.
                mono_scratch.clear();
                mono_scratch.extend(data.iter().step_by(channels as usize));
                mono_scratch.as_slice()
            };
            let written = producer.write(samples);
            if written < samples.len() {
                PipelineMetrics::increment(&data_metrics.ring_overflows);
            }
        },
        move |err| {
            warn!("Audio stream error: {err}");
            PipelineMetrics::increment(&error_metrics.read_errors);
        },
        None,
    )?;

    Ok(stream)
}
