use std::thread::JoinHandle;

use crossbeam_channel::{bounded, Sender};
use tracing::info;

use autocue_audio::{AudioStreamer, StreamerConfig};
use autocue_foundation::{AppError, AudioError, ShutdownToken};
use autocue_slide::SlideActuator;
use autocue_stt::Transcriber;
use autocue_telemetry::PipelineMetrics;
use autocue_vad::VadEngine;

use crate::navigator::RealtimeNavigator;
use crate::workers::{NavCommand, NavigationWorker, RecognizerWorker};

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Bounded capacity of the audio frame queue (drop-newest on overflow).
    pub audio_queue_frames: usize,
    /// Bounded capacity of the hypothesis queue (drop-oldest on overflow).
    pub speech_queue_hypotheses: usize,
    pub streamer: StreamerConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            audio_queue_frames: 64,
            speech_queue_hypotheses: 16,
            streamer: StreamerConfig::default(),
        }
    }
}

/// The assembled pipeline:
///
/// ```text
/// mic → AudioStreamer → [audio_q] → RecognizerWorker → [speech_q] → NavigationWorker → actuator
/// ```
///
/// Capture starts suspended; the hotkey layer toggles it. Workers run from
/// construction until `shutdown`.
pub struct Pipeline {
    streamer: AudioStreamer,
    recognizer: Option<JoinHandle<()>>,
    navigation: Option<JoinHandle<()>>,
    cmd_tx: Sender<NavCommand>,
    shutdown: ShutdownToken,
    metrics: PipelineMetrics,
}

impl Pipeline {
    pub fn new(
        config: PipelineConfig,
        vad: Box<dyn VadEngine>,
        transcriber: Box<dyn Transcriber>,
        navigator: RealtimeNavigator,
        actuator: Box<dyn SlideActuator>,
        shutdown: ShutdownToken,
        metrics: PipelineMetrics,
    ) -> Result<Self, AppError> {
        let (audio_tx, audio_rx) = bounded(config.audio_queue_frames);
        let (speech_tx, speech_rx) = bounded(config.speech_queue_hypotheses);
        let (cmd_tx, cmd_rx) = bounded(8);

        let streamer =
            AudioStreamer::new(config.streamer, vad, audio_tx, metrics.clone());

        let recognizer = RecognizerWorker::spawn(
            transcriber,
            audio_rx,
            speech_tx,
            speech_rx.clone(),
            shutdown.clone(),
            metrics.clone(),
        )
        .map_err(|e| AppError::Fatal(format!("failed to spawn recognizer thread: {e}")))?;
        let navigation = NavigationWorker::spawn(
            navigator,
            actuator,
            speech_rx,
            cmd_rx,
            shutdown.clone(),
            metrics.clone(),
        )
        .map_err(|e| AppError::Fatal(format!("failed to spawn navigation thread: {e}")))?;

        Ok(Self {
            streamer,
            recognizer: Some(recognizer),
            navigation: Some(navigation),
            cmd_tx,
            shutdown,
            metrics,
        })
    }

    /// Toggle microphone capture; returns whether capture is now running.
    pub fn toggle_capture(&mut self) -> Result<bool, AudioError> {
        if self.streamer.is_running() {
            self.streamer.stop();
            Ok(false)
        } else {
            self.streamer.start()?;
            Ok(true)
        }
    }

    pub fn is_capturing(&self) -> bool {
        self.streamer.is_running()
    }

    /// Manual one-slide nudge, delivered to the navigation worker.
    pub fn nudge_forward(&self) {
        let _ = self.cmd_tx.try_send(NavCommand::NudgeForward);
    }

    pub fn metrics(&self) -> &PipelineMetrics {
        &self.metrics
    }

    pub fn shutdown_token(&self) -> &ShutdownToken {
        &self.shutdown
    }

    /// Tear down in pipeline order: quiesce capture, signal every worker,
    /// then join them.
    pub fn shutdown(mut self) {
        info!("Shutting down autocue pipeline...");
        self.shutdown.signal();
        self.streamer.stop();
        if let Some(handle) = self.recognizer.take() {
            let _ = handle.join();
        }
        if let Some(handle) = self.navigation.take() {
            let _ = handle.join();
        }
        info!("Pipeline shutdown complete: {}", self.metrics.summary());
    }
}
