use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError};
use tracing::{debug, error, info, warn};

use autocue_audio::AudioFrame;
use autocue_foundation::ShutdownToken;
use autocue_script::normalize;
use autocue_slide::SlideActuator;
use autocue_stt::{Transcriber, TranscriptionEvent};
use autocue_telemetry::PipelineMetrics;

use crate::navigator::{Decision, RealtimeNavigator};

/// Queue waits use this timeout so shutdown is noticed promptly.
const QUEUE_WAIT: Duration = Duration::from_millis(100);

/// Consecutive engine failures tolerated before the session is torn down.
const MAX_CONSECUTIVE_ASR_ERRORS: u32 = 8;

/// Out-of-band commands for the navigation worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavCommand {
    /// Manual keyboard nudge one slide forward.
    NudgeForward,
}

/// Worker thread that feeds gated audio frames to the ASR engine and
/// publishes deduplicated partial hypotheses.
pub struct RecognizerWorker;

impl RecognizerWorker {
    pub fn spawn(
        mut transcriber: Box<dyn Transcriber>,
        audio_rx: Receiver<AudioFrame>,
        speech_tx: Sender<String>,
        speech_rx: Receiver<String>,
        shutdown: ShutdownToken,
        metrics: PipelineMetrics,
    ) -> std::io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("recognizer".to_string())
            .spawn(move || {
                let mut last_partial = String::new();
                let mut consecutive_errors = 0u32;

                while !shutdown.is_signalled() {
                    let frame = match audio_rx.recv_timeout(QUEUE_WAIT) {
                        Ok(frame) => frame,
                        Err(RecvTimeoutError::Timeout) => continue,
                        Err(RecvTimeoutError::Disconnected) => break,
                    };

                    match transcriber.accept_frame(&frame.samples) {
                        Ok(Some(TranscriptionEvent::Partial { text, .. })) => {
                            consecutive_errors = 0;
                            let normalized = normalize(&text);
                            if normalized.is_empty() {
                                continue;
                            }
                            if normalized == last_partial {
                                // Idempotent snapshot already published.
                                PipelineMetrics::increment(&metrics.partials_deduped);
                                continue;
                            }
                            last_partial = normalized;
                            push_latest(&speech_tx, &speech_rx, text, &metrics);
                        }
                        Ok(Some(TranscriptionEvent::Final { .. })) => {
                            // Utterance boundary: the next partial starts a
                            // fresh snapshot sequence.
                            consecutive_errors = 0;
                            last_partial.clear();
                        }
                        Ok(Some(TranscriptionEvent::Error { code, message })) => {
                            warn!("ASR error [{code}]: {message}");
                            PipelineMetrics::increment(&metrics.asr_errors);
                            consecutive_errors += 1;
                        }
                        Ok(None) => {
                            consecutive_errors = 0;
                        }
                        Err(e) => {
                            warn!("ASR engine failure, dropping frame: {e}");
                            PipelineMetrics::increment(&metrics.asr_errors);
                            consecutive_errors += 1;
                        }
                    }

                    if consecutive_errors >= MAX_CONSECUTIVE_ASR_ERRORS {
                        error!(
                            "ASR failed {} consecutive frames, stopping session",
                            consecutive_errors
                        );
                        shutdown.signal();
                        break;
                    }
                }
                info!("Recognizer worker exiting");
            })
    }
}

/// Navigation only cares about the latest hypothesis: on a full queue the
/// oldest entry is discarded to make room.
fn push_latest(
    speech_tx: &Sender<String>,
    speech_rx: &Receiver<String>,
    text: String,
    metrics: &PipelineMetrics,
) {
    PipelineMetrics::increment(&metrics.partials_emitted);
    match speech_tx.try_send(text) {
        Ok(()) => {}
        Err(TrySendError::Full(text)) => {
            let _ = speech_rx.try_recv();
            PipelineMetrics::increment(&metrics.speech_queue_dropped);
            if speech_tx.try_send(text).is_err() {
                PipelineMetrics::increment(&metrics.speech_queue_dropped);
            }
        }
        Err(TrySendError::Disconnected(_)) => {}
    }
}

/// Worker thread that turns hypotheses into navigation decisions and drives
/// the actuator.
pub struct NavigationWorker;

impl NavigationWorker {
    pub fn spawn(
        mut navigator: RealtimeNavigator,
        mut actuator: Box<dyn SlideActuator>,
        speech_rx: Receiver<String>,
        cmd_rx: Receiver<NavCommand>,
        shutdown: ShutdownToken,
        metrics: PipelineMetrics,
    ) -> std::io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("navigation".to_string())
            .spawn(move || {
                // The hypothesis-length gate mirrors the match window.
                let min_words = navigator.config().query_window_words;
                let mut cmd_rx = cmd_rx;

                while !shutdown.is_signalled() {
                    crossbeam_channel::select! {
                        recv(speech_rx) -> msg => match msg {
                            Ok(hypothesis) => Self::handle_hypothesis(
                                &mut navigator,
                                actuator.as_mut(),
                                &hypothesis,
                                min_words,
                                &metrics,
                            ),
                            Err(_) => break,
                        },
                        recv(cmd_rx) -> msg => match msg {
                            Ok(NavCommand::NudgeForward) => {
                                let index = navigator.nudge_forward();
                                info!("Manual nudge, now at slide {}", index);
                            }
                            Err(_) => {
                                // Hotkey side is gone; stop polling it.
                                cmd_rx = crossbeam_channel::never();
                            }
                        },
                        default(QUEUE_WAIT) => {}
                    }
                }
                info!("Navigation worker exiting");
            })
    }

    fn handle_hypothesis(
        navigator: &mut RealtimeNavigator,
        actuator: &mut dyn SlideActuator,
        hypothesis: &str,
        min_words: usize,
        metrics: &PipelineMetrics,
    ) {
        // Very short partials churn the ranking without carrying enough
        // context to act on.
        if normalize(hypothesis).split_whitespace().count() < min_words {
            PipelineMetrics::increment(&metrics.hypotheses_skipped_short);
            return;
        }

        PipelineMetrics::increment(&metrics.hypotheses_processed);
        let outcome = navigator.process_hypothesis(hypothesis);
        debug!(
            query = %outcome.query,
            matched = ?outcome.matched_chunk_id,
            decision = ?outcome.decision,
            elapsed_us = outcome.elapsed.as_micros() as u64,
            "Navigation outcome"
        );

        match outcome.decision {
            Decision::Stay => {
                PipelineMetrics::increment(&metrics.decisions_stay);
            }
            Decision::Forward { target, steps } => {
                PipelineMetrics::increment(&metrics.decisions_forward);
                info!("Forward to slide {} ({} step(s))", target, steps);
                if let Err(e) = actuator.advance(steps) {
                    warn!("Actuator failed: {e}");
                    PipelineMetrics::increment(&metrics.actuator_errors);
                }
            }
        }
    }
}
