use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::writer::MakeWriterExt;

use autocue_app::{AppConfig, Pipeline, RealtimeNavigator};
use autocue_foundation::ShutdownToken;
use autocue_match::{Embedder, MatcherConfig, SpeechMatcher};
use autocue_script::ScriptCorpus;
use autocue_slide::SlideActuator;
use autocue_stt::Transcriber;
use autocue_telemetry::PipelineMetrics;
use autocue_vad::{UnifiedVadConfig, VadEngine};

#[derive(Parser, Debug)]
#[command(name = "autocue", about = "Real-time speech-driven slide navigation")]
struct Cli {
    /// Data-set name; reads data/<user>/<user>_transcript.json and _chunks.json
    #[arg(long, default_value = "demo")]
    user: String,

    /// Directory holding the prepared per-user data
    #[arg(long, default_value = "data")]
    data_dir: std::path::PathBuf,

    /// Input device name (host default when omitted)
    #[arg(long)]
    device: Option<String>,

    /// Vosk model directory
    #[arg(long)]
    model_path: Option<String>,

    /// Sentence-embedding ONNX model file
    #[arg(long)]
    embedding_model: Option<String>,

    /// Tokenizer file for the embedding model
    #[arg(long)]
    embedding_tokenizer: Option<String>,

    /// VAD aggressiveness, 0 (permissive) to 3 (aggressive)
    #[arg(long, default_value_t = 2)]
    vad_aggressiveness: u8,

    /// Use the energy-threshold VAD instead of WebRTC
    #[arg(long)]
    energy_vad: bool,

    /// Minimum fused score below which every decision degrades to Stay
    #[arg(long)]
    min_score: Option<f32>,
}

fn init_logging() -> anyhow::Result<()> {
    std::fs::create_dir_all("logs")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, "logs", "autocue.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

    tracing_subscriber::fmt()
        .with_writer(std::io::stdout.and(non_blocking_file))
        .with_env_filter(log_level)
        .init();

    // Keep the flush guard alive for the whole process.
    std::mem::forget(guard);

    Ok(())
}

fn main() -> anyhow::Result<()> {
    init_logging()?;
    let cli = Cli::parse();

    let mut config = AppConfig {
        user: cli.user,
        data_dir: cli.data_dir,
        device: cli.device,
        min_score: cli.min_score,
        ..AppConfig::default()
    };
    config.vad.aggressiveness = cli.vad_aggressiveness;
    config.vad.energy_fallback = cli.energy_vad;
    if let Some(path) = cli.model_path {
        config.asr_model_path = path;
    }
    if let Some(path) = cli.embedding_model {
        config.embedding_model_path = path;
    }
    if let Some(path) = cli.embedding_tokenizer {
        config.embedding_tokenizer_path = path;
    }

    tracing::info!("Starting autocue for data set '{}'", config.user);

    let corpus = Arc::new(
        ScriptCorpus::load(config.transcripts_path(), config.chunks_path())
            .context("loading script corpus")?,
    );

    let embedder = build_embedder(&config)?;
    let matcher_config: MatcherConfig = config.matcher_config();
    let metrics = PipelineMetrics::default();
    let matcher = SpeechMatcher::new(corpus.clone(), embedder, matcher_config)
        .context("preparing the speech matcher")?
        .with_metrics(metrics.clone());
    let navigator = RealtimeNavigator::new(corpus, matcher, config.navigator_config());

    let vad_config = config.vad_config()?;
    let vad = build_vad(&vad_config)?;
    let transcriber = build_transcriber(&config)?;
    let actuator = build_actuator();

    let shutdown = ShutdownToken::new();
    let mut pipeline = Pipeline::new(
        config.pipeline_config(),
        vad,
        transcriber,
        navigator,
        actuator,
        shutdown.clone(),
        metrics,
    )?;

    autocue_app::hotkey::run(&mut pipeline).context("hotkey loop")?;

    pipeline.shutdown();
    Ok(())
}

fn build_vad(config: &UnifiedVadConfig) -> anyhow::Result<Box<dyn VadEngine>> {
    match config.mode {
        autocue_vad::VadMode::Energy => Ok(Box::new(autocue_vad::EnergyEngine::new(
            config.energy.clone(),
        ))),
        autocue_vad::VadMode::WebRtc => {
            #[cfg(feature = "webrtc")]
            {
                Ok(Box::new(
                    autocue_vad_webrtc::WebRtcEngine::new(config.aggressiveness)
                        .map_err(anyhow::Error::msg)?,
                ))
            }
            #[cfg(not(feature = "webrtc"))]
            {
                tracing::warn!("Built without the WebRTC VAD; using the energy engine");
                Ok(Box::new(autocue_vad::EnergyEngine::new(
                    config.energy.clone(),
                )))
            }
        }
    }
}

#[cfg(feature = "vosk")]
fn build_transcriber(config: &AppConfig) -> anyhow::Result<Box<dyn Transcriber>> {
    let stt_config = autocue_stt::TranscriptionConfig {
        model_path: config.asr_model_path.clone(),
        ..autocue_stt::TranscriptionConfig::default()
    };
    let transcriber =
        autocue_stt_vosk::VoskTranscriber::new(stt_config, autocue_vad::SAMPLE_RATE_HZ as f32)
            .map_err(anyhow::Error::msg)
            .context("initializing the Vosk engine")?;
    Ok(Box::new(transcriber))
}

#[cfg(not(feature = "vosk"))]
fn build_transcriber(_config: &AppConfig) -> anyhow::Result<Box<dyn Transcriber>> {
    anyhow::bail!(
        "This build has no ASR engine; rebuild with `--features vosk` to run a live session"
    )
}

#[cfg(feature = "onnx")]
fn build_embedder(config: &AppConfig) -> anyhow::Result<Box<dyn Embedder>> {
    let embedder = autocue_match::OrtEmbedder::new(
        &config.embedding_model_path,
        &config.embedding_tokenizer_path,
        autocue_match::EmbeddingConfig::default(),
    )
    .context("loading the sentence-embedding model")?;
    Ok(Box::new(embedder))
}

#[cfg(not(feature = "onnx"))]
fn build_embedder(_config: &AppConfig) -> anyhow::Result<Box<dyn Embedder>> {
    tracing::warn!(
        "Built without the ONNX embedder; semantic scores use the hash fallback and the \
         phonetic component will dominate"
    );
    Ok(Box::new(autocue_match::HashEmbedder::default()))
}

#[cfg(feature = "enigo")]
fn build_actuator() -> Box<dyn SlideActuator> {
    match autocue_slide::EnigoActuator::new() {
        Ok(actuator) => Box::new(actuator),
        Err(e) => {
            tracing::warn!("Synthetic input unavailable ({e}); slide advances will be logged only");
            Box::new(autocue_slide::NoopActuator::new())
        }
    }
}

#[cfg(not(feature = "enigo"))]
fn build_actuator() -> Box<dyn SlideActuator> {
    tracing::warn!("Built without the enigo actuator; slide advances will be logged only");
    Box::new(autocue_slide::NoopActuator::new())
}
