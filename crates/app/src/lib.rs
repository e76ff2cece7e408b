//! Autocue application layer: navigation logic, pipeline workers and wiring.

pub mod config;
pub mod hotkey;
pub mod navigator;
pub mod pipeline;
pub mod workers;

pub use config::AppConfig;
pub use navigator::{Decision, NavigationOutcome, NavigatorConfig, RealtimeNavigator};
pub use pipeline::{Pipeline, PipelineConfig};
pub use workers::{NavCommand, NavigationWorker, RecognizerWorker};
