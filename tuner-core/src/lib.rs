// tuner-core/src/lib.rs

//! The core logic for the chromatic tuner.
//! This crate estimates the fundamental frequency of 8-bit sample blocks
//! without any spectral transform, classifies it into a pitch class, and
//! runs the analysis and output contexts that connect capture to the
//! indicators. It is completely headless.
//!
//! ## Pipeline
//! raw block → [`smoothing`] → [`interference`] → [`peaks`] → [`period`]
//! → frequency → [`handoff`] → [`tuning`] → [`output`]

#[cfg(feature = "mic")]
pub mod audio;
pub mod capture;
pub mod config;
pub mod error;
pub mod handoff;
pub mod interference;
pub mod output;
pub mod peaks;
pub mod period;
pub mod pipeline;
pub mod runtime;
pub mod smoothing;
pub mod tone;
pub mod tuning;

pub use config::AnalysisParams;
pub use error::{Result, TunerError};
pub use pipeline::FrequencyPipeline;
pub use runtime::{Tuner, TunerStats};
pub use tuning::{PitchClass, Reading, TuningIndicator};
