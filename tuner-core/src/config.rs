//! # Analysis Configuration
//!
//! Fixed parameters of the frequency-estimation pipeline. They are chosen
//! at compile time for an 8-bit microphone front end sampled at 44 kHz and
//! are not reconfigurable at runtime.
//!
//! `AnalysisParams` groups them so that the algorithm can be driven with
//! other fixed values (mostly from tests); every relationship between the
//! sizes is checked once by [`AnalysisParams::validate`].

use std::time::Duration;

use crate::error::{Result, TunerError};

/// Sampling rate of the capture front end in Hz.
pub const SAMPLE_RATE: u32 = 44_000;

/// Number of smoothed samples analysed per block (N).
pub const NUM_SAMPLES: usize = 1500;

/// Extra lead-in samples needed by the moving average (M).
/// Each smoothed sample averages `SMA_WIDTH + 1` raw samples.
pub const SMA_WIDTH: usize = 20;

/// Highest shift searched for peaks. Must be lower than `NUM_SAMPLES`;
/// shifts close to the block length compare too few samples and pick up
/// noise as spurious peaks.
pub const SHIFT_LIMIT: usize = 1250;

/// Width of one peak-search window (W). Peaks closer than `2 * W`
/// samples cannot be told apart.
pub const PEAK_SEARCH_RANGE: usize = 15;

/// Maximum number of peaks tracked per block (K).
pub const PEAK_TRACKING_LIMIT: usize = 10;

/// Interference scores above this value are never peaks, so their
/// summation is abandoned early (T).
pub const INTERFERENCE_THRESHOLD: i32 = 3000;

/// Period, in samples, reported when no peak was found.
pub const FALLBACK_PERIOD: f32 = 100.0;

/// Half-width, in Hz, of the in-tune band around a reference pitch.
pub const TUNE_PRECISION: f32 = 0.7;

/// Number of frequency values the handoff channel buffers before the
/// analysis context blocks.
pub const HANDOFF_CAPACITY: usize = 8;

/// The parameter set of one analysis pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisParams {
    pub sample_rate: u32,
    pub num_samples: usize,
    pub sma_width: usize,
    pub shift_limit: usize,
    pub peak_search_range: usize,
    pub peak_tracking_limit: usize,
    pub interference_threshold: i32,
    pub fallback_period: f32,
}

impl AnalysisParams {
    /// The compiled-in configuration used by the device.
    pub const DEFAULT: Self = Self {
        sample_rate: SAMPLE_RATE,
        num_samples: NUM_SAMPLES,
        sma_width: SMA_WIDTH,
        shift_limit: SHIFT_LIMIT,
        peak_search_range: PEAK_SEARCH_RANGE,
        peak_tracking_limit: PEAK_TRACKING_LIMIT,
        interference_threshold: INTERFERENCE_THRESHOLD,
        fallback_period: FALLBACK_PERIOD,
    };

    /// Length of a raw capture block (`N + M`).
    pub fn raw_block_len(&self) -> usize {
        self.num_samples + self.sma_width
    }

    /// Time the front end needs to capture one raw block. One analysis
    /// pass has to finish within this period.
    pub fn block_period(&self) -> Duration {
        Duration::from_secs_f64(self.raw_block_len() as f64 / f64::from(self.sample_rate))
    }

    /// Checks the size relationships the algorithm relies on.
    ///
    /// # Errors
    /// Returns [`TunerError::InvalidParams`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        let invalid = |name, reason| Err(TunerError::InvalidParams { name, reason });

        if self.sample_rate == 0 {
            return invalid("sample_rate", "must be positive");
        }
        if self.num_samples == 0 {
            return invalid("num_samples", "must be positive");
        }
        // The smoothing accumulator holds (M + 1) full-scale samples.
        if (self.sma_width as u64 + 1) * u64::from(u8::MAX) > u64::from(u32::MAX) {
            return invalid("sma_width", "window too wide for the accumulator");
        }
        if self.peak_search_range == 0 {
            return invalid("peak_search_range", "must be positive");
        }
        if self.shift_limit >= self.num_samples {
            return invalid("shift_limit", "must be lower than num_samples");
        }
        if self.shift_limit < 3 * self.peak_search_range {
            return invalid("shift_limit", "must hold at least three search windows");
        }
        if self.peak_tracking_limit == 0 {
            return invalid("peak_tracking_limit", "must be positive");
        }
        // A running sum may overshoot the threshold by one full-scale term.
        if self.interference_threshold < 0
            || self.interference_threshold > i32::MAX - i32::from(u8::MAX)
        {
            return invalid("interference_threshold", "out of range");
        }
        if !(self.fallback_period.is_finite() && self.fallback_period > 0.0) {
            return invalid("fallback_period", "must be positive and finite");
        }
        Ok(())
    }
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self::DEFAULT
    }
}
