//! # Frequency Pipeline
//!
//! Runs the four analysis stages on one block:
//! smoothing, interference scan, peak extraction and period estimation.
//!
//! `FrequencyPipeline` owns its working buffers, sized once from the
//! parameters, so a pass never allocates. Every buffer is overwritten by
//! each pass; nothing carries over from one block to the next.

use log::debug;

use crate::config::AnalysisParams;
use crate::error::{Result, TunerError};
use crate::interference;
use crate::peaks::{self, PeakSet};
use crate::period;
use crate::smoothing;

#[derive(Debug, Clone)]
pub struct FrequencyPipeline {
    params: AnalysisParams,
    smoothed: Vec<u8>,
    profile: Vec<i32>,
    peaks: PeakSet,
}

impl FrequencyPipeline {
    /// Creates a pipeline with buffers sized for `params`.
    ///
    /// # Errors
    /// Returns [`TunerError::InvalidParams`] if the parameters are inconsistent.
    pub fn new(params: AnalysisParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            params,
            smoothed: vec![0; params.num_samples],
            profile: vec![0; params.num_samples],
            peaks: PeakSet::with_limit(params.peak_tracking_limit),
        })
    }

    pub fn params(&self) -> &AnalysisParams {
        &self.params
    }

    /// Smooths a raw block into the pipeline's working buffer. Once this
    /// returns, the raw block is no longer needed and can go back to capture.
    ///
    /// # Errors
    /// Returns [`TunerError::BlockLength`] if `raw` is not `N + M` samples long.
    pub fn smooth(&mut self, raw: &[u8]) -> Result<()> {
        let expected = self.params.raw_block_len();
        if raw.len() != expected {
            return Err(TunerError::BlockLength {
                expected,
                actual: raw.len(),
            });
        }
        smoothing::smooth_block(raw, self.params.sma_width, &mut self.smoothed);
        Ok(())
    }

    /// Estimates the frequency of the most recently smoothed block.
    pub fn estimate(&mut self) -> f32 {
        let params = &self.params;

        interference::scan_into(&self.smoothed, params.interference_threshold, &mut self.profile);
        peaks::find_peaks(
            &self.profile,
            params.shift_limit,
            params.peak_search_range,
            &mut self.peaks,
        );

        let period = period::average_period(self.peaks.as_slice(), params.fallback_period);
        let frequency = period::period_to_frequency(params.sample_rate, period);
        debug!(
            "{} peaks, period {period:.2} samples, {frequency:.2} Hz",
            self.peaks.len()
        );
        frequency
    }

    /// Smooths `raw` and estimates its frequency in one call.
    ///
    /// # Errors
    /// Returns [`TunerError::BlockLength`] if `raw` is not `N + M` samples long.
    pub fn process(&mut self, raw: &[u8]) -> Result<f32> {
        self.smooth(raw)?;
        Ok(self.estimate())
    }

    /// Smoothed samples of the last block.
    pub fn smoothed(&self) -> &[u8] {
        &self.smoothed
    }

    /// Interference profile of the last estimate.
    pub fn profile(&self) -> &[i32] {
        &self.profile
    }

    /// Peaks found by the last estimate.
    pub fn peaks(&self) -> &[usize] {
        self.peaks.as_slice()
    }
}

/// Estimates the base frequency of an already smoothed block.
///
/// # Panics
/// If `smoothed` is shorter than `params.shift_limit` or `params` is invalid.
pub fn calculate_freq(smoothed: &[u8], params: &AnalysisParams) -> f32 {
    let profile = interference::scan(smoothed, params.interference_threshold);
    let peaks = peaks::calculate_peaks(
        &profile,
        params.shift_limit,
        params.peak_search_range,
        params.peak_tracking_limit,
    );
    let period = period::average_period(peaks.as_slice(), params.fallback_period);
    period::period_to_frequency(params.sample_rate, period)
}
