//! # Indicator Output
//!
//! The output context drives a display and three tuning lights through an
//! [`IndicatorSink`]. Sinks are called from the output context only and
//! must not block.

use log::info;

use crate::error::Result;
use crate::tuning::Reading;

pub trait IndicatorSink {
    /// Shows a classified estimate.
    fn show(&mut self, reading: &Reading) -> Result<()>;

    /// Called for an estimate that could not be classified. The default
    /// leaves the indicators as they are.
    fn no_pitch(&mut self, _frequency: f32) -> Result<()> {
        Ok(())
    }
}

impl<S: IndicatorSink + ?Sized> IndicatorSink for Box<S> {
    fn show(&mut self, reading: &Reading) -> Result<()> {
        (**self).show(reading)
    }

    fn no_pitch(&mut self, frequency: f32) -> Result<()> {
        (**self).no_pitch(frequency)
    }
}

/// Sink that reports readings through the `log` facade.
#[derive(Debug, Default)]
pub struct LogSink;

impl IndicatorSink for LogSink {
    fn show(&mut self, reading: &Reading) -> Result<()> {
        info!(
            "{:.2} Hz -> {} ({:.2} Hz, {:+.1} cents, {:?})",
            reading.frequency,
            reading.pitch_class.name(),
            reading.folded,
            reading.cents,
            reading.indicator
        );
        Ok(())
    }

    fn no_pitch(&mut self, frequency: f32) -> Result<()> {
        info!("{frequency} Hz -> no stable pitch");
        Ok(())
    }
}
