//! # Tuner Runtime
//!
//! The two permanently running execution contexts of the tuner.
//!
//! ## Architecture
//! - **Analysis thread**: waits for a captured block, smooths it, hands the
//!   region straight back to capture, estimates the frequency and pushes it
//!   into the handoff channel.
//! - **Output thread**: sleeps on the handoff channel, then drains every
//!   queued estimate, classifies it and updates the indicators.
//! - **Communication**: the handoff channel is the only state the two
//!   threads share.
//!
//! Both loops end when their input goes away: the analysis loop when the
//! capture source closes, the output loop when the analysis loop has exited
//! and the channel is empty.

use std::thread::{self, JoinHandle};
use std::time::Instant;

use log::{debug, info, warn};

use crate::capture::BlockSource;
use crate::config::{AnalysisParams, HANDOFF_CAPACITY};
use crate::error::{Result, TunerError};
use crate::handoff::{self, FrequencyReceiver, FrequencySender};
use crate::output::IndicatorSink;
use crate::pipeline::FrequencyPipeline;
use crate::tuning;

/// Counters reported by the analysis loop when it stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnalysisStats {
    /// Blocks analysed and pushed.
    pub blocks: u64,
    /// Passes that took longer than one capture period.
    pub overruns: u64,
}

/// Counters reported by the output loop when it stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputStats {
    /// Estimates received.
    pub values: u64,
    /// Estimates that could not be classified.
    pub unclassified: u64,
    /// Times the loop woke up to drain the channel.
    pub wakeups: u64,
}

/// Producer context: capture block in, frequency estimate out.
pub struct AnalysisLoop<S> {
    source: S,
    pipeline: FrequencyPipeline,
    sender: FrequencySender,
}

impl<S: BlockSource> AnalysisLoop<S> {
    pub fn new(source: S, pipeline: FrequencyPipeline, sender: FrequencySender) -> Self {
        Self {
            source,
            pipeline,
            sender,
        }
    }

    /// Runs until the source closes or the output side disconnects.
    ///
    /// A pass slower than the capture period is logged and counted; the
    /// estimate is still delivered.
    ///
    /// # Errors
    /// Propagates source failures other than closing, and raw blocks of the
    /// wrong length.
    pub fn run(mut self) -> Result<AnalysisStats> {
        let budget = self.pipeline.params().block_period();
        let mut stats = AnalysisStats::default();
        info!("analysis loop started, {budget:?} per block");

        loop {
            let block = match self.source.next_block() {
                Ok(block) => block,
                Err(TunerError::SourceClosed) => {
                    info!("capture source closed");
                    break;
                }
                Err(e) => return Err(e),
            };
            let started = Instant::now();

            self.pipeline.smooth(&block)?;
            // The region can be overwritten from here on.
            block.release();

            let frequency = self.pipeline.estimate();

            let elapsed = started.elapsed();
            if elapsed > budget {
                stats.overruns += 1;
                warn!("analysis pass took {elapsed:?}, capture period is {budget:?}");
            }

            if self.sender.push(frequency).is_err() {
                info!("output side disconnected");
                break;
            }
            stats.blocks += 1;
        }

        info!(
            "analysis loop stopped after {} blocks, {} overruns",
            stats.blocks, stats.overruns
        );
        Ok(stats)
    }
}

/// Consumer context: frequency estimate in, indicators out.
pub struct OutputLoop<O> {
    receiver: FrequencyReceiver,
    sink: O,
}

impl<O: IndicatorSink> OutputLoop<O> {
    pub fn new(receiver: FrequencyReceiver, sink: O) -> Self {
        Self { receiver, sink }
    }

    /// Runs until the analysis side disconnects and every queued value has
    /// been shown. Sink failures are logged and do not stop the loop.
    pub fn run(mut self) -> OutputStats {
        let mut stats = OutputStats::default();
        let sink = &mut self.sink;

        while self
            .receiver
            .drain(|frequency| {
                stats.values += 1;
                debug!("received {frequency:.2} Hz");
                let shown = match tuning::classify(frequency) {
                    Some(reading) => sink.show(&reading),
                    None => {
                        stats.unclassified += 1;
                        debug!("{frequency} Hz has no pitch class");
                        sink.no_pitch(frequency)
                    }
                };
                if let Err(e) = shown {
                    warn!("failed to update indicators: {e}");
                }
            })
            .is_ok()
        {
            stats.wakeups += 1;
        }

        info!(
            "output loop stopped after {} values ({} unclassified)",
            stats.values, stats.unclassified
        );
        stats
    }
}

/// Combined counters of both contexts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TunerStats {
    pub analysis: AnalysisStats,
    pub output: OutputStats,
}

/// Handle to the running analysis and output threads.
#[derive(Debug)]
pub struct Tuner {
    analysis: JoinHandle<Result<AnalysisStats>>,
    output: JoinHandle<OutputStats>,
}

impl Tuner {
    /// Starts the analysis and output threads.
    ///
    /// # Errors
    /// Returns an error if the parameters are invalid or a thread cannot be
    /// spawned.
    pub fn spawn<S, O>(source: S, sink: O, params: AnalysisParams) -> Result<Self>
    where
        S: BlockSource + Send + 'static,
        O: IndicatorSink + Send + 'static,
    {
        let pipeline = FrequencyPipeline::new(params)?;
        let (sender, receiver) = handoff::channel(HANDOFF_CAPACITY);

        let output = thread::Builder::new()
            .name("output".into())
            .spawn(move || OutputLoop::new(receiver, sink).run())?;
        let analysis = thread::Builder::new()
            .name("analysis".into())
            .spawn(move || AnalysisLoop::new(source, pipeline, sender).run())?;

        Ok(Self { analysis, output })
    }

    /// Waits for both threads to finish.
    ///
    /// # Errors
    /// Returns the analysis loop's error, or [`TunerError::WorkerPanicked`]
    /// if either thread panicked.
    pub fn join(self) -> Result<TunerStats> {
        let analysis = self
            .analysis
            .join()
            .map_err(|_| TunerError::WorkerPanicked("analysis"))?;
        // The output thread ends once the analysis thread has dropped its
        // sender, whichever way it stopped.
        let output = self
            .output
            .join()
            .map_err(|_| TunerError::WorkerPanicked("output"))?;

        Ok(TunerStats {
            analysis: analysis?,
            output,
        })
    }
}
