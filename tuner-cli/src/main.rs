//! # Tuner - command line front end
//!
//! Wires a sample source (microphone or built-in tone generator) and an
//! indicator sink (terminal glyph, JSON lines or log records) to the two
//! tuner threads.

use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, info};
use tuner_core::config::SAMPLE_RATE;
use tuner_core::output::{IndicatorSink, LogSink};
use tuner_core::tone::ToneSource;
use tuner_core::{AnalysisParams, Tuner, TunerStats};

mod cli;
mod display;

use cli::{Cli, OutputFormat, Source};
use display::{JsonLines, TerminalDisplay};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Log output needs at least `info` records to show anything.
    let level = match cli.output {
        OutputFormat::Log => cli.log_level.max(LevelFilter::Info),
        _ => cli.log_level,
    };
    env_logger::Builder::new().filter_level(level).init();

    let params = AnalysisParams::DEFAULT;
    let sink: Box<dyn IndicatorSink + Send> = match cli.output {
        OutputFormat::Display => Box::new(TerminalDisplay::new(io::stdout())),
        OutputFormat::Json => Box::new(JsonLines::new(io::stdout())),
        OutputFormat::Log => Box::new(LogSink),
    };

    let stats = match cli.source {
        Source::Tone => run_tone(&cli, params, sink)?,
        Source::Mic => run_mic(params, sink)?,
    };

    info!(
        "done: {} blocks analysed, {} overruns, {} values shown ({} unclassified)",
        stats.analysis.blocks,
        stats.analysis.overruns,
        stats.output.values,
        stats.output.unclassified
    );
    Ok(())
}

fn run_tone(
    cli: &Cli,
    params: AnalysisParams,
    sink: Box<dyn IndicatorSink + Send>,
) -> Result<TunerStats> {
    info!(
        "generating a {:?} tone at {} Hz, amplitude {}",
        cli.waveform, cli.tone_freq, cli.amplitude
    );
    let mut source = ToneSource::new(
        cli.waveform.into(),
        cli.tone_freq,
        cli.amplitude,
        SAMPLE_RATE,
        params.raw_block_len(),
    )
    .paced();
    if let Some(blocks) = cli.blocks {
        source = source.with_block_limit(blocks);
    }

    let tuner = Tuner::spawn(source, sink, params).context("failed to start the tuner")?;
    tuner.join().context("tuner stopped with an error")
}

#[cfg(feature = "mic")]
fn run_mic(params: AnalysisParams, sink: Box<dyn IndicatorSink + Send>) -> Result<TunerStats> {
    let (stream, reader) =
        tuner_core::audio::start_audio_capture(params.sample_rate, params.raw_block_len())
            .context("failed to start audio capture")?;

    let tuner = Tuner::spawn(reader, sink, params).context("failed to start the tuner")?;
    let stats = tuner.join().context("tuner stopped with an error");
    drop(stream);
    stats
}

#[cfg(not(feature = "mic"))]
fn run_mic(_params: AnalysisParams, _sink: Box<dyn IndicatorSink + Send>) -> Result<TunerStats> {
    anyhow::bail!("microphone input is not compiled in; rebuild with `--features mic`")
}
