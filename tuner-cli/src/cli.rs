use clap::{Parser, ValueEnum};
use log::LevelFilter;
use tuner_core::tone::Waveform;

/// Chromatic tuner: estimates the pitch of the input and shows the nearest
/// note with flat / in tune / sharp lights.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Where the samples come from.
    #[arg(long, value_enum, default_value_t = Source::Tone)]
    pub source: Source,

    /// Frequency of the generated tone in Hz.
    #[arg(long, default_value_t = 440.0)]
    pub tone_freq: f64,

    /// Shape of the generated tone.
    #[arg(long, value_enum, default_value_t = WaveformArg::Sine)]
    pub waveform: WaveformArg,

    /// Peak amplitude of the generated tone in ADC codes around 128.
    #[arg(long, default_value_t = 100.0, value_parser = parse_amplitude)]
    pub amplitude: f64,

    /// Stop after this many tone blocks. Runs forever if omitted.
    #[arg(long)]
    pub blocks: Option<u64>,

    /// How readings are shown.
    #[arg(long, value_enum, default_value_t = OutputFormat::Display)]
    pub output: OutputFormat,

    /// Log level: off, error, warn, info, debug, trace.
    #[arg(long, default_value = "warn", value_parser = parse_log_level)]
    pub log_level: LevelFilter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Source {
    /// Default microphone. Requires --features mic.
    Mic,
    /// Built-in tone generator.
    Tone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum WaveformArg {
    Sine,
    Triangle,
    Square,
}

impl From<WaveformArg> for Waveform {
    fn from(arg: WaveformArg) -> Self {
        match arg {
            WaveformArg::Sine => Waveform::Sine,
            WaveformArg::Triangle => Waveform::Triangle,
            WaveformArg::Square => Waveform::Square,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Seven-segment glyph and indicator lamps.
    Display,
    /// One JSON object per reading.
    Json,
    /// Readings as `info` log records.
    Log,
}

fn parse_log_level(s: &str) -> Result<LevelFilter, String> {
    s.parse().map_err(|_| format!("unknown log level `{s}`"))
}

fn parse_amplitude(s: &str) -> Result<f64, String> {
    let amplitude: f64 = s.parse().map_err(|e| format!("{e}"))?;
    if (0.0..=127.0).contains(&amplitude) {
        Ok(amplitude)
    } else {
        Err(format!("{amplitude} is outside 0..=127"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_generate_a_concert_a() {
        let cli = Cli::try_parse_from(["tuner"]).unwrap();
        assert_eq!(cli.source, Source::Tone);
        assert_eq!(cli.tone_freq, 440.0);
        assert_eq!(cli.waveform, WaveformArg::Sine);
        assert_eq!(cli.output, OutputFormat::Display);
        assert_eq!(cli.blocks, None);
        assert_eq!(cli.log_level, LevelFilter::Warn);
    }

    #[test]
    fn log_output_and_levels() {
        let cli = Cli::try_parse_from(["tuner", "--output", "log", "--log-level", "INFO"]).unwrap();
        assert_eq!(cli.output, OutputFormat::Log);
        assert_eq!(cli.log_level, LevelFilter::Info);
        assert!(Cli::try_parse_from(["tuner", "--log-level", "verbose"]).is_err());
    }

    #[test]
    fn parses_every_flag() {
        let cli = Cli::try_parse_from([
            "tuner",
            "--source",
            "mic",
            "--tone-freq",
            "196",
            "--waveform",
            "triangle",
            "--amplitude",
            "64",
            "--blocks",
            "12",
            "--output",
            "json",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(cli.source, Source::Mic);
        assert_eq!(cli.tone_freq, 196.0);
        assert_eq!(Waveform::from(cli.waveform), Waveform::Triangle);
        assert_eq!(cli.amplitude, 64.0);
        assert_eq!(cli.blocks, Some(12));
        assert_eq!(cli.output, OutputFormat::Json);
        assert_eq!(cli.log_level, LevelFilter::Debug);
    }

    #[test]
    fn rejects_out_of_range_amplitude() {
        assert!(Cli::try_parse_from(["tuner", "--amplitude", "200"]).is_err());
        assert!(Cli::try_parse_from(["tuner", "--amplitude", "loud"]).is_err());
    }
}
