//! # Tone Generator
//!
//! Synthetic capture front end producing 8-bit blocks of a steady tone.
//! Used by the demo mode of the command-line tuner and by tests.

use std::f64::consts::TAU;
use std::thread;
use std::time::{Duration, Instant};

use crate::capture::{BlockReader, BlockSource, BlockWriter, RawBlock, block_pool};
use crate::error::{Result, TunerError};

/// Shape of the generated tone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Triangle,
    Square,
}

impl Waveform {
    /// Value of the waveform in `[-1, 1]` at `phase` cycles.
    pub fn value(self, phase: f64) -> f64 {
        let phase = phase.fract();
        match self {
            Waveform::Sine => (TAU * phase).sin(),
            Waveform::Triangle => 1.0 - 4.0 * (phase - 0.5).abs(),
            Waveform::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
        }
    }
}

/// Block source generating a tone at a fixed frequency.
#[derive(Debug)]
pub struct ToneSource {
    writer: BlockWriter,
    reader: BlockReader,
    waveform: Waveform,
    frequency: f64,
    amplitude: f64,
    sample_rate: u32,
    next_sample: u64,
    remaining: Option<u64>,
    pacing: Option<Pacing>,
}

#[derive(Debug)]
struct Pacing {
    period: Duration,
    next_due: Option<Instant>,
}

impl ToneSource {
    /// Creates a generator of `block_len`-sample blocks. `amplitude` is in
    /// ADC codes around the mid-scale value 128 and is clamped to 0..=127.
    pub fn new(
        waveform: Waveform,
        frequency: f64,
        amplitude: f64,
        sample_rate: u32,
        block_len: usize,
    ) -> Self {
        let (writer, reader) = block_pool(block_len);
        Self {
            writer,
            reader,
            waveform,
            frequency,
            amplitude: amplitude.clamp(0.0, 127.0),
            sample_rate,
            next_sample: 0,
            remaining: None,
            pacing: None,
        }
    }

    /// Stops after `blocks` blocks.
    pub fn with_block_limit(mut self, blocks: u64) -> Self {
        self.remaining = Some(blocks);
        self
    }

    /// Delivers blocks no faster than a real front end would, one per
    /// capture period of `block_len` samples.
    pub fn paced(mut self) -> Self {
        let seconds = self.writer.block_len() as f64 / f64::from(self.sample_rate);
        self.pacing = Some(Pacing {
            period: Duration::from_secs_f64(seconds),
            next_due: None,
        });
        self
    }

    /// Quantised 8-bit sample at absolute sample index `n`.
    fn sample(&self, n: u64) -> u8 {
        let phase = self.frequency * n as f64 / f64::from(self.sample_rate);
        let value = 128.0 + self.amplitude * self.waveform.value(phase);
        value.clamp(0.0, 255.0) as u8
    }

    fn wait_for_capture(&mut self) {
        if let Some(pacing) = self.pacing.as_mut() {
            let now = Instant::now();
            let due = pacing.next_due.unwrap_or(now);
            if due > now {
                thread::sleep(due - now);
            }
            pacing.next_due = Some(due.max(now) + pacing.period);
        }
    }
}

impl BlockSource for ToneSource {
    /// Generates the next block. At most one block from this source may be
    /// held at a time beyond the one being returned.
    fn next_block(&mut self) -> Result<RawBlock> {
        match self.remaining {
            Some(0) => return Err(TunerError::SourceClosed),
            Some(ref mut left) => *left -= 1,
            None => {}
        }
        self.wait_for_capture();

        let start = self.next_sample;
        let len = self.writer.block_len();
        let samples: Vec<u8> = (0..len as u64).map(|i| self.sample(start + i)).collect();
        self.writer
            .try_fill_with(|region| region.copy_from_slice(&samples))?;
        self.next_sample += len as u64;

        self.reader.next_block()
    }
}
