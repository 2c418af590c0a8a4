//! # Musical Tuning Module
//!
//! Maps an estimated frequency onto one of the twelve chromatic pitch
//! classes and tells whether it is flat, in tune or sharp.
//!
//! ## Method
//! - Octave folding: the frequency is doubled or halved until it lies in the
//!   reference octave `[LOWER_BOUND, UPPER_BOUND)`, which runs from a
//!   quarter tone below A3 to a quarter tone below A4.
//! - Classification: the reference octave is split into twelve contiguous,
//!   half-open ranges, one per pitch class, each starting a quarter tone
//!   below the class's reference frequency.
//! - Indicator: the folded frequency is compared with the reference within
//!   a fixed tolerance in Hz.

use once_cell::sync::Lazy;
use serde::Serialize;

use crate::config::TUNE_PRECISION;

/// Frequency ratio of a quarter tone, the geometric middle between two
/// adjacent half steps.
pub const QUARTER_TONE_RATIO: f32 = 1.0293;

/// Lowest frequency of the reference octave (a quarter tone below A3).
pub const LOWER_BOUND: f32 = 220.0 / QUARTER_TONE_RATIO;

/// Exclusive upper end of the reference octave (a quarter tone below A4).
/// Exactly one octave above [`LOWER_BOUND`], so folding always lands inside.
pub const UPPER_BOUND: f32 = 2.0 * LOWER_BOUND;

/// One of the twelve chromatic pitch classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PitchClass {
    A,
    #[serde(rename = "A#")]
    ASharp,
    B,
    C,
    #[serde(rename = "C#")]
    CSharp,
    D,
    #[serde(rename = "D#")]
    DSharp,
    E,
    F,
    #[serde(rename = "F#")]
    FSharp,
    G,
    #[serde(rename = "G#")]
    GSharp,
}

impl PitchClass {
    /// All classes in ascending order through the reference octave.
    pub const ALL: [PitchClass; 12] = [
        PitchClass::A,
        PitchClass::ASharp,
        PitchClass::B,
        PitchClass::C,
        PitchClass::CSharp,
        PitchClass::D,
        PitchClass::DSharp,
        PitchClass::E,
        PitchClass::F,
        PitchClass::FSharp,
        PitchClass::G,
        PitchClass::GSharp,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PitchClass::A => "A",
            PitchClass::ASharp => "A#",
            PitchClass::B => "B",
            PitchClass::C => "C",
            PitchClass::CSharp => "C#",
            PitchClass::D => "D",
            PitchClass::DSharp => "D#",
            PitchClass::E => "E",
            PitchClass::F => "F",
            PitchClass::FSharp => "F#",
            PitchClass::G => "G",
            PitchClass::GSharp => "G#",
        }
    }

    /// Equal-tempered frequency of the class inside the reference octave.
    pub fn reference_frequency(self) -> f32 {
        match self {
            PitchClass::A => 220.00,
            PitchClass::ASharp => 233.08,
            PitchClass::B => 246.94,
            PitchClass::C => 261.63,
            PitchClass::CSharp => 277.18,
            PitchClass::D => 293.66,
            PitchClass::DSharp => 311.13,
            PitchClass::E => 329.63,
            PitchClass::F => 349.23,
            PitchClass::FSharp => 369.99,
            PitchClass::G => 392.00,
            PitchClass::GSharp => 415.30,
        }
    }

    /// Segments lit on the display for this class.
    pub fn segments(self) -> SegmentPattern {
        SegmentPattern(match self {
            PitchClass::A => 0b0001_0001,
            PitchClass::ASharp => 0b0001_0000,
            PitchClass::B => 0b1100_0001,
            PitchClass::C => 0b0110_0011,
            PitchClass::CSharp => 0b0110_0010,
            PitchClass::D => 0b1000_0101,
            PitchClass::DSharp => 0b1000_0100,
            PitchClass::E => 0b0110_0001,
            PitchClass::F => 0b0111_0001,
            PitchClass::FSharp => 0b0111_0000,
            PitchClass::G => 0b0100_0011,
            PitchClass::GSharp => 0b0100_0010,
        })
    }

    /// Half-open frequency range of the class in the reference octave.
    pub fn range(self) -> (f32, f32) {
        let range = &PITCH_RANGES[self as usize];
        (range.lower, range.upper)
    }
}

/// A segment of a seven-segment display with decimal point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    /// The decimal point, standing in for the sharp sign.
    Dp,
}

impl Segment {
    pub const ALL: [Segment; 8] = [
        Segment::A,
        Segment::B,
        Segment::C,
        Segment::D,
        Segment::E,
        Segment::F,
        Segment::G,
        Segment::Dp,
    ];

    fn mask(self) -> u8 {
        match self {
            Segment::A => 0b1000_0000,
            Segment::B => 0b0100_0000,
            Segment::C => 0b0010_0000,
            Segment::D => 0b0001_0000,
            Segment::E => 0b0000_1000,
            Segment::F => 0b0000_0100,
            Segment::G => 0b0000_0010,
            Segment::Dp => 0b0000_0001,
        }
    }
}

/// Eight-bit segment encoding for a common-anode display: bit 7 drives
/// segment A through bit 1 for G and bit 0 for the decimal point. A cleared
/// bit lights its segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SegmentPattern(pub u8);

impl SegmentPattern {
    pub fn is_lit(self, segment: Segment) -> bool {
        self.0 & segment.mask() == 0
    }
}

/// Tuning state shown on the three indicator lights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TuningIndicator {
    Flat,
    InTune,
    Sharp,
}

impl TuningIndicator {
    /// Compares `frequency` with `reference` within `tolerance` Hz.
    pub fn from_deviation(frequency: f32, reference: f32, tolerance: f32) -> Self {
        let deviation = frequency - reference;
        if deviation < -tolerance {
            TuningIndicator::Flat
        } else if deviation > tolerance {
            TuningIndicator::Sharp
        } else {
            TuningIndicator::InTune
        }
    }
}

/// A classified frequency estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Reading {
    /// Frequency as estimated, in Hz.
    pub frequency: f32,
    /// Frequency folded into the reference octave.
    pub folded: f32,
    pub pitch_class: PitchClass,
    /// Reference frequency of the class in the reference octave.
    pub reference: f32,
    pub indicator: TuningIndicator,
    /// Deviation of `folded` from `reference` in cents.
    pub cents: f32,
    pub segments: SegmentPattern,
}

#[derive(Debug)]
struct PitchRange {
    class: PitchClass,
    lower: f32,
    upper: f32,
}

/// Classification table computed once: each class's range starts a quarter
/// tone below its reference and ends where the next class starts.
static PITCH_RANGES: Lazy<Vec<PitchRange>> = Lazy::new(|| {
    let lowers: Vec<f32> = PitchClass::ALL
        .iter()
        .map(|class| class.reference_frequency() / QUARTER_TONE_RATIO)
        .collect();

    PitchClass::ALL
        .iter()
        .enumerate()
        .map(|(i, &class)| PitchRange {
            class,
            lower: lowers[i],
            upper: lowers.get(i + 1).copied().unwrap_or(UPPER_BOUND),
        })
        .collect()
});

/// Folds `frequency` into `[LOWER_BOUND, UPPER_BOUND)` by octaves.
///
/// Returns `None` for zero, negative, infinite or NaN input, none of which
/// can be folded.
pub fn fold_octave(frequency: f32) -> Option<f32> {
    if !frequency.is_finite() || frequency <= 0.0 {
        return None;
    }

    let mut folded = frequency;
    while folded < LOWER_BOUND {
        folded *= 2.0;
    }
    while folded >= UPPER_BOUND {
        folded /= 2.0;
    }
    Some(folded)
}

/// Finds the pitch class whose range holds an already folded frequency.
pub fn pitch_class_of(folded: f32) -> Option<PitchClass> {
    PITCH_RANGES
        .iter()
        .find(|range| range.lower <= folded && folded < range.upper)
        .map(|range| range.class)
}

/// Folds and classifies a frequency estimate.
///
/// Returns `None` when the frequency cannot be folded; every positive,
/// finite frequency is classified.
pub fn classify(frequency: f32) -> Option<Reading> {
    let folded = fold_octave(frequency)?;
    let pitch_class = pitch_class_of(folded)?;
    let reference = pitch_class.reference_frequency();

    Some(Reading {
        frequency,
        folded,
        pitch_class,
        reference,
        indicator: TuningIndicator::from_deviation(folded, reference, TUNE_PRECISION),
        cents: calculate_cents_deviation(folded, reference),
        segments: pitch_class.segments(),
    })
}

/// Calculates the deviation from a target frequency in cents.
///
/// Cents are a logarithmic unit of pitch measurement where:
/// - 100 cents = 1 semitone
/// - 1200 cents = 1 octave
/// - Positive values indicate sharpness, negative values indicate flatness
pub fn calculate_cents_deviation(freq: f32, target_freq: f32) -> f32 {
    1200.0 * (freq / target_freq).log2()
}
