//! Terminal renderings of the tuner's indicators.

use std::io::Write;

use serde_json::json;
use tuner_core::output::IndicatorSink;
use tuner_core::tuning::{Segment, SegmentPattern};
use tuner_core::{Reading, Result, TunerError, TuningIndicator};

fn io_error(e: std::io::Error) -> TunerError {
    TunerError::Output(e.to_string())
}

/// Renders a segment pattern as three rows of text. The decimal point
/// follows the bottom row.
pub fn render_glyph(pattern: SegmentPattern) -> [String; 3] {
    let lit = |segment, on: char| if pattern.is_lit(segment) { on } else { ' ' };

    [
        [' ', lit(Segment::A, '_'), ' '].iter().collect(),
        [lit(Segment::F, '|'), lit(Segment::G, '_'), lit(Segment::B, '|')]
            .iter()
            .collect(),
        [
            lit(Segment::E, '|'),
            lit(Segment::D, '_'),
            lit(Segment::C, '|'),
            lit(Segment::Dp, '.'),
        ]
        .iter()
        .collect(),
    ]
}

/// The three tuning lamps, the active one filled.
pub fn render_lamps(indicator: TuningIndicator) -> String {
    let lamp = |which: TuningIndicator, label: &str| {
        let mark = if which == indicator { '*' } else { ' ' };
        format!("({mark}) {label}")
    };
    format!(
        "{}  {}  {}",
        lamp(TuningIndicator::Flat, "flat"),
        lamp(TuningIndicator::InTune, "in tune"),
        lamp(TuningIndicator::Sharp, "sharp")
    )
}

/// Seven-segment glyph and lamps, redrawn for every reading. An estimate
/// without a pitch class leaves the previous drawing in place.
pub struct TerminalDisplay<W> {
    out: W,
}

impl<W: Write> TerminalDisplay<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> IndicatorSink for TerminalDisplay<W> {
    fn show(&mut self, reading: &Reading) -> Result<()> {
        let [top, middle, bottom] = render_glyph(reading.segments);
        writeln!(self.out, "{top}").map_err(io_error)?;
        writeln!(self.out, "{middle}   {:>8.2} Hz", reading.frequency).map_err(io_error)?;
        writeln!(self.out, "{bottom}  {:+6.1} cents", reading.cents).map_err(io_error)?;
        writeln!(self.out, "{}", render_lamps(reading.indicator)).map_err(io_error)?;
        writeln!(self.out).map_err(io_error)?;
        self.out.flush().map_err(io_error)
    }
}

/// One JSON object per line.
pub struct JsonLines<W> {
    out: W,
}

impl<W: Write> JsonLines<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_value<T: serde::Serialize>(&mut self, value: &T) -> Result<()> {
        serde_json::to_writer(&mut self.out, value).map_err(|e| TunerError::Output(e.to_string()))?;
        writeln!(self.out).map_err(io_error)?;
        self.out.flush().map_err(io_error)
    }
}

impl<W: Write> IndicatorSink for JsonLines<W> {
    fn show(&mut self, reading: &Reading) -> Result<()> {
        self.write_value(reading)
    }

    fn no_pitch(&mut self, frequency: f32) -> Result<()> {
        self.write_value(&json!({ "frequency": frequency, "pitch_class": null }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tuner_core::PitchClass;
    use tuner_core::tuning::classify;

    #[test]
    fn renders_a() {
        assert_eq!(render_glyph(PitchClass::A.segments()), [" _ ", "|_|", "| | "]);
    }

    #[test]
    fn sharp_classes_light_the_decimal_point() {
        assert_eq!(render_glyph(PitchClass::ASharp.segments()), [" _ ", "|_|", "| |."]);
        assert_eq!(render_glyph(PitchClass::C.segments()), [" _ ", "|  ", "|_  "]);
    }

    #[test]
    fn only_the_active_lamp_is_filled() {
        assert_eq!(render_lamps(TuningIndicator::InTune), "( ) flat  (*) in tune  ( ) sharp");
    }

    #[test]
    fn terminal_display_draws_glyph_and_lamps() {
        let reading = classify(440.0).unwrap();
        let mut display = TerminalDisplay::new(Vec::new());
        display.show(&reading).unwrap();

        let text = String::from_utf8(display.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], " _ ");
        assert!(lines[1].starts_with("|_|"));
        assert!(lines[1].contains("440.00 Hz"));
        assert!(lines[2].starts_with("| | "));
        assert!(lines[3].contains("(*) in tune"));
    }

    #[test]
    fn terminal_display_ignores_unclassified_estimates() {
        let mut display = TerminalDisplay::new(Vec::new());
        display.no_pitch(f32::NAN).unwrap();
        assert!(display.into_inner().is_empty());
    }

    #[test]
    fn json_lines_writes_one_object_per_reading() {
        let mut sink = JsonLines::new(Vec::new());
        sink.show(&classify(880.0).unwrap()).unwrap();
        sink.no_pitch(0.0).unwrap();

        let text = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["pitch_class"], "A");
        assert_eq!(lines[0]["indicator"], "in-tune");
        assert_eq!(lines[0]["frequency"], 880.0);
        assert_eq!(lines[1]["pitch_class"], serde_json::Value::Null);
    }
}
