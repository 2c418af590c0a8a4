//! Integration tests for the two-thread tuner runtime

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use approx::assert_relative_eq;
use tuner_core::capture::{BlockSource, block_pool};
use tuner_core::config::{AnalysisParams, SAMPLE_RATE};
use tuner_core::handoff;
use tuner_core::output::IndicatorSink;
use tuner_core::runtime::{AnalysisLoop, OutputLoop};
use tuner_core::tone::{ToneSource, Waveform};
use tuner_core::{
    FrequencyPipeline, PitchClass, Reading, Result, Tuner, TunerError, TuningIndicator,
};

/// Sink recording everything it is asked to show.
#[derive(Clone, Default)]
struct RecordingSink {
    readings: Arc<Mutex<Vec<Reading>>>,
    unclassified: Arc<Mutex<Vec<f32>>>,
}

impl IndicatorSink for RecordingSink {
    fn show(&mut self, reading: &Reading) -> Result<()> {
        self.readings.lock().unwrap().push(*reading);
        Ok(())
    }

    fn no_pitch(&mut self, frequency: f32) -> Result<()> {
        self.unclassified.lock().unwrap().push(frequency);
        Ok(())
    }
}

/// Sink that always fails.
struct BrokenSink;

impl IndicatorSink for BrokenSink {
    fn show(&mut self, _reading: &Reading) -> Result<()> {
        Err(TunerError::Output("display unplugged".into()))
    }
}

fn tone(frequency: f64, blocks: u64) -> ToneSource {
    let params = AnalysisParams::DEFAULT;
    ToneSource::new(Waveform::Sine, frequency, 100.0, SAMPLE_RATE, params.raw_block_len())
        .with_block_limit(blocks)
}

#[test]
fn tuner_classifies_a_steady_tone() {
    let sink = RecordingSink::default();
    let tuner = Tuner::spawn(tone(440.0, 5), sink.clone(), AnalysisParams::DEFAULT).unwrap();
    let stats = tuner.join().unwrap();

    assert_eq!(stats.analysis.blocks, 5);
    assert_eq!(stats.output.values, 5);
    assert_eq!(stats.output.unclassified, 0);

    let readings = sink.readings.lock().unwrap();
    assert_eq!(readings.len(), 5);
    for reading in readings.iter() {
        assert_eq!(reading.pitch_class, PitchClass::A);
        assert_eq!(reading.indicator, TuningIndicator::InTune);
        assert_relative_eq!(reading.frequency, 440.0, max_relative = 0.01);
    }
}

#[test]
fn tuner_reports_a_flat_e() {
    let sink = RecordingSink::default();
    let tuner = Tuner::spawn(tone(328.0, 2), sink.clone(), AnalysisParams::DEFAULT).unwrap();
    tuner.join().unwrap();

    let readings = sink.readings.lock().unwrap();
    assert_eq!(readings.len(), 2);
    assert!(
        readings
            .iter()
            .all(|r| r.pitch_class == PitchClass::E && r.indicator == TuningIndicator::Flat)
    );
}

#[test]
fn estimates_arrive_in_capture_order() {
    let params = AnalysisParams::DEFAULT;
    let (writer, reader) = block_pool(params.raw_block_len());
    let (sender, receiver) = handoff::channel(1);
    let sink = RecordingSink::default();

    let analysis = thread::spawn(move || {
        AnalysisLoop::new(reader, FrequencyPipeline::new(params).unwrap(), sender).run()
    });
    let output = {
        let sink = sink.clone();
        thread::spawn(move || OutputLoop::new(receiver, sink).run())
    };

    let frequencies = [110.0, 261.63, 329.63, 440.0, 220.0];
    for frequency in frequencies {
        let mut source =
            ToneSource::new(Waveform::Sine, frequency, 100.0, SAMPLE_RATE, params.raw_block_len());
        let block = source.next_block().unwrap();
        writer.fill_with(|region| region.copy_from_slice(&block)).unwrap();
    }
    drop(writer);

    let analysis_stats = analysis.join().unwrap().unwrap();
    let output_stats = output.join().unwrap();
    assert_eq!(analysis_stats.blocks, 5);
    assert_eq!(output_stats.values, 5);

    let readings = sink.readings.lock().unwrap();
    let received: Vec<f32> = readings.iter().map(|r| r.frequency).collect();
    assert_eq!(received.len(), frequencies.len());
    for (got, expected) in received.iter().zip(frequencies) {
        assert_relative_eq!(*got, expected as f32, max_relative = 0.01);
    }
}

#[test]
fn silence_falls_back_to_the_default_period() {
    let params = AnalysisParams::DEFAULT;
    let silence = ToneSource::new(Waveform::Sine, 440.0, 0.0, SAMPLE_RATE, params.raw_block_len())
        .with_block_limit(3);
    let sink = RecordingSink::default();
    Tuner::spawn(silence, sink.clone(), params).unwrap().join().unwrap();

    // 44 kHz over the 100-sample fallback period
    let readings = sink.readings.lock().unwrap();
    assert_eq!(readings.len(), 3);
    assert!(readings.iter().all(|r| r.frequency == 440.0));
}

#[test]
fn sink_failures_do_not_stop_the_output_loop() {
    let tuner = Tuner::spawn(tone(261.63, 4), BrokenSink, AnalysisParams::DEFAULT).unwrap();
    let stats = tuner.join().unwrap();
    assert_eq!(stats.output.values, 4);
}

#[test]
fn wrong_block_length_stops_analysis_with_an_error() {
    let params = AnalysisParams::DEFAULT;
    let short = ToneSource::new(Waveform::Sine, 440.0, 100.0, SAMPLE_RATE, 100).with_block_limit(1);
    let tuner = Tuner::spawn(short, RecordingSink::default(), params).unwrap();
    assert!(matches!(
        tuner.join(),
        Err(TunerError::BlockLength { expected: 1520, actual: 100 })
    ));
}

#[test]
fn invalid_params_fail_before_spawning() {
    let params = AnalysisParams {
        shift_limit: 10,
        ..AnalysisParams::DEFAULT
    };
    let result = Tuner::spawn(tone(440.0, 1), RecordingSink::default(), params);
    assert!(matches!(result, Err(TunerError::InvalidParams { .. })));
}

#[test]
fn regions_return_to_capture_before_the_estimate_is_handed_off() {
    let params = AnalysisParams::DEFAULT;
    let (writer, reader) = block_pool(params.raw_block_len());
    writer.fill_with(|region| region.fill(128)).unwrap();
    writer.fill_with(|region| region.fill(128)).unwrap();

    // Never drained: the second push blocks with its block already analysed.
    let (sender, receiver) = handoff::channel(1);
    let analysis = thread::spawn(move || {
        AnalysisLoop::new(reader, FrequencyPipeline::new(params).unwrap(), sender).run()
    });

    let deadline = Instant::now() + Duration::from_secs(5);
    let mut refilled = 0;
    while refilled < 2 && Instant::now() < deadline {
        if writer.try_fill_with(|region| region.fill(128)).is_ok() {
            refilled += 1;
        } else {
            thread::sleep(Duration::from_millis(1));
        }
    }
    assert_eq!(refilled, 2, "both regions should be free while analysis waits on the handoff");
    assert_eq!(receiver.len(), 1);

    drop(receiver);
    let stats = analysis.join().unwrap().unwrap();
    assert_eq!(stats.blocks, 1);
}
