//! # Audio Capture Module
//!
//! Microphone front end built on CPAL (Cross-Platform Audio Library).
//! Incoming samples are downmixed to mono, quantised to unsigned 8-bit ADC
//! codes and collected into the double-buffered capture regions read by the
//! analysis context.
//!
//! ## Features
//! - Default input device selection
//! - Any channel count, downmixed to mono
//! - 8-bit quantisation around mid-scale 128
//! - Never blocks the audio callback: samples arriving while both regions
//!   are leased are dropped

use cpal::SupportedStreamConfigRange;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use log::{error, info};

use crate::capture::{BlockAccumulator, BlockReader, block_pool};
use crate::error::{Result, TunerError};

/// Converts a float sample in `[-1, 1]` into an unsigned 8-bit ADC code.
pub fn quantize(sample: f32) -> u8 {
    ((sample.clamp(-1.0, 1.0) + 1.0) * 127.5) as u8
}

fn backend<E: std::fmt::Display>(e: E) -> TunerError {
    TunerError::Audio(e.to_string())
}

/// Starts audio capture from the default input device.
///
/// This function:
/// 1. Selects the default audio input device
/// 2. Picks an f32 configuration that can run at `sample_rate`
/// 3. Feeds every callback's samples into regions of `block_len` samples
///
/// # Returns
/// * `Ok((stream, reader))` - The running stream, which must be kept alive
///   for capture to continue, and the block reader for the analysis context
/// * `Err(e)` - Error if audio setup fails
pub fn start_audio_capture(
    sample_rate: u32,
    block_len: usize,
) -> Result<(cpal::Stream, BlockReader)> {
    let host = cpal::default_host();
    let device = host.default_input_device().ok_or(TunerError::NoInputDevice)?;

    info!("Using audio input device: {}", device.name().map_err(backend)?);

    let configs = device
        .supported_input_configs()
        .map_err(backend)?
        .collect::<Vec<_>>();
    let supported_config = find_supported_config(configs, sample_rate)
        .ok_or(TunerError::UnsupportedConfig(sample_rate))?;

    let config = supported_config.with_sample_rate(cpal::SampleRate(sample_rate));
    let channels = usize::from(config.channels());
    let config: cpal::StreamConfig = config.into();

    info!("Capturing {channels} channel(s) at {sample_rate} Hz");

    let (writer, reader) = block_pool(block_len);
    let mut accumulator = BlockAccumulator::new(writer);

    let err_fn = |err| error!("An error occurred on the audio stream: {err}");

    let stream = device
        .build_input_stream(
            &config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                let mono = data
                    .chunks(channels)
                    .map(|frame| quantize(frame.iter().sum::<f32>() / frame.len() as f32));
                // Fails only once the analysis side is gone; the stream is
                // about to be dropped then.
                let _ = accumulator.push_samples(mono);
            },
            err_fn,
            None,
        )
        .map_err(backend)?;

    stream.play().map_err(backend)?;

    Ok((stream, reader))
}

/// Finds an f32 input configuration whose rate range contains `target_rate`,
/// preferring fewer channels.
fn find_supported_config(
    configs: Vec<SupportedStreamConfigRange>,
    target_rate: u32,
) -> Option<SupportedStreamConfigRange> {
    configs
        .into_iter()
        .filter(|c| {
            c.sample_format() == cpal::SampleFormat::F32
                && c.min_sample_rate().0 <= target_rate
                && target_rate <= c.max_sample_rate().0
        })
        .min_by_key(|c| c.channels())
}
