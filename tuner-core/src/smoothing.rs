//! # Smoothing Module
//!
//! Simple moving average over raw 8-bit capture blocks. The raw block
//! carries `width` extra lead-in samples, so every output sample has a full
//! window and no boundary handling is needed.

/// Calculates the simple moving average of `width + 1` samples starting at
/// `index`, truncating the result.
///
/// # Panics
/// If `index + width` is out of bounds for `raw`.
pub fn simple_moving_average(raw: &[u8], index: usize, width: usize) -> u8 {
    let sum: u32 = raw[index..=index + width].iter().map(|&s| u32::from(s)).sum();
    // The mean of u8 values always fits in a u8.
    (sum / (width as u32 + 1)) as u8
}

/// Smooths `raw` into `out`, where `out[i]` is the truncated average of
/// `raw[i..=i + width]`.
///
/// Uses a running sum, which gives the same values as calling
/// [`simple_moving_average`] for every index.
///
/// # Panics
/// If `raw.len() != out.len() + width`.
pub fn smooth_block(raw: &[u8], width: usize, out: &mut [u8]) {
    assert_eq!(
        raw.len(),
        out.len() + width,
        "raw block must carry exactly `width` lead-in samples"
    );
    if out.is_empty() {
        return;
    }

    let divisor = width as u32 + 1;
    let mut sum: u32 = raw[..=width].iter().map(|&s| u32::from(s)).sum();
    let last = out.len() - 1;

    for (i, sample) in out.iter_mut().enumerate() {
        *sample = (sum / divisor) as u8;
        if i < last {
            sum += u32::from(raw[i + width + 1]);
            sum -= u32::from(raw[i]);
        }
    }
}

/// Allocating variant of [`smooth_block`].
pub fn smooth(raw: &[u8], width: usize) -> Vec<u8> {
    let mut out = vec![0; raw.len().saturating_sub(width)];
    smooth_block(raw, width, &mut out);
    out
}
