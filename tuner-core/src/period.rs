//! # Period Estimation Module
//!
//! Turns peak shifts into one fundamental period. The k-th peak (1-based)
//! is assumed to sit at k periods, so each shift is divided by its harmonic
//! index before averaging. That way the estimate stays on the fundamental
//! even when only some multiples produced clean minima.

/// Calculates the average period, in samples, of the given peaks.
///
/// Returns `fallback` when there are no peaks.
pub fn average_period(peaks: &[usize], fallback: f32) -> f32 {
    if peaks.is_empty() {
        return fallback;
    }

    let sum: f32 = peaks
        .iter()
        .enumerate()
        .map(|(i, &shift)| shift as f32 / (i + 1) as f32)
        .sum();
    sum / peaks.len() as f32
}

/// Converts a period in samples into a frequency in Hz.
///
/// Not guarded against a zero period: peaks are never found below the
/// first search window and the fallback period is validated positive.
pub fn period_to_frequency(sample_rate: u32, period: f32) -> f32 {
    sample_rate as f32 / period
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn no_peaks_returns_fallback() {
        assert_eq!(average_period(&[], 100.0), 100.0);
    }

    #[test]
    fn harmonics_are_normalised_by_their_index() {
        assert_relative_eq!(average_period(&[100, 200, 300, 400], 1.0), 100.0);
        // (168 + 336/2 + 505/3) / 3
        assert_relative_eq!(
            average_period(&[168, 336, 505], 1.0),
            (168.0 + 168.0 + 505.0 / 3.0) / 3.0,
            max_relative = 1e-6
        );
    }

    #[test]
    fn single_peak_is_the_period() {
        assert_relative_eq!(average_period(&[227], 1.0), 227.0);
    }

    #[test]
    fn frequency_from_period() {
        assert_relative_eq!(period_to_frequency(44_000, 100.0), 440.0);
        assert_relative_eq!(period_to_frequency(44_000, 200.0), 220.0);
    }
}
