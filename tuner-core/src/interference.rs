//! # Interference Module
//!
//! Self-interference scan of a smoothed block. If a signal is periodic with
//! a period of P samples, subtracting a copy of it shifted by P, 2P, 3P...
//! cancels it out. The score of a shift is the sum of absolute differences
//! between the block and its shifted copy; shifts close to a multiple of the
//! period score low.
//!
//! Scores are not normalised by the number of compared samples, only their
//! ordering matters. Summation stops as soon as a score passes the
//! threshold, and the shift is marked [`EXCEEDED`].

/// Score of a shift whose running sum passed the threshold. It compares
/// greater than every finite score and equal to itself.
pub const EXCEEDED: i32 = i32::MAX;

/// Calculates the interference power of `samples` with itself shifted by
/// `shift`, or [`EXCEEDED`] once the running sum goes above `threshold`.
///
/// A shift of `samples.len()` or more compares nothing and scores 0.
pub fn interference_power(samples: &[u8], shift: usize, threshold: i32) -> i32 {
    let shifted = samples.get(shift..).unwrap_or(&[]);
    let mut power: i32 = 0;
    for (&a, &b) in samples.iter().zip(shifted) {
        power += i32::from(a.abs_diff(b));
        if power > threshold {
            return EXCEEDED;
        }
    }
    power
}

/// Fills `profile[s]` with the interference power of every shift
/// `s in 0..profile.len()`.
///
/// # Panics
/// If `profile` and `samples` differ in length.
pub fn scan_into(samples: &[u8], threshold: i32, profile: &mut [i32]) {
    assert_eq!(
        samples.len(),
        profile.len(),
        "profile needs one score per candidate shift"
    );
    for (shift, score) in profile.iter_mut().enumerate() {
        *score = interference_power(samples, shift, threshold);
    }
}

/// Allocating variant of [`scan_into`].
pub fn scan(samples: &[u8], threshold: i32) -> Vec<i32> {
    let mut profile = vec![0; samples.len()];
    scan_into(samples, threshold, &mut profile);
    profile
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Triangle ramp 0..=50..0 with a period of 100 samples.
    fn triangle(len: usize) -> Vec<u8> {
        (0..len)
            .map(|i| {
                let phase = i % 100;
                phase.min(100 - phase) as u8
            })
            .collect()
    }

    #[test]
    fn zero_shift_scores_zero() {
        let samples = triangle(1500);
        assert_eq!(interference_power(&samples, 0, 3000), 0);
    }

    #[test]
    fn constant_signal_cancels_at_every_shift() {
        let samples = vec![128u8; 200];
        assert!(scan(&samples, 0).iter().all(|&score| score == 0));
    }

    #[test]
    fn sums_absolute_differences_below_threshold() {
        let samples = [0u8, 10, 0, 10, 5];
        // |0-10| + |10-0| + |0-10| + |10-5|
        assert_eq!(interference_power(&samples, 1, 1000), 35);
        // |0-0| + |10-10| + |0-5|
        assert_eq!(interference_power(&samples, 2, 1000), 5);
    }

    #[test]
    fn aborts_when_threshold_is_passed() {
        let samples = [0u8, 200, 0, 200];
        assert_eq!(interference_power(&samples, 1, 399), EXCEEDED);
        // Exactly reaching the threshold is still a finite score
        assert_eq!(interference_power(&samples, 1, 600), 600);
    }

    #[test]
    fn shift_past_the_end_compares_nothing() {
        let samples = [1u8, 2, 3];
        assert_eq!(interference_power(&samples, 3, 0), 0);
        assert_eq!(interference_power(&samples, 10, 0), 0);
    }

    #[test]
    fn periodic_block_cancels_at_multiples_of_the_period() {
        let samples = triangle(1500);
        let profile = scan(&samples, 3000);
        assert_eq!(profile.len(), 1500);

        for k in 1..=12 {
            assert_eq!(profile[k * 100], 0, "shift {}", k * 100);
        }
        // One sample off a multiple is a small but finite score
        assert!(profile[99] > 0 && profile[99] < 3000);
        assert!(profile[101] > 0 && profile[101] < 3000);

        // Away from the multiples every score passes the threshold
        for shift in 1..1250usize {
            let distance = (0..=13).map(|k| shift.abs_diff(k * 100)).min().unwrap_or(0);
            if distance >= 15 {
                assert_eq!(profile[shift], EXCEEDED, "shift {shift}");
            }
        }
    }
}
