//! # Peak Extraction Module
//!
//! Finds the shifts at which an interference profile has harmonically
//! consistent local minima ("peaks"). Each peak is taken to be one more
//! multiple of the fundamental period.
//!
//! The profile is split into fixed-width, non-overlapping windows starting
//! at shift 0. A window's minimum becomes a peak when it is strictly lower
//! than the minima of both neighbouring windows. The search stops for good
//! at a minimum that still sits on a descending slope, which is how the
//! third harmonic shows up, and once the tracking limit is reached.

use log::debug;

/// Returns the index of the minimum of `profile[begin..begin + range]`.
/// Ties keep the earliest index.
///
/// # Panics
/// If `range` is zero or the window runs past the end of `profile`.
pub fn min_in_range(profile: &[i32], begin: usize, range: usize) -> usize {
    let window = &profile[begin..begin + range];
    let mut min_index = 0;
    for (i, &score) in window.iter().enumerate() {
        if score < window[min_index] {
            min_index = i;
        }
    }
    begin + min_index
}

/// Bounded, ordered set of peak shifts.
///
/// The capacity is fixed when the set is created; pushes beyond it are
/// ignored rather than growing the storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeakSet {
    indices: Vec<usize>,
    limit: usize,
}

impl PeakSet {
    /// Creates an empty set that holds at most `limit` peaks.
    ///
    /// # Panics
    /// If `limit` is zero.
    pub fn with_limit(limit: usize) -> Self {
        assert!(limit > 0, "peak tracking limit must be positive");
        Self {
            indices: Vec::with_capacity(limit),
            limit,
        }
    }

    /// Appends a peak. Returns `false` without storing it if the set is full.
    pub fn push(&mut self, index: usize) -> bool {
        if self.is_full() {
            return false;
        }
        self.indices.push(index);
        true
    }

    pub fn clear(&mut self) {
        self.indices.clear();
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.indices.len() >= self.limit
    }

    /// Peak shifts in ascending order.
    pub fn as_slice(&self) -> &[usize] {
        &self.indices
    }
}

/// Searches `profile[..shift_limit]` for peaks, appending them to `peaks`
/// (which is cleared first) until it is full.
///
/// # Panics
/// If `window` is zero, `shift_limit` exceeds the profile length, or fewer
/// than three windows fit below `shift_limit`.
pub fn find_peaks(profile: &[i32], shift_limit: usize, window: usize, peaks: &mut PeakSet) {
    assert!(window > 0, "peak search window must be positive");
    assert!(
        shift_limit <= profile.len(),
        "shift limit {shift_limit} beyond profile of {}",
        profile.len()
    );
    assert!(
        shift_limit >= 3 * window,
        "shift limit must hold three search windows"
    );
    peaks.clear();

    let mut prev_min = min_in_range(profile, 0, window);
    let mut current_min = min_in_range(profile, window, window);

    let mut start = window;
    while start + 2 * window < shift_limit {
        let next_min = min_in_range(profile, start + window, window);
        let current = profile[current_min];

        if profile[prev_min] > current && profile[next_min] > current {
            // Still descending: give up on the whole block.
            if current_min > 0 && profile[current_min - 1] < current {
                break;
            }

            peaks.push(current_min);
            debug!(
                "local minimum at shift {current_min}, score {current}, peak count {}",
                peaks.len()
            );
            if peaks.is_full() {
                return;
            }
        }

        prev_min = current_min;
        current_min = next_min;
        start += window;
    }
}

/// Allocating variant of [`find_peaks`].
pub fn calculate_peaks(
    profile: &[i32],
    shift_limit: usize,
    window: usize,
    limit: usize,
) -> PeakSet {
    let mut peaks = PeakSet::with_limit(limit);
    find_peaks(profile, shift_limit, window, &mut peaks);
    peaks
}
