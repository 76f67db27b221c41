//! Allocation throughput tracking.
//!
//! The heap reports free-running allocation counters for new space and the
//! old generation. The tracker diffs consecutive observations, accumulates
//! the deltas until [`AllocationTracker::add_allocation`] closes a period,
//! and keeps the closed periods in bounded histories.

use crate::core::ring_buffer::RingBuffer;
use crate::core::speed::{average_speed, BytesAndDuration};

/// Window used by the `current_*` throughput queries, in milliseconds.
pub const THROUGHPUT_TIME_FRAME_MS: f64 = 5000.0;

/// One reading of the heap's allocation counters.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AllocationObservation {
    /// When the counters were read.
    pub time_ms: f64,
    /// New-space allocation counter.
    pub new_space_bytes: u64,
    /// Old-generation allocation counter.
    pub old_generation_bytes: u64,
}

/// Allocation accumulated since the last closed period.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct PendingAllocation {
    duration: f64,
    new_space_bytes: u64,
    old_generation_bytes: u64,
}

impl PendingAllocation {
    fn new_space(&self) -> BytesAndDuration {
        BytesAndDuration::new(self.new_space_bytes, self.duration)
    }

    fn old_generation(&self) -> BytesAndDuration {
        BytesAndDuration::new(self.old_generation_bytes, self.duration)
    }
}

/// Tracks allocation rates of new space and the old generation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AllocationTracker {
    /// Last observation; `None` until the first sample establishes it.
    baseline: Option<AllocationObservation>,
    pending: PendingAllocation,
    new_space: RingBuffer<BytesAndDuration>,
    old_generation: RingBuffer<BytesAndDuration>,
}

impl AllocationTracker {
    /// Create a tracker with no baseline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe the allocation counters.
    ///
    /// The first observation only establishes the baseline. Counters are
    /// free-running, so the difference wraps instead of saturating.
    pub fn sample_allocation(
        &mut self,
        time_ms: f64,
        new_space_counter_bytes: u64,
        old_generation_counter_bytes: u64,
    ) {
        let current = AllocationObservation {
            time_ms,
            new_space_bytes: new_space_counter_bytes,
            old_generation_bytes: old_generation_counter_bytes,
        };

        let Some(previous) = self.baseline.replace(current) else {
            return;
        };

        self.pending.duration += time_ms - previous.time_ms;
        self.pending.new_space_bytes = self
            .pending
            .new_space_bytes
            .wrapping_add(new_space_counter_bytes.wrapping_sub(previous.new_space_bytes));
        self.pending.old_generation_bytes = self.pending.old_generation_bytes.wrapping_add(
            old_generation_counter_bytes.wrapping_sub(previous.old_generation_bytes),
        );
    }

    /// Close the current period, pushing it into the histories if any time
    /// has passed.
    pub fn add_allocation(&mut self, time_ms: f64) {
        if let Some(baseline) = self.baseline.as_mut() {
            baseline.time_ms = time_ms;
        }
        if self.pending.duration > 0.0 {
            self.new_space.push(self.pending.new_space());
            self.old_generation.push(self.pending.old_generation());
        }
        self.pending = PendingAllocation::default();
    }

    /// New-space allocation rate over the last `time_ms` (all history if `None`).
    pub fn new_space_allocation_throughput(&self, time_ms: Option<f64>) -> f64 {
        average_speed(&self.new_space, self.pending.new_space(), time_ms)
    }

    /// Old-generation allocation rate over the last `time_ms` (all history if `None`).
    pub fn old_generation_allocation_throughput(&self, time_ms: Option<f64>) -> f64 {
        average_speed(&self.old_generation, self.pending.old_generation(), time_ms)
    }

    /// Combined allocation rate of both regions.
    pub fn allocation_throughput(&self, time_ms: Option<f64>) -> f64 {
        self.new_space_allocation_throughput(time_ms)
            + self.old_generation_allocation_throughput(time_ms)
    }

    /// Combined allocation rate over [`THROUGHPUT_TIME_FRAME_MS`].
    pub fn current_allocation_throughput(&self) -> f64 {
        self.allocation_throughput(Some(THROUGHPUT_TIME_FRAME_MS))
    }

    /// Old-generation allocation rate over [`THROUGHPUT_TIME_FRAME_MS`].
    pub fn current_old_generation_allocation_throughput(&self) -> f64 {
        self.old_generation_allocation_throughput(Some(THROUGHPUT_TIME_FRAME_MS))
    }

    /// Last observation, if a baseline exists.
    pub fn last_observation(&self) -> Option<AllocationObservation> {
        self.baseline
    }

    /// Number of closed periods held for new space.
    pub fn recorded_periods(&self) -> usize {
        self.new_space.len()
    }

    /// Drop the baseline and all history.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_and_add(tracker: &mut AllocationTracker, time: f64, new: u64, old: u64) {
        tracker.sample_allocation(time, new, old);
        tracker.add_allocation(time);
    }

    #[test]
    fn test_first_sample_is_baseline_only() {
        let mut tracker = AllocationTracker::new();
        sample_and_add(&mut tracker, 100.0, 1000, 1000);

        assert_eq!(tracker.recorded_periods(), 0);
        assert_eq!(tracker.allocation_throughput(None), 0.0);
        assert_eq!(
            tracker.last_observation(),
            Some(AllocationObservation {
                time_ms: 100.0,
                new_space_bytes: 1000,
                old_generation_bytes: 1000,
            })
        );
    }

    #[test]
    fn test_regions_are_independent() {
        let mut tracker = AllocationTracker::new();
        sample_and_add(&mut tracker, 100.0, 1000, 0);
        sample_and_add(&mut tracker, 200.0, 2000, 0);

        assert_eq!(tracker.new_space_allocation_throughput(None), 10.0);
        // No old-generation bytes, but time has passed: floor of the clamp.
        assert_eq!(tracker.old_generation_allocation_throughput(None), 1.0);
    }

    #[test]
    fn test_zero_elapsed_time_is_not_recorded() {
        let mut tracker = AllocationTracker::new();
        sample_and_add(&mut tracker, 100.0, 1000, 0);
        sample_and_add(&mut tracker, 100.0, 5000, 0);

        assert_eq!(tracker.recorded_periods(), 0);
        assert_eq!(tracker.new_space_allocation_throughput(None), 0.0);
    }

    #[test]
    fn test_pending_samples_count_before_add() {
        let mut tracker = AllocationTracker::new();
        tracker.sample_allocation(0.0, 0, 0);
        tracker.sample_allocation(10.0, 500, 0);
        tracker.sample_allocation(20.0, 1000, 0);

        assert_eq!(tracker.recorded_periods(), 0);
        assert_eq!(tracker.new_space_allocation_throughput(None), 50.0);

        tracker.add_allocation(20.0);
        assert_eq!(tracker.recorded_periods(), 1);
        assert_eq!(tracker.new_space_allocation_throughput(None), 50.0);
    }

    #[test]
    fn test_counter_wraparound() {
        let mut tracker = AllocationTracker::new();
        sample_and_add(&mut tracker, 0.0, u64::MAX - 99, 0);
        sample_and_add(&mut tracker, 10.0, 100, 0);

        assert_eq!(tracker.new_space_allocation_throughput(None), 20.0);
    }

    #[test]
    fn test_current_throughput_window() {
        let mut tracker = AllocationTracker::new();
        sample_and_add(&mut tracker, 0.0, 0, 0);
        // Old period at 1 B/ms, then a long fast period filling the window.
        sample_and_add(&mut tracker, 1000.0, 1000, 0);
        sample_and_add(&mut tracker, 7000.0, 601_000, 0);

        assert_eq!(tracker.current_allocation_throughput(), 100.0 + 1.0);
    }

    #[test]
    fn test_reset_drops_baseline() {
        let mut tracker = AllocationTracker::new();
        sample_and_add(&mut tracker, 100.0, 1000, 0);
        sample_and_add(&mut tracker, 200.0, 2000, 0);
        tracker.reset();

        assert_eq!(tracker, AllocationTracker::new());
        sample_and_add(&mut tracker, 300.0, 5000, 0);
        assert_eq!(tracker.recorded_periods(), 0);
    }

    #[test]
    fn test_equal_histories_compare_equal() {
        // Eleven identical periods wrap the history; ten do not.
        let mut wrapped = AllocationTracker::new();
        for i in 0..=11u64 {
            sample_and_add(&mut wrapped, i as f64, i * 10, i * 10);
        }
        let mut unwrapped = AllocationTracker::new();
        for i in 1..=11u64 {
            sample_and_add(&mut unwrapped, i as f64, i * 10, i * 10);
        }

        assert_eq!(wrapped.recorded_periods(), unwrapped.recorded_periods());
        assert_eq!(wrapped, unwrapped);
    }
}
