//! Speed estimation over bytes/duration histories.

use std::ops::{Add, AddAssign};

use crate::core::ring_buffer::RingBuffer;
use crate::util::size::MB;

/// Upper clamp for any reported speed, in bytes per millisecond.
pub const MAX_SPEED: f64 = (1024 * MB) as f64;

/// Lower clamp for any reported speed, in bytes per millisecond.
pub const MIN_SPEED: f64 = 1.0;

/// `bytes` processed over `duration` milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BytesAndDuration {
    /// Bytes processed.
    pub bytes: u64,
    /// Time taken, in milliseconds.
    pub duration: f64,
}

impl BytesAndDuration {
    /// Create a new sample.
    pub const fn new(bytes: u64, duration: f64) -> Self {
        Self { bytes, duration }
    }

    /// A sample with no bytes and no time.
    pub const fn zero() -> Self {
        Self::new(0, 0.0)
    }

    /// Unclamped rate of this single sample, or 0 if no time elapsed.
    pub fn rate(&self) -> f64 {
        if self.duration == 0.0 {
            0.0
        } else {
            self.bytes as f64 / self.duration
        }
    }
}

impl Add for BytesAndDuration {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            bytes: self.bytes.saturating_add(other.bytes),
            duration: self.duration + other.duration,
        }
    }
}

impl AddAssign for BytesAndDuration {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

/// Average speed of `history` plus the in-progress `current` sample.
///
/// History is walked from newest to oldest. With a positive `time_ms`,
/// older entries are skipped once the accumulated duration reaches the
/// budget; an entry that only partly fits is still counted whole. `None`
/// or `Some(0.0)` uses the whole history.
///
/// Returns 0 when no time has been accumulated at all, otherwise the
/// rate clamped to [`MIN_SPEED`, `MAX_SPEED`].
pub fn average_speed<const N: usize>(
    history: &RingBuffer<BytesAndDuration, N>,
    current: BytesAndDuration,
    time_ms: Option<f64>,
) -> f64 {
    let budget = time_ms.filter(|t| *t > 0.0);
    let sum = history.fold_newest_first(current, |acc, sample| match budget {
        Some(limit) if acc.duration >= limit => acc,
        _ => acc + *sample,
    });

    if sum.duration == 0.0 {
        return 0.0;
    }
    let speed = sum.bytes as f64 / sum.duration;
    if speed.is_nan() {
        return MIN_SPEED;
    }
    speed.clamp(MIN_SPEED, MAX_SPEED)
}
