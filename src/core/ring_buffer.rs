//! Fixed-capacity ring buffer for sample history.
//!
//! The buffer never allocates: elements live in an inline array and a
//! start cursor plus element count describe the live window. Pushing into
//! a full buffer overwrites the oldest element.

/// Default number of samples kept per history.
pub const RING_BUFFER_SIZE: usize = 10;

/// A bounded history of the most recent `N` values.
///
/// Equality and `Debug` look only at the held elements, oldest first.
#[derive(Clone)]
pub struct RingBuffer<T, const N: usize = RING_BUFFER_SIZE> {
    elements: [T; N],
    start: usize,
    count: usize,
}

impl<T: Copy + Default, const N: usize> RingBuffer<T, N> {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self {
            elements: [T::default(); N],
            start: 0,
            count: 0,
        }
    }
}

impl<T, const N: usize> RingBuffer<T, N> {
    /// Maximum number of elements held.
    pub const CAPACITY: usize = N;

    /// Push a value, evicting the oldest one when full.
    pub fn push(&mut self, value: T) {
        if N == 0 {
            return;
        }
        if self.count == N {
            self.elements[self.start] = value;
            self.start = (self.start + 1) % N;
        } else {
            self.elements[(self.start + self.count) % N] = value;
            self.count += 1;
        }
    }

    /// Forget every element.
    pub fn reset(&mut self) {
        self.start = 0;
        self.count = 0;
    }

    /// Number of elements currently held.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns true if no element is held.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns true if the next push evicts.
    pub fn is_full(&self) -> bool {
        self.count == N
    }

    /// Iterate from oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator + '_ {
        (0..self.count).map(move |i| &self.elements[(self.start + i) % N])
    }

    /// The most recently pushed element.
    pub fn newest(&self) -> Option<&T> {
        self.iter().next_back()
    }

    /// The oldest retained element.
    pub fn oldest(&self) -> Option<&T> {
        self.iter().next()
    }

    /// Fold from newest to oldest, starting from `initial`.
    pub fn fold_newest_first<A, F>(&self, initial: A, f: F) -> A
    where
        F: FnMut(A, &T) -> A,
    {
        self.iter().rev().fold(initial, f)
    }
}

impl<T: PartialEq, const N: usize> PartialEq for RingBuffer<T, N> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: std::fmt::Debug, const N: usize> std::fmt::Debug for RingBuffer<T, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: Copy + Default, const N: usize> Default for RingBuffer<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_iterate() {
        let mut buffer: RingBuffer<u32, 4> = RingBuffer::new();
        assert!(buffer.is_empty());

        buffer.push(1);
        buffer.push(2);
        buffer.push(3);

        assert_eq!(buffer.len(), 3);
        assert!(!buffer.is_full());
        assert_eq!(buffer.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(buffer.oldest(), Some(&1));
        assert_eq!(buffer.newest(), Some(&3));
    }

    #[test]
    fn test_overflow_evicts_oldest() {
        let mut buffer: RingBuffer<u32, 3> = RingBuffer::new();
        for i in 1..=5 {
            buffer.push(i);
        }

        assert!(buffer.is_full());
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.iter().copied().collect::<Vec<_>>(), vec![3, 4, 5]);
    }

    #[test]
    fn test_reset() {
        let mut buffer: RingBuffer<u32> = RingBuffer::new();
        for i in 0..15 {
            buffer.push(i);
        }
        buffer.reset();
        assert_eq!(buffer.len(), 0);
        assert_eq!(buffer.newest(), None);

        buffer.push(42);
        assert_eq!(buffer.iter().copied().collect::<Vec<_>>(), vec![42]);
    }

    #[test]
    fn test_fold_newest_first() {
        let mut buffer: RingBuffer<u32, 3> = RingBuffer::new();
        for i in 1..=4 {
            buffer.push(i);
        }

        let order = buffer.fold_newest_first(Vec::new(), |mut acc, v| {
            acc.push(*v);
            acc
        });
        assert_eq!(order, vec![4, 3, 2]);
    }

    #[test]
    fn test_default_capacity() {
        assert_eq!(RingBuffer::<f64>::CAPACITY, RING_BUFFER_SIZE);
        let mut buffer: RingBuffer<f64> = RingBuffer::default();
        for i in 0..RING_BUFFER_SIZE {
            assert!(!buffer.is_full());
            buffer.push(i as f64);
        }
        assert!(buffer.is_full());
    }

    #[test]
    fn test_equality_ignores_cursor() {
        let mut wrapped: RingBuffer<u32, 3> = RingBuffer::new();
        for i in 1..=4 {
            wrapped.push(i);
        }
        let mut unwrapped: RingBuffer<u32, 3> = RingBuffer::new();
        for i in 2..=4 {
            unwrapped.push(i);
        }
        assert_eq!(wrapped, unwrapped);

        unwrapped.push(5);
        assert_ne!(wrapped, unwrapped);
    }

    #[test]
    fn test_reset_equals_new() {
        let mut buffer: RingBuffer<u32, 3> = RingBuffer::new();
        buffer.push(7);
        buffer.reset();
        assert_eq!(buffer, RingBuffer::new());
        assert_eq!(format!("{:?}", buffer), "[]");

        buffer.push(8);
        assert_eq!(format!("{:?}", buffer), "[8]");
    }

    #[test]
    fn test_zero_capacity_ignores_pushes() {
        let mut buffer: RingBuffer<u8, 0> = RingBuffer::new();
        buffer.push(1);
        assert!(buffer.is_empty());
        assert!(buffer.is_full());
    }
}
