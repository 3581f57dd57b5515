//! Running median over a bounded number of readings.
//!
//! Values are split between a max-heap holding the lower half and a min-heap
//! holding the upper half, so the median is always at one of the two tops.
//! Once `capacity` readings are stored, further ones are ignored until
//! [`MedianFilter::reset`].

use std::cmp::Reverse;
use std::collections::BinaryHeap;

#[derive(Debug, Clone)]
pub struct MedianFilter {
    capacity: usize,
    lower: BinaryHeap<i64>,
    upper: BinaryHeap<Reverse<i64>>,
}

impl MedianFilter {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            lower: BinaryHeap::with_capacity(capacity / 2 + 1),
            upper: BinaryHeap::with_capacity(capacity / 2 + 1),
        }
    }

    pub fn len(&self) -> usize {
        self.lower.len() + self.upper.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.len() >= self.capacity
    }

    pub fn reset(&mut self) {
        self.lower.clear();
        self.upper.clear();
    }

    /// Adds a reading. Returns `false` if the filter is full and the value
    /// was dropped.
    pub fn add(&mut self, value: i64) -> bool {
        if self.is_full() {
            return false;
        }

        match self.lower.peek() {
            Some(&lower_max) if value > lower_max => self.upper.push(Reverse(value)),
            _ => self.lower.push(value),
        }

        // Keep `lower` equal to `upper` or one larger.
        if self.lower.len() > self.upper.len() + 1 {
            if let Some(v) = self.lower.pop() {
                self.upper.push(Reverse(v));
            }
        } else if self.upper.len() > self.lower.len() {
            if let Some(Reverse(v)) = self.upper.pop() {
                self.lower.push(v);
            }
        }

        true
    }

    /// Median of the stored readings; `0` when empty. For an even count this
    /// is the average of the two middle values, truncated toward zero.
    pub fn result(&self) -> i64 {
        match (self.lower.peek(), self.upper.peek()) {
            (None, _) => 0,
            (Some(&lo), Some(&Reverse(hi))) if self.lower.len() == self.upper.len() => {
                (lo + hi) / 2
            }
            (Some(&lo), _) => lo,
        }
    }
}

impl Extend<i64> for MedianFilter {
    fn extend<I: IntoIterator<Item = i64>>(&mut self, iter: I) {
        for value in iter {
            self.add(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn median_of(values: &[i64]) -> i64 {
        let mut filter = MedianFilter::new(32);
        filter.extend(values.iter().copied());
        filter.result()
    }

    #[test]
    fn test_empty_is_zero() {
        assert_eq!(MedianFilter::new(8).result(), 0);
    }

    #[test]
    fn test_small_counts() {
        assert_eq!(median_of(&[5]), 5);
        assert_eq!(median_of(&[4, 1]), 2);
        assert_eq!(median_of(&[1, 3, 2]), 2);
        assert_eq!(median_of(&[4, 1, 3, 2]), 2);
    }

    #[test]
    fn test_ignores_outliers() {
        assert_eq!(median_of(&[2050, 2055, 2048, 2, 2051, 2058, 2050, 3000]), 2050);
    }

    #[test]
    fn test_matches_sorted_middle() {
        let values = [9, -3, 14, 0, 7, 7, 21, -8, 2, 11, 5];
        let mut sorted = values.to_vec();
        sorted.sort_unstable();
        assert_eq!(median_of(&values), sorted[sorted.len() / 2]);
    }

    #[test]
    fn test_stops_accepting_when_full() {
        let mut filter = MedianFilter::new(3);
        assert!(filter.add(1));
        assert!(filter.add(2));
        assert!(filter.add(3));
        assert!(filter.is_full());
        assert!(!filter.add(100));
        assert!(!filter.add(200));
        assert_eq!(filter.len(), 3);
        assert_eq!(filter.result(), 2);
    }

    #[test]
    fn test_reset() {
        let mut filter = MedianFilter::new(2);
        filter.extend([10, 20]);
        filter.reset();
        assert!(filter.is_empty());
        filter.add(7);
        assert_eq!(filter.result(), 7);
    }
}
