//! Ordered IQ sample queue used by streaming sessions

use std::collections::VecDeque;

use num_complex::Complex64;

use crate::error::{RfiError, RfiResult};

/// FIFO queue of complex samples awaiting dispatch
///
/// Samples leave the queue only through [`SampleQueue::take_front`], which
/// always removes the oldest samples and leaves the remainder in arrival
/// order.
#[derive(Debug, Default, Clone)]
pub struct SampleQueue {
    data: VecDeque<Complex64>,
}

impl SampleQueue {
    /// Create an empty queue with room for `capacity` samples
    pub fn new(capacity: usize) -> Self {
        Self {
            data: VecDeque::with_capacity(capacity),
        }
    }

    /// Append interleaved `[I, Q, I, Q, ...]` values
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if `values` does not hold whole pairs; nothing
    /// is appended in that case.
    pub fn push_interleaved(&mut self, values: &[f64]) -> RfiResult<()> {
        if values.len() % 2 != 0 {
            return Err(RfiError::InvalidInput(format!(
                "chunk of {} values cannot be split into I/Q pairs",
                values.len()
            )));
        }
        self.data.extend(
            values
                .chunks_exact(2)
                .map(|pair| Complex64::new(pair[0], pair[1])),
        );
        Ok(())
    }

    /// Append complex samples
    pub fn push_samples(&mut self, samples: &[Complex64]) {
        self.data.extend(samples.iter().copied());
    }

    /// Number of queued samples
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Remove and return the oldest `n` samples
    ///
    /// Returns `None` (and leaves the queue untouched) when fewer than `n`
    /// samples are queued. Afterwards the queue holds exactly the samples
    /// that followed the taken slice, in the same order.
    pub fn take_front(&mut self, n: usize) -> Option<Vec<Complex64>> {
        if n > self.data.len() {
            return None;
        }
        Some(self.data.drain(..n).collect())
    }

    /// Drop every queued sample
    pub fn clear(&mut self) {
        self.data.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(start: usize, len: usize) -> Vec<f64> {
        (start..start + len)
            .flat_map(|i| [i as f64, -(i as f64)])
            .collect()
    }

    #[test]
    fn test_take_front_retains_remainder() {
        let mut q = SampleQueue::new(16);
        q.push_interleaved(&ramp(0, 10)).unwrap();

        let head = q.take_front(4).unwrap();
        assert_eq!(head.len(), 4);
        assert_eq!(head[3], Complex64::new(3.0, -3.0));
        assert_eq!(q.len(), 6);

        let rest = q.take_front(6).unwrap();
        assert_eq!(rest[0], Complex64::new(4.0, -4.0));
        assert!(q.is_empty());
    }

    #[test]
    fn test_take_front_insufficient() {
        let mut q = SampleQueue::default();
        q.push_interleaved(&ramp(0, 3)).unwrap();
        assert!(q.take_front(4).is_none());
        assert_eq!(q.len(), 3);
    }

    #[test]
    fn test_odd_chunk_rejected() {
        let mut q = SampleQueue::default();
        assert!(q.push_interleaved(&[1.0, 2.0, 3.0]).is_err());
        assert!(q.is_empty());
    }

    #[test]
    fn test_order_preserved_across_pushes() {
        let mut q = SampleQueue::default();
        q.push_interleaved(&ramp(0, 5)).unwrap();
        q.push_samples(&[Complex64::new(5.0, -5.0)]);
        q.push_interleaved(&ramp(6, 2)).unwrap();

        let all = q.take_front(8).unwrap();
        for (i, s) in all.iter().enumerate() {
            assert_eq!(s.re, i as f64);
        }
    }
}
