// navslam_sim/src/simulation/debugging/state_error.rs

use std::collections::VecDeque;

/// Tracks the Euclidean distance between the true and the estimated position.
///
/// Keeps a bounded rolling window for plotting plus running statistics over
/// the whole run.
#[derive(Debug, Clone)]
pub struct EstimationErrorTracker {
    history: VecDeque<f64>,
    capacity: usize,
    count: u64,
    sum: f64,
    sum_sq: f64,
    max: f64,
}

impl EstimationErrorTracker {
    pub fn new(capacity: usize) -> Self {
        Self {
            history: VecDeque::with_capacity(capacity),
            capacity,
            count: 0,
            sum: 0.0,
            sum_sq: 0.0,
            max: 0.0,
        }
    }

    pub fn record(&mut self, error: f64) {
        if self.capacity > 0 {
            if self.history.len() == self.capacity {
                self.history.pop_front();
            }
            self.history.push_back(error);
        }
        self.count += 1;
        self.sum += error;
        self.sum_sq += error * error;
        self.max = self.max.max(error);
    }

    /// The most recent errors, oldest first.
    pub fn history(&self) -> &VecDeque<f64> {
        &self.history
    }

    pub fn latest(&self) -> Option<f64> {
        self.history.back().copied()
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }

    pub fn rmse(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            (self.sum_sq / self.count as f64).sqrt()
        }
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_history_is_bounded_and_statistics_cover_everything() {
        let mut tracker = EstimationErrorTracker::new(3);
        for e in [1.0, 2.0, 3.0, 4.0] {
            tracker.record(e);
        }
        let history: Vec<f64> = tracker.history().iter().copied().collect();
        assert_eq!(history, vec![2.0, 3.0, 4.0]);
        assert_eq!(tracker.latest(), Some(4.0));
        assert_eq!(tracker.count(), 4);
        assert_abs_diff_eq!(tracker.mean(), 2.5);
        assert_abs_diff_eq!(tracker.rmse(), 7.5_f64.sqrt(), epsilon = 1e-12);
        assert_eq!(tracker.max(), 4.0);
    }

    #[test]
    fn test_empty_tracker() {
        let tracker = EstimationErrorTracker::new(10);
        assert_eq!(tracker.latest(), None);
        assert_eq!(tracker.mean(), 0.0);
        assert_eq!(tracker.rmse(), 0.0);
    }
}
