//! Rolling statistics over the strikes of recent top movers
//!
//! Two fixed-capacity windows are kept, one fed by positive deltas and one
//! by negative deltas. Mean and population standard deviation are taken
//! over each window's current contents after every update.

use crate::types::{RankedChange, DEFAULT_WINDOW_CAPACITY};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;

/// Bounded FIFO of strikes; the oldest entry is evicted on overflow
#[derive(Debug, Clone, PartialEq)]
pub struct RollingWindow {
    values: VecDeque<f64>,
    capacity: usize,
}

impl RollingWindow {
    /// A capacity of zero is raised to one
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            values: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, value: f64) {
        if self.values.len() == self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied()
    }

    pub fn mean(&self) -> Option<f64> {
        if self.values.is_empty() {
            return None;
        }
        Some(self.values.iter().sum::<f64>() / self.values.len() as f64)
    }

    /// Population standard deviation (divides by `len`, not `len - 1`)
    pub fn std_dev(&self) -> Option<f64> {
        let mean = self.mean()?;
        let variance = self
            .values
            .iter()
            .map(|v| (v - mean).powi(2))
            .sum::<f64>()
            / self.values.len() as f64;
        Some(variance.sqrt())
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}

impl Default for RollingWindow {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_CAPACITY)
    }
}

/// Latest scalars of both windows; `None` while a window is empty
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RollingStats {
    pub mean_pos: Option<f64>,
    pub std_pos: Option<f64>,
    pub mean_neg: Option<f64>,
    pub std_neg: Option<f64>,
}

/// One point of a window's history
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WindowStats {
    pub observed_at: DateTime<Utc>,
    pub mean: f64,
    pub std_dev: f64,
    pub len: usize,
}

#[derive(Debug, Clone)]
pub struct RollingStatsTracker {
    positive: RollingWindow,
    negative: RollingWindow,
    positive_history: Vec<WindowStats>,
    negative_history: Vec<WindowStats>,
}

impl RollingStatsTracker {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_WINDOW_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            positive: RollingWindow::new(capacity),
            negative: RollingWindow::new(capacity),
            positive_history: Vec::new(),
            negative_history: Vec::new(),
        }
    }

    /// Feed one poll's ranked changes and return the refreshed stats.
    ///
    /// A window's history grows by one point for every update that pushed
    /// into it; zero deltas touch neither window.
    pub fn update(&mut self, ranked: &[RankedChange]) -> RollingStats {
        let mut touched_pos = None;
        let mut touched_neg = None;

        for change in ranked {
            if change.delta > 0.0 {
                self.positive.push(change.strike);
                touched_pos = Some(change.observed_at);
            } else if change.delta < 0.0 {
                self.negative.push(change.strike);
                touched_neg = Some(change.observed_at);
            }
        }

        if let Some(observed_at) = touched_pos {
            record(&self.positive, observed_at, &mut self.positive_history);
        }
        if let Some(observed_at) = touched_neg {
            record(&self.negative, observed_at, &mut self.negative_history);
        }

        self.stats()
    }

    pub fn stats(&self) -> RollingStats {
        RollingStats {
            mean_pos: self.positive.mean(),
            std_pos: self.positive.std_dev(),
            mean_neg: self.negative.mean(),
            std_neg: self.negative.std_dev(),
        }
    }

    pub fn positive(&self) -> &RollingWindow {
        &self.positive
    }

    pub fn negative(&self) -> &RollingWindow {
        &self.negative
    }

    pub fn positive_history(&self) -> &[WindowStats] {
        &self.positive_history
    }

    pub fn negative_history(&self) -> &[WindowStats] {
        &self.negative_history
    }

    pub fn reset(&mut self) {
        self.positive.clear();
        self.negative.clear();
        self.positive_history.clear();
        self.negative_history.clear();
    }
}

impl Default for RollingStatsTracker {
    fn default() -> Self {
        Self::new()
    }
}

fn record(window: &RollingWindow, observed_at: DateTime<Utc>, history: &mut Vec<WindowStats>) {
    if let (Some(mean), Some(std_dev)) = (window.mean(), window.std_dev()) {
        history.push(WindowStats {
            observed_at,
            mean,
            std_dev,
            len: window.len(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(strike: f64, delta: f64) -> RankedChange {
        RankedChange {
            strike,
            delta,
            observed_at: Utc::now(),
        }
    }

    #[test]
    fn test_window_mean_and_population_std() {
        let mut window = RollingWindow::new(10);
        for strike in [100.0, 102.0, 104.0] {
            window.push(strike);
        }
        assert_eq!(window.mean(), Some(102.0));
        let expected = (8.0_f64 / 3.0).sqrt();
        assert!((window.std_dev().unwrap() - expected).abs() < 1e-12);
        assert!((window.std_dev().unwrap() - 1.633).abs() < 1e-3);
    }

    #[test]
    fn test_window_evicts_oldest() {
        let mut window = RollingWindow::new(3);
        for strike in [1.0, 2.0, 3.0, 4.0, 5.0] {
            window.push(strike);
        }
        assert_eq!(window.len(), 3);
        assert_eq!(window.values().collect::<Vec<_>>(), vec![3.0, 4.0, 5.0]);
        assert_eq!(window.mean(), Some(4.0));
    }

    #[test]
    fn test_empty_window_has_no_stats() {
        let window = RollingWindow::new(5);
        assert_eq!(window.mean(), None);
        assert_eq!(window.std_dev(), None);
        assert_eq!(RollingWindow::new(0).capacity(), 1);
    }

    #[test]
    fn test_update_splits_by_sign() {
        let mut tracker = RollingStatsTracker::with_capacity(100);
        let stats = tracker.update(&[
            change(4500.0, 0.8),
            change(4400.0, -0.5),
            change(4450.0, 0.0),
            change(4510.0, 0.2),
        ]);

        assert_eq!(tracker.positive().len(), 2);
        assert_eq!(tracker.negative().len(), 1);
        assert_eq!(stats.mean_pos, Some(4505.0));
        assert_eq!(stats.std_pos, Some(5.0));
        assert_eq!(stats.mean_neg, Some(4400.0));
        assert_eq!(stats.std_neg, Some(0.0));
    }

    #[test]
    fn test_history_appends_only_for_touched_windows() {
        let mut tracker = RollingStatsTracker::new();
        tracker.update(&[change(100.0, 1.0)]);
        tracker.update(&[change(102.0, 1.0), change(90.0, -1.0)]);
        tracker.update(&[]);

        assert_eq!(tracker.positive_history().len(), 2);
        assert_eq!(tracker.negative_history().len(), 1);
        assert_eq!(tracker.positive_history()[1].mean, 101.0);
        assert_eq!(tracker.positive_history()[1].len, 2);
    }

    #[test]
    fn test_empty_update_leaves_windows_unchanged() {
        let mut tracker = RollingStatsTracker::new();
        let stats = tracker.update(&[]);
        assert_eq!(stats, RollingStats::default());
        assert!(tracker.positive().is_empty());
        assert!(tracker.negative().is_empty());
    }

    #[test]
    fn test_sliding_window_keeps_recent_movers() {
        let mut tracker = RollingStatsTracker::with_capacity(2);
        tracker.update(&[change(100.0, 1.0)]);
        tracker.update(&[change(200.0, 1.0)]);
        let stats = tracker.update(&[change(300.0, 1.0)]);
        assert_eq!(stats.mean_pos, Some(250.0));
        assert_eq!(stats.std_pos, Some(50.0));
    }

    #[test]
    fn test_reset_clears_windows_and_history() {
        let mut tracker = RollingStatsTracker::new();
        tracker.update(&[change(100.0, 1.0), change(90.0, -1.0)]);
        tracker.reset();
        assert!(tracker.positive().is_empty());
        assert!(tracker.negative_history().is_empty());
        assert_eq!(tracker.stats(), RollingStats::default());
    }
}
