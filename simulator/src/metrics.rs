//! Simulation metrics.

use std::collections::VecDeque;

/// Simulation metrics.
#[derive(Debug, Clone)]
pub struct SimulationMetrics {
    /// Steps executed.
    pub steps_total: u64,
    /// Actions the engine refused (validation, wrong phase, ...).
    pub actions_rejected: u64,
    /// Amount edits dropped by the input sanitizer.
    pub edits_rejected: u64,
    /// Expectations that held.
    pub expectations_met: u64,
    /// Expectations that did not hold.
    pub expectations_failed: u64,
    /// Wall-clock step durations (ms), excluding waits.
    step_samples: VecDeque<u64>,
    /// Maximum samples to keep.
    max_samples: usize,
}

impl SimulationMetrics {
    /// Create new metrics.
    pub fn new() -> Self {
        Self {
            steps_total: 0,
            actions_rejected: 0,
            edits_rejected: 0,
            expectations_met: 0,
            expectations_failed: 0,
            step_samples: VecDeque::with_capacity(1000),
            max_samples: 1000,
        }
    }

    /// Record a completed step.
    pub fn record_step(&mut self, elapsed_ms: u64) {
        self.steps_total += 1;

        if self.step_samples.len() >= self.max_samples {
            self.step_samples.pop_front();
        }
        self.step_samples.push_back(elapsed_ms);
    }

    pub fn record_rejection(&mut self) {
        self.actions_rejected += 1;
    }

    pub fn record_rejected_edit(&mut self) {
        self.edits_rejected += 1;
    }

    pub fn record_expectation(&mut self, held: bool) {
        if held {
            self.expectations_met += 1;
        } else {
            self.expectations_failed += 1;
        }
    }

    /// Get average step duration in ms.
    pub fn average_step_ms(&self) -> u64 {
        if self.step_samples.is_empty() {
            return 0;
        }

        let sum: u64 = self.step_samples.iter().sum();
        sum / self.step_samples.len() as u64
    }

    /// Check if every expectation held.
    pub fn all_expectations_met(&self) -> bool {
        self.expectations_failed == 0
    }
}

impl Default for SimulationMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics() {
        let mut metrics = SimulationMetrics::new();

        metrics.record_step(10);
        metrics.record_step(20);
        metrics.record_step(30);
        metrics.record_rejection();
        metrics.record_expectation(true);
        metrics.record_expectation(false);

        assert_eq!(metrics.steps_total, 3);
        assert_eq!(metrics.actions_rejected, 1);
        assert_eq!(metrics.average_step_ms(), 20);
        assert_eq!(metrics.expectations_met, 1);
        assert!(!metrics.all_expectations_met());
    }
}
