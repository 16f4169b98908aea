//! Bounded value history for sparklines and rate calculations.

use std::collections::VecDeque;
use std::time::Instant;

/// Maximum number of samples to keep.
pub const MAX_HISTORY_SIZE: usize = 60;

/// Tracks a value sampled over time.
///
/// Samples are expected once per monitor tick. The sparkline shows how much
/// the value moved between consecutive samples, not the value itself.
#[derive(Debug, Clone, Default)]
pub struct Trend {
    values: VecDeque<i64>,
    timestamps: VecDeque<Instant>,
}

impl Trend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a sample, dropping the oldest once full.
    pub fn record(&mut self, value: i64, at: Instant) {
        self.values.push_back(value);
        self.timestamps.push_back(at);
        if self.values.len() > MAX_HISTORY_SIZE {
            self.values.pop_front();
            self.timestamps.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn latest(&self) -> Option<i64> {
        self.values.back().copied()
    }

    /// Sample-to-sample deltas normalized to 0-7 for 8 bar levels.
    ///
    /// Returns an empty Vec if there's not enough history.
    pub fn sparkline(&self) -> Vec<u8> {
        if self.values.len() < 2 {
            return Vec::new();
        }

        let deltas: Vec<i64> = self
            .values
            .iter()
            .zip(self.values.iter().skip(1))
            .map(|(a, b)| b - a)
            .collect();

        let max = deltas.iter().copied().max().unwrap_or(1).max(1);
        let min = deltas.iter().copied().min().unwrap_or(0).min(0);
        let range = (max - min).max(1) as f64;

        deltas
            .iter()
            .map(|&v| (((v - min) as f64 / range * 7.0) as u8).min(7))
            .collect()
    }

    /// Change per second between the last two samples.
    pub fn rate(&self) -> Option<f64> {
        let n = self.values.len();
        if n < 2 {
            return None;
        }

        let delta = self.values[n - 1] - self.values[n - 2];
        let elapsed = self.timestamps[n - 1]
            .duration_since(self.timestamps[n - 2])
            .as_secs_f64();

        (elapsed > 0.0).then(|| delta as f64 / elapsed)
    }
}
