//! Mean, population standard deviation and rounding.

use serde::Serialize;

/// Streaming accumulator using Welford's algorithm.
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: usize,
    mean: f64,
    m2: f64,
}

impl RunningStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value.
    pub fn add(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        let delta2 = value - self.mean;
        self.m2 += delta * delta2;
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Mean and population standard deviation (divisor n).
    ///
    /// `None` when no values were added or the result is not finite.
    pub fn summary(&self) -> Option<Summary> {
        if self.count == 0 {
            return None;
        }
        let std = (self.m2 / self.count as f64).sqrt();
        (self.mean.is_finite() && std.is_finite()).then_some(Summary {
            mean: self.mean,
            std,
        })
    }
}

/// Mean and standard deviation of one metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub mean: f64,
    pub std: f64,
}

impl Summary {
    /// Summarize a slice of values.
    pub fn of(values: &[f64]) -> Option<Summary> {
        let mut stats = RunningStats::new();
        for &v in values {
            stats.add(v);
        }
        stats.summary()
    }

    pub fn rounded(&self, decimals: u32) -> Summary {
        Summary {
            mean: round_to(self.mean, decimals),
            std: round_to(self.std, decimals),
        }
    }
}

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    let rounded = (value * factor).round() / factor;
    // Avoid writing "-0".
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// Render an optional value for a CSV cell; missing is empty.
pub fn format_value(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
