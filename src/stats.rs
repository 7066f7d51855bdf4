//! Summary statistics over collected readings.

use std::time::Duration;

use crate::schema::Reading;

/// Descriptive statistics for one measured quantity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldStats {
    pub mean: f64,
    pub min: f64,
    pub max: f64,

    /// Sample standard deviation (n - 1 denominator).
    ///
    /// `None` when fewer than two samples exist.
    pub std_dev: Option<f64>,
}

impl FieldStats {
    /// Returns `None` for an empty slice.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let std_dev = (values.len() > 1).then(|| {
            let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
            (ss / (n - 1.0)).sqrt()
        });

        Some(Self { mean, min, max, std_dev })
    }
}

/// Everything printed at finalize.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub duration: Duration,
    pub speed: Option<FieldStats>,
    pub direction: Option<FieldStats>,
}

impl Summary {
    pub fn from_readings(readings: &[Reading], duration: Duration) -> Self {
        let speeds: Vec<f64> = readings.iter().map(|r| r.wind_speed).collect();
        let directions: Vec<f64> = readings.iter().map(|r| r.wind_direction).collect();

        Self {
            count: readings.len(),
            duration,
            speed: FieldStats::from_values(&speeds),
            direction: FieldStats::from_values(&directions),
        }
    }

    /// Readings per second, `None` when no time has elapsed.
    pub fn rate(&self) -> Option<f64> {
        let secs = self.duration.as_secs_f64();
        (secs > 0.0).then(|| self.count as f64 / secs)
    }
}
