//! Ordinary least squares line fitting over evenly spaced values.

use serde::{Deserialize, Serialize};

/// A line `value = intercept + slope * step` fit to a series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Regression {
    /// The change in value per step.
    pub slope: f64,
    /// The fitted value at step zero.
    pub intercept: f64,
}

impl Regression {
    /// The fitted value at `step`, clamped to be non-negative.
    ///
    /// For a series of length `n`, `project(n)` is the forecast for the next step.
    pub fn project(&self, step: usize) -> f64 {
        (self.intercept + self.slope * step as f64).max(0.0)
    }

    /// Which way the fitted line is heading.
    pub fn direction(&self) -> TrendDirection {
        TrendDirection::from_slope(self.slope)
    }
}

/// Fit a line to `values`, using the index of each value as its x coordinate.
///
/// An empty series gives a flat line through zero and a single value gives a
/// flat line through that value.
pub fn linear_regression(values: &[f64]) -> Regression {
    let n = values.len();

    if n <= 1 {
        return Regression {
            slope: 0.0,
            intercept: values.first().copied().unwrap_or(0.0),
        };
    }

    let x_mean = (n - 1) as f64 / 2.0;
    let y_mean = values.iter().sum::<f64>() / n as f64;

    let (numerator, denominator) =
        values
            .iter()
            .enumerate()
            .fold((0.0, 0.0), |(numerator, denominator), (i, &y)| {
                let x_diff = i as f64 - x_mean;
                (
                    numerator + x_diff * (y - y_mean),
                    denominator + x_diff * x_diff,
                )
            });

    let slope = if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    };

    Regression {
        slope,
        intercept: y_mean - slope * x_mean,
    }
}

/// The sign of a trend's slope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    /// The slope is positive.
    Upward,
    /// The slope is negative.
    Downward,
    /// The slope is zero.
    Flat,
}

impl TrendDirection {
    /// The direction of a line with `slope`.
    pub fn from_slope(slope: f64) -> Self {
        if slope > 0.0 {
            TrendDirection::Upward
        } else if slope < 0.0 {
            TrendDirection::Downward
        } else {
            TrendDirection::Flat
        }
    }

    /// The lower-case name used in generated text.
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Upward => "upward",
            TrendDirection::Downward => "downward",
            TrendDirection::Flat => "flat",
        }
    }
}
