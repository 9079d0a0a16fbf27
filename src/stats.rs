//! Small descriptive statistics used by the stopping criteria.

use serde::{Deserialize, Serialize};

/// Arithmetic mean. Returns `NaN` for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (Bessel-corrected) around a precomputed mean.
///
/// Returns `NaN` with fewer than two values.
pub fn standard_deviation(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let ss: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
    (ss / (values.len() - 1) as f64).sqrt()
}

/// Sample standard deviation divided by the mean.
///
/// `NaN` or infinite when undefined; callers check `is_finite`.
pub fn relative_standard_deviation(values: &[f64]) -> f64 {
    let m = mean(values);
    standard_deviation(values, m) / m
}

/// Ordinary least-squares line fitted to a series indexed `0..n`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineFit {
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination; `1.0` for a constant series.
    pub r2: f64,
}

impl LineFit {
    /// Fits `y = slope * x + intercept` with `x` the position in `ys`.
    ///
    /// Needs at least two points. A constant series is reported exactly as
    /// slope `0` and `r2` `1`, without going through the mean, which can leave
    /// rounding residue.
    pub fn fit(ys: &[f64]) -> Option<LineFit> {
        let n = ys.len();
        if n < 2 {
            return None;
        }
        if ys.iter().all(|y| *y == ys[0]) {
            return Some(LineFit {
                slope: 0.0,
                intercept: ys[0],
                r2: 1.0,
            });
        }
        let x_mean = (n - 1) as f64 / 2.0;
        let y_mean = mean(ys);

        let mut sxy = 0.0;
        let mut sxx = 0.0;
        for (i, y) in ys.iter().enumerate() {
            let dx = i as f64 - x_mean;
            sxy += dx * (y - y_mean);
            sxx += dx * dx;
        }
        let slope = sxy / sxx;
        let intercept = y_mean - slope * x_mean;

        let mut ss_res = 0.0;
        let mut ss_tot = 0.0;
        for (i, y) in ys.iter().enumerate() {
            let predicted = slope * i as f64 + intercept;
            ss_res += (y - predicted) * (y - predicted);
            ss_tot += (y - y_mean) * (y - y_mean);
        }
        let r2 = if ss_tot == 0.0 {
            1.0
        } else {
            1.0 - ss_res / ss_tot
        };

        Some(LineFit {
            slope,
            intercept,
            r2,
        })
    }
}
