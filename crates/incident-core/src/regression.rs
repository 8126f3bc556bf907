use serde::{Deserialize, Serialize};

use crate::error::{ReportError, Result};

// ── LinearFit ─────────────────────────────────────────────────────────────────

/// Result of an ordinary-least-squares fit `y ≈ intercept + slope * x`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination. `1.0` when `y` has no variance and the
    /// line passes through every point.
    pub r_squared: f64,
    /// Standard error of the slope; `None` with fewer than three points.
    pub slope_std_error: Option<f64>,
    /// Standard error of the intercept; `None` with fewer than three points.
    pub intercept_std_error: Option<f64>,
    /// Number of points used.
    pub n: usize,
}

impl LinearFit {
    /// Evaluate the fitted line at `x`.
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }

    /// `slope / slope_std_error`, when the standard error is defined and
    /// non-zero.
    pub fn slope_t_statistic(&self) -> Option<f64> {
        self.slope_std_error
            .filter(|se| *se > 0.0)
            .map(|se| self.slope / se)
    }

    /// Human-readable equation, e.g. `y = 0.712x + 12.30`.
    pub fn equation(&self) -> String {
        if self.intercept < 0.0 {
            format!("y = {:.3}x - {:.2}", self.slope, self.intercept.abs())
        } else {
            format!("y = {:.3}x + {:.2}", self.slope, self.intercept)
        }
    }
}

// ── OLS ───────────────────────────────────────────────────────────────────────

/// Fit `y ≈ intercept + slope * x` by ordinary least squares.
///
/// Errors:
/// * [`ReportError::InsufficientData`] for fewer than two points.
/// * [`ReportError::DegenerateInput`] when every `x` is the same.
pub fn fit_linear(points: &[(f64, f64)]) -> Result<LinearFit> {
    let n = points.len();
    if n < 2 {
        return Err(ReportError::InsufficientData { points: n });
    }
    let nf = n as f64;

    let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / nf;
    let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / nf;

    // Centred sums keep precision for large counts.
    let (sxx, sxy, syy) = points.iter().fold((0.0, 0.0, 0.0), |(sxx, sxy, syy), (x, y)| {
        let dx = x - mean_x;
        let dy = y - mean_y;
        (sxx + dx * dx, sxy + dx * dy, syy + dy * dy)
    });

    if sxx <= f64::EPSILON * mean_x.abs().max(1.0) {
        return Err(ReportError::DegenerateInput);
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;

    let sse: f64 = points
        .iter()
        .map(|(x, y)| {
            let r = y - (intercept + slope * x);
            r * r
        })
        .sum();

    let r_squared = if syy == 0.0 {
        1.0
    } else {
        (1.0 - sse / syy).clamp(0.0, 1.0)
    };

    let (slope_std_error, intercept_std_error) = if n > 2 {
        let sigma2 = sse / (nf - 2.0);
        let se_slope = (sigma2 / sxx).sqrt();
        let se_intercept = (sigma2 * (1.0 / nf + mean_x * mean_x / sxx)).sqrt();
        (Some(se_slope), Some(se_intercept))
    } else {
        (None, None)
    };

    Ok(LinearFit {
        slope,
        intercept,
        r_squared,
        slope_std_error,
        intercept_std_error,
        n,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_exact_line() {
        let points: Vec<(f64, f64)> = (0..5).map(|x| (x as f64, 2.0 * x as f64 + 1.0)).collect();
        let fit = fit_linear(&points).expect("fit");

        assert!(approx(fit.slope, 2.0));
        assert!(approx(fit.intercept, 1.0));
        assert!(approx(fit.r_squared, 1.0));
        assert!(approx(fit.slope_std_error.expect("se"), 0.0));
        assert_eq!(fit.n, 5);
        assert!(fit.slope_t_statistic().is_none());
    }

    #[test]
    fn test_noisy_line_matches_closed_form() {
        // x = 1..5, y = [2.2, 2.5, 3.6, 4.7, 5.1]
        let points = [(1.0, 2.2), (2.0, 2.5), (3.0, 3.6), (4.0, 4.7), (5.0, 5.1)];
        let fit = fit_linear(&points).expect("fit");

        // sxx = 10, sxy = 8
        assert!(approx(fit.slope, 0.8));
        assert!(approx(fit.intercept, 1.22));
        assert!(fit.r_squared > 0.95 && fit.r_squared < 1.0);
        assert!(fit.slope_std_error.expect("se") > 0.0);
        assert!(fit.slope_t_statistic().expect("t") > 0.0);
    }

    #[test]
    fn test_two_points_has_no_standard_errors() {
        let fit = fit_linear(&[(10.0, 3.0), (20.0, 5.0)]).expect("fit");
        assert!(approx(fit.slope, 0.2));
        assert!(approx(fit.intercept, 1.0));
        assert!(fit.slope_std_error.is_none());
        assert!(fit.intercept_std_error.is_none());
    }

    #[test]
    fn test_insufficient_data() {
        assert!(matches!(
            fit_linear(&[]),
            Err(ReportError::InsufficientData { points: 0 })
        ));
        assert!(matches!(
            fit_linear(&[(1.0, 1.0)]),
            Err(ReportError::InsufficientData { points: 1 })
        ));
    }

    #[test]
    fn test_degenerate_x() {
        let result = fit_linear(&[(4.0, 1.0), (4.0, 2.0), (4.0, 3.0)]);
        assert!(matches!(result, Err(ReportError::DegenerateInput)));
    }

    #[test]
    fn test_constant_y_is_perfect_fit() {
        let fit = fit_linear(&[(1.0, 7.0), (2.0, 7.0), (3.0, 7.0)]).expect("fit");
        assert!(approx(fit.slope, 0.0));
        assert!(approx(fit.r_squared, 1.0));
    }

    #[test]
    fn test_predict_and_equation() {
        let fit = LinearFit {
            slope: 0.5,
            intercept: -2.0,
            r_squared: 0.9,
            slope_std_error: None,
            intercept_std_error: None,
            n: 3,
        };
        assert!(approx(fit.predict(10.0), 3.0));
        assert_eq!(fit.equation(), "y = 0.500x - 2.00");
    }
}
