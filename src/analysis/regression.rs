//! Single-feature least squares on top of `linfa-linear`.

use linfa::{traits::Fit, Dataset};
use linfa_linear::LinearRegression;
use ndarray::{Array1, Array2};

/// Coefficients of `y = intercept + slope * x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineFit {
    pub intercept: f64,
    pub slope: f64,
}

/// Why a regression could not be fitted.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FitError {
    #[error("need at least two observations, got {0}")]
    TooFewPoints(usize),
    #[error("feature and target lengths differ ({features} vs {targets})")]
    LengthMismatch { features: usize, targets: usize },
    #[error("feature has zero variance")]
    ConstantFeature,
    #[error("inputs contain non-finite values")]
    NonFinite,
    #[error("solver failed: {0}")]
    Solver(String),
}

const VARIANCE_EPSILON: f64 = 1e-12;

/// Ordinary least squares of `targets` on `features` with an intercept.
pub fn fit_line(features: &[f64], targets: &[f64]) -> Result<LineFit, FitError> {
    if features.len() != targets.len() {
        return Err(FitError::LengthMismatch {
            features: features.len(),
            targets: targets.len(),
        });
    }
    if features.len() < 2 {
        return Err(FitError::TooFewPoints(features.len()));
    }
    if features.iter().chain(targets).any(|v| !v.is_finite()) {
        return Err(FitError::NonFinite);
    }
    if variance(features) <= VARIANCE_EPSILON {
        return Err(FitError::ConstantFeature);
    }

    let records = Array2::from_shape_vec((features.len(), 1), features.to_vec())
        .map_err(|err| FitError::Solver(err.to_string()))?;
    let dataset = Dataset::new(records, Array1::from(targets.to_vec()));
    let model = LinearRegression::default()
        .fit(&dataset)
        .map_err(|err| FitError::Solver(err.to_string()))?;

    let fit = LineFit {
        intercept: model.intercept(),
        slope: model.params()[0],
    };
    if !fit.intercept.is_finite() || !fit.slope.is_finite() {
        return Err(FitError::NonFinite);
    }
    Ok(fit)
}

impl LineFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }

    /// Coefficient of determination of this line against `(features, targets)`.
    ///
    /// Constant targets score 1.0 when predicted exactly and 0.0 otherwise.
    pub fn r_squared(&self, features: &[f64], targets: &[f64]) -> f64 {
        if targets.is_empty() {
            return 0.0;
        }
        let mean = targets.iter().sum::<f64>() / targets.len() as f64;
        let ss_res: f64 = features
            .iter()
            .zip(targets)
            .map(|(x, y)| (y - self.predict(*x)).powi(2))
            .sum();
        let ss_tot: f64 = targets.iter().map(|y| (y - mean).powi(2)).sum();
        if ss_tot <= VARIANCE_EPSILON {
            return if ss_res <= VARIANCE_EPSILON { 1.0 } else { 0.0 };
        }
        1.0 - ss_res / ss_tot
    }
}

fn variance(values: &[f64]) -> f64 {
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use linfa::prelude::Predict;

    use super::*;

    fn linfa_predictions(features: &[f64], targets: &[f64]) -> Vec<f64> {
        let records = Array2::from_shape_vec((features.len(), 1), features.to_vec()).unwrap();
        let dataset = Dataset::new(records.clone(), Array1::from(targets.to_vec()));
        let model = LinearRegression::default().fit(&dataset).unwrap();
        model.predict(&records).to_vec()
    }

    #[test]
    fn recovers_exact_line() {
        let xs = [1.0, 2.0, 3.0, 4.0, 5.0];
        let ys: Vec<f64> = xs.iter().map(|x| 3.0 + 2.0 * x).collect();
        let fit = fit_line(&xs, &ys).unwrap();
        assert!((fit.slope - 2.0).abs() < 1e-8);
        assert!((fit.intercept - 3.0).abs() < 1e-8);
        assert!((fit.r_squared(&xs, &ys) - 1.0).abs() < 1e-10);
    }

    #[test]
    fn matches_linfa_predictions() {
        let xs = [0.5, 1.5, 2.0, 3.5, 4.0, 6.0];
        let ys = [1.0, 2.9, 3.1, 6.5, 7.2, 11.0];
        let fit = fit_line(&xs, &ys).unwrap();
        for (x, expected) in xs.iter().zip(linfa_predictions(&xs, &ys)) {
            assert!((fit.predict(*x) - expected).abs() < 1e-8);
        }
    }

    #[test]
    fn noisy_fit_has_partial_r_squared() {
        let xs = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let ys = [2.0, 1.0, 4.0, 3.0, 6.0, 5.0];
        let r2 = fit_line(&xs, &ys).unwrap().r_squared(&xs, &ys);
        assert!(r2 > 0.0 && r2 < 1.0);
    }

    #[test]
    fn constant_feature_is_rejected() {
        assert_eq!(
            fit_line(&[2.0; 6], &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]),
            Err(FitError::ConstantFeature)
        );
    }

    #[test]
    fn non_finite_and_short_inputs_are_rejected() {
        assert_eq!(fit_line(&[1.0], &[1.0]), Err(FitError::TooFewPoints(1)));
        assert_eq!(
            fit_line(&[1.0, f64::NAN, 3.0], &[1.0, 2.0, 3.0]),
            Err(FitError::NonFinite)
        );
        assert!(matches!(
            fit_line(&[1.0, 2.0], &[1.0]),
            Err(FitError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn constant_target_scores_perfect_fit() {
        let xs = [1.0, 2.0, 3.0, 4.0, 5.0];
        let ys = [0.0; 5];
        let fit = fit_line(&xs, &ys).unwrap();
        assert!(fit.slope.abs() < 1e-10);
        assert_eq!(fit.r_squared(&xs, &ys), 1.0);
        let off = LineFit { intercept: 1.0, slope: 0.0 };
        assert_eq!(off.r_squared(&xs, &ys), 0.0);
    }
}
