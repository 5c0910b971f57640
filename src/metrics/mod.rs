//! Evaluation metrics for rating predictions.
//!
//! Regression metrics (MSE, RMSE, MAE) over paired prediction/target
//! sequences, and the [`evaluator`] that produces those sequences from a
//! fitted model and a held-out sample set.

pub mod evaluator;

pub use evaluator::{evaluate, Evaluation};

use crate::data::Rating;
use crate::error::{CfError, Result};

fn check_pair(predictions: &[Rating], targets: &[Rating]) -> Result<()> {
    if predictions.len() != targets.len() {
        return Err(CfError::LengthMismatch {
            predictions: predictions.len(),
            targets: targets.len(),
        });
    }
    if targets.is_empty() {
        return Err(CfError::empty_input("no predictions to score"));
    }
    Ok(())
}

/// Computes the Mean Squared Error (MSE).
///
/// MSE = (1/n) * `Σ(target` - `prediction)²`
///
/// # Errors
///
/// - [`CfError::LengthMismatch`] if the sequences differ in length.
/// - [`CfError::EmptyInput`] if both are empty.
///
/// # Examples
///
/// ```
/// use usercf::metrics::mse;
///
/// assert_eq!(mse(&[5.0, 5.0], &[4.0, 2.0]).unwrap(), 5.0);
/// ```
pub fn mse(predictions: &[Rating], targets: &[Rating]) -> Result<f64> {
    check_pair(predictions, targets)?;

    let sum_sq_error: f64 = predictions
        .iter()
        .zip(targets)
        .map(|(p, t)| (p - t).powi(2))
        .sum();

    Ok(sum_sq_error / targets.len() as f64)
}

/// Computes the Root Mean Squared Error (RMSE).
///
/// RMSE = sqrt(MSE)
///
/// # Errors
///
/// As [`mse`].
///
/// # Examples
///
/// ```
/// use usercf::metrics::rmse;
///
/// assert_eq!(rmse(&[4.0, 3.0, 5.0], &[4.0, 3.0, 5.0]).unwrap(), 0.0);
/// assert_eq!(rmse(&[5.0, 5.0], &[4.0, 4.0]).unwrap(), 1.0);
/// ```
pub fn rmse(predictions: &[Rating], targets: &[Rating]) -> Result<f64> {
    mse(predictions, targets).map(f64::sqrt)
}

/// Computes the Mean Absolute Error (MAE).
///
/// MAE = (1/n) * `Σ|target` - `prediction|`
///
/// # Errors
///
/// As [`mse`].
pub fn mae(predictions: &[Rating], targets: &[Rating]) -> Result<f64> {
    check_pair(predictions, targets)?;

    let sum_abs_error: f64 = predictions
        .iter()
        .zip(targets)
        .map(|(p, t)| (p - t).abs())
        .sum();

    Ok(sum_abs_error / targets.len() as f64)
}

#[cfg(test)]
#[path = "metrics_tests.rs"]
mod tests;
