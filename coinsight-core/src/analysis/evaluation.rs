//! Regression and forecast-accuracy metrics for an (actual, predicted) pair.

use crate::error::{AnalysisError, Result};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub sample_count: usize,
    pub mse: Option<f64>,
    pub rmse: Option<f64>,
    pub mae: Option<f64>,
    /// Undefined when every actual value is identical (SS_tot = 0).
    pub r2: Option<f64>,
    /// Percent; undefined when any actual value is 0.
    pub mape: Option<f64>,
    pub directional_accuracy: Option<f64>,
}

impl EvaluationReport {
    fn empty() -> Self {
        Self {
            sample_count: 0,
            mse: None,
            rmse: None,
            mae: None,
            r2: None,
            mape: None,
            directional_accuracy: None,
        }
    }
}

/// Compare `predicted` against `actual`.
///
/// Fails with `LengthMismatch` when the sequences differ in length. An empty
/// pair yields a report with every metric undefined.
pub fn evaluate_prediction_model(actual: &[f64], predicted: &[f64]) -> Result<EvaluationReport> {
    if actual.len() != predicted.len() {
        return Err(AnalysisError::LengthMismatch {
            actual: actual.len(),
            predicted: predicted.len(),
        });
    }
    if actual.is_empty() {
        return Ok(EvaluationReport::empty());
    }

    let n = actual.len() as f64;
    let pairs = || actual.iter().zip(predicted);

    let mse = pairs().map(|(a, p)| (a - p).powi(2)).sum::<f64>() / n;
    let mae = pairs().map(|(a, p)| (a - p).abs()).sum::<f64>() / n;

    let mean_actual = actual.iter().sum::<f64>() / n;
    let ss_tot: f64 = actual.iter().map(|a| (a - mean_actual).powi(2)).sum();
    let ss_res = mse * n;
    // mean_actual can round away from a constant series, leaving ss_tot a hair above 0
    let constant = actual.iter().all(|&a| a == actual[0]);
    let r2 = (!constant && ss_tot > 0.0).then(|| 1.0 - ss_res / ss_tot);

    let mape = if actual.iter().any(|&a| a == 0.0) {
        None
    } else {
        Some(pairs().map(|(a, p)| ((a - p) / a).abs()).sum::<f64>() / n * 100.0)
    };

    Ok(EvaluationReport {
        sample_count: actual.len(),
        mse: Some(mse),
        rmse: Some(mse.sqrt()),
        mae: Some(mae),
        r2,
        mape,
        directional_accuracy: Some(directional_accuracy(actual, predicted)),
    })
}

/// Fraction of steps whose direction agrees. Step 0 compares each sequence
/// with its own first value, so both directions are 0 there.
fn directional_accuracy(actual: &[f64], predicted: &[f64]) -> f64 {
    let directions = |values: &[f64]| -> Vec<i8> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                let prev = if i == 0 { values[0] } else { values[i - 1] };
                sign(v - prev)
            })
            .collect()
    };
    let hits = directions(actual)
        .into_iter()
        .zip(directions(predicted))
        .filter(|(a, p)| a == p)
        .count();
    hits as f64 / actual.len() as f64
}

fn sign(x: f64) -> i8 {
    if x > 0.0 {
        1
    } else if x < 0.0 {
        -1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    const ACTUAL: [f64; 7] = [100.0, 105.0, 110.0, 108.0, 112.0, 115.0, 118.0];
    const PREDICTED: [f64; 7] = [102.0, 107.0, 109.0, 110.0, 113.0, 116.0, 117.0];

    #[test]
    fn reference_pair_metrics() {
        let r = evaluate_prediction_model(&ACTUAL, &PREDICTED).unwrap();
        assert_eq!(r.sample_count, 7);
        // errors: -2,-2,1,-2,-1,-1,1 → squares sum 16
        assert_approx(r.mse.unwrap(), 16.0 / 7.0, DEFAULT_EPSILON);
        assert_eq!(r.rmse.unwrap(), r.mse.unwrap().sqrt());
        assert_approx(r.mae.unwrap(), 10.0 / 7.0, DEFAULT_EPSILON);
        let r2 = r.r2.unwrap();
        assert!(r2 <= 1.0 && r2 > 0.8);
        assert!(r.mape.unwrap() > 0.0);
        // directions: actual 0,+,+,-,+,+,+ predicted 0,+,+,+,+,+,+ → 6/7
        assert_approx(r.directional_accuracy.unwrap(), 6.0 / 7.0, DEFAULT_EPSILON);
    }

    #[test]
    fn perfect_prediction() {
        let r = evaluate_prediction_model(&ACTUAL, &ACTUAL).unwrap();
        assert_eq!(r.mse, Some(0.0));
        assert_eq!(r.r2, Some(1.0));
        assert_eq!(r.mape, Some(0.0));
        assert_eq!(r.directional_accuracy, Some(1.0));
    }

    #[test]
    fn length_mismatch_is_an_error() {
        let err = evaluate_prediction_model(&[1.0, 2.0], &[1.0]).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::LengthMismatch {
                actual: 2,
                predicted: 1
            }
        );
    }

    #[test]
    fn constant_actual_leaves_r2_undefined() {
        let r = evaluate_prediction_model(&[5.0; 4], &[4.0, 5.0, 6.0, 5.0]).unwrap();
        assert_eq!(r.r2, None);
        assert!(r.mse.is_some());
    }

    #[test]
    fn constant_inexact_actual_leaves_r2_undefined() {
        let r = evaluate_prediction_model(&[0.1, 0.1, 0.1], &[0.2, 0.1, 0.0]).unwrap();
        assert_eq!(r.r2, None);
        assert!(r.mae.is_some());
    }

    #[test]
    fn zero_actual_leaves_mape_undefined() {
        let r = evaluate_prediction_model(&[0.0, 1.0, 2.0], &[0.5, 1.0, 2.0]).unwrap();
        assert_eq!(r.mape, None);
        assert!(r.r2.is_some());
    }

    #[test]
    fn empty_input_is_all_undefined() {
        let r = evaluate_prediction_model(&[], &[]).unwrap();
        assert_eq!(r, EvaluationReport::empty());
    }
}
