//! Relative Strength Index (RSI).
//!
//! gain = max(delta, 0), loss = max(-delta, 0), each averaged with a trailing
//! SMA over `window`; RSI = 100 - 100 / (1 + avg_gain / avg_loss).
//! The delta at index 0 is undefined, so the first RSI is at index `window`.
//! Edge case: avg_loss == 0 → RSI = 100 (this includes a flat series).

use super::rolling::diff;
use super::sma::sma;
use crate::domain::Series;

/// Default RSI lookback.
pub const DEFAULT_RSI_WINDOW: usize = 14;

pub fn rsi(series: &Series, window: usize) -> Series {
    let delta = diff(series, 1);
    let gains = delta.map(|d| d.max(0.0));
    let losses = delta.map(|d| (-d).max(0.0));

    let avg_gain = sma(&gains, window);
    let avg_loss = sma(&losses, window);

    avg_gain.zip_with(&avg_loss, rsi_from_averages)
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    (100.0 - 100.0 / (1.0 + rs)).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn rsi_all_gains() {
        let s = Series::from_values(&[100.0, 101.0, 102.0, 103.0, 104.0, 105.0]);
        let result = rsi(&s, 3);
        assert_approx(result.get(3).unwrap(), 100.0, 1e-6);
    }

    #[test]
    fn rsi_all_losses() {
        let s = Series::from_values(&[105.0, 104.0, 103.0, 102.0, 101.0, 100.0]);
        let result = rsi(&s, 3);
        assert_approx(result.get(3).unwrap(), 0.0, 1e-6);
    }

    #[test]
    fn rsi_mixed() {
        // Changes: +0.34, -0.25, -0.48, +0.72
        // RSI[3] over changes 1..=3: avg_gain = 0.34/3, avg_loss = 0.73/3
        // RSI[3] = 100 - 100 / (1 + 0.34/0.73)
        let s = Series::from_values(&[44.0, 44.34, 44.09, 43.61, 44.33]);
        let result = rsi(&s, 3);

        assert!(result.get(0).is_none());
        assert!(result.get(1).is_none());
        assert!(result.get(2).is_none());
        let expected = 100.0 - 100.0 / (1.0 + 0.34 / 0.73);
        assert_approx(result.get(3).unwrap(), expected, 1e-9);
    }

    #[test]
    fn rsi_flat_series_saturates_to_100() {
        let s = Series::from_values(&[50.0; 20]);
        let result = rsi(&s, 14);
        for i in 14..20 {
            assert_approx(result.get(i).unwrap(), 100.0, DEFAULT_EPSILON);
        }
    }

    #[test]
    fn rsi_short_series_is_all_undefined() {
        let s = Series::from_values(&[100.0, 105.0, 110.0, 108.0, 112.0, 115.0, 118.0]);
        let result = rsi(&s, DEFAULT_RSI_WINDOW);
        assert_eq!(result.len(), 7);
        assert_eq!(result.defined_count(), 0);
    }

    #[test]
    fn rsi_bounds() {
        let s = Series::from_values(&[100.0, 105.0, 98.0, 110.0, 95.0, 115.0, 90.0, 120.0]);
        let result = rsi(&s, 3);
        for (i, v) in result.iter().enumerate() {
            if let Some(v) = v {
                assert!((0.0..=100.0).contains(&v), "RSI out of bounds at {i}: {v}");
            }
        }
    }
}
