//! Stochastic Oscillator.
//!
//! %K = 100 * (close - lowest_low(k)) / (highest_high(k) - lowest_low(k))
//! %D = SMA(%K, d)
//! A zero-width range (highest == lowest) leaves %K undefined.

use super::rolling::{rolling_max, rolling_min};
use super::sma::sma;
use crate::domain::Series;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stochastic {
    pub k: Series,
    pub d: Series,
}

/// Panics if `high`, `low` and `close` differ in length.
pub fn stochastic_oscillator(
    high: &Series,
    low: &Series,
    close: &Series,
    k_window: usize,
    d_window: usize,
) -> Stochastic {
    assert!(
        high.len() == close.len() && low.len() == close.len(),
        "stochastic_oscillator requires aligned series"
    );
    let highest = rolling_max(high, k_window);
    let lowest = rolling_min(low, k_window);

    let k: Series = close
        .iter()
        .zip(highest.iter().zip(lowest.iter()))
        .map(|(c, (hi, lo))| {
            let (c, hi, lo) = (c?, hi?, lo?);
            let range = hi - lo;
            if range > 0.0 {
                Some(100.0 * (c - lo) / range)
            } else {
                None
            }
        })
        .collect();
    let d = sma(&k, d_window);

    Stochastic { k, d }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn k_at_range_extremes() {
        let high = Series::from_values(&[10.0, 12.0, 14.0, 16.0]);
        let low = Series::from_values(&[8.0, 9.0, 10.0, 11.0]);
        let close = Series::from_values(&[9.0, 11.0, 14.0, 11.0]);
        let st = stochastic_oscillator(&high, &low, &close, 3, 2);

        assert!(st.k.get(1).is_none());
        // index 2: hh = 14, ll = 8, close 14 → 100
        assert_approx(st.k.get(2).unwrap(), 100.0, DEFAULT_EPSILON);
        // index 3: hh = 16, ll = 9, close 11 → 100 * 2/7
        assert_approx(st.k.get(3).unwrap(), 200.0 / 7.0, DEFAULT_EPSILON);
        assert_approx(st.d.get(3).unwrap(), (100.0 + 200.0 / 7.0) / 2.0, DEFAULT_EPSILON);
    }

    #[test]
    #[should_panic(expected = "aligned series")]
    fn misaligned_inputs_panic() {
        let high = Series::from_values(&[10.0, 12.0, 14.0]);
        let close = Series::from_values(&[9.0, 11.0]);
        stochastic_oscillator(&high, &high, &close, 2, 2);
    }

    #[test]
    fn flat_range_is_undefined() {
        let flat = Series::from_values(&[5.0; 6]);
        let st = stochastic_oscillator(&flat, &flat, &flat, 3, 2);
        assert_eq!(st.k.defined_count(), 0);
        assert_eq!(st.d.defined_count(), 0);
    }

    #[test]
    fn k_stays_in_bounds_for_sane_bars() {
        let close = [10.0, 11.0, 10.5, 12.0, 11.5, 13.0, 12.5];
        let high: Vec<f64> = close.iter().map(|c| c + 0.5).collect();
        let low: Vec<f64> = close.iter().map(|c| c - 0.5).collect();
        let st = stochastic_oscillator(
            &Series::from_values(&high),
            &Series::from_values(&low),
            &Series::from_values(&close),
            3,
            3,
        );
        for v in st.k.iter().flatten() {
            assert!((0.0..=100.0).contains(&v));
        }
    }
}
