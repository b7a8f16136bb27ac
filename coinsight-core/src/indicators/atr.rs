//! Average True Range (ATR).
//!
//! True Range: max(high-low, |high-prev_close|, |low-prev_close|)
//! ATR = trailing SMA of the true range over `window`.
//! First defined value at index window - 1.

use super::sma::sma;
use crate::domain::Series;

/// True Range series.
/// TR[0] = high[0] - low[0] (no previous close).
/// TR[t] = max(high[t]-low[t], |high[t]-close[t-1]|, |low[t]-close[t-1]|).
pub fn true_range(high: &Series, low: &Series, close: &Series) -> Series {
    let n = high.len();
    (0..n)
        .map(|i| {
            let h = high.get(i)?;
            let l = low.get(i)?;
            if i == 0 {
                return Some(h - l);
            }
            let pc = close.get(i - 1)?;
            Some((h - l).max((h - pc).abs()).max((l - pc).abs()))
        })
        .collect()
}

pub fn atr(high: &Series, low: &Series, close: &Series, window: usize) -> Series {
    sma(&true_range(high, low, close), window)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    fn columns(data: &[(f64, f64, f64)]) -> (Series, Series, Series) {
        let high: Vec<f64> = data.iter().map(|d| d.0).collect();
        let low: Vec<f64> = data.iter().map(|d| d.1).collect();
        let close: Vec<f64> = data.iter().map(|d| d.2).collect();
        (
            Series::from_values(&high),
            Series::from_values(&low),
            Series::from_values(&close),
        )
    }

    #[test]
    fn true_range_basic() {
        let (h, l, c) = columns(&[
            (105.0, 95.0, 102.0),  // TR = 10
            (108.0, 100.0, 106.0), // TR = max(8, 6, 2) = 8
            (107.0, 98.0, 99.0),   // TR = max(9, 1, 8) = 9
        ]);
        let tr = true_range(&h, &l, &c);
        assert_approx(tr.get(0).unwrap(), 10.0, DEFAULT_EPSILON);
        assert_approx(tr.get(1).unwrap(), 8.0, DEFAULT_EPSILON);
        assert_approx(tr.get(2).unwrap(), 9.0, DEFAULT_EPSILON);
    }

    #[test]
    fn true_range_gap_up() {
        let (h, l, c) = columns(&[(102.0, 97.0, 100.0), (115.0, 108.0, 112.0)]);
        let tr = true_range(&h, &l, &c);
        // max(7, |115-100|, |108-100|) = 15
        assert_approx(tr.get(1).unwrap(), 15.0, DEFAULT_EPSILON);
    }

    #[test]
    fn atr_window_3() {
        let (h, l, c) = columns(&[
            (105.0, 95.0, 102.0),  // TR = 10
            (108.0, 100.0, 106.0), // TR = 8
            (107.0, 98.0, 99.0),   // TR = 9
            (103.0, 97.0, 101.0),  // TR = 6
        ]);
        let result = atr(&h, &l, &c, 3);
        assert!(result.get(1).is_none());
        assert_approx(result.get(2).unwrap(), 9.0, DEFAULT_EPSILON);
        assert_approx(result.get(3).unwrap(), 23.0 / 3.0, DEFAULT_EPSILON);
    }

    #[test]
    fn missing_previous_close_is_undefined() {
        let h = Series::from_values(&[10.0, 11.0]);
        let l = Series::from_values(&[9.0, 10.0]);
        let c: Series = vec![None, Some(10.5)].into();
        let tr = true_range(&h, &l, &c);
        assert_approx(tr.get(0).unwrap(), 1.0, DEFAULT_EPSILON);
        assert!(tr.get(1).is_none());
    }
}
