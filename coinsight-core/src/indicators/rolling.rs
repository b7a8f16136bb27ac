//! Trailing-window and differencing primitives shared by the indicators.
//!
//! A window is "full" at position `i` once `window` points end at `i`. Any
//! undefined point inside the window makes the output undefined; a window of
//! 0 never fills.

use crate::domain::Series;

/// Apply `f` to every full trailing window of defined values.
pub(crate) fn rolling_apply(
    series: &Series,
    window: usize,
    f: impl Fn(&[f64]) -> Option<f64>,
) -> Series {
    let n = series.len();
    let mut result = vec![None; n];
    if window == 0 || n < window {
        return result.into();
    }

    let values = series.values();
    let mut buf = Vec::with_capacity(window);
    for i in (window - 1)..n {
        buf.clear();
        for v in &values[(i + 1 - window)..=i] {
            match v {
                Some(x) => buf.push(*x),
                None => break,
            }
        }
        if buf.len() == window {
            result[i] = f(&buf);
        }
    }
    result.into()
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator). Undefined for fewer than
/// two values.
pub(crate) fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    Some((ss / (values.len() - 1) as f64).sqrt())
}

pub fn rolling_max(series: &Series, window: usize) -> Series {
    rolling_apply(series, window, |w| {
        w.iter().copied().reduce(f64::max)
    })
}

pub fn rolling_min(series: &Series, window: usize) -> Series {
    rolling_apply(series, window, |w| {
        w.iter().copied().reduce(f64::min)
    })
}

/// Trailing sample standard deviation over `window`.
pub fn rolling_std(series: &Series, window: usize) -> Series {
    rolling_apply(series, window, sample_std)
}

/// `series[t] - series[t - periods]`; the first `periods` points are undefined.
pub fn diff(series: &Series, periods: usize) -> Series {
    series.zip_with(&series.shift(periods as isize), |cur, prev| cur - prev)
}

/// `(series[t] - series[t - periods]) / series[t - periods]`. A zero base is
/// undefined rather than infinite.
pub fn pct_change(series: &Series, periods: usize) -> Series {
    let prev = series.shift(periods as isize);
    series
        .iter()
        .zip(prev.iter())
        .map(|(cur, prev)| match (cur, prev) {
            (Some(c), Some(p)) if p != 0.0 => Some((c - p) / p),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn rolling_max_min_basic() {
        let s = Series::from_values(&[3.0, 1.0, 4.0, 1.0, 5.0]);
        let hi = rolling_max(&s, 3);
        let lo = rolling_min(&s, 3);
        assert_eq!(hi.values(), &[None, None, Some(4.0), Some(4.0), Some(5.0)]);
        assert_eq!(lo.values(), &[None, None, Some(1.0), Some(1.0), Some(1.0)]);
    }

    #[test]
    fn rolling_std_is_sample_std() {
        // [2, 4, 4, 4, 5, 5, 7, 9]: mean 5, sum of squares 32, sample var 32/7
        let s = Series::from_values(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        let std = rolling_std(&s, 8);
        assert_approx(std.get(7).unwrap(), (32.0_f64 / 7.0).sqrt(), DEFAULT_EPSILON);
    }

    #[test]
    fn window_with_undefined_point_is_undefined() {
        let s: Series = vec![Some(1.0), None, Some(3.0), Some(4.0)].into();
        let hi = rolling_max(&s, 2);
        assert_eq!(hi.values(), &[None, None, None, Some(4.0)]);
    }

    #[test]
    fn zero_window_never_fills() {
        let s = Series::from_values(&[1.0, 2.0]);
        assert_eq!(rolling_max(&s, 0).defined_count(), 0);
    }

    #[test]
    fn diff_and_pct_change() {
        let s = Series::from_values(&[100.0, 110.0, 0.0, 5.0]);
        assert_eq!(diff(&s, 1).values(), &[None, Some(10.0), Some(-110.0), Some(5.0)]);
        let pct = pct_change(&s, 1);
        assert_eq!(pct.get(0), None);
        assert_approx(pct.get(1).unwrap(), 0.1, DEFAULT_EPSILON);
        assert_approx(pct.get(2).unwrap(), -1.0, DEFAULT_EPSILON);
        // base is zero
        assert_eq!(pct.get(3), None);
    }
}
