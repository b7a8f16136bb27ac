//! Exponential Moving Average (EMA).
//!
//! Recursive: EMA[t] = alpha * x[t] + (1 - alpha) * EMA[t-1], alpha = 2 / (window + 1).
//! Seed: EMA at the first defined point equals that point, so a raw price
//! series has no warm-up gap.
//!
//! An undefined input point yields an undefined output at that position; the
//! recursion picks up again from the last defined EMA value.

use crate::domain::Series;

pub fn ema(series: &Series, window: usize) -> Series {
    if window == 0 {
        return Series::undefined(series.len());
    }

    let alpha = 2.0 / (window as f64 + 1.0);
    let mut prev: Option<f64> = None;

    series
        .iter()
        .map(|v| {
            let x = v?;
            let next = match prev {
                None => x,
                Some(p) => alpha * x + (1.0 - alpha) * p,
            };
            prev = Some(next);
            Some(next)
        })
        .collect()
}
