//! Moving Average Convergence Divergence (MACD).
//!
//! line = EMA(fast) - EMA(slow), signal = EMA(line, signal), histogram = line - signal.

use super::ema::ema;
use crate::domain::Series;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Macd {
    pub line: Series,
    pub signal: Series,
    pub histogram: Series,
}

pub fn macd(series: &Series, fast: usize, slow: usize, signal: usize) -> Macd {
    let line = ema(series, fast).zip_with(&ema(series, slow), |f, s| f - s);
    let signal = ema(&line, signal);
    let histogram = line.zip_with(&signal, |l, s| l - s);
    Macd {
        line,
        signal,
        histogram,
    }
}
