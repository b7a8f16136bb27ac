//! Simple Moving Average (SMA).
//!
//! Arithmetic mean of the trailing `window` values, current point included.
//! First defined value at index `window - 1`.

use super::rolling::{mean, rolling_apply};
use crate::domain::Series;

pub fn sma(series: &Series, window: usize) -> Series {
    rolling_apply(series, window, |w| Some(mean(w)))
}
