//! Bollinger Bands: moving average +/- standard deviation multiplier.
//!
//! - Middle: SMA(series, window)
//! - Upper: middle + num_std * stddev(series, window)
//! - Lower: middle - num_std * stddev(series, window)
//!
//! Uses sample stddev (divide by N-1) over the same window as the middle band.
//! First defined value at index window - 1 (window >= 2).

use super::rolling::rolling_std;
use super::sma::sma;
use crate::domain::Series;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BollingerBands {
    pub middle: Series,
    pub upper: Series,
    pub lower: Series,
}

pub fn bollinger_bands(series: &Series, window: usize, num_std: f64) -> BollingerBands {
    let middle = sma(series, window);
    let width = rolling_std(series, window).map(|std| std * num_std);
    let upper = middle.zip_with(&width, |m, w| m + w);
    let lower = middle.zip_with(&width, |m, w| m - w);
    BollingerBands {
        middle,
        upper,
        lower,
    }
}
