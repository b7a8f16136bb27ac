//! Forecast report over an external price predictor.
//!
//! The engine never trains or runs a model itself. Anything that can turn a
//! close history into `days` future prices implements [`Forecaster`];
//! [`DriftForecaster`] is a deterministic least-squares baseline.

use crate::domain::OhlcvTable;
use crate::error::{AnalysisError, ForecastError, Result};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_FORECAST_DAYS: usize = 7;

pub trait Forecaster: Send + Sync {
    fn name(&self) -> &str;

    /// Predict `days` future prices following `history` (oldest first).
    fn predict_future(&self, history: &[f64], days: usize) -> Result<Vec<f64>, ForecastError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ForecastTrend {
    #[serde(rename = "Strong Bullish")]
    StrongBullish,
    Bullish,
    Neutral,
    Bearish,
    #[serde(rename = "Strong Bearish")]
    StrongBearish,
}

impl ForecastTrend {
    /// Classify the final predicted price against the last observed price.
    pub fn classify(last_price: f64, final_price: f64) -> Self {
        if final_price > last_price * 1.10 {
            Self::StrongBullish
        } else if final_price > last_price * 1.02 {
            Self::Bullish
        } else if final_price < last_price * 0.90 {
            Self::StrongBearish
        } else if final_price < last_price * 0.98 {
            Self::Bearish
        } else {
            Self::Neutral
        }
    }
}

impl fmt::Display for ForecastTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::StrongBullish => "Strong Bullish",
            Self::Bullish => "Bullish",
            Self::Neutral => "Neutral",
            Self::Bearish => "Bearish",
            Self::StrongBearish => "Strong Bearish",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub price: f64,
    /// Undefined when the last observed price is 0.
    pub change_percent: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastReport {
    pub model: String,
    pub last_price: f64,
    pub forecast_trend: ForecastTrend,
    pub max_price: f64,
    pub min_price: f64,
    pub avg_price: f64,
    pub forecast_data: Vec<ForecastPoint>,
}

/// Run `model` over the close history of `table` and summarize `days` of
/// predictions. Entries are dated one day apart starting the day after the
/// last observation.
pub fn generate_price_forecast(
    table: &OhlcvTable,
    model: &dyn Forecaster,
    days: usize,
) -> Result<ForecastReport> {
    let (last_price, last_ts) = match (table.close().last(), table.last_timestamp()) {
        (Some(&p), Some(ts)) => (p, ts),
        _ => return Err(AnalysisError::EmptyInput("price history")),
    };
    if days == 0 {
        return Err(AnalysisError::EmptyInput("forecast horizon"));
    }

    let predicted = model.predict_future(table.close(), days)?;
    if predicted.len() != days {
        return Err(ForecastError::HorizonMismatch {
            requested: days,
            returned: predicted.len(),
        }
        .into());
    }
    let final_price = predicted[predicted.len() - 1];

    let start = last_ts.date_naive();
    let forecast_data = predicted
        .iter()
        .enumerate()
        .map(|(i, &price)| ForecastPoint {
            date: start + Duration::days(i as i64 + 1),
            price,
            change_percent: (last_price != 0.0)
                .then(|| (price - last_price) / last_price * 100.0),
        })
        .collect();

    let max_price = predicted.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min_price = predicted.iter().copied().fold(f64::INFINITY, f64::min);
    let avg_price = predicted.iter().sum::<f64>() / predicted.len() as f64;

    Ok(ForecastReport {
        model: model.name().to_string(),
        last_price,
        forecast_trend: ForecastTrend::classify(last_price, final_price),
        max_price,
        min_price,
        avg_price,
        forecast_data,
    })
}

/// Linear extrapolation of the least-squares slope over the last `lookback`
/// prices, anchored at the last price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriftForecaster {
    pub lookback: usize,
}

impl Default for DriftForecaster {
    fn default() -> Self {
        Self { lookback: 30 }
    }
}

impl DriftForecaster {
    pub fn new(lookback: usize) -> Self {
        Self { lookback }
    }

    fn slope(values: &[f64]) -> f64 {
        let n = values.len() as f64;
        let mean_x = (n - 1.0) / 2.0;
        let mean_y = values.iter().sum::<f64>() / n;
        let (mut num, mut den) = (0.0, 0.0);
        for (i, y) in values.iter().enumerate() {
            let dx = i as f64 - mean_x;
            num += dx * (y - mean_y);
            den += dx * dx;
        }
        if den == 0.0 {
            0.0
        } else {
            num / den
        }
    }
}

impl Forecaster for DriftForecaster {
    fn name(&self) -> &str {
        "drift"
    }

    fn predict_future(&self, history: &[f64], days: usize) -> Result<Vec<f64>, ForecastError> {
        let needed = self.lookback.max(2);
        if history.len() < needed {
            return Err(ForecastError::InsufficientHistory {
                needed,
                available: history.len(),
            });
        }
        let window = &history[history.len() - needed..];
        if window.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::Model("non-finite price in lookback window".into()));
        }
        let slope = Self::slope(window);
        let last = window[window.len() - 1];
        Ok((1..=days).map(|d| last + slope * d as f64).collect())
    }
}
