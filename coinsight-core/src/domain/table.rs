//! OHLCV table: the column-oriented market data unit the engine consumes.
//!
//! `timestamps` and `close` are always present. `open`, `high`, `low` and
//! `volume` are optional because not every source delivers them (the
//! CoinGecko market chart has no OHLC, the OHLC endpoint has no volume).
//! Raw columns hold plain `f64`; a missing point inside a present column is
//! stored as NaN and becomes undefined once lifted into a `Series`.

use super::history::PriceHistory;
use super::series::Series;
use crate::error::{AnalysisError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One OHLCV row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Option<f64>,
}

impl Candle {
    /// Basic sanity check: high bounds open/close from above, low from below,
    /// volume non-negative.
    pub fn is_sane(&self) -> bool {
        let finite = self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite();
        finite
            && self.high >= self.open.max(self.close)
            && self.low <= self.open.min(self.close)
            && self.volume.map_or(true, |v| v >= 0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OhlcvTable {
    timestamps: Vec<DateTime<Utc>>,
    close: Vec<f64>,
    open: Option<Vec<f64>>,
    high: Option<Vec<f64>>,
    low: Option<Vec<f64>>,
    volume: Option<Vec<f64>>,
}

impl OhlcvTable {
    /// Close-only table. Fails if the two columns differ in length.
    pub fn new(timestamps: Vec<DateTime<Utc>>, close: Vec<f64>) -> Result<Self> {
        check_len("close", timestamps.len(), close.len())?;
        Ok(Self {
            timestamps,
            close,
            open: None,
            high: None,
            low: None,
            volume: None,
        })
    }

    pub fn with_open(mut self, open: Vec<f64>) -> Result<Self> {
        check_len("open", self.len(), open.len())?;
        self.open = Some(open);
        Ok(self)
    }

    pub fn with_high(mut self, high: Vec<f64>) -> Result<Self> {
        check_len("high", self.len(), high.len())?;
        self.high = Some(high);
        Ok(self)
    }

    pub fn with_low(mut self, low: Vec<f64>) -> Result<Self> {
        check_len("low", self.len(), low.len())?;
        self.low = Some(low);
        Ok(self)
    }

    pub fn with_volume(mut self, volume: Vec<f64>) -> Result<Self> {
        check_len("volume", self.len(), volume.len())?;
        self.volume = Some(volume);
        Ok(self)
    }

    /// Full OHLC table from rows. The volume column is present only when
    /// every row carries a volume.
    pub fn from_candles(candles: &[Candle]) -> Self {
        let has_volume = !candles.is_empty() && candles.iter().all(|c| c.volume.is_some());
        Self {
            timestamps: candles.iter().map(|c| c.timestamp).collect(),
            close: candles.iter().map(|c| c.close).collect(),
            open: Some(candles.iter().map(|c| c.open).collect()),
            high: Some(candles.iter().map(|c| c.high).collect()),
            low: Some(candles.iter().map(|c| c.low).collect()),
            volume: has_volume.then(|| {
                candles
                    .iter()
                    .map(|c| c.volume.unwrap_or(f64::NAN))
                    .collect()
            }),
        }
    }

    /// Close-only table from a market-chart history (price becomes close).
    /// Volume is attached when the history carries a volume column.
    pub fn from_price_history(history: &PriceHistory) -> Self {
        let points = history.points();
        let volume = history.has_volume().then(|| {
            points
                .iter()
                .map(|p| p.volume.unwrap_or(f64::NAN))
                .collect()
        });
        Self {
            timestamps: points.iter().map(|p| p.timestamp).collect(),
            close: points.iter().map(|p| p.price).collect(),
            open: None,
            high: None,
            low: None,
            volume,
        }
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamps.last().copied()
    }

    pub fn close(&self) -> &[f64] {
        &self.close
    }

    pub fn open(&self) -> Option<&[f64]> {
        self.open.as_deref()
    }

    pub fn high(&self) -> Option<&[f64]> {
        self.high.as_deref()
    }

    pub fn low(&self) -> Option<&[f64]> {
        self.low.as_deref()
    }

    pub fn volume(&self) -> Option<&[f64]> {
        self.volume.as_deref()
    }

    pub fn has_volume(&self) -> bool {
        self.volume.is_some()
    }

    pub fn require_high(&self) -> Result<&[f64]> {
        self.high().ok_or(AnalysisError::MissingColumn("high"))
    }

    pub fn require_low(&self) -> Result<&[f64]> {
        self.low().ok_or(AnalysisError::MissingColumn("low"))
    }

    pub fn close_series(&self) -> Series {
        Series::from_values(&self.close)
    }

    /// Highest high and lowest low over the whole table, falling back to the
    /// close column when high/low are absent. `None` for an empty table.
    pub fn price_range(&self) -> Option<(f64, f64)> {
        let highs = self.high().unwrap_or(&self.close);
        let lows = self.low().unwrap_or(&self.close);
        let high = highs
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))))?;
        let low = lows
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.min(v))))?;
        Some((high, low))
    }
}

fn check_len(column: &'static str, expected: usize, found: usize) -> Result<()> {
    if expected == found {
        Ok(())
    } else {
        Err(AnalysisError::ColumnLength {
            column,
            expected,
            found,
        })
    }
}
