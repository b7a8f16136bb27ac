//! Market trend analyzer: point-in-time snapshot of trend, volatility,
//! momentum and overbought/oversold condition, taken at the last observation.

use crate::domain::{OhlcvTable, Series};
use crate::indicators::{diff, pct_change, rolling_std, rsi, sma};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_TREND_WINDOW: usize = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendLabel {
    #[serde(rename = "Strong Uptrend")]
    StrongUptrend,
    Uptrend,
    Sideways,
    Downtrend,
    #[serde(rename = "Strong Downtrend")]
    StrongDowntrend,
    /// Not enough history to compute trend strength.
    Unavailable,
}

impl TrendLabel {
    pub fn from_strength(strength: Option<f64>) -> Self {
        match strength {
            None => Self::Unavailable,
            Some(s) if s > 0.05 => Self::StrongUptrend,
            Some(s) if s > 0.01 => Self::Uptrend,
            Some(s) if s < -0.05 => Self::StrongDowntrend,
            Some(s) if s < -0.01 => Self::Downtrend,
            Some(_) => Self::Sideways,
        }
    }
}

impl fmt::Display for TrendLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::StrongUptrend => "Strong Uptrend",
            Self::Uptrend => "Uptrend",
            Self::Sideways => "Sideways",
            Self::Downtrend => "Downtrend",
            Self::StrongDowntrend => "Strong Downtrend",
            Self::Unavailable => "Unavailable",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketCondition {
    Overbought,
    Oversold,
    Neutral,
    /// RSI undefined at the last point.
    Unavailable,
}

impl MarketCondition {
    pub fn from_rsi(rsi: Option<f64>) -> Self {
        match rsi {
            None => Self::Unavailable,
            Some(r) if r > 70.0 => Self::Overbought,
            Some(r) if r < 30.0 => Self::Oversold,
            Some(_) => Self::Neutral,
        }
    }
}

impl fmt::Display for MarketCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Overbought => "Overbought",
            Self::Oversold => "Oversold",
            Self::Neutral => "Neutral",
            Self::Unavailable => "Unavailable",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendReport {
    pub trend: TrendLabel,
    pub trend_strength: Option<f64>,
    pub volatility: Option<f64>,
    pub momentum: Option<f64>,
    pub rsi: Option<f64>,
    pub market_condition: MarketCondition,
    /// Whether the source table carried a volume column. When false the two
    /// volume fields are absent rather than undefined.
    pub has_volume: bool,
    pub avg_volume: Option<f64>,
    pub volume_change: Option<f64>,
}

/// Trend snapshot over the close column.
///
/// - volatility: rolling sample std of percent change over `window`, scaled by sqrt(window)
/// - trend_strength: (SMA(window) - SMA(2*window)) / SMA(2*window)
/// - momentum: close[t] - close[t - window]
/// - rsi: RSI(close, window)
pub fn analyze_market_trend(table: &OhlcvTable, window: usize) -> TrendReport {
    let price = table.close_series();

    let volatility = rolling_std(&pct_change(&price, 1), window)
        .last()
        .map(|std| std * (window as f64).sqrt());

    let short = sma(&price, window).last();
    let long = sma(&price, window * 2).last();
    let trend_strength = match (short, long) {
        (Some(s), Some(l)) if l != 0.0 => Some((s - l) / l),
        _ => None,
    };

    let momentum = diff(&price, window).last();
    let rsi_last = rsi(&price, window).last();

    let (avg_volume, volume_change) = match table.volume() {
        Some(volume) => {
            let volume = Series::from_values(volume);
            (
                sma(&volume, window).last(),
                pct_change(&volume, window).last(),
            )
        }
        None => (None, None),
    };

    TrendReport {
        trend: TrendLabel::from_strength(trend_strength),
        trend_strength,
        volatility,
        momentum,
        rsi: rsi_last,
        market_condition: MarketCondition::from_rsi(rsi_last),
        has_volume: table.has_volume(),
        avg_volume,
        volume_change,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::synthetic;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};
    use chrono::{Duration, TimeZone, Utc};

    fn close_table(closes: &[f64]) -> OhlcvTable {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let ts = (0..closes.len())
            .map(|i| start + Duration::days(i as i64))
            .collect();
        OhlcvTable::new(ts, closes.to_vec()).unwrap()
    }

    #[test]
    fn trend_thresholds() {
        assert_eq!(TrendLabel::from_strength(Some(0.06)), TrendLabel::StrongUptrend);
        assert_eq!(TrendLabel::from_strength(Some(0.05)), TrendLabel::Uptrend);
        assert_eq!(TrendLabel::from_strength(Some(0.01)), TrendLabel::Sideways);
        assert_eq!(TrendLabel::from_strength(Some(-0.01)), TrendLabel::Sideways);
        assert_eq!(TrendLabel::from_strength(Some(-0.02)), TrendLabel::Downtrend);
        assert_eq!(TrendLabel::from_strength(Some(-0.051)), TrendLabel::StrongDowntrend);
        assert_eq!(TrendLabel::from_strength(None), TrendLabel::Unavailable);
    }

    #[test]
    fn rsi_thresholds() {
        assert_eq!(MarketCondition::from_rsi(Some(70.1)), MarketCondition::Overbought);
        assert_eq!(MarketCondition::from_rsi(Some(70.0)), MarketCondition::Neutral);
        assert_eq!(MarketCondition::from_rsi(Some(29.9)), MarketCondition::Oversold);
        assert_eq!(MarketCondition::from_rsi(None), MarketCondition::Unavailable);
    }

    #[test]
    fn steady_uptrend_is_detected() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 * 1.01_f64.powi(i)).collect();
        let report = analyze_market_trend(&close_table(&closes), 14);
        assert_eq!(report.trend, TrendLabel::StrongUptrend);
        assert_eq!(report.market_condition, MarketCondition::Overbought);
        assert!(report.momentum.unwrap() > 0.0);
        // constant 1% step → zero volatility
        assert_approx(report.volatility.unwrap(), 0.0, 1e-9);
        assert!(!report.has_volume);
        assert_eq!(report.avg_volume, None);
        assert_eq!(report.volume_change, None);
    }

    #[test]
    fn flat_series_is_sideways() {
        let report = analyze_market_trend(&close_table(&[10.0; 40]), 14);
        assert_eq!(report.trend, TrendLabel::Sideways);
        assert_approx(report.trend_strength.unwrap(), 0.0, DEFAULT_EPSILON);
        assert_approx(report.momentum.unwrap(), 0.0, DEFAULT_EPSILON);
        // flat → avg_loss 0 → RSI saturates
        assert_eq!(report.rsi, Some(100.0));
    }

    #[test]
    fn short_history_is_unavailable() {
        let report = analyze_market_trend(
            &close_table(&[100.0, 105.0, 110.0, 108.0, 112.0, 115.0, 118.0]),
            14,
        );
        assert_eq!(report.trend, TrendLabel::Unavailable);
        assert_eq!(report.market_condition, MarketCondition::Unavailable);
        assert_eq!(report.trend_strength, None);
        assert_eq!(report.volatility, None);
        assert_eq!(report.momentum, None);
        assert_eq!(report.rsi, None);
    }

    #[test]
    fn empty_table_does_not_panic() {
        let report = analyze_market_trend(&close_table(&[]), 14);
        assert_eq!(report.trend, TrendLabel::Unavailable);
    }

    #[test]
    fn volume_fields_with_volume_column() {
        let table = synthetic::table(21, 60, 100.0);
        let report = analyze_market_trend(&table, 14);
        assert!(report.has_volume);
        assert!(report.avg_volume.unwrap() > 0.0);
        assert!(report.volume_change.is_some());
    }

    #[test]
    fn labels_serialize_with_spaces() {
        let json = serde_json::to_string(&TrendLabel::StrongDowntrend).unwrap();
        assert_eq!(json, "\"Strong Downtrend\"");
        assert_eq!(TrendLabel::StrongUptrend.to_string(), "Strong Uptrend");
    }
}
