//! Trading signal generator.
//!
//! Runs the aggregator, then per row derives five directional votes in
//! {-1, 0, +1}, their mean, and a Buy/Sell/Hold recommendation. A vote whose
//! inputs are undefined is undefined; any undefined vote leaves the combined
//! signal, strength and recommendation for that row undefined.

use crate::aggregate::{calculate_indicators_with, EnrichedTable, IndicatorConfig};
use crate::domain::OhlcvTable;
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    #[serde(rename = "Strong Buy")]
    StrongBuy,
    Buy,
    Hold,
    Sell,
    #[serde(rename = "Strong Sell")]
    StrongSell,
}

impl Recommendation {
    /// First match wins: > 0.5, > 0.2, < -0.5, < -0.2, otherwise Hold.
    pub fn from_combined(combined: f64) -> Self {
        if combined > 0.5 {
            Self::StrongBuy
        } else if combined > 0.2 {
            Self::Buy
        } else if combined < -0.5 {
            Self::StrongSell
        } else if combined < -0.2 {
            Self::Sell
        } else {
            Self::Hold
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::StrongBuy => "Strong Buy",
            Self::Buy => "Buy",
            Self::Hold => "Hold",
            Self::Sell => "Sell",
            Self::StrongSell => "Strong Sell",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalRow {
    pub timestamp: DateTime<Utc>,
    pub sma_crossover: Option<i8>,
    pub rsi_signal: Option<i8>,
    pub macd_signal: Option<i8>,
    pub bb_signal: Option<i8>,
    pub stoch_signal: Option<i8>,
    pub combined_signal: Option<f64>,
    pub signal_strength: Option<f64>,
    pub recommendation: Option<Recommendation>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SignalTable {
    rows: Vec<SignalRow>,
}

impl SignalTable {
    pub fn rows(&self) -> &[SignalRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Most recent row that carries a recommendation.
    pub fn latest(&self) -> Option<&SignalRow> {
        self.rows.iter().rev().find(|r| r.recommendation.is_some())
    }
}

pub fn generate_trading_signals(table: &OhlcvTable) -> Result<SignalTable> {
    generate_trading_signals_with(table, &IndicatorConfig::default())
}

pub fn generate_trading_signals_with(
    table: &OhlcvTable,
    config: &IndicatorConfig,
) -> Result<SignalTable> {
    let enriched = calculate_indicators_with(table, config)?;
    Ok(signals_from_indicators(&enriched, config))
}

/// Derive the signal table from an already enriched table.
pub fn signals_from_indicators(enriched: &EnrichedTable, config: &IndicatorConfig) -> SignalTable {
    let ind = enriched.indicators();
    let close = enriched.table().close();
    let sma_mid = IndicatorConfig::sma_name(config.sma_mid);
    let sma_slow = IndicatorConfig::sma_name(config.sma_slow);
    let rsi_name = config.rsi_name();

    let rows = enriched
        .table()
        .timestamps()
        .iter()
        .enumerate()
        .map(|(i, &timestamp)| {
            let at = |name: &str| ind.get(name, i);
            let close = close.get(i).copied().filter(|c| c.is_finite());

            let sma_crossover = sma_crossover_vote(at(&sma_mid), at(&sma_slow));
            let rsi_signal = rsi_vote(at(&rsi_name));
            let macd_signal = macd_vote(at("macd_line"), at("macd_signal"));
            let bb_signal = bollinger_vote(close, at("bb_lower"), at("bb_upper"));
            let stoch_signal = stochastic_vote(at("stoch_k"), at("stoch_d"));

            let combined_signal = combine(&[
                sma_crossover,
                rsi_signal,
                macd_signal,
                bb_signal,
                stoch_signal,
            ]);

            SignalRow {
                timestamp,
                sma_crossover,
                rsi_signal,
                macd_signal,
                bb_signal,
                stoch_signal,
                combined_signal,
                signal_strength: combined_signal.map(f64::abs),
                recommendation: combined_signal.map(Recommendation::from_combined),
            }
        })
        .collect();

    SignalTable { rows }
}

fn sma_crossover_vote(mid: Option<f64>, slow: Option<f64>) -> Option<i8> {
    let (mid, slow) = (mid?, slow?);
    Some(if mid > slow { 1 } else { -1 })
}

fn rsi_vote(rsi: Option<f64>) -> Option<i8> {
    let rsi = rsi?;
    Some(if rsi < 30.0 {
        1
    } else if rsi > 70.0 {
        -1
    } else {
        0
    })
}

fn macd_vote(line: Option<f64>, signal: Option<f64>) -> Option<i8> {
    let (line, signal) = (line?, signal?);
    Some(if line > signal { 1 } else { -1 })
}

fn bollinger_vote(close: Option<f64>, lower: Option<f64>, upper: Option<f64>) -> Option<i8> {
    let (close, lower, upper) = (close?, lower?, upper?);
    Some(if close < lower {
        1
    } else if close > upper {
        -1
    } else {
        0
    })
}

fn stochastic_vote(k: Option<f64>, d: Option<f64>) -> Option<i8> {
    let (k, d) = (k?, d?);
    Some(if k < 20.0 && k > d {
        1
    } else if k > 80.0 && k < d {
        -1
    } else {
        0
    })
}

fn combine(votes: &[Option<i8>]) -> Option<f64> {
    let mut sum = 0i32;
    for vote in votes {
        sum += i32::from((*vote)?);
    }
    Some(sum as f64 / votes.len() as f64)
}
