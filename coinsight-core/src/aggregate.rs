//! Indicator aggregator: applies the full indicator set to an OHLCV table.
//!
//! The source table is borrowed immutably and cloned into the result; every
//! call builds a fresh `IndicatorSet`. Same input, same output.

use crate::domain::{OhlcvTable, Series};
use crate::error::Result;
use crate::indicators::{atr, bollinger_bands, ema, macd, obv, rsi, sma, stochastic_oscillator};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Window parameters for the aggregated indicator set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    pub sma_fast: usize,
    pub sma_mid: usize,
    pub sma_slow: usize,
    pub ema_fast: usize,
    pub ema_slow: usize,
    pub rsi_window: usize,
    pub macd_signal: usize,
    pub bb_window: usize,
    pub bb_num_std: f64,
    pub stoch_k: usize,
    pub stoch_d: usize,
    pub atr_window: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            sma_fast: 20,
            sma_mid: 50,
            sma_slow: 200,
            ema_fast: 12,
            ema_slow: 26,
            rsi_window: 14,
            macd_signal: 9,
            bb_window: 20,
            bb_num_std: 2.0,
            stoch_k: 14,
            stoch_d: 3,
            atr_window: 14,
        }
    }
}

impl IndicatorConfig {
    pub fn sma_name(window: usize) -> String {
        format!("sma_{window}")
    }

    pub fn ema_name(window: usize) -> String {
        format!("ema_{window}")
    }

    pub fn rsi_name(&self) -> String {
        format!("rsi_{}", self.rsi_window)
    }

    /// Rows needed before every signal vote is defined. Shorter tables never
    /// produce a combined signal.
    pub fn signal_warm_up(&self) -> usize {
        [
            self.sma_mid,
            self.sma_slow,
            self.rsi_window + 1,
            (self.ema_slow + self.macd_signal).saturating_sub(1),
            self.bb_window,
            (self.stoch_k + self.stoch_d).saturating_sub(1),
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }
}

/// Named indicator series aligned with a source table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct IndicatorSet {
    series: BTreeMap<String, Series>,
}

impl IndicatorSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, values: Series) {
        self.series.insert(name.into(), values);
    }

    /// Value of a named indicator at `index`.
    pub fn get(&self, name: &str, index: usize) -> Option<f64> {
        self.series.get(name).and_then(|s| s.get(index))
    }

    pub fn series(&self, name: &str) -> Option<&Series> {
        self.series.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.series.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Series)> {
        self.series.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// A copy of the source table with its indicator columns attached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedTable {
    table: OhlcvTable,
    indicators: IndicatorSet,
}

impl EnrichedTable {
    pub fn table(&self) -> &OhlcvTable {
        &self.table
    }

    pub fn indicators(&self) -> &IndicatorSet {
        &self.indicators
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Every indicator value at row `index`, keyed by name.
    pub fn row(&self, index: usize) -> BTreeMap<&str, Option<f64>> {
        self.indicators
            .iter()
            .map(|(name, s)| (name, s.get(index)))
            .collect()
    }
}

/// Full indicator set with the default windows.
pub fn calculate_all_indicators(table: &OhlcvTable) -> Result<EnrichedTable> {
    calculate_indicators_with(table, &IndicatorConfig::default())
}

/// Full indicator set. Requires `high` and `low`; `obv` is attached only when
/// the table has a volume column.
pub fn calculate_indicators_with(
    table: &OhlcvTable,
    config: &IndicatorConfig,
) -> Result<EnrichedTable> {
    let high = Series::from_values(table.require_high()?);
    let low = Series::from_values(table.require_low()?);
    let close = table.close_series();

    let mut set = IndicatorSet::new();

    for window in [config.sma_fast, config.sma_mid, config.sma_slow] {
        set.insert(IndicatorConfig::sma_name(window), sma(&close, window));
    }
    for window in [config.ema_fast, config.ema_slow] {
        set.insert(IndicatorConfig::ema_name(window), ema(&close, window));
    }

    set.insert(config.rsi_name(), rsi(&close, config.rsi_window));

    let m = macd(&close, config.ema_fast, config.ema_slow, config.macd_signal);
    set.insert("macd_line", m.line);
    set.insert("macd_signal", m.signal);
    set.insert("macd_histogram", m.histogram);

    let bb = bollinger_bands(&close, config.bb_window, config.bb_num_std);
    set.insert("bb_middle", bb.middle);
    set.insert("bb_upper", bb.upper);
    set.insert("bb_lower", bb.lower);

    let st = stochastic_oscillator(&high, &low, &close, config.stoch_k, config.stoch_d);
    set.insert("stoch_k", st.k);
    set.insert("stoch_d", st.d);

    set.insert("atr", atr(&high, &low, &close, config.atr_window));

    if let Some(volume) = table.volume() {
        set.insert("obv", obv(&close, &Series::from_values(volume)));
    }

    Ok(EnrichedTable {
        table: table.clone(),
        indicators: set,
    })
}
