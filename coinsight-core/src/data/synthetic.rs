//! Seeded synthetic market data for offline runs, tests and benchmarks.
//!
//! A bounded random walk on daily candles. The same seed always yields the
//! same series; per-coin seeds are derived from a master seed with BLAKE3 so
//! they do not depend on the order coins are requested in.

use super::provider::{DataError, DataOrigin, MarketDataSource};
use crate::domain::{Candle, OhlcvTable, PriceHistory};
use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// 2024-01-01T00:00:00Z
const START_EPOCH_SECS: i64 = 1_704_067_200;
const MAX_DAYS: usize = 730;

/// Derive a per-coin seed from a master seed.
pub fn seed_for(master_seed: u64, coin: &str) -> u64 {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&master_seed.to_le_bytes());
    hasher.update(coin.as_bytes());
    let hash = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(bytes)
}

/// `n` daily candles starting at `start_price`. Every candle is sane and
/// carries a volume.
pub fn generate(seed: u64, n: usize, start_price: f64) -> Vec<Candle> {
    let mut rng = StdRng::seed_from_u64(seed);
    let start = DateTime::from_timestamp(START_EPOCH_SECS, 0).unwrap_or_default();
    let mut close = if start_price > 0.0 { start_price } else { 100.0 };

    (0..n)
        .map(|i| {
            let open = close;
            let ret: f64 = 0.0005 + rng.gen_range(-0.03..0.03);
            close = (open * (1.0 + ret)).max(f64::EPSILON);
            let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
            let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
            Candle {
                timestamp: start + Duration::days(i as i64),
                open,
                high,
                low,
                close,
                volume: Some(rng.gen_range(1.0e6..5.0e6)),
            }
        })
        .collect()
}

pub fn table(seed: u64, n: usize, start_price: f64) -> OhlcvTable {
    OhlcvTable::from_candles(&generate(seed, n, start_price))
}

/// Offline `MarketDataSource`: each coin gets its own reproducible walk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyntheticSource {
    pub seed: u64,
    pub start_price: f64,
}

impl SyntheticSource {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            start_price: 100.0,
        }
    }

    fn candles(&self, coin: &str, days: usize) -> Vec<Candle> {
        generate(seed_for(self.seed, coin), days.min(MAX_DAYS), self.start_price)
    }
}

fn day_count(days: &str) -> usize {
    match days.trim() {
        "max" => MAX_DAYS,
        other => other.parse().unwrap_or(30),
    }
}

impl MarketDataSource for SyntheticSource {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn origin(&self) -> DataOrigin {
        DataOrigin::Synthetic
    }

    fn price_history(
        &self,
        coin: &str,
        _vs_currency: &str,
        days: &str,
    ) -> Result<PriceHistory, DataError> {
        let candles = self.candles(coin, day_count(days));
        let prices: Vec<(i64, f64)> = candles
            .iter()
            .map(|c| (c.timestamp.timestamp_millis(), c.close))
            .collect();
        let volumes: Vec<(i64, f64)> = candles
            .iter()
            .filter_map(|c| Some((c.timestamp.timestamp_millis(), c.volume?)))
            .collect();
        Ok(PriceHistory::from_columns(&prices, Some(volumes.as_slice()), None))
    }

    fn ohlc(&self, coin: &str, _vs_currency: &str, days: u32) -> Result<Vec<Candle>, DataError> {
        Ok(self.candles(coin, days as usize))
    }
}
