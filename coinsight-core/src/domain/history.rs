//! Price history: the `(timestamp, price)` series a market-chart source
//! delivers, with optional volume and market-cap columns joined on timestamp.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
    pub volume: Option<f64>,
    pub market_cap: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceHistory {
    points: Vec<PricePoint>,
    has_volume: bool,
    has_market_cap: bool,
}

impl PriceHistory {
    /// Join raw `(epoch_ms, value)` columns on timestamp.
    ///
    /// Prices drive the index (left join): a volume or market-cap point with
    /// no matching price is dropped, a price with no matching volume keeps
    /// `None`. Points whose timestamp cannot be represented are skipped.
    /// The result is sorted by timestamp.
    pub fn from_columns(
        prices: &[(i64, f64)],
        volumes: Option<&[(i64, f64)]>,
        market_caps: Option<&[(i64, f64)]>,
    ) -> Self {
        let volume_by_ts: Option<HashMap<i64, f64>> =
            volumes.map(|v| v.iter().copied().collect());
        let cap_by_ts: Option<HashMap<i64, f64>> =
            market_caps.map(|v| v.iter().copied().collect());

        let mut points: Vec<PricePoint> = prices
            .iter()
            .filter_map(|&(ms, price)| {
                let timestamp = DateTime::from_timestamp_millis(ms)?;
                Some(PricePoint {
                    timestamp,
                    price,
                    volume: volume_by_ts.as_ref().and_then(|m| m.get(&ms).copied()),
                    market_cap: cap_by_ts.as_ref().and_then(|m| m.get(&ms).copied()),
                })
            })
            .collect();
        points.sort_by_key(|p| p.timestamp);

        Self {
            points,
            has_volume: volumes.is_some(),
            has_market_cap: market_caps.is_some(),
        }
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn has_volume(&self) -> bool {
        self.has_volume
    }

    pub fn has_market_cap(&self) -> bool {
        self.has_market_cap
    }

    pub fn prices(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.price).collect()
    }
}
