//! Market data source trait and structured error types.
//!
//! `MarketDataSource` abstracts over where candles and price histories come
//! from (CoinGecko, seeded synthetic series) so callers can swap sources and
//! tests can run offline. The request cache and rate limiter live inside the
//! network client, not in the trait.

use crate::domain::{Candle, PriceHistory};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured error types for data operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("coin not found: {coin}")]
    CoinNotFound { coin: String },

    #[error("hard stop: provider refused requests (circuit breaker open, {remaining_secs}s left)")]
    CircuitBreakerOpen { remaining_secs: u64 },

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("invalid row {row}: {reason}")]
    InvalidRow { row: usize, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("client setup failed: {0}")]
    Client(String),
}

impl From<csv::Error> for DataError {
    fn from(e: csv::Error) -> Self {
        DataError::Csv(e.to_string())
    }
}

/// Where a table came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataOrigin {
    CoinGecko,
    CsvImport,
    Synthetic,
}

/// A source of per-coin market data.
pub trait MarketDataSource: Send + Sync {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    fn origin(&self) -> DataOrigin;

    /// Price history (with volume and market cap when the source has them)
    /// covering the last `days` days; `days` is a day count or `"max"`.
    fn price_history(
        &self,
        coin: &str,
        vs_currency: &str,
        days: &str,
    ) -> Result<PriceHistory, DataError>;

    /// OHLC candles covering the last `days` days.
    fn ohlc(&self, coin: &str, vs_currency: &str, days: u32) -> Result<Vec<Candle>, DataError>;
}
