//! Coinsight Core: crypto market analytics.
//!
//! - Domain types (series with explicit undefined values, OHLCV tables, price histories)
//! - Technical indicator library and the aggregated indicator set
//! - Trend snapshot, trading signals, model evaluation, news sentiment, forecast reports
//! - Market data layer (CoinGecko client, request cache, rate limiter, CSV import, synthetic data)
//! - TOML configuration and dataset fingerprints
//!
//! Everything from `indicators` through `analysis` is pure and synchronous:
//! no I/O, no logging, no state between calls.

pub mod aggregate;
pub mod analysis;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod fingerprint;
pub mod indicators;

pub use error::{AnalysisError, ForecastError, Result};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: engine and data types are Send + Sync, so tables
    /// can be analyzed on worker threads and the client shared across them.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        // Domain types
        require_send::<domain::Series>();
        require_sync::<domain::Series>();
        require_send::<domain::OhlcvTable>();
        require_sync::<domain::OhlcvTable>();
        require_send::<domain::Candle>();
        require_sync::<domain::Candle>();
        require_send::<domain::PriceHistory>();
        require_sync::<domain::PriceHistory>();

        // Indicator outputs
        require_send::<aggregate::EnrichedTable>();
        require_sync::<aggregate::EnrichedTable>();
        require_send::<indicators::IchimokuCloud>();
        require_sync::<indicators::IchimokuCloud>();
        require_send::<indicators::FibonacciLevels>();
        require_sync::<indicators::FibonacciLevels>();

        // Reports
        require_send::<analysis::TrendReport>();
        require_sync::<analysis::TrendReport>();
        require_send::<analysis::SignalTable>();
        require_sync::<analysis::SignalTable>();
        require_send::<analysis::EvaluationReport>();
        require_sync::<analysis::EvaluationReport>();
        require_send::<analysis::SentimentReport>();
        require_sync::<analysis::SentimentReport>();
        require_send::<analysis::ForecastReport>();
        require_sync::<analysis::ForecastReport>();
        require_send::<analysis::DriftForecaster>();
        require_sync::<analysis::DriftForecaster>();

        // Data layer
        require_send::<data::CoinGeckoClient>();
        require_sync::<data::CoinGeckoClient>();
        require_send::<data::ResponseCache>();
        require_sync::<data::ResponseCache>();
        require_send::<data::SyntheticSource>();
        require_sync::<data::SyntheticSource>();
        require_send::<config::AppConfig>();
        require_sync::<config::AppConfig>();
    }

    /// Architecture contract: the aggregator borrows its input immutably.
    #[test]
    fn aggregator_takes_shared_reference() {
        fn _check(table: &domain::OhlcvTable) -> Result<aggregate::EnrichedTable> {
            aggregate::calculate_all_indicators(table)
        }
    }

    /// Sources are usable as trait objects.
    #[test]
    fn market_data_source_is_object_safe() {
        let source: Box<dyn data::MarketDataSource> = Box::new(data::SyntheticSource::new(1));
        assert_eq!(source.name(), "synthetic");
    }
}
