//! Market data acquisition: CoinGecko client, request caching and rate
//! limiting, CSV import, synthetic series.

pub mod circuit_breaker;
pub mod coingecko;
pub mod csv_import;
pub mod provider;
pub mod rate_limit;
pub mod request_cache;
pub mod synthetic;

pub use circuit_breaker::CircuitBreaker;
pub use coingecko::{CoinGeckoClient, CoinListEntry, CoinMarket, MarketsQuery};
pub use provider::{DataError, DataOrigin, MarketDataSource};
pub use rate_limit::RateLimiter;
pub use request_cache::{RequestKey, ResponseCache};
pub use synthetic::SyntheticSource;
