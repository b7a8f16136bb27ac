//! CoinGecko v3 REST client.
//!
//! Blocking reqwest client with a structured response cache, minimum-interval
//! rate limiting, bounded retries with exponential backoff on 429/5xx, and
//! the circuit breaker. Parsing lives in free functions so it can be tested
//! against inline fixtures.

use super::circuit_breaker::CircuitBreaker;
use super::provider::{DataError, DataOrigin, MarketDataSource};
use super::rate_limit::RateLimiter;
use super::request_cache::{RequestKey, ResponseCache};
use crate::config::ApiConfig;
use crate::domain::{Candle, PriceHistory};
use chrono::{DateTime, NaiveDate};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";

const CHART_DAYS: [&str; 8] = ["1", "7", "14", "30", "90", "180", "365", "max"];
const OHLC_DAYS: [u32; 7] = [1, 7, 14, 30, 90, 180, 365];

/// Entry of `coins/list`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinListEntry {
    pub id: String,
    pub symbol: String,
    pub name: String,
}

/// Entry of `coins/markets`. Only the fields the CLI reports are typed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinMarket {
    pub id: String,
    pub symbol: String,
    pub name: String,
    #[serde(default)]
    pub current_price: Option<f64>,
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub market_cap_rank: Option<u32>,
    #[serde(default)]
    pub total_volume: Option<f64>,
    #[serde(default)]
    pub price_change_percentage_24h: Option<f64>,
}

/// Parameters of a `coins/markets` query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketsQuery {
    pub vs_currency: String,
    pub ids: Vec<String>,
    pub category: Option<String>,
    pub order: String,
    pub per_page: u32,
    pub page: u32,
}

impl Default for MarketsQuery {
    fn default() -> Self {
        Self {
            vs_currency: "usd".into(),
            ids: Vec::new(),
            category: None,
            order: "market_cap_desc".into(),
            per_page: 100,
            page: 1,
        }
    }
}

impl MarketsQuery {
    fn key(&self) -> RequestKey {
        let mut key = RequestKey::new("coins/markets")
            .param("vs_currency", &self.vs_currency)
            .param("order", &self.order)
            .param("per_page", self.per_page)
            .param("page", self.page)
            .param("sparkline", "false");
        if !self.ids.is_empty() {
            key = key.param("ids", self.ids.join(","));
        }
        if let Some(category) = &self.category {
            key = key.param("category", category);
        }
        key
    }
}

/// Accepts the listed day counts, `max`, or any digit string; anything else
/// falls back to `30`.
pub fn normalize_chart_days(days: &str) -> String {
    let days = days.trim();
    if CHART_DAYS.contains(&days) || (!days.is_empty() && days.bytes().all(|b| b.is_ascii_digit()))
    {
        days.to_string()
    } else {
        tracing::warn!(days, "invalid days parameter, defaulting to 30");
        "30".to_string()
    }
}

/// `daily` for `max` or more than 90 days, else `hourly`.
pub fn chart_interval(days: &str) -> &'static str {
    if days == "max" || days.parse::<u64>().is_ok_and(|d| d > 90) {
        "daily"
    } else {
        "hourly"
    }
}

/// OHLC only serves fixed ranges; anything else falls back to 1 day.
pub fn normalize_ohlc_days(days: u32) -> u32 {
    if OHLC_DAYS.contains(&days) {
        days
    } else {
        tracing::warn!(days, "unsupported OHLC range, defaulting to 1");
        1
    }
}

pub fn market_chart_key(coin: &str, vs_currency: &str, days: &str) -> RequestKey {
    let days = normalize_chart_days(days);
    RequestKey::new(format!("coins/{coin}/market_chart"))
        .param("vs_currency", vs_currency)
        .param("interval", chart_interval(&days))
        .param("days", days)
}

pub fn ohlc_key(coin: &str, vs_currency: &str, days: u32) -> RequestKey {
    RequestKey::new(format!("coins/{coin}/ohlc"))
        .param("vs_currency", vs_currency)
        .param("days", normalize_ohlc_days(days))
}

#[derive(Debug, Deserialize)]
struct MarketChartResponse {
    prices: Option<Vec<[f64; 2]>>,
    total_volumes: Option<Vec<[f64; 2]>>,
    market_caps: Option<Vec<[f64; 2]>>,
}

fn pairs(raw: &[[f64; 2]]) -> Vec<(i64, f64)> {
    raw.iter().map(|[ms, v]| (*ms as i64, *v)).collect()
}

/// Parse a `market_chart` body into a price history.
pub fn parse_market_chart(coin: &str, body: &Value) -> Result<PriceHistory, DataError> {
    let chart = MarketChartResponse::deserialize(body).map_err(|e| {
        DataError::ResponseFormatChanged(format!("market chart for {coin}: {e}"))
    })?;
    let prices = chart.prices.ok_or_else(|| {
        DataError::ResponseFormatChanged(format!("no price data in response for {coin}"))
    })?;
    let volumes = chart.total_volumes.as_deref().map(pairs);
    let caps = chart.market_caps.as_deref().map(pairs);
    Ok(PriceHistory::from_columns(
        &pairs(&prices),
        volumes.as_deref(),
        caps.as_deref(),
    ))
}

/// Parse an `ohlc` body (`[[ms, open, high, low, close], ...]`).
pub fn parse_ohlc(coin: &str, body: &Value) -> Result<Vec<Candle>, DataError> {
    let rows = Vec::<[f64; 5]>::deserialize(body)
        .map_err(|e| DataError::ResponseFormatChanged(format!("OHLC for {coin}: {e}")))?;
    let mut candles = rows
        .into_iter()
        .map(|[ms, open, high, low, close]| {
            let timestamp = DateTime::from_timestamp_millis(ms as i64).ok_or_else(|| {
                DataError::ResponseFormatChanged(format!("invalid timestamp {ms} for {coin}"))
            })?;
            Ok(Candle {
                timestamp,
                open,
                high,
                low,
                close,
                volume: None,
            })
        })
        .collect::<Result<Vec<_>, DataError>>()?;
    candles.sort_by_key(|c| c.timestamp);
    Ok(candles)
}

fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

pub struct CoinGeckoClient {
    http: reqwest::blocking::Client,
    base_url: String,
    api_key: Option<String>,
    cache: ResponseCache,
    limiter: RateLimiter,
    circuit_breaker: Arc<CircuitBreaker>,
    max_retries: u32,
    base_delay: Duration,
}

impl CoinGeckoClient {
    pub fn new(config: &ApiConfig) -> Result<Self, DataError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("coinsight/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DataError::Client(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            cache: ResponseCache::new(config.cache_capacity),
            limiter: RateLimiter::new(config.rate_limit()),
            circuit_breaker: Arc::new(CircuitBreaker::default_provider()),
            max_retries: config.max_retries,
            base_delay: Duration::from_secs(1),
        })
    }

    /// Share a breaker across clients.
    pub fn with_circuit_breaker(mut self, breaker: Arc<CircuitBreaker>) -> Self {
        self.circuit_breaker = breaker;
        self
    }

    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub fn circuit_breaker(&self) -> &CircuitBreaker {
        &self.circuit_breaker
    }

    fn breaker_open(&self) -> DataError {
        DataError::CircuitBreakerOpen {
            remaining_secs: self.circuit_breaker.remaining_cooldown().as_secs(),
        }
    }

    /// GET `key`, answering from the cache when possible. Only successful
    /// responses are cached.
    pub fn get_json(&self, key: &RequestKey) -> Result<Value, DataError> {
        if let Some(hit) = self.cache.get(key) {
            tracing::debug!(endpoint = key.endpoint(), "cache hit");
            return Ok(hit);
        }
        let value = self.fetch_with_retry(key)?;
        self.cache.insert(key.clone(), value.clone());
        Ok(value)
    }

    fn fetch_with_retry(&self, key: &RequestKey) -> Result<Value, DataError> {
        let url = format!("{}/{}", self.base_url, key.endpoint());
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = backoff_delay(self.base_delay, attempt);
                tracing::warn!(%url, attempt, delay_ms = delay.as_millis() as u64, "retrying");
                std::thread::sleep(delay);
            }
            if !self.circuit_breaker.is_allowed() {
                return Err(self.breaker_open());
            }

            self.limiter.wait();
            tracing::info!(%url, params = ?key.params(), "request");

            let mut request = self.http.get(&url).query(&key.query());
            if let Some(api_key) = &self.api_key {
                request = request.header("x-cg-api-key", api_key);
            }

            let resp = match request.send() {
                Ok(resp) => resp,
                Err(e) if e.is_connect() || e.is_timeout() => {
                    self.circuit_breaker.record_failure();
                    last_error = Some(DataError::NetworkUnreachable(e.to_string()));
                    continue;
                }
                Err(e) => return Err(DataError::NetworkUnreachable(e.to_string())),
            };

            let status = resp.status();
            if status == StatusCode::FORBIDDEN {
                self.circuit_breaker.trip();
                tracing::error!(%url, "403 from provider, circuit breaker tripped");
                return Err(self.breaker_open());
            }
            if status == StatusCode::UNAUTHORIZED {
                return Err(DataError::AuthenticationRequired(
                    "set COINGECKO_API_KEY or api.api_key".into(),
                ));
            }
            if status == StatusCode::NOT_FOUND {
                return Err(DataError::CoinNotFound {
                    coin: key.endpoint().to_string(),
                });
            }
            if is_retryable(status) {
                self.circuit_breaker.record_failure();
                last_error = Some(if status == StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = resp
                        .headers()
                        .get("retry-after")
                        .and_then(|v| v.to_str().ok())
                        .and_then(|v| v.parse::<u64>().ok())
                        .unwrap_or(60);
                    DataError::RateLimited { retry_after_secs }
                } else {
                    DataError::Http {
                        status: status.as_u16(),
                        url: url.clone(),
                    }
                });
                continue;
            }
            if !status.is_success() {
                return Err(DataError::Http {
                    status: status.as_u16(),
                    url,
                });
            }

            let body: Value = resp.json().map_err(|e| {
                DataError::ResponseFormatChanged(format!("invalid JSON from {url}: {e}"))
            })?;
            self.circuit_breaker.record_success();
            tracing::debug!(%url, "request successful");
            return Ok(body);
        }

        Err(last_error.unwrap_or_else(|| DataError::NetworkUnreachable("max retries exceeded".into())))
    }

    fn get_typed<T: for<'de> Deserialize<'de>>(&self, key: &RequestKey) -> Result<T, DataError> {
        let body = self.get_json(key)?;
        T::deserialize(&body).map_err(|e| {
            DataError::ResponseFormatChanged(format!("{}: {e}", key.endpoint()))
        })
    }

    pub fn coins_list(&self) -> Result<Vec<CoinListEntry>, DataError> {
        self.get_typed(&RequestKey::new("coins/list"))
    }

    pub fn coins_markets(&self, query: &MarketsQuery) -> Result<Vec<CoinMarket>, DataError> {
        self.get_typed(&query.key())
    }

    /// Top coins by market cap.
    pub fn top_coins(&self, limit: u32) -> Result<Vec<CoinMarket>, DataError> {
        self.coins_markets(&MarketsQuery {
            per_page: limit.max(1),
            ..MarketsQuery::default()
        })
    }

    /// Current coin data with market data, without tickers or community data.
    pub fn coin_data(&self, coin: &str) -> Result<Value, DataError> {
        let key = RequestKey::new(format!("coins/{coin}"))
            .param("localization", "false")
            .param("tickers", "false")
            .param("market_data", "true")
            .param("community_data", "false")
            .param("developer_data", "false")
            .param("sparkline", "false");
        self.get_json(&key)
    }

    /// Snapshot of a coin on `date`.
    pub fn coin_history(&self, coin: &str, date: NaiveDate) -> Result<Value, DataError> {
        let key = RequestKey::new(format!("coins/{coin}/history"))
            .param("date", date.format("%d-%m-%Y"))
            .param("localization", "false");
        self.get_json(&key)
    }

    pub fn market_chart(
        &self,
        coin: &str,
        vs_currency: &str,
        days: &str,
    ) -> Result<PriceHistory, DataError> {
        let body = self.get_json(&market_chart_key(coin, vs_currency, days))?;
        let history = parse_market_chart(coin, &body)?;
        tracing::info!(coin, records = history.len(), "processed market chart");
        Ok(history)
    }

    pub fn ohlc_candles(
        &self,
        coin: &str,
        vs_currency: &str,
        days: u32,
    ) -> Result<Vec<Candle>, DataError> {
        let body = self.get_json(&ohlc_key(coin, vs_currency, days))?;
        parse_ohlc(coin, &body)
    }
}

/// `base * 2^(attempt - 1)`, saturating.
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
}

impl MarketDataSource for CoinGeckoClient {
    fn name(&self) -> &str {
        "coingecko"
    }

    fn origin(&self) -> DataOrigin {
        DataOrigin::CoinGecko
    }

    fn price_history(
        &self,
        coin: &str,
        vs_currency: &str,
        days: &str,
    ) -> Result<PriceHistory, DataError> {
        self.market_chart(coin, vs_currency, days)
    }

    fn ohlc(&self, coin: &str, vs_currency: &str, days: u32) -> Result<Vec<Candle>, DataError> {
        self.ohlc_candles(coin, vs_currency, days)
    }
}
