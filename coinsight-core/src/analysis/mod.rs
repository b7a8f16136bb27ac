//! Consumers of the indicator layer and the standalone utilities.

pub mod evaluation;
pub mod forecast;
pub mod sentiment;
pub mod signals;
pub mod trend;

pub use evaluation::{evaluate_prediction_model, EvaluationReport};
pub use forecast::{
    generate_price_forecast, DriftForecaster, ForecastPoint, ForecastReport, ForecastTrend,
    Forecaster, DEFAULT_FORECAST_DAYS,
};
pub use sentiment::{analyze_market_sentiment, NewsItem, SentimentLabel, SentimentReport};
pub use signals::{
    generate_trading_signals, generate_trading_signals_with, signals_from_indicators,
    Recommendation, SignalRow, SignalTable,
};
pub use trend::{analyze_market_trend, MarketCondition, TrendLabel, TrendReport, DEFAULT_TREND_WINDOW};
