//! Coinsight CLI: market data, indicator, trend, signal and forecast reports.
//!
//! Commands:
//! - `top`: top coins by market cap
//! - `trend`, `signals`, `indicators`, `forecast`, `fib`: single-coin analyses
//! - `report`: trend, latest signal and forecast for several coins
//! - `sentiment`: aggregate scored news items from a JSON file
//! - `evaluate`: score predictions in an `actual,predicted` CSV
//!
//! Reports go to stdout as JSON (CSV for `signals`); logs go to stderr.

mod source;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use coinsight_core::aggregate::{calculate_indicators_with, IndicatorConfig};
use coinsight_core::analysis::{
    analyze_market_sentiment, analyze_market_trend, evaluate_prediction_model,
    generate_price_forecast, generate_trading_signals_with, DriftForecaster, ForecastReport,
    NewsItem, SignalRow, SignalTable, TrendReport,
};
use coinsight_core::config::AppConfig;
use coinsight_core::data::csv_import;
use coinsight_core::domain::OhlcvTable;
use coinsight_core::fingerprint::Provenance;
use coinsight_core::indicators::{fibonacci_retracement, FibonacciLevels};
use rayon::prelude::*;
use serde::Serialize;
use source::{Shape, Source, SourceArgs};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "coinsight",
    about = "Coinsight CLI: crypto market analytics"
)]
struct Cli {
    /// Path to a TOML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging (overridden by RUST_LOG).
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(flatten)]
    source: SourceArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Top coins by market cap.
    Top {
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
    /// Trend, volatility, momentum and RSI snapshot.
    Trend {
        coin: String,
        #[arg(long, default_value = "30")]
        days: String,
        #[arg(long, default_value = "usd")]
        vs: String,
        /// Defaults to `analysis.trend_window`.
        #[arg(long)]
        window: Option<usize>,
    },
    /// Per-row trading signals as CSV.
    Signals {
        coin: String,
        #[arg(long, default_value = "365")]
        days: String,
        #[arg(long, default_value = "usd")]
        vs: String,
        /// Write to a file instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Last value of every indicator.
    Indicators {
        coin: String,
        #[arg(long, default_value = "365")]
        days: String,
        #[arg(long, default_value = "usd")]
        vs: String,
    },
    /// Drift forecast of future prices.
    Forecast {
        coin: String,
        #[arg(long, default_value = "90")]
        days: String,
        #[arg(long, default_value = "usd")]
        vs: String,
        /// Defaults to `analysis.forecast_days`.
        #[arg(long)]
        days_ahead: Option<usize>,
    },
    /// Fibonacci retracement over the table's high/low range.
    Fib {
        coin: String,
        #[arg(long, default_value = "90")]
        days: String,
        #[arg(long, default_value = "usd")]
        vs: String,
    },
    /// Trend, latest signal and forecast for several coins.
    Report {
        #[arg(required = true)]
        coins: Vec<String>,
        #[arg(long, default_value = "365")]
        days: String,
        #[arg(long, default_value = "usd")]
        vs: String,
    },
    /// Aggregate a JSON array of `{title, sentiment_score}` items.
    Sentiment { path: PathBuf },
    /// Score predictions from an `actual,predicted` CSV.
    Evaluate { path: PathBuf },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(cli.config.as_deref())?;
    tracing::debug!(fingerprint = %config.fingerprint(), "configuration loaded");

    match cli.command {
        Commands::Sentiment { path } => run_sentiment(&path),
        Commands::Evaluate { path } => run_evaluate(&path),
        command => {
            let source = Source::from_args(&cli.source, &config)?;
            run_market_command(command, &source, &config)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(AppConfig::from_env()),
    }
}

fn run_market_command(command: Commands, source: &Source, config: &AppConfig) -> Result<()> {
    let analysis = &config.analysis;
    match command {
        Commands::Top { limit } => {
            let coins = source.coingecko()?.top_coins(limit)?;
            print_json(&coins)
        }
        Commands::Trend {
            coin,
            days,
            vs,
            window,
        } => {
            let table = source.load(&coin, &vs, &days, Shape::Chart)?;
            let report = analyze_market_trend(&table, window.unwrap_or(analysis.trend_window));
            print_json(&report)
        }
        Commands::Signals {
            coin,
            days,
            vs,
            output,
        } => {
            let table = source.load(&coin, &vs, &days, Shape::Candles)?;
            warn_short_history(&coin, &table, &analysis.indicators);
            let signals = generate_trading_signals_with(&table, &analysis.indicators)?;
            match output {
                Some(path) => {
                    let file = std::fs::File::create(&path)
                        .with_context(|| format!("failed to create {}", path.display()))?;
                    write_signals_csv(&signals, file)?;
                    tracing::info!(rows = signals.len(), path = %path.display(), "signals written");
                    Ok(())
                }
                None => write_signals_csv(&signals, std::io::stdout().lock()),
            }
        }
        Commands::Indicators { coin, days, vs } => {
            let table = source.load(&coin, &vs, &days, Shape::Candles)?;
            let enriched = calculate_indicators_with(&table, &analysis.indicators)?;
            let last = enriched.len() - 1;
            print_json(&LatestIndicators {
                coin: &coin,
                timestamp: table.timestamps()[last],
                close: table.close()[last],
                values: enriched.row(last),
            })
        }
        Commands::Forecast {
            coin,
            days,
            vs,
            days_ahead,
        } => {
            let table = source.load(&coin, &vs, &days, Shape::Chart)?;
            let model = DriftForecaster::new(analysis.forecast_lookback);
            let report = generate_price_forecast(
                &table,
                &model,
                days_ahead.unwrap_or(analysis.forecast_days),
            )?;
            print_json(&report)
        }
        Commands::Fib { coin, days, vs } => {
            let table = source.load(&coin, &vs, &days, Shape::Candles)?;
            let (high, low) = table
                .price_range()
                .with_context(|| format!("no finite prices for {coin}"))?;
            print_json(&FibReport {
                coin: &coin,
                high,
                low,
                levels: fibonacci_retracement(high, low),
            })
        }
        Commands::Report { coins, days, vs } => {
            let reports = run_report(&coins, &days, &vs, source, config)?;
            print_json(&reports)
        }
        // file-based commands are dispatched before a source is built
        Commands::Sentiment { .. } | Commands::Evaluate { .. } => Ok(()),
    }
}

#[derive(Serialize)]
struct LatestIndicators<'a> {
    coin: &'a str,
    timestamp: DateTime<Utc>,
    close: f64,
    values: BTreeMap<&'a str, Option<f64>>,
}

#[derive(Serialize)]
struct FibReport<'a> {
    coin: &'a str,
    high: f64,
    low: f64,
    levels: FibonacciLevels,
}

#[derive(Serialize)]
struct CoinReport {
    coin: String,
    provenance: Provenance,
    trend: TrendReport,
    latest_signal: Option<SignalRow>,
    forecast: Option<ForecastReport>,
}

/// Fetch sequentially (the client is rate limited), analyze in parallel.
fn run_report(
    coins: &[String],
    days: &str,
    vs: &str,
    source: &Source,
    config: &AppConfig,
) -> Result<Vec<CoinReport>> {
    let tables = coins
        .iter()
        .map(|coin| Ok((coin.clone(), source.load(coin, vs, days, Shape::Candles)?)))
        .collect::<Result<Vec<_>>>()?;

    let analysis = &config.analysis;
    let fingerprint = config.fingerprint();
    let origin = source.origin();

    tables
        .into_par_iter()
        .map(|(coin, table)| {
            warn_short_history(&coin, &table, &analysis.indicators);
            let signals = generate_trading_signals_with(&table, &analysis.indicators)
                .with_context(|| format!("signals for {coin}"))?;
            let model = DriftForecaster::new(analysis.forecast_lookback);
            let forecast = match generate_price_forecast(&table, &model, analysis.forecast_days) {
                Ok(report) => Some(report),
                Err(e) => {
                    tracing::warn!(%coin, error = %e, "forecast skipped");
                    None
                }
            };
            Ok(CoinReport {
                provenance: Provenance::new(origin, &table, fingerprint.clone()),
                trend: analyze_market_trend(&table, analysis.trend_window),
                latest_signal: signals.latest().cloned(),
                forecast,
                coin,
            })
        })
        .collect()
}

/// Warn when `table` is too short for any row to carry a recommendation.
/// CoinGecko serves 4-day candles for ranges over 30 days, so `--days 365`
/// yields roughly 92 rows.
fn warn_short_history(coin: &str, table: &OhlcvTable, indicators: &IndicatorConfig) -> bool {
    let needed = indicators.signal_warm_up();
    let short = table.len() < needed;
    if short {
        tracing::warn!(
            %coin,
            rows = table.len(),
            needed,
            "history too short for a combined signal; use --csv or widen the range"
        );
    }
    short
}

fn run_sentiment(path: &Path) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let items: Vec<NewsItem> = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a JSON array of news items", path.display()))?;
    print_json(&analyze_market_sentiment(&items))
}

fn run_evaluate(path: &Path) -> Result<()> {
    let (actual, predicted) = csv_import::load_prediction_pairs(path)
        .with_context(|| format!("failed to load {}", path.display()))?;
    print_json(&evaluate_prediction_model(&actual, &predicted)?)
}

fn write_signals_csv<W: Write>(signals: &SignalTable, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in signals.rows() {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let mut out = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}
