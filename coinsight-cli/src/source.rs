//! Resolves the data source flags into OHLCV tables.
//!
//! CoinGecko serves two shapes: the market chart (close + volume, any day
//! count) and the OHLC endpoint (candles without volume, fixed ranges).
//! Commands that need high/low ask for candles; the rest take the chart.

use anyhow::{bail, Context, Result};
use clap::Args;
use coinsight_core::config::AppConfig;
use coinsight_core::data::{csv_import, CoinGeckoClient, DataOrigin, MarketDataSource, SyntheticSource};
use coinsight_core::domain::OhlcvTable;
use std::path::PathBuf;

/// Data source flags shared by the analysis commands.
#[derive(Debug, Clone, Default, Args)]
pub struct SourceArgs {
    /// Read candles from a CSV file (timestamp,open,high,low,close[,volume]).
    #[arg(long, global = true, conflicts_with = "synthetic")]
    pub csv: Option<PathBuf>,

    /// Use seeded synthetic data instead of CoinGecko.
    #[arg(long, global = true, default_value_t = false)]
    pub synthetic: bool,

    /// Master seed for synthetic data.
    #[arg(long, global = true, default_value_t = 42)]
    pub seed: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Close and volume.
    Chart,
    /// Open, high, low and close.
    Candles,
}

pub enum Source {
    Csv(PathBuf),
    Synthetic(SyntheticSource),
    CoinGecko(CoinGeckoClient),
}

impl Source {
    pub fn from_args(args: &SourceArgs, config: &AppConfig) -> Result<Self> {
        if let Some(path) = &args.csv {
            return Ok(Self::Csv(path.clone()));
        }
        if args.synthetic {
            return Ok(Self::Synthetic(SyntheticSource::new(args.seed)));
        }
        let client = CoinGeckoClient::new(&config.api).context("failed to build CoinGecko client")?;
        Ok(Self::CoinGecko(client))
    }

    pub fn origin(&self) -> DataOrigin {
        match self {
            Self::Csv(_) => DataOrigin::CsvImport,
            Self::Synthetic(s) => s.origin(),
            Self::CoinGecko(c) => c.origin(),
        }
    }

    pub fn coingecko(&self) -> Result<&CoinGeckoClient> {
        match self {
            Self::CoinGecko(client) => Ok(client),
            _ => bail!("this command needs the CoinGecko API; drop --csv/--synthetic"),
        }
    }

    pub fn load(&self, coin: &str, vs_currency: &str, days: &str, shape: Shape) -> Result<OhlcvTable> {
        let table = match self {
            Self::Csv(path) => {
                let candles = csv_import::load_candles(path)
                    .with_context(|| format!("failed to load {}", path.display()))?;
                OhlcvTable::from_candles(&candles)
            }
            Self::Synthetic(source) => from_source(source, coin, vs_currency, days, shape)?,
            Self::CoinGecko(client) => from_source(client, coin, vs_currency, days, shape)?,
        };
        if table.is_empty() {
            bail!("no data for {coin}");
        }
        tracing::info!(coin, rows = table.len(), origin = ?self.origin(), "loaded table");
        Ok(table)
    }
}

fn from_source(
    source: &dyn MarketDataSource,
    coin: &str,
    vs_currency: &str,
    days: &str,
    shape: Shape,
) -> Result<OhlcvTable> {
    let table = match shape {
        Shape::Chart => {
            let history = source
                .price_history(coin, vs_currency, days)
                .with_context(|| format!("{}: price history for {coin}", source.name()))?;
            OhlcvTable::from_price_history(&history)
        }
        Shape::Candles => {
            let candles = source
                .ohlc(coin, vs_currency, candle_days(days))
                .with_context(|| format!("{}: OHLC for {coin}", source.name()))?;
            OhlcvTable::from_candles(&candles)
        }
    };
    Ok(table)
}

/// OHLC ranges are numeric; `max` maps to the longest one served.
pub fn candle_days(days: &str) -> u32 {
    match days.trim() {
        "max" => 365,
        other => other.parse().unwrap_or(365),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn candle_days_parsing() {
        assert_eq!(candle_days("30"), 30);
        assert_eq!(candle_days(" 90 "), 90);
        assert_eq!(candle_days("max"), 365);
        assert_eq!(candle_days("weekly"), 365);
    }

    #[test]
    fn synthetic_source_serves_both_shapes() {
        let args = SourceArgs {
            synthetic: true,
            seed: 3,
            ..SourceArgs::default()
        };
        let source = Source::from_args(&args, &AppConfig::default()).unwrap();
        assert_eq!(source.origin(), DataOrigin::Synthetic);

        let chart = source.load("bitcoin", "usd", "60", Shape::Chart).unwrap();
        assert_eq!(chart.len(), 60);
        assert!(chart.high().is_none());

        let candles = source.load("bitcoin", "usd", "60", Shape::Candles).unwrap();
        assert!(candles.high().is_some());
        assert_eq!(chart.close(), candles.close());
        assert!(source.coingecko().is_err());
    }

    #[test]
    fn csv_source_ignores_coin() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "timestamp,open,high,low,close\n2024-01-01,1,2,0.5,1.5\n2024-01-02,1.5,2.5,1,2"
        )
        .unwrap();
        let args = SourceArgs {
            csv: Some(file.path().to_path_buf()),
            ..SourceArgs::default()
        };
        let source = Source::from_args(&args, &AppConfig::default()).unwrap();
        assert_eq!(source.origin(), DataOrigin::CsvImport);
        let table = source.load("anything", "usd", "30", Shape::Chart).unwrap();
        assert_eq!(table.close(), &[1.5, 2.0]);
    }

    #[test]
    fn empty_csv_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "timestamp,open,high,low,close").unwrap();
        let args = SourceArgs {
            csv: Some(file.path().to_path_buf()),
            ..SourceArgs::default()
        };
        let source = Source::from_args(&args, &AppConfig::default()).unwrap();
        assert!(source.load("x", "usd", "30", Shape::Candles).is_err());
    }
}
