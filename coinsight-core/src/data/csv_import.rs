//! CSV import for candles and (actual, predicted) pairs.
//!
//! Candle files have the header `timestamp,open,high,low,close[,volume]`.
//! Timestamps may be epoch milliseconds, RFC 3339, or a plain `YYYY-MM-DD`
//! date (midnight UTC). Rows are returned sorted by timestamp.

use super::provider::DataError;
use crate::domain::Candle;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct CandleRow {
    timestamp: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    #[serde(default)]
    volume: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct PairRow {
    actual: f64,
    predicted: f64,
}

pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ms) = raw.parse::<i64>() {
        return DateTime::from_timestamp_millis(ms);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

pub fn load_candles(path: &Path) -> Result<Vec<Candle>, DataError> {
    read_candles(std::fs::File::open(path)?)
}

pub fn read_candles<R: Read>(reader: R) -> Result<Vec<Candle>, DataError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut candles = Vec::new();
    for (i, row) in rdr.deserialize::<CandleRow>().enumerate() {
        // header is line 1
        let line = i + 2;
        let row = row?;
        let timestamp = parse_timestamp(&row.timestamp).ok_or_else(|| DataError::InvalidRow {
            row: line,
            reason: format!("unrecognized timestamp '{}'", row.timestamp),
        })?;
        candles.push(Candle {
            timestamp,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
        });
    }
    candles.sort_by_key(|c| c.timestamp);
    Ok(candles)
}

/// Load an `actual,predicted` file into two aligned columns.
pub fn load_prediction_pairs(path: &Path) -> Result<(Vec<f64>, Vec<f64>), DataError> {
    read_prediction_pairs(std::fs::File::open(path)?)
}

pub fn read_prediction_pairs<R: Read>(reader: R) -> Result<(Vec<f64>, Vec<f64>), DataError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut actual = Vec::new();
    let mut predicted = Vec::new();
    for row in rdr.deserialize::<PairRow>() {
        let row = row?;
        actual.push(row.actual);
        predicted.push(row.predicted);
    }
    Ok((actual, predicted))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::io::Write;

    #[test]
    fn timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(parse_timestamp("1704067200000"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-01T00:00:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-01T01:00:00+01:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-01"), Some(expected));
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn reads_rows_with_and_without_volume() {
        let data = "timestamp,open,high,low,close,volume\n\
                    2024-01-02,2,3,1,2.5,\n\
                    2024-01-01,1,2,0.5,1.5,100\n";
        let candles = read_candles(data.as_bytes()).unwrap();
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].close, 1.5);
        assert_eq!(candles[0].volume, Some(100.0));
        assert_eq!(candles[1].volume, None);
    }

    #[test]
    fn volume_column_is_optional() {
        let data = "timestamp,open,high,low,close\n1704067200000,1,2,0.5,1.5\n";
        let candles = read_candles(data.as_bytes()).unwrap();
        assert_eq!(candles[0].volume, None);
    }

    #[test]
    fn bad_timestamp_names_the_line() {
        let data = "timestamp,open,high,low,close\nsoon,1,2,0.5,1.5\n";
        match read_candles(data.as_bytes()).unwrap_err() {
            DataError::InvalidRow { row, .. } => assert_eq!(row, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn non_numeric_price_is_csv_error() {
        let data = "timestamp,open,high,low,close\n2024-01-01,a,2,0.5,1.5\n";
        assert!(matches!(
            read_candles(data.as_bytes()).unwrap_err(),
            DataError::Csv(_)
        ));
    }

    #[test]
    fn loads_pairs_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "actual,predicted\n100,102\n105,107").unwrap();
        let (actual, predicted) = load_prediction_pairs(file.path()).unwrap();
        assert_eq!(actual, vec![100.0, 105.0]);
        assert_eq!(predicted, vec![102.0, 107.0]);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_candles(Path::new("/nonexistent/candles.csv")).unwrap_err();
        assert!(matches!(err, DataError::Io(_)));
    }
}
