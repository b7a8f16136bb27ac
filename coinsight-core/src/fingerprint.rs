//! Dataset fingerprinting: deterministic identification of OHLCV tables.
//!
//! A report carries the BLAKE3 hash of the table it was computed from and of
//! the configuration that produced it, so two reports can be compared for
//! identical inputs without keeping the data around.

use crate::data::DataOrigin;
use crate::domain::OhlcvTable;
use serde::{Deserialize, Serialize};
use std::fmt;

/// BLAKE3 hex digest of a table's contents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatasetHash(pub String);

impl DatasetHash {
    /// Hash every column in a fixed order. Absent optional columns hash
    /// differently from present ones, so adding a volume column changes the
    /// hash even if every value is NaN.
    pub fn of_table(table: &OhlcvTable) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&(table.len() as u64).to_le_bytes());
        for ts in table.timestamps() {
            hasher.update(&ts.timestamp_millis().to_le_bytes());
        }
        let columns: [(&str, Option<&[f64]>); 5] = [
            ("close", Some(table.close())),
            ("open", table.open()),
            ("high", table.high()),
            ("low", table.low()),
            ("volume", table.volume()),
        ];
        for (name, column) in columns {
            hasher.update(name.as_bytes());
            match column {
                Some(values) => {
                    hasher.update(&[1]);
                    for v in values {
                        hasher.update(&v.to_bits().to_le_bytes());
                    }
                }
                None => {
                    hasher.update(&[0]);
                }
            }
        }
        Self(hasher.finalize().to_hex().to_string())
    }

    /// First 12 hex characters, for display.
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(12)]
    }
}

impl fmt::Display for DatasetHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where a report's inputs came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    pub origin: DataOrigin,
    pub dataset_hash: DatasetHash,
    pub config_fingerprint: String,
    pub rows: usize,
}

impl Provenance {
    pub fn new(origin: DataOrigin, table: &OhlcvTable, config_fingerprint: String) -> Self {
        Self {
            origin,
            dataset_hash: DatasetHash::of_table(table),
            config_fingerprint,
            rows: table.len(),
        }
    }
}
