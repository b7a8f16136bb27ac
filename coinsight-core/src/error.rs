//! Structured error types for the analysis engine.
//!
//! Insufficient history and degenerate arithmetic never show up here: those
//! surface as undefined (`None`) values in the produced series and reports.
//! Errors are reserved for inputs the engine cannot interpret at all.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum AnalysisError {
    #[error("length mismatch: {actual} actual values vs {predicted} predicted values")]
    LengthMismatch { actual: usize, predicted: usize },

    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("column '{column}' has {found} rows, expected {expected}")]
    ColumnLength {
        column: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("empty input: {0}")]
    EmptyInput(&'static str),

    #[error(transparent)]
    Forecast(#[from] ForecastError),
}

/// Failures reported by (or about) an external forecast model.
#[derive(Debug, Error, PartialEq)]
pub enum ForecastError {
    #[error("forecaster returned {returned} prices for a {requested}-day horizon")]
    HorizonMismatch { requested: usize, returned: usize },

    #[error("not enough history for forecasting: need {needed}, have {available}")]
    InsufficientHistory { needed: usize, available: usize },

    #[error("forecast model failed: {0}")]
    Model(String),
}

pub type Result<T, E = AnalysisError> = std::result::Result<T, E>;
