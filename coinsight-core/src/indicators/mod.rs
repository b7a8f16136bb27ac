//! Technical indicator library.
//!
//! Every indicator is a free function: aligned input series and window
//! parameters in, one or more `Series` of the same length out. Warm-up
//! positions are undefined. There is no state between calls.
//!
//! Multi-series indicators (MACD, Bollinger, Stochastic, Ichimoku) return a
//! small struct with one named `Series` per line.

pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod fibonacci;
pub mod ichimoku;
pub mod macd;
pub mod obv;
pub mod rolling;
pub mod rsi;
pub mod sma;
pub mod stochastic;

pub use atr::{atr, true_range};
pub use bollinger::{bollinger_bands, BollingerBands};
pub use ema::ema;
pub use fibonacci::{fibonacci_retracement, FibonacciLevels, FIBONACCI_RATIOS};
pub use ichimoku::{ichimoku_cloud, IchimokuCloud, IchimokuParams};
pub use macd::{macd, Macd};
pub use obv::obv;
pub use rolling::{diff, pct_change, rolling_max, rolling_min, rolling_std};
pub use rsi::rsi;
pub use sma::sma;
pub use stochastic::{stochastic_oscillator, Stochastic};

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
