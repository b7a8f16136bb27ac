//! Fibonacci retracement levels between a range low and high.
//!
//! level(r) = low + r * (high - low) for the fixed ratio set. The end points
//! are taken verbatim so level(0.0) == low and level(1.0) == high exactly.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

pub const FIBONACCI_RATIOS: [f64; 7] = [0.0, 0.236, 0.382, 0.5, 0.618, 0.786, 1.0];

const RATIO_LABELS: [&str; 7] = ["0.0", "0.236", "0.382", "0.5", "0.618", "0.786", "1.0"];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FibonacciLevels {
    levels: [f64; 7],
}

impl FibonacciLevels {
    /// Price at `ratio`, if it is one of the fixed ratios.
    pub fn level(&self, ratio: f64) -> Option<f64> {
        FIBONACCI_RATIOS
            .iter()
            .position(|&r| r == ratio)
            .map(|i| self.levels[i])
    }

    /// `(label, ratio, price)` in ascending ratio order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64, f64)> + '_ {
        RATIO_LABELS
            .iter()
            .zip(FIBONACCI_RATIOS.iter())
            .zip(self.levels.iter())
            .map(|((&label, &ratio), &price)| (label, ratio, price))
    }

    pub fn prices(&self) -> &[f64; 7] {
        &self.levels
    }
}

// Serialized as a `{"0.0": low, ..., "1.0": high}` map.
impl Serialize for FibonacciLevels {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.levels.len()))?;
        for (label, _, price) in self.iter() {
            map.serialize_entry(label, &price)?;
        }
        map.end()
    }
}

pub fn fibonacci_retracement(high: f64, low: f64) -> FibonacciLevels {
    let diff = high - low;
    let mut levels = [0.0; 7];
    for (slot, &ratio) in levels.iter_mut().zip(FIBONACCI_RATIOS.iter()) {
        *slot = low + ratio * diff;
    }
    levels[0] = low;
    levels[6] = high;
    FibonacciLevels { levels }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_levels() {
        let fib = fibonacci_retracement(200.0, 100.0);
        assert_eq!(fib.level(0.0), Some(100.0));
        assert_eq!(fib.level(0.236), Some(100.0 + 0.236 * 100.0));
        assert_eq!(fib.level(0.382), Some(100.0 + 0.382 * 100.0));
        assert_eq!(fib.level(0.5), Some(150.0));
        assert_eq!(fib.level(0.618), Some(100.0 + 0.618 * 100.0));
        assert_eq!(fib.level(0.786), Some(100.0 + 0.786 * 100.0));
        assert_eq!(fib.level(1.0), Some(200.0));
        assert_eq!(fib.level(0.3), None);
    }

    #[test]
    fn levels_are_monotonic() {
        let fib = fibonacci_retracement(0.75, 0.5);
        for pair in fib.prices().windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn serializes_as_labelled_map() {
        let json = serde_json::to_value(fibonacci_retracement(2.0, 1.0)).unwrap();
        assert_eq!(json["0.0"], 1.0);
        assert_eq!(json["0.5"], 1.5);
        assert_eq!(json["1.0"], 2.0);
    }
}
