//! Series: a numeric time series with an explicit undefined marker.
//!
//! Every indicator returns a `Series` aligned index-for-index with its input.
//! Warm-up positions and degenerate points are `None`, never a made-up number.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Series {
    values: Vec<Option<f64>>,
}

impl Series {
    /// Build a series from raw numbers. Non-finite inputs become undefined.
    pub fn from_values(values: &[f64]) -> Self {
        values
            .iter()
            .map(|&v| if v.is_finite() { Some(v) } else { None })
            .collect()
    }

    /// A series of `len` undefined points.
    pub fn undefined(len: usize) -> Self {
        Self {
            values: vec![None; len],
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at `index`; `None` when undefined or out of range.
    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied().flatten()
    }

    /// Value at the last position (the point-in-time snapshot used by reports).
    pub fn last(&self) -> Option<f64> {
        self.values.last().copied().flatten()
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<f64>> + '_ {
        self.values.iter().copied()
    }

    /// Number of defined points.
    pub fn defined_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    /// Index of the first defined point.
    pub fn first_defined(&self) -> Option<usize> {
        self.values.iter().position(|v| v.is_some())
    }

    /// Apply `f` to every defined point.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Series {
        self.iter().map(|v| v.map(&f)).collect()
    }

    /// Combine two aligned series point by point. Undefined on either side
    /// yields undefined.
    ///
    /// # Panics
    /// Panics if the lengths differ; callers only combine series derived from
    /// the same source index.
    pub fn zip_with(&self, other: &Series, f: impl Fn(f64, f64) -> f64) -> Series {
        assert_eq!(
            self.len(),
            other.len(),
            "zip_with requires aligned series"
        );
        self.iter()
            .zip(other.iter())
            .map(|(a, b)| match (a, b) {
                (Some(a), Some(b)) => Some(f(a, b)),
                _ => None,
            })
            .collect()
    }

    /// Shift values by `periods` positions: positive moves values forward in
    /// time (later indices), negative moves them backward. Vacated positions
    /// are undefined; values pushed past either end are dropped.
    pub fn shift(&self, periods: isize) -> Series {
        let n = self.len();
        let mut out = vec![None; n];
        for (i, slot) in out.iter_mut().enumerate() {
            let src = i as isize - periods;
            if src >= 0 && (src as usize) < n {
                *slot = self.values[src as usize];
            }
        }
        Series { values: out }
    }
}

impl From<Vec<Option<f64>>> for Series {
    fn from(values: Vec<Option<f64>>) -> Self {
        Self { values }
    }
}

impl From<&[f64]> for Series {
    fn from(values: &[f64]) -> Self {
        Self::from_values(values)
    }
}

impl FromIterator<Option<f64>> for Series {
    fn from_iter<I: IntoIterator<Item = Option<f64>>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_values_marks_non_finite_undefined() {
        let s = Series::from_values(&[1.0, f64::NAN, f64::INFINITY, 4.0]);
        assert_eq!(s.values(), &[Some(1.0), None, None, Some(4.0)]);
        assert_eq!(s.defined_count(), 2);
    }

    #[test]
    fn shift_forward_and_backward() {
        let s = Series::from_values(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(s.shift(2).values(), &[None, None, Some(1.0), Some(2.0)]);
        assert_eq!(s.shift(-1).values(), &[Some(2.0), Some(3.0), Some(4.0), None]);
        assert_eq!(s.shift(0), s);
    }

    #[test]
    fn shift_past_length_is_all_undefined() {
        let s = Series::from_values(&[1.0, 2.0]);
        assert_eq!(s.shift(5).defined_count(), 0);
        assert_eq!(s.shift(-5).defined_count(), 0);
    }

    #[test]
    fn zip_with_propagates_undefined() {
        let a: Series = vec![Some(1.0), None, Some(3.0)].into();
        let b: Series = vec![Some(1.0), Some(2.0), None].into();
        assert_eq!(a.zip_with(&b, |x, y| x + y).values(), &[Some(2.0), None, None]);
    }

    #[test]
    fn last_and_get() {
        let s: Series = vec![Some(1.0), None].into();
        assert_eq!(s.get(0), Some(1.0));
        assert_eq!(s.get(1), None);
        assert_eq!(s.get(9), None);
        assert_eq!(s.last(), None);
        assert_eq!(s.first_defined(), Some(0));
    }

    #[test]
    fn serializes_undefined_as_null() {
        let s: Series = vec![Some(1.5), None].into();
        assert_eq!(serde_json::to_string(&s).unwrap(), "[1.5,null]");
    }
}
