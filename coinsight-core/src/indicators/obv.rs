//! On-Balance Volume (OBV).
//!
//! Running total: +volume when close rose, -volume when it fell, 0 when
//! unchanged. The first point contributes 0. A step whose close, previous
//! close or volume is undefined is itself undefined and leaves the running
//! total untouched.

use crate::domain::Series;

pub fn obv(close: &Series, volume: &Series) -> Series {
    let mut total = 0.0;
    (0..close.len())
        .map(|i| {
            if i == 0 {
                close.get(0)?;
                return Some(total);
            }
            let (cur, prev, vol) = (close.get(i)?, close.get(i - 1)?, volume.get(i)?);
            if cur > prev {
                total += vol;
            } else if cur < prev {
                total -= vol;
            }
            Some(total)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn obv_known_values() {
        let close = Series::from_values(&[10.0, 11.0, 11.0, 9.0, 12.0]);
        let volume = Series::from_values(&[100.0, 200.0, 300.0, 400.0, 500.0]);
        let result = obv(&close, &volume);
        assert_eq!(
            result.values(),
            &[Some(0.0), Some(200.0), Some(200.0), Some(-200.0), Some(300.0)]
        );
    }

    #[test]
    fn first_point_is_zero_even_with_large_volume() {
        let close = Series::from_values(&[10.0]);
        let volume = Series::from_values(&[1e9]);
        assert_eq!(obv(&close, &volume).get(0), Some(0.0));
    }

    #[test]
    fn undefined_volume_skips_step() {
        let close = Series::from_values(&[10.0, 11.0, 12.0]);
        let volume: Series = vec![Some(1.0), None, Some(5.0)].into();
        let result = obv(&close, &volume);
        assert_eq!(result.values(), &[Some(0.0), None, Some(5.0)]);
    }
}
