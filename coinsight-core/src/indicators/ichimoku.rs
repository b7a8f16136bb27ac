//! Ichimoku Cloud.
//!
//! - Conversion line: midpoint of highest high / lowest low over `conversion`
//! - Base line: same over `base`
//! - Leading span A: midpoint(conversion, base) shifted forward by `displacement`
//! - Leading span B: midpoint over `lagging_span`, shifted forward by `displacement`
//! - Lagging span: close shifted backward by `displacement`
//!
//! Shifts never wrap: positions with no source point are undefined.

use super::rolling::{rolling_max, rolling_min};
use crate::domain::Series;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IchimokuParams {
    pub conversion: usize,
    pub base: usize,
    pub lagging_span: usize,
    pub displacement: usize,
}

impl Default for IchimokuParams {
    fn default() -> Self {
        Self {
            conversion: 9,
            base: 26,
            lagging_span: 52,
            displacement: 26,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IchimokuCloud {
    pub conversion_line: Series,
    pub base_line: Series,
    pub leading_span_a: Series,
    pub leading_span_b: Series,
    pub lagging_span: Series,
}

fn channel_midpoint(high: &Series, low: &Series, window: usize) -> Series {
    rolling_max(high, window).zip_with(&rolling_min(low, window), |h, l| (h + l) / 2.0)
}

/// Panics if `high`, `low` and `close` differ in length.
pub fn ichimoku_cloud(
    high: &Series,
    low: &Series,
    close: &Series,
    params: IchimokuParams,
) -> IchimokuCloud {
    assert!(
        high.len() == close.len() && low.len() == close.len(),
        "ichimoku_cloud requires aligned series"
    );
    let displacement = params.displacement as isize;

    let conversion_line = channel_midpoint(high, low, params.conversion);
    let base_line = channel_midpoint(high, low, params.base);
    let leading_span_a = conversion_line
        .zip_with(&base_line, |c, b| (c + b) / 2.0)
        .shift(displacement);
    let leading_span_b = channel_midpoint(high, low, params.lagging_span).shift(displacement);
    let lagging_span = close.shift(-displacement);

    IchimokuCloud {
        conversion_line,
        base_line,
        leading_span_a,
        leading_span_b,
        lagging_span,
    }
}
