//! Domain types for Coinsight

pub mod history;
pub mod series;
pub mod table;

pub use history::{PriceHistory, PricePoint};
pub use series::Series;
pub use table::{Candle, OhlcvTable};
