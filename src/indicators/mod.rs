//! Indicator engine: pure functions over a candle slice.
//!
//! Indicators are independent of each other and hold no state, so one
//! asset's bundle can be computed on any worker.

pub mod bundle;
pub mod error;
pub mod momentum;
pub mod trend;
pub mod volatility;
pub mod volume;

pub use bundle::*;
pub use error::IndicatorError;
