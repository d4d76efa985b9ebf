//! Trend indicators: EMA and short-term price direction

pub mod direction;
pub mod ema;

pub use direction::*;
pub use ema::*;
