//! Scoring, selection and trade levels.

pub mod factors;
pub mod levels;
pub mod report;
pub mod scoring;
pub mod selection;

pub use factors::FactorScorer;
pub use levels::{LevelCalculator, LevelError};
pub use report::ReportAssembler;
pub use scoring::*;
pub use selection::{CandidateSelector, Selection};
