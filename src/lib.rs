//! Swing-trading scanner: technical indicators, factor scoring and
//! candidate selection over a universe of crypto assets.

pub mod cli;
pub mod common;
pub mod config;
pub mod core;
pub mod indicators;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod signals;

pub use crate::config::{AnalysisConfig, ServiceConfig};
pub use crate::core::pipeline::{run_analysis, AnalysisEngine, AssetInput};
pub use crate::models::report::Report;
