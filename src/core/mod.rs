//! Core application primitives (pipeline, runtime, scheduler, HTTP)

pub mod http;
pub mod pipeline;
pub mod runtime;
pub mod scheduler;

pub use http::*;
pub use pipeline::*;
pub use runtime::*;
pub use scheduler::*;
