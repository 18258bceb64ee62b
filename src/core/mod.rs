//! Core Module - Assessment Logic
//!
//! Feature assembly, risk classification, gauge and report rendering, and
//! the pipeline that ties them to the external scaler/model.

pub mod classifier;
pub mod features;
pub mod gauge;
pub mod pipeline;
pub mod report;

pub use classifier::*;
pub use gauge::*;
pub use pipeline::*;
pub use report::*;
