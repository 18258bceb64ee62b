//! Utils Module - Helper Functions & Shared Utilities
//!
//! Constants shared across the crate and the assessment telemetry.

pub mod constants;
pub mod telemetry;

pub use constants::*;
pub use telemetry::*;
