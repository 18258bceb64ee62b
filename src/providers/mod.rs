//! Providers Module - External Artifacts
//!
//! The pre-fitted scaler and pre-trained risk model. Both are opaque to the
//! rest of the crate beyond the `Scaler` / `RiskModel` contracts.

pub mod artifacts;
pub mod network;
pub mod scaler;

pub use artifacts::*;
pub use network::*;
pub use scaler::*;
