//! Crate-level tests spanning several modules.
//!
//! - `determinism.rs`: same seed and inputs replay identically
//! - `integration.rs`: full rounds through the orchestrator
//! - `helpers.rs`: encounter factories and drivers

mod helpers;

pub use helpers::*;
