//! Fisher-matrix engine.
//!
//! Responsibilities:
//!
//! - derivatives of the projected response (closed form or central differences)
//! - per-detector Fisher matrix assembly and population (parallel over signals)
//! - network aggregation, threshold filtering and sky localization

pub mod derivative;
pub mod matrix;
pub mod network;

pub use derivative::*;
pub use matrix::*;
pub use network::*;
