//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - per-signal parameters (`ParameterVector`, `ParameterTable`, `FisherParameters`)
//! - detectors and networks with their per-signal SNR/Fisher records
//! - aggregation outputs (`NetworkErrors`) and run configuration

pub mod types;

pub use types::*;
