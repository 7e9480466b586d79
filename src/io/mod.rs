//! Input/output helpers.
//!
//! - population CSV ingest (`ingest`)
//! - detector store JSON read/write (`store`)
//! - error report files (`export`)

pub mod export;
pub mod ingest;
pub mod store;

pub use export::*;
pub use ingest::*;
pub use store::*;
