//! `gw-fisher` library crate.
//!
//! Fisher-matrix parameter errors for simulated gravitational-wave populations
//! observed by networks of detectors. The binary (`gwfisher`) is a thin wrapper
//! around this library so that:
//!
//! - the numerical core is testable without spawning processes
//! - waveform and projection collaborators can be plugged in by library users

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod fisher;
pub mod io;
pub mod math;
pub mod models;
pub mod report;
