//! Interfaces to the collaborators of the numerical core.
//!
//! Waveform generation, antenna projection and the noise-weighted inner product
//! are supplied by the caller. They are kept behind small traits so the
//! derivative and Fisher code stays generic.

pub mod inner;
pub mod waveform;

#[cfg(test)]
pub(crate) mod testing;

pub use inner::*;
pub use waveform::*;
