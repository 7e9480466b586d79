//! Mathematical utilities: normalized SVD pseudo-inverse and complex helpers.

pub mod complex;
pub mod svd;

pub use complex::*;
pub use svd::*;
