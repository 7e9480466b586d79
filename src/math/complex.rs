//! Complex frequency-domain helpers.
//!
//! A detector response is stored as a matrix with one row per frequency bin and
//! one column per detector component (a single interferometer has one column,
//! a triangular detector has three).

use std::f64::consts::PI;

use nalgebra::{Complex, DMatrix};

/// Frequency-domain detector response: rows are frequency bins, columns are components.
pub type Response = DMatrix<Complex<f64>>;

/// Multiply every row `i` of `response` by `factor(i)`.
pub fn scale_rows(response: &Response, mut factor: impl FnMut(usize) -> Complex<f64>) -> Response {
    let mut out = response.clone();
    for (i, mut row) in out.row_iter_mut().enumerate() {
        let c = factor(i);
        for z in row.iter_mut() {
            *z *= c;
        }
    }
    out
}

/// `2πi f`, the derivative of `exp(2πi f t)` with respect to `t`.
pub fn time_derivative_factor(frequency: f64) -> Complex<f64> {
    Complex::new(0.0, 2.0 * PI * frequency)
}

/// `exp(2πi f t)`, the frequency-domain factor of a shift by `t` seconds.
pub fn time_shift_factor(frequency: f64, time: f64) -> Complex<f64> {
    Complex::from_polar(1.0, 2.0 * PI * frequency * time)
}
