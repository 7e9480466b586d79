//! Partial derivatives of the projected detector response.
//!
//! Three parameters have closed forms:
//!
//! - `luminosity_distance`: amplitude scales as `1/d`, so `∂R = -R/d`
//! - `geocent_time`: a time shift multiplies by `exp(2πi f t_c)`, so `∂R = 2πi f R`
//! - `phase`: `∂R = -i R`
//!
//! Everything else uses central differences with `dp = max(ε, ε·p)`:
//!
//! - `ra`, `dec`, `psi` only enter through the antenna pattern, so the waveform
//!   is generated once and only the projection is perturbed
//! - all other parameters change the waveform itself; those are generated with
//!   `geocent_time = 0` so the large common phase `2π f t_c` does not swamp the
//!   difference, and the shift is re-applied to the result

use nalgebra::Complex;

use crate::domain::{Detector, ParameterVector, names};
use crate::error::{FisherError, FisherResult};
use crate::math::{Response, scale_rows, time_derivative_factor, time_shift_factor};
use crate::models::SignalModel;

/// Relative finite-difference step (cube root of double precision, roughly).
pub const FINITE_DIFF_EPS: f64 = 1e-5;

/// How the derivative with respect to one parameter is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivativeKind {
    AnalyticDistance,
    AnalyticTime,
    AnalyticPhase,
    /// Central difference of the projection only (antenna-pattern parameters).
    NumericShapeIndependent,
    /// Central difference of waveform and projection.
    NumericShapeDependent,
}

impl DerivativeKind {
    pub fn for_parameter(name: &str) -> Self {
        match name {
            names::LUMINOSITY_DISTANCE => Self::AnalyticDistance,
            names::GEOCENT_TIME => Self::AnalyticTime,
            names::PHASE => Self::AnalyticPhase,
            names::RA | names::DEC | names::PSI => Self::NumericShapeIndependent,
            _ => Self::NumericShapeDependent,
        }
    }
}

/// Finite-difference step for a parameter value.
pub fn step_size(value: f64) -> f64 {
    FINITE_DIFF_EPS.max(FINITE_DIFF_EPS * value)
}

/// Derivative of the detector response with respect to `parameter`.
pub fn derivative(
    model: &SignalModel<'_>,
    params: &ParameterVector,
    parameter: &str,
    detector: &Detector,
) -> FisherResult<Response> {
    derivative_with(model, params, parameter, DerivativeKind::for_parameter(parameter), detector)
}

/// Like [`derivative`], with the strategy chosen by the caller.
pub fn derivative_with(
    model: &SignalModel<'_>,
    params: &ParameterVector,
    parameter: &str,
    kind: DerivativeKind,
    detector: &Detector,
) -> FisherResult<Response> {
    let value = params.require(parameter)?;
    let freqs = &detector.frequencies;

    let out = match kind {
        DerivativeKind::AnalyticDistance => {
            let response = model.response(params, detector)?;
            let factor = Complex::new(-1.0 / value, 0.0);
            scale_rows(&response, |_| factor)
        }
        DerivativeKind::AnalyticTime => {
            let response = model.response(params, detector)?;
            scale_rows(&response, |i| time_derivative_factor(freqs[i]))
        }
        DerivativeKind::AnalyticPhase => {
            let response = model.response(params, detector)?;
            scale_rows(&response, |_| Complex::new(0.0, -1.0))
        }
        DerivativeKind::NumericShapeIndependent => {
            let dp = step_size(value);
            let lower = params.with(parameter, value - dp / 2.0)?;
            let upper = params.with(parameter, value + dp / 2.0)?;

            let wave = model.polarizations(params, detector)?;
            let r_lower = model.project(&lower, detector, &wave)?;
            let r_upper = model.project(&upper, detector, &wave)?;
            (r_upper - r_lower) / Complex::new(dp, 0.0)
        }
        DerivativeKind::NumericShapeDependent => {
            let tc = params.require(names::GEOCENT_TIME)?;
            let dp = step_size(value);
            let lower = params.with(parameter, value - dp / 2.0)?;
            let upper = params.with(parameter, value + dp / 2.0)?;

            let r_lower = shifted_response(model, &lower, tc, detector)?;
            let r_upper = shifted_response(model, &upper, tc, detector)?;
            let diff = (r_upper - r_lower) / Complex::new(dp, 0.0);
            scale_rows(&diff, |i| time_shift_factor(freqs[i], tc))
        }
    };

    if out.nrows() != freqs.len() {
        return Err(FisherError::shapes(
            format!("derivative of '{parameter}'"),
            freqs.len(),
            out.nrows(),
        ));
    }
    Ok(out)
}

/// Response of `params` generated at `geocent_time = 0` and projected at the true `tc`.
///
/// The returned response lacks the `exp(2πi f tc)` factor; the caller applies it.
fn shifted_response(
    model: &SignalModel<'_>,
    params: &ParameterVector,
    tc: f64,
    detector: &Detector,
) -> FisherResult<Response> {
    let at_zero = params.with(names::GEOCENT_TIME, 0.0)?;
    let wave = model.polarizations(&at_zero, detector)?.delayed(tc);
    model.project(params, detector, &wave)
}
