//! Deterministic collaborators for tests.
//!
//! The toy chirp has closed-form derivatives:
//!
//! ```text
//! h+(f) = exp(i (2π f t_c - φ + α f²)) / d,    h×(f) = (i/2) h+(f)
//! R_c(f) = (c + 1) (F+ + (i/2) F×) h+(f)
//! F+ = cos(ra - 0.2) cos(dec) cos(2ψ),        F× = sin(ra) cos(dec) sin(2ψ)
//! ```
//!
//! with `α = mass_1`, so `∂R/∂α = i f² R`.

use std::f64::consts::PI;

use nalgebra::Complex;

use crate::domain::{Detector, ParameterVector, names};
use crate::error::FisherResult;
use crate::math::Response;
use crate::models::{InnerProduct, NoiseWeighted, Projector, SignalModel, Waveform, WaveformModel};

pub const TOY_WAVEFORM: &str = "toy_chirp";

pub struct ToyChirp;

impl WaveformModel for ToyChirp {
    fn polarizations(&self, _waveform: &str, params: &ParameterVector, frequencies: &[f64]) -> FisherResult<Waveform> {
        let alpha = params.require("mass_1")?;
        let d = params.require(names::LUMINOSITY_DISTANCE)?;
        let phi = params.require(names::PHASE)?;
        let tc = params.require(names::GEOCENT_TIME)?;

        let plus: Vec<Complex<f64>> = frequencies
            .iter()
            .map(|&f| Complex::from_polar(1.0 / d, 2.0 * PI * f * tc - phi + alpha * f * f))
            .collect();
        let cross = plus.iter().map(|h| Complex::new(0.0, 0.5) * h).collect();
        let time_of_frequency = frequencies.iter().map(|&f| tc - alpha / f).collect();
        Ok(Waveform {
            plus,
            cross,
            time_of_frequency,
        })
    }
}

pub struct ToyAntenna;

impl ToyAntenna {
    pub fn patterns(params: &ParameterVector) -> FisherResult<(f64, f64)> {
        let ra = params.require(names::RA)?;
        let dec = params.require(names::DEC)?;
        let psi = params.require(names::PSI)?;
        let fp = (ra - 0.2).cos() * dec.cos() * (2.0 * psi).cos();
        let fx = ra.sin() * dec.cos() * (2.0 * psi).sin();
        Ok((fp, fx))
    }
}

impl Projector for ToyAntenna {
    fn project(&self, params: &ParameterVector, detector: &Detector, waveform: &Waveform) -> FisherResult<Response> {
        let (fp, fx) = Self::patterns(params)?;
        Ok(Response::from_fn(waveform.len(), detector.components, |i, c| {
            (waveform.plus[i] * fp + waveform.cross[i] * fx) * (c as f64 + 1.0)
        }))
    }
}

/// [`ToyAntenna`] with an extra phase `exp(i ω t(f))` that follows the arrival
/// time of each frequency bin, like an antenna carried by a rotating Earth.
///
/// With `t(f) = t_c - α/f` this gives `∂R/∂α = i (f² - ω/f) R`.
pub struct RotatingAntenna;

impl RotatingAntenna {
    pub const OMEGA: f64 = 1e-4;
}

impl Projector for RotatingAntenna {
    fn project(&self, params: &ParameterVector, detector: &Detector, waveform: &Waveform) -> FisherResult<Response> {
        let (fp, fx) = ToyAntenna::patterns(params)?;
        Ok(Response::from_fn(waveform.len(), detector.components, |i, c| {
            let rotation = Complex::from_polar(1.0, Self::OMEGA * waveform.time_of_frequency[i]);
            (waveform.plus[i] * fp + waveform.cross[i] * fx) * rotation * (c as f64 + 1.0)
        }))
    }
}

pub fn rotating_model() -> SignalModel<'static> {
    SignalModel::new(TOY_WAVEFORM, &ToyChirp, &RotatingAntenna)
}

pub fn toy_model() -> SignalModel<'static> {
    SignalModel::new(TOY_WAVEFORM, &ToyChirp, &ToyAntenna)
}

pub fn toy_detector(name: &str, components: usize) -> Detector {
    Detector::new(name, vec![1.0, 1.5, 2.0, 2.5, 3.0, 3.5, 4.0], components)
}

/// Flat unit PSD with `Δf = 1/4`, so the inner product is `Re Σ conj(a) b`.
pub fn flat_inner(detector: &Detector) -> NoiseWeighted {
    NoiseWeighted::new(vec![1.0; detector.frequencies.len()], 0.25)
}

pub fn toy_params() -> ParameterVector {
    ParameterVector::from_pairs([
        ("mass_1", 1.4),
        ("luminosity_distance", 40.0),
        ("ra", 3.45),
        ("dec", -0.41),
        ("psi", 1.6),
        ("phase", 0.3),
        ("geocent_time", 1187008882.0),
    ])
}

/// Squared optimal SNR `Σ_c <R, R>`.
pub fn snr_squared(inner: &dyn InnerProduct, response: &Response, detector: &Detector) -> f64 {
    inner
        .inner_product(response, response, detector)
        .map(|v| v.iter().sum())
        .unwrap_or(f64::NAN)
}
