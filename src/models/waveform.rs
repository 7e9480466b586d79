//! Waveform and projection interfaces.
//!
//! Waveform physics and antenna patterns live outside this crate. The
//! derivative engine only needs two operations:
//!
//! - generate plus/cross polarizations and `t(f)` for a parameter vector
//! - project polarizations onto a detector's response channels

use nalgebra::Complex;

use crate::domain::{Detector, ParameterVector};
use crate::error::FisherResult;
use crate::math::Response;

/// Frequency-domain polarizations on a detector grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    pub plus: Vec<Complex<f64>>,
    pub cross: Vec<Complex<f64>>,
    /// Time to merger per frequency bin (seconds).
    pub time_of_frequency: Vec<f64>,
}

impl Waveform {
    pub fn len(&self) -> usize {
        self.plus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plus.is_empty()
    }

    /// Copy with `time_of_frequency` offset by `dt`.
    pub fn delayed(&self, dt: f64) -> Self {
        Self {
            plus: self.plus.clone(),
            cross: self.cross.clone(),
            time_of_frequency: self.time_of_frequency.iter().map(|t| t + dt).collect(),
        }
    }
}

/// Produces polarizations for a named waveform approximant.
pub trait WaveformModel: Send + Sync {
    fn polarizations(
        &self,
        waveform: &str,
        params: &ParameterVector,
        frequencies: &[f64],
    ) -> FisherResult<Waveform>;
}

/// Projects polarizations onto a detector.
///
/// The returned response has one row per frequency bin of `detector` and one
/// column per detector component.
pub trait Projector: Send + Sync {
    fn project(
        &self,
        params: &ParameterVector,
        detector: &Detector,
        waveform: &Waveform,
    ) -> FisherResult<Response>;
}

/// A waveform approximant bound to its generator and a projector.
///
/// This is everything the derivative engine needs to evaluate the detector
/// response of a parameter vector.
#[derive(Clone, Copy)]
pub struct SignalModel<'a> {
    pub waveform: &'a str,
    pub generator: &'a dyn WaveformModel,
    pub projector: &'a dyn Projector,
}

impl<'a> SignalModel<'a> {
    pub fn new(waveform: &'a str, generator: &'a dyn WaveformModel, projector: &'a dyn Projector) -> Self {
        Self {
            waveform,
            generator,
            projector,
        }
    }

    pub fn polarizations(&self, params: &ParameterVector, detector: &Detector) -> FisherResult<Waveform> {
        self.generator
            .polarizations(self.waveform, params, &detector.frequencies)
    }

    pub fn project(
        &self,
        params: &ParameterVector,
        detector: &Detector,
        waveform: &Waveform,
    ) -> FisherResult<Response> {
        self.projector.project(params, detector, waveform)
    }

    /// Generate and project in one step.
    pub fn response(&self, params: &ParameterVector, detector: &Detector) -> FisherResult<Response> {
        let wave = self.polarizations(params, detector)?;
        self.project(params, detector, &wave)
    }
}

impl std::fmt::Debug for SignalModel<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalModel")
            .field("waveform", &self.waveform)
            .finish_non_exhaustive()
    }
}
