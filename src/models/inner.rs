//! Noise-weighted inner product.

use crate::domain::Detector;
use crate::error::{FisherError, FisherResult};
use crate::math::Response;

/// Noise-weighted overlap of two responses, one value per detector component.
pub trait InnerProduct: Send + Sync {
    fn inner_product(&self, a: &Response, b: &Response, detector: &Detector) -> FisherResult<Vec<f64>>;
}

/// `4 Re Σ_f conj(a) b / S_n(f) Δf` on a uniform grid.
#[derive(Debug, Clone, PartialEq)]
pub struct NoiseWeighted {
    /// One-sided power spectral density per frequency bin.
    pub psd: Vec<f64>,
    pub df: f64,
}

impl NoiseWeighted {
    pub fn new(psd: Vec<f64>, df: f64) -> Self {
        Self { psd, df }
    }
}

impl InnerProduct for NoiseWeighted {
    fn inner_product(&self, a: &Response, b: &Response, detector: &Detector) -> FisherResult<Vec<f64>> {
        let bins = detector.frequencies.len();
        if self.psd.len() != bins {
            return Err(FisherError::shapes("PSD length", bins, self.psd.len()));
        }
        for r in [a, b] {
            if r.nrows() != bins {
                return Err(FisherError::shapes("response frequency bins", bins, r.nrows()));
            }
        }
        if a.ncols() != b.ncols() {
            return Err(FisherError::shapes("response components", a.ncols(), b.ncols()));
        }

        let out = (0..a.ncols())
            .map(|c| {
                let sum: f64 = (0..bins)
                    .map(|i| (a[(i, c)].conj() * b[(i, c)]).re / self.psd[i])
                    .sum();
                4.0 * sum * self.df
            })
            .collect();
        Ok(out)
    }
}
