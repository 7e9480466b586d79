//! Fisher matrix assembly for one detector.
//!
//! `F[i,j] = Σ_c <∂_i R_c, ∂_j R_c>` where `c` runs over the detector components
//! (the three interferometers of a triangular detector contribute additively).

use nalgebra::DMatrix;
use rayon::prelude::*;
use tracing::debug;

use crate::domain::{Detector, FisherParameters, ParameterTable, ParameterVector, SignalRecord};
use crate::error::{FisherError, FisherResult};
use crate::fisher::derivative::{DerivativeKind, derivative_with};
use crate::math::Response;
use crate::models::{InnerProduct, SignalModel};

/// Fisher matrix of one signal in one detector.
pub fn fisher_matrix(
    model: &SignalModel<'_>,
    inner: &dyn InnerProduct,
    params: &ParameterVector,
    fisher_parameters: &FisherParameters,
    detector: &Detector,
) -> FisherResult<DMatrix<f64>> {
    let kinds = derivative_kinds(fisher_parameters);
    fisher_matrix_with(model, inner, params, fisher_parameters, &kinds, detector)
}

fn derivative_kinds(fisher_parameters: &FisherParameters) -> Vec<DerivativeKind> {
    fisher_parameters
        .names()
        .iter()
        .map(|p| DerivativeKind::for_parameter(p))
        .collect()
}

fn fisher_matrix_with(
    model: &SignalModel<'_>,
    inner: &dyn InnerProduct,
    params: &ParameterVector,
    fisher_parameters: &FisherParameters,
    kinds: &[DerivativeKind],
    detector: &Detector,
) -> FisherResult<DMatrix<f64>> {
    let n = fisher_parameters.len();

    // Each derivative is evaluated once and reused for every pair it appears in.
    let derivatives: Vec<Response> = fisher_parameters
        .names()
        .iter()
        .zip(kinds)
        .map(|(p, &kind)| derivative_with(model, params, p, kind, detector))
        .collect::<FisherResult<_>>()?;

    let mut fm = DMatrix::<f64>::zeros(n, n);
    for i in 0..n {
        for j in i..n {
            let value = summed_inner(inner, &derivatives[i], &derivatives[j], detector)?;
            fm[(i, j)] = value;
            fm[(j, i)] = value;
        }
    }
    Ok(fm)
}

/// Optimal SNR `sqrt(Σ_c <R_c, R_c>)` of one signal.
pub fn optimal_snr(
    model: &SignalModel<'_>,
    inner: &dyn InnerProduct,
    params: &ParameterVector,
    detector: &Detector,
) -> FisherResult<f64> {
    let response = model.response(params, detector)?;
    Ok(summed_inner(inner, &response, &response, detector)?.sqrt())
}

fn summed_inner(inner: &dyn InnerProduct, a: &Response, b: &Response, detector: &Detector) -> FisherResult<f64> {
    let per_component = inner.inner_product(a, b, detector)?;
    if per_component.len() != a.ncols() {
        return Err(FisherError::shapes(
            "inner product components",
            a.ncols(),
            per_component.len(),
        ));
    }
    Ok(per_component.iter().sum())
}

/// Compute SNR and Fisher matrix for every signal of `table`, in parallel.
///
/// Replaces `detector.signals`; on error the detector is left untouched.
pub fn populate_detector(
    model: &SignalModel<'_>,
    inner: &dyn InnerProduct,
    table: &ParameterTable,
    fisher_parameters: &FisherParameters,
    detector: &mut Detector,
) -> FisherResult<()> {
    let kinds = derivative_kinds(fisher_parameters);
    let det: &Detector = detector;

    let records = (0..table.len())
        .into_par_iter()
        .map(|k| {
            let params = table.row(k);
            let record = optimal_snr(model, inner, &params, det).and_then(|snr| {
                let fisher = fisher_matrix_with(model, inner, &params, fisher_parameters, &kinds, det)?;
                Ok(SignalRecord { snr, fisher })
            });
            record.map_err(|e| e.for_signal(k, &det.name))
        })
        .collect::<FisherResult<Vec<SignalRecord>>>()?;

    debug!(detector = %detector.name, signals = records.len(), "populated Fisher matrices");
    detector.signals = records;
    Ok(())
}
