//! Network-level error aggregation.
//!
//! For every signal of a subnetwork:
//!
//! 1. network SNR = `sqrt(Σ_d SNR_d²)` over all selected detectors
//! 2. signals at or below the network detection threshold are dropped
//! 3. the network Fisher matrix sums the selected detectors whose own SNR
//!    exceeds the per-detector inclusion threshold
//! 4. the matrix is pseudo-inverted; errors are `sqrt(diag(F⁻¹))`
//! 5. with `ra` and `dec` in the parameter list, the sky-localization area is
//!    `π |cos(dec)| sqrt(C_ra,ra C_dec,dec - C_ra,dec²)`
//!
//! Signals are independent and processed in parallel.

use std::f64::consts::PI;

use nalgebra::DMatrix;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::domain::{FisherParameters, Network, NetworkErrors, ParameterTable, Subnetwork, names};
use crate::error::{FisherError, FisherResult};
use crate::math::invert_svd;

/// Network SNR of signal `k` over the selected detectors.
pub fn network_snr(network: &Network, subnetwork: &Subnetwork, k: usize) -> f64 {
    subnetwork
        .detector_ids
        .iter()
        .map(|&d| network.detectors[d].snr(k).powi(2))
        .sum::<f64>()
        .sqrt()
}

/// Sum of the Fisher matrices of the selected detectors that individually
/// exceed the per-detector threshold for signal `k`.
///
/// Returns the matrix and the number of contributing detectors.
pub fn network_fisher_matrix(network: &Network, subnetwork: &Subnetwork, k: usize, n_params: usize) -> (DMatrix<f64>, usize) {
    let threshold = network.detection_snr.detector;
    let mut fm = DMatrix::<f64>::zeros(n_params, n_params);
    let mut contributing = 0usize;
    for &d in &subnetwork.detector_ids {
        let record = &network.detectors[d].signals[k];
        if record.snr > threshold {
            fm += &record.fisher;
            contributing += 1;
        }
    }
    (fm, contributing)
}

/// One-sigma sky-localization area from a covariance matrix.
pub fn sky_localization_error(covariance: &DMatrix<f64>, dec: f64, i_ra: usize, i_dec: usize) -> f64 {
    PI * dec.cos().abs()
        * (covariance[(i_ra, i_ra)] * covariance[(i_dec, i_dec)] - covariance[(i_ra, i_dec)].powi(2)).sqrt()
}

struct SignalErrors {
    index: usize,
    snr: f64,
    errors: Vec<f64>,
    sky: Option<f64>,
}

/// Errors of the detected signals of one subnetwork.
pub fn compute_fisher_errors(
    network: &Network,
    table: &ParameterTable,
    fisher_parameters: &FisherParameters,
    subnetwork: &Subnetwork,
) -> FisherResult<NetworkErrors> {
    let n_signals = validate(network, table, fisher_parameters, subnetwork)?;
    let n_params = fisher_parameters.len();
    let name = subnetwork.name(network);
    let sky = fisher_parameters.sky_indices();
    let network_threshold = network.detection_snr.network;

    let per_signal: Vec<Option<SignalErrors>> = (0..n_signals)
        .into_par_iter()
        .map(|k| {
            let snr = network_snr(network, subnetwork, k);
            if snr <= network_threshold {
                return Ok(None);
            }
            signal_errors(network, table, subnetwork, k, snr, n_params, sky)
                .map(Some)
                .map_err(|e| e.for_signal(k, name.as_str()))
        })
        .collect::<FisherResult<_>>()?;

    let kept: Vec<SignalErrors> = per_signal.into_iter().flatten().collect();

    let mut parameter_errors = DMatrix::<f64>::zeros(kept.len(), n_params);
    for (r, s) in kept.iter().enumerate() {
        for (c, &e) in s.errors.iter().enumerate() {
            parameter_errors[(r, c)] = e;
        }
    }
    let sky_localization = sky.map(|_| kept.iter().map(|s| s.sky.unwrap_or(f64::NAN)).collect());

    info!(
        subnetwork = %name,
        signals = n_signals,
        detected = kept.len(),
        threshold = network_threshold,
        "aggregated Fisher errors"
    );

    Ok(NetworkErrors {
        subnetwork: name,
        detected: kept.iter().map(|s| s.index).collect(),
        network_snr: kept.iter().map(|s| s.snr).collect(),
        parameter_errors,
        sky_localization,
    })
}

fn signal_errors(
    network: &Network,
    table: &ParameterTable,
    subnetwork: &Subnetwork,
    k: usize,
    snr: f64,
    n_params: usize,
    sky: Option<(usize, usize)>,
) -> FisherResult<SignalErrors> {
    let (fm, contributing) = network_fisher_matrix(network, subnetwork, k, n_params);
    if contributing == 0 {
        warn!(signal = k, snr, "detected signal has no detector above the inclusion threshold");
    }

    let covariance = invert_svd(&fm)?;
    let errors: Vec<f64> = covariance.diagonal().iter().map(|v| v.sqrt()).collect();

    let sky = match sky {
        Some((i_ra, i_dec)) => {
            let dec = table.value(k, names::DEC)?;
            Some(sky_localization_error(&covariance, dec, i_ra, i_dec))
        }
        None => None,
    };

    debug!(signal = k, snr, contributing, "inverted network Fisher matrix");
    Ok(SignalErrors {
        index: k,
        snr,
        errors,
        sky,
    })
}

/// Check every structural precondition once; returns the signal count.
fn validate(
    network: &Network,
    table: &ParameterTable,
    fisher_parameters: &FisherParameters,
    subnetwork: &Subnetwork,
) -> FisherResult<usize> {
    if fisher_parameters.is_empty() {
        return Err(FisherError::EmptyParameterList);
    }
    if subnetwork.detector_ids.is_empty() {
        return Err(FisherError::shapes("subnetwork detectors", 1, 0));
    }
    for &d in &subnetwork.detector_ids {
        if d >= network.detectors.len() {
            return Err(FisherError::UnknownDetector {
                index: d,
                available: network.detectors.len(),
            });
        }
    }

    let n_signals = table.len();
    if n_signals == 0 {
        return Err(FisherError::EmptySignalSet);
    }

    let n_params = fisher_parameters.len();
    for &d in &subnetwork.detector_ids {
        let det = &network.detectors[d];
        if det.signals.len() != n_signals {
            return Err(FisherError::shapes(
                format!("signal count of detector {}", det.name),
                n_signals,
                det.signals.len(),
            ));
        }
        for record in &det.signals {
            if record.fisher.shape() != (n_params, n_params) {
                let found = if record.fisher.nrows() != n_params {
                    record.fisher.nrows()
                } else {
                    record.fisher.ncols()
                };
                return Err(FisherError::shapes(
                    format!("Fisher matrix of detector {}", det.name),
                    n_params,
                    found,
                ));
            }
        }
    }

    if fisher_parameters.sky_indices().is_some() && table.column_index(names::DEC).is_none() {
        return Err(FisherError::unknown_parameter(names::DEC));
    }

    Ok(n_signals)
}
