//! The error-analysis pipeline shared by the CLI and library users.
//!
//! store + population -> per-subnetwork aggregation -> reports
//!
//! Subnetworks are processed in order. A failing subnetwork stops the run;
//! reports already written for earlier subnetworks stay on disk.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::domain::{FisherParameters, Network, NetworkErrors, ParameterTable, RunConfig, Subnetwork};
use crate::error::AppError;
use crate::fisher::compute_fisher_errors;
use crate::io::{load_population, read_store, write_error_report};

/// Outputs of a full `errors` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub fisher_parameters: FisherParameters,
    pub results: Vec<NetworkErrors>,
    pub reports: Vec<PathBuf>,
}

/// Load inputs, apply threshold overrides and analyze every requested subnetwork.
pub fn run_errors(config: &RunConfig) -> Result<RunOutput, AppError> {
    let store = read_store(&config.store_path)?;
    let table = load_population(&config.population_path)?;

    let mut network = store.network;
    if let Some(v) = config.detector_snr {
        network.detection_snr.detector = v;
    }
    if let Some(v) = config.network_snr {
        network.detection_snr.network = v;
    }

    let subnetworks = resolve_subnetworks(&network, &config.subnetworks)?;

    let (results, reports) = analyze_fisher_errors(
        &network,
        &table,
        &store.fisher_parameters,
        &subnetworks,
        &config.population_name,
        &config.out_dir,
    )?;

    Ok(RunOutput {
        fisher_parameters: store.fisher_parameters,
        results,
        reports,
    })
}

/// Aggregate and write one report per subnetwork.
pub fn analyze_fisher_errors(
    network: &Network,
    table: &ParameterTable,
    fisher_parameters: &FisherParameters,
    subnetworks: &[Subnetwork],
    population: &str,
    out_dir: &Path,
) -> Result<(Vec<NetworkErrors>, Vec<PathBuf>), AppError> {
    let mut results = Vec::with_capacity(subnetworks.len());
    let mut reports = Vec::with_capacity(subnetworks.len());

    for sub in subnetworks {
        let errors = compute_fisher_errors(network, table, fisher_parameters, sub)?;
        let path = write_error_report(
            out_dir,
            population,
            network.detection_snr.network,
            table,
            fisher_parameters,
            &errors,
        )?;
        info!(subnetwork = %errors.subnetwork, detected = errors.len(), path = %path.display(), "wrote error report");
        results.push(errors);
        reports.push(path);
    }

    Ok((results, reports))
}

/// Parse subnetwork selections such as `0,2` or `ET,CE1`.
///
/// An empty list selects the whole network.
pub fn resolve_subnetworks(network: &Network, specs: &[String]) -> Result<Vec<Subnetwork>, AppError> {
    if specs.is_empty() {
        return Ok(vec![Subnetwork::all(network)]);
    }

    specs
        .iter()
        .map(|spec| {
            let ids = spec
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(|token| resolve_detector(network, token))
                .collect::<Result<Vec<usize>, AppError>>()?;
            if ids.is_empty() {
                return Err(AppError::new(2, format!("Empty subnetwork selection '{spec}'")));
            }
            Ok(Subnetwork::new(ids))
        })
        .collect()
}

fn resolve_detector(network: &Network, token: &str) -> Result<usize, AppError> {
    if let Ok(i) = token.parse::<usize>() {
        if i < network.detectors.len() {
            return Ok(i);
        }
        return Err(AppError::new(
            2,
            format!("Detector index {i} out of range (network has {} detectors)", network.detectors.len()),
        ));
    }
    network
        .detectors
        .iter()
        .position(|d| d.name == token)
        .ok_or_else(|| AppError::new(2, format!("Unknown detector '{token}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Detector, SnrThresholds};
    use crate::fisher::populate_detector;
    use crate::models::testing::{flat_inner, toy_detector, toy_model, toy_params};
    use crate::report::format::format_report;

    fn two_detectors() -> Network {
        Network {
            detectors: vec![Detector::new("ET", vec![], 3), Detector::new("CE1", vec![], 1)],
            detection_snr: SnrThresholds { detector: 8.0, network: 10.0 },
        }
    }

    #[test]
    fn subnetworks_by_index_and_name() {
        let net = two_detectors();
        let subs = resolve_subnetworks(&net, &["0".into(), "ET, CE1".into(), "1".into()]).unwrap();
        assert_eq!(subs[0].detector_ids, vec![0]);
        assert_eq!(subs[1].detector_ids, vec![0, 1]);
        assert_eq!(subs[2].detector_ids, vec![1]);
        assert_eq!(resolve_subnetworks(&net, &[]).unwrap()[0].detector_ids, vec![0, 1]);
    }

    #[test]
    fn unknown_detector_selection_fails() {
        let net = two_detectors();
        assert!(resolve_subnetworks(&net, &["LIGO".into()]).is_err());
        assert!(resolve_subnetworks(&net, &["5".into()]).is_err());
        assert!(resolve_subnetworks(&net, &[",".into()]).is_err());
    }

    /// One detector, one signal, SNR forced to 100: the report has exactly one
    /// row whose errors are the textbook `σ_d = d/ρ` and `σ_φ = 1/ρ`.
    #[test]
    fn single_detector_end_to_end() {
        let model = toy_model();
        let mut det = toy_detector("ET", 1);
        let inner = flat_inner(&det);

        let base = toy_params();
        let columns: Vec<String> = base.iter().map(|(k, _)| k.to_string()).collect();
        let row: Vec<f64> = base.iter().map(|(_, v)| v).collect();
        let table = ParameterTable::new(columns, vec![row], None).unwrap();
        let fp = FisherParameters::new(vec!["luminosity_distance".into(), "phase".into()]).unwrap();

        populate_detector(&model, &inner, &table, &fp, &mut det).unwrap();
        let rho = det.snr(0);
        det.signals[0].snr = 100.0;

        let network = Network {
            detectors: vec![det],
            detection_snr: SnrThresholds { detector: 8.0, network: 8.0 },
        };
        let errors = compute_fisher_errors(&network, &table, &fp, &Subnetwork::all(&network)).unwrap();

        assert_eq!(errors.detected, vec![0]);
        assert_eq!(errors.network_snr, vec![100.0]);
        let sigma_d = errors.parameter_errors[(0, 0)];
        let sigma_phi = errors.parameter_errors[(0, 1)];
        assert!((sigma_d - 40.0 / rho).abs() < 1e-9 * sigma_d, "{sigma_d} vs {}", 40.0 / rho);
        assert!((sigma_phi - 1.0 / rho).abs() < 1e-9 * sigma_phi, "{sigma_phi} vs {}", 1.0 / rho);

        let report = format_report(&table, &fp, &errors);
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "network_SNR mass_1 luminosity_distance ra dec psi phase geocent_time err_luminosity_distance err_phase"
        );
        let fields: Vec<&str> = lines[1].split(' ').collect();
        assert_eq!(fields.len(), 10);
        assert_eq!(fields[0], "1.000000000000000000e+02");
        assert_eq!(fields[7], "1.187008882000000000e+09");
        let reported_sigma_d: f64 = fields[8].parse().unwrap();
        assert!((reported_sigma_d - sigma_d).abs() < 1e-15 * sigma_d);
    }

    #[test]
    fn reports_are_written_per_subnetwork() {
        use crate::domain::SignalRecord;
        use nalgebra::DMatrix;

        let mut net = two_detectors();
        for d in &mut net.detectors {
            d.signals = vec![SignalRecord { snr: 20.0, fisher: DMatrix::identity(1, 1) * 4.0 }];
        }
        let table = ParameterTable::new(vec!["mass_1".into()], vec![vec![1.4]], None).unwrap();
        let fp = FisherParameters::new(vec!["mass_1".into()]).unwrap();
        let subs = resolve_subnetworks(&net, &["ET".into(), "ET,CE1".into()]).unwrap();

        let out_dir = std::env::temp_dir().join(format!("gwfisher-test-{}", std::process::id()));
        std::fs::create_dir_all(&out_dir).unwrap();
        let (results, paths) = analyze_fisher_errors(&net, &table, &fp, &subs, "BNS", &out_dir).unwrap();

        assert_eq!(results.len(), 2);
        assert!(paths[0].ends_with("Errors_ET_BNS_SNR10.0.txt"));
        assert!(paths[1].ends_with("Errors_ET_CE1_BNS_SNR10.0.txt"));
        let text = std::fs::read_to_string(&paths[1]).unwrap();
        assert!(text.starts_with("network_SNR mass_1 err_mass_1\n"));
        // Two detectors of Fisher 4 each: error 1/sqrt(8).
        assert!((results[1].parameter_errors[(0, 0)] - 8f64.sqrt().recip()).abs() < 1e-12);
        std::fs::remove_dir_all(&out_dir).ok();
    }
}
