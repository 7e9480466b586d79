//! Reporting: error report files and terminal summaries.
//!
//! Formatting lives here so the numerical code never deals with text.

pub mod format;

use crate::domain::{FisherParameters, Network, NetworkErrors, Subnetwork};

/// One line per subnetwork: detections, median network SNR and median errors.
pub fn format_run_summary(results: &[NetworkErrors], fisher_parameters: &FisherParameters) -> String {
    let mut out = String::new();
    out.push_str("=== gwfisher - Fisher error summary ===\n");

    for r in results {
        out.push_str(&format!(
            "{:<20} detected={:<6} median_SNR={}\n",
            r.subnetwork,
            r.len(),
            fmt_opt(median(&r.network_snr)),
        ));
        for (c, p) in fisher_parameters.names().iter().enumerate() {
            let column: Vec<f64> = r.parameter_errors.column(c).iter().copied().collect();
            out.push_str(&format!("  err_{:<24} median={}\n", p, fmt_opt(median(&column))));
        }
        if let Some(sky) = &r.sky_localization {
            out.push_str(&format!("  {:<28} median={}\n", "err_sky_location", fmt_opt(median(sky))));
        }
    }

    out
}

/// Per-detector signal counts and how many signals pass each threshold.
pub fn format_store_summary(network: &Network, fisher_parameters: &FisherParameters) -> String {
    let th = network.detection_snr;
    let mut out = String::new();
    out.push_str(&format!(
        "Fisher parameters ({}): {}\n",
        fisher_parameters.len(),
        fisher_parameters.names().join(" ")
    ));
    out.push_str(&format!("Thresholds: detector={:?} network={:?}\n", th.detector, th.network));

    out.push_str(&format!(
        "{:<4} {:<16} {:>10} {:>12} {:>12}\n",
        "idx", "detector", "signals", "SNR>det", "SNR>net"
    ));
    for (i, d) in network.detectors.iter().enumerate() {
        let above_det = d.signals.iter().filter(|s| s.snr > th.detector).count();
        let above_net = d.signals.iter().filter(|s| s.snr > th.network).count();
        out.push_str(&format!(
            "{:<4} {:<16} {:>10} {:>12} {:>12}\n",
            i,
            d.name,
            d.signals.len(),
            above_det,
            above_net
        ));
    }

    let all = Subnetwork::all(network);
    if let Some(n_signals) = network.detectors.first().map(|d| d.signals.len()) {
        let consistent = network.detectors.iter().all(|d| d.signals.len() == n_signals);
        if consistent {
            let detected = (0..n_signals)
                .filter(|&k| crate::fisher::network_snr(network, &all, k) > th.network)
                .count();
            out.push_str(&format!("Network {}: {detected} of {n_signals} detected\n", all.name(network)));
        } else {
            out.push_str("Warning: detectors disagree on the number of signals\n");
        }
    }

    out
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map(|x| format!("{x:.4e}")).unwrap_or_else(|| "-".to_string())
}

fn median(values: &[f64]) -> Option<f64> {
    let mut v: Vec<f64> = values.iter().copied().filter(|x| x.is_finite()).collect();
    if v.is_empty() {
        return None;
    }
    v.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = v.len() / 2;
    if v.len() % 2 == 1 {
        Some(v[mid])
    } else {
        Some((v[mid - 1] + v[mid]) / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Detector, SignalRecord, SnrThresholds};
    use nalgebra::DMatrix;

    #[test]
    fn median_ignores_non_finite() {
        assert_eq!(median(&[3.0, f64::NAN, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0]), Some(2.5));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn store_summary_counts_thresholds() {
        let mut d = Detector::new("ET", vec![], 3);
        d.signals = [5.0, 9.0, 20.0]
            .iter()
            .map(|&snr| SignalRecord { snr, fisher: DMatrix::identity(1, 1) })
            .collect();
        let network = Network {
            detectors: vec![d],
            detection_snr: SnrThresholds { detector: 8.0, network: 10.0 },
        };
        let fp = FisherParameters::new(vec!["mass_1".into()]).unwrap();
        let s = format_store_summary(&network, &fp);
        assert!(s.contains("Network ET: 1 of 3 detected"), "{s}");
        assert!(s.contains("detector=8.0 network=10.0"), "{s}");
    }

    #[test]
    fn run_summary_lists_each_parameter() {
        let r = NetworkErrors {
            subnetwork: "ET_CE".to_string(),
            detected: vec![0, 2],
            network_snr: vec![12.0, 14.0],
            parameter_errors: DMatrix::from_row_slice(2, 1, &[1.0, 3.0]),
            sky_localization: None,
        };
        let fp = FisherParameters::new(vec!["mass_1".into()]).unwrap();
        let s = format_run_summary(&[r], &fp);
        assert!(s.contains("ET_CE"));
        assert!(s.contains("median_SNR=1.3000e1"), "{s}");
        assert!(s.contains("err_mass_1"));
        assert!(s.contains("median=2.0000e0"), "{s}");
    }
}
