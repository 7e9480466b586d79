//! Read/write the detector store JSON.
//!
//! The store is the hand-off between Fisher population and aggregation:
//!
//! - the two detection thresholds of the network
//! - the Fisher parameter list (defines matrix dimension and order)
//! - for every detector, one `{ snr, fisher }` record per population row
//!
//! Fisher matrices are stored as arrays of rows.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::domain::{Detector, FisherParameters, Network, SignalRecord, SnrThresholds};
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreFile {
    pub detection_snr: SnrThresholds,
    pub fisher_parameters: FisherParameters,
    pub detectors: Vec<DetectorEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorEntry {
    pub name: String,
    #[serde(default = "default_components")]
    pub components: usize,
    pub signals: Vec<SignalEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalEntry {
    pub snr: f64,
    pub fisher: Vec<Vec<f64>>,
}

fn default_components() -> usize {
    1
}

/// A loaded store: the network plus its Fisher parameter list.
#[derive(Debug, Clone)]
pub struct DetectorStore {
    pub network: Network,
    pub fisher_parameters: FisherParameters,
}

impl StoreFile {
    /// Snapshot a populated network.
    pub fn from_network(network: &Network, fisher_parameters: &FisherParameters) -> Self {
        let detectors = network
            .detectors
            .iter()
            .map(|d| DetectorEntry {
                name: d.name.clone(),
                components: d.components,
                signals: d
                    .signals
                    .iter()
                    .map(|s| SignalEntry {
                        snr: s.snr,
                        fisher: s.fisher.row_iter().map(|r| r.iter().copied().collect()).collect(),
                    })
                    .collect(),
            })
            .collect();

        StoreFile {
            detection_snr: network.detection_snr,
            fisher_parameters: fisher_parameters.clone(),
            detectors,
        }
    }

    /// Convert into domain types, checking every matrix is square.
    pub fn into_store(self) -> Result<DetectorStore, AppError> {
        let n = self.fisher_parameters.len();
        let mut detectors = Vec::with_capacity(self.detectors.len());

        for entry in self.detectors {
            let mut det = Detector::new(entry.name, Vec::new(), entry.components);
            for (k, signal) in entry.signals.into_iter().enumerate() {
                let fisher = matrix_from_rows(&signal.fisher, n).map_err(|msg| {
                    AppError::new(2, format!("Detector {} signal {k}: {msg}", det.name))
                })?;
                det.signals.push(SignalRecord { snr: signal.snr, fisher });
            }
            detectors.push(det);
        }

        if detectors.is_empty() {
            return Err(AppError::new(2, "Detector store contains no detectors"));
        }

        Ok(DetectorStore {
            network: Network {
                detectors,
                detection_snr: self.detection_snr,
            },
            fisher_parameters: self.fisher_parameters,
        })
    }
}

fn matrix_from_rows(rows: &[Vec<f64>], n: usize) -> Result<DMatrix<f64>, String> {
    if rows.len() != n {
        return Err(format!("Fisher matrix has {} rows, expected {n}", rows.len()));
    }
    if let Some(bad) = rows.iter().find(|r| r.len() != n) {
        return Err(format!("Fisher matrix row has {} entries, expected {n}", bad.len()));
    }
    Ok(DMatrix::from_fn(n, n, |i, j| rows[i][j]))
}

/// Read a detector store JSON file.
pub fn read_store(path: &Path) -> Result<DetectorStore, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open detector store '{}': {e}", path.display())))?;
    let raw: StoreFile = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| AppError::new(2, format!("Invalid detector store JSON: {e}")))?;
    raw.into_store()
}

/// Write a detector store JSON file.
pub fn write_store(path: &Path, network: &Network, fisher_parameters: &FisherParameters) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create detector store '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(BufWriter::new(file), &StoreFile::from_network(network, fisher_parameters))
        .map_err(|e| AppError::new(2, format!("Failed to write detector store JSON: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const STORE: &str = r#"{
        "detection_snr": { "detector": 8.0, "network": 10.0 },
        "fisher_parameters": ["ra", "dec"],
        "detectors": [
            { "name": "ET", "components": 3,
              "signals": [ { "snr": 100.0, "fisher": [[4.0, 1.0], [1.0, 9.0]] } ] },
            { "name": "CE",
              "signals": [ { "snr": 12.0, "fisher": [[1.0, 0.0], [0.0, 1.0]] } ] }
        ]
    }"#;

    #[test]
    fn parses_store() {
        let raw: StoreFile = serde_json::from_str(STORE).unwrap();
        let store = raw.into_store().unwrap();
        assert_eq!(store.fisher_parameters.names(), ["ra", "dec"]);
        assert_eq!(store.network.detectors.len(), 2);
        assert_eq!(store.network.detectors[0].components, 3);
        assert_eq!(store.network.detectors[1].components, 1);
        assert_eq!(store.network.detectors[0].signals[0].fisher[(1, 1)], 9.0);
        assert_eq!(store.network.detection_snr.network, 10.0);
    }

    #[test]
    fn store_survives_json_round_trip() {
        let raw: StoreFile = serde_json::from_str(STORE).unwrap();
        let store = raw.clone().into_store().unwrap();
        let back = StoreFile::from_network(&store.network, &store.fisher_parameters);
        assert_eq!(back, raw);
    }

    #[test]
    fn written_store_reads_back() {
        let raw: StoreFile = serde_json::from_str(STORE).unwrap();
        let store = raw.into_store().unwrap();

        let dir = std::env::temp_dir().join(format!("gwfisher-store-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("store.json");
        write_store(&path, &store.network, &store.fisher_parameters).unwrap();
        let back = read_store(&path).unwrap();
        std::fs::remove_dir_all(&dir).ok();

        assert_eq!(back.network, store.network);
        assert_eq!(back.fisher_parameters, store.fisher_parameters);
    }

    #[test]
    fn missing_store_file_is_an_io_error() {
        let err = read_store(Path::new("/nonexistent/gwfisher/store.json")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn empty_parameter_list_is_rejected() {
        let json = r#"{ "detection_snr": { "detector": 8.0, "network": 10.0 },
                        "fisher_parameters": [], "detectors": [] }"#;
        assert!(serde_json::from_str::<StoreFile>(json).is_err());
    }

    #[test]
    fn wrong_matrix_shape_is_reported() {
        let json = r#"{ "detection_snr": { "detector": 8.0, "network": 10.0 },
                        "fisher_parameters": ["ra", "dec"],
                        "detectors": [ { "name": "L1", "signals": [ { "snr": 9.0, "fisher": [[1.0]] } ] } ] }"#;
        let raw: StoreFile = serde_json::from_str(json).unwrap();
        let err = raw.into_store().unwrap_err();
        assert!(err.to_string().contains("Detector L1 signal 0"), "{err}");
    }
}
