//! Shared domain types.
//!
//! These are plain data: the numerical core reads them, the I/O layer builds
//! them, and nothing mutates a detector or network once aggregation starts.

use std::path::PathBuf;

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::error::{FisherError, FisherResult};

/// Parameter names with dedicated handling in the derivative engine and aggregator.
pub mod names {
    pub const LUMINOSITY_DISTANCE: &str = "luminosity_distance";
    pub const GEOCENT_TIME: &str = "geocent_time";
    pub const PHASE: &str = "phase";
    pub const RA: &str = "ra";
    pub const DEC: &str = "dec";
    pub const PSI: &str = "psi";
}

/// Ordered `name -> value` mapping for one signal.
///
/// Overrides return a new vector; nothing is perturbed in place.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParameterVector {
    entries: Vec<(String, f64)>,
}

impl ParameterVector {
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self {
            entries: pairs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries.iter().find(|(k, _)| k == name).map(|(_, v)| *v)
    }

    /// Like [`ParameterVector::get`], but a missing name is an error.
    pub fn require(&self, name: &str) -> FisherResult<f64> {
        self.get(name).ok_or_else(|| FisherError::unknown_parameter(name))
    }

    /// Copy of `self` with `name` set to `value`.
    pub fn with(&self, name: &str, value: f64) -> FisherResult<Self> {
        let mut entries = self.entries.clone();
        let slot = entries
            .iter_mut()
            .find(|(k, _)| k == name)
            .ok_or_else(|| FisherError::unknown_parameter(name))?;
        slot.1 = value;
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// Population of signals: one row per signal, columns in a stable order.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterTable {
    columns: Vec<String>,
    rows: Vec<Vec<f64>>,
    ids: Option<Vec<String>>,
}

impl ParameterTable {
    /// Build a table, checking every row against the column list.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<f64>>, ids: Option<Vec<String>>) -> FisherResult<Self> {
        for row in &rows {
            if row.len() != columns.len() {
                return Err(FisherError::shapes("parameter row length", columns.len(), row.len()));
            }
        }
        if let Some(ids) = &ids {
            if ids.len() != rows.len() {
                return Err(FisherError::shapes("signal identifiers", rows.len(), ids.len()));
            }
        }
        Ok(Self { columns, rows, ids })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn ids(&self) -> Option<&[String]> {
        self.ids.as_deref()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn values(&self, row: usize) -> &[f64] {
        &self.rows[row]
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn value(&self, row: usize, name: &str) -> FisherResult<f64> {
        let col = self
            .column_index(name)
            .ok_or_else(|| FisherError::unknown_parameter(name))?;
        Ok(self.rows[row][col])
    }

    /// The parameter vector of one signal.
    pub fn row(&self, row: usize) -> ParameterVector {
        ParameterVector::from_pairs(
            self.columns
                .iter()
                .cloned()
                .zip(self.rows[row].iter().copied()),
        )
    }
}

/// Ordered, non-empty list of parameters spanning the Fisher matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct FisherParameters(Vec<String>);

impl FisherParameters {
    pub fn new(names: Vec<String>) -> FisherResult<Self> {
        if names.is_empty() {
            return Err(FisherError::EmptyParameterList);
        }
        Ok(Self(names))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.0.iter().position(|p| p == name)
    }

    /// Indices of `ra` and `dec` when both are Fisher parameters.
    pub fn sky_indices(&self) -> Option<(usize, usize)> {
        Some((self.index_of(names::RA)?, self.index_of(names::DEC)?))
    }
}

impl TryFrom<Vec<String>> for FisherParameters {
    type Error = FisherError;

    fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FisherParameters> for Vec<String> {
    fn from(value: FisherParameters) -> Self {
        value.0
    }
}

/// SNR and Fisher matrix of one signal as seen by one detector.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalRecord {
    pub snr: f64,
    pub fisher: DMatrix<f64>,
}

/// A detector: frequency grid, component count, and per-signal records.
///
/// `signals` is indexed like the population table.
#[derive(Debug, Clone, PartialEq)]
pub struct Detector {
    pub name: String,
    pub frequencies: Vec<f64>,
    /// Number of independent response channels (e.g. 3 for a triangular detector).
    pub components: usize,
    pub signals: Vec<SignalRecord>,
}

impl Detector {
    pub fn new(name: impl Into<String>, frequencies: Vec<f64>, components: usize) -> Self {
        Self {
            name: name.into(),
            frequencies,
            components,
            signals: Vec::new(),
        }
    }

    pub fn snr(&self, signal: usize) -> f64 {
        self.signals[signal].snr
    }
}

/// The two detection thresholds of a network.
///
/// `detector` decides whether a detector contributes to the network Fisher
/// matrix of a signal; `network` decides whether the signal is detected at all.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SnrThresholds {
    pub detector: f64,
    pub network: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Network {
    pub detectors: Vec<Detector>,
    pub detection_snr: SnrThresholds,
}

/// Detector indices combined into one report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subnetwork {
    pub detector_ids: Vec<usize>,
}

impl Subnetwork {
    pub fn new(detector_ids: Vec<usize>) -> Self {
        Self { detector_ids }
    }

    /// Every detector of the network.
    pub fn all(network: &Network) -> Self {
        Self::new((0..network.detectors.len()).collect())
    }

    /// Detector names joined by `_`, as used in report file names.
    ///
    /// Out-of-range ids are rendered as `#<id>`; aggregation rejects them.
    pub fn name(&self, network: &Network) -> String {
        self.detector_ids
            .iter()
            .map(|&i| {
                network
                    .detectors
                    .get(i)
                    .map(|d| d.name.clone())
                    .unwrap_or_else(|| format!("#{i}"))
            })
            .collect::<Vec<_>>()
            .join("_")
    }
}

/// Errors for the detected signals of one subnetwork.
///
/// Row `r` of every field refers to population row `detected[r]`.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkErrors {
    pub subnetwork: String,
    pub detected: Vec<usize>,
    pub network_snr: Vec<f64>,
    /// One row per detected signal, one column per Fisher parameter.
    pub parameter_errors: DMatrix<f64>,
    /// Present when both `ra` and `dec` are Fisher parameters.
    pub sky_localization: Option<Vec<f64>>,
}

impl NetworkErrors {
    pub fn len(&self) -> usize {
        self.detected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detected.is_empty()
    }
}

/// Configuration of an `errors` run, resolved from CLI arguments.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub store_path: PathBuf,
    pub population_path: PathBuf,
    pub population_name: String,
    /// Raw subnetwork selections (indices or detector names, comma separated).
    pub subnetworks: Vec<String>,
    pub out_dir: PathBuf,
    pub detector_snr: Option<f64>,
    pub network_snr: Option<f64>,
    pub summary: bool,
}
