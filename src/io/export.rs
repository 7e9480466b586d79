//! Write error reports to disk.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::domain::{FisherParameters, NetworkErrors, ParameterTable};
use crate::error::AppError;
use crate::report::format::{report_file_name, report_header, report_rows};

/// Write the report of one subnetwork into `out_dir` and return its path.
pub fn write_error_report(
    out_dir: &Path,
    population: &str,
    network_threshold: f64,
    table: &ParameterTable,
    fisher_parameters: &FisherParameters,
    errors: &NetworkErrors,
) -> Result<PathBuf, AppError> {
    let path = out_dir.join(report_file_name(&errors.subnetwork, population, network_threshold));
    let mut file = File::create(&path)
        .map_err(|e| AppError::new(2, format!("Failed to create report '{}': {e}", path.display())))?;

    writeln!(file, "{}", report_header(table, fisher_parameters, errors))
        .map_err(|e| AppError::new(2, format!("Failed to write report header: {e}")))?;

    for row in report_rows(table, errors) {
        writeln!(file, "{row}").map_err(|e| AppError::new(2, format!("Failed to write report row: {e}")))?;
    }

    Ok(path)
}
