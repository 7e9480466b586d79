//! Population CSV ingest.
//!
//! One row per simulated signal, one column per parameter. An optional `id`
//! column carries a non-numeric signal identifier; it is kept aside and never
//! treated as a parameter.
//!
//! Rows are never skipped: the row index is the signal index used by the
//! detector store, so a bad row is a hard error naming its line.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;

use crate::domain::ParameterTable;
use crate::error::AppError;

/// Name of the optional identifier column (case-insensitive).
pub const ID_COLUMN: &str = "id";

/// Load a population table from a CSV file.
pub fn load_population(path: &Path) -> Result<ParameterTable, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open population CSV '{}': {e}", path.display())))?;
    read_population(file)
}

/// Parse a population table from any reader.
pub fn read_population<R: Read>(input: R) -> Result<ParameterTable, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read population CSV headers: {e}")))?
        .clone();

    let (columns, id_index) = split_headers(&headers)?;

    let mut rows = Vec::new();
    let mut ids = id_index.map(|_| Vec::new());

    for (idx, result) in reader.records().enumerate() {
        // +2: records start after the header line, and lines are 1-based.
        let line = idx + 2;
        let record = result.map_err(|e| AppError::new(2, format!("Population CSV line {line}: {e}")))?;

        let mut values = Vec::with_capacity(columns.len());
        for (pos, field) in record.iter().enumerate() {
            if Some(pos) == id_index {
                continue;
            }
            let value = parse_value(field).ok_or_else(|| {
                AppError::new(
                    2,
                    format!(
                        "Population CSV line {line}: invalid value '{field}' for column `{}`",
                        headers.get(pos).unwrap_or("?")
                    ),
                )
            })?;
            values.push(value);
        }

        if let (Some(ids), Some(i)) = (ids.as_mut(), id_index) {
            ids.push(record.get(i).unwrap_or("").to_string());
        }
        rows.push(values);
    }

    ParameterTable::new(columns, rows, ids).map_err(|e| AppError::new(2, format!("Invalid population table: {e}")))
}

/// Parameter column names (in file order) and the position of the id column.
fn split_headers(headers: &StringRecord) -> Result<(Vec<String>, Option<usize>), AppError> {
    let mut columns = Vec::new();
    let mut id_index = None;

    for (pos, raw) in headers.iter().enumerate() {
        let name = normalize_header_name(raw);
        if name.is_empty() {
            return Err(AppError::new(2, format!("Population CSV column {} has an empty name", pos + 1)));
        }
        if name.eq_ignore_ascii_case(ID_COLUMN) {
            id_index = Some(pos);
            continue;
        }
        if columns.contains(&name) {
            return Err(AppError::new(2, format!("Duplicate population column `{name}`")));
        }
        columns.push(name);
    }

    if columns.is_empty() {
        return Err(AppError::new(2, "Population CSV has no parameter columns"));
    }
    Ok((columns, id_index))
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    name.trim().trim_start_matches('\u{feff}').to_string()
}

fn parse_value(field: &str) -> Option<f64> {
    let v: f64 = field.trim().parse().ok()?;
    v.is_finite().then_some(v)
}
