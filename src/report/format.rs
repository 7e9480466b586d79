//! Error report text format.
//!
//! ```text
//! [signal] network_SNR <parameter columns...> err_<p>... [err_sky_location]
//! ```
//!
//! - space-delimited, header line without a comment marker
//! - numbers in C `%.18e` form; when signal identifiers are present the id is
//!   written verbatim and numbers use `%.3E`
//! - the decimal separator is always `.`

use crate::domain::{FisherParameters, NetworkErrors, ParameterTable};

/// Format `value` like C's `%.{precision}e` / `%.{precision}E`.
///
/// Rust's `{:e}` omits the exponent sign and padding (`1.5e2`); C always
/// writes a sign and at least two exponent digits (`1.5e+02`).
pub fn format_scientific(value: f64, precision: usize, uppercase: bool) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let raw = format!("{value:.precision$e}");
    let (mantissa, exponent) = raw.split_once('e').unwrap_or((raw.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let sign = if exponent < 0 { '-' } else { '+' };
    let e = if uppercase { 'E' } else { 'e' };
    format!("{mantissa}{e}{sign}{:02}", exponent.abs())
}

/// Report file name for a subnetwork.
pub fn report_file_name(subnetwork: &str, population: &str, network_threshold: f64) -> String {
    format!(
        "Errors_{subnetwork}_{population}_SNR{}.txt",
        format_threshold(network_threshold)
    )
}

/// Threshold as a float literal: `8.0`, `10.5`, `1e+20`, `1e-05`.
///
/// Rust's `{:?}` already picks the shortest round-trip digits and switches to
/// exponent form outside `[1e-4, 1e16)`; only the exponent needs a sign and two
/// digits.
fn format_threshold(value: f64) -> String {
    let raw = format!("{value:?}");
    match raw.split_once('e') {
        Some((mantissa, exponent)) => {
            let exponent: i32 = exponent.parse().unwrap_or(0);
            let sign = if exponent < 0 { '-' } else { '+' };
            format!("{mantissa}e{sign}{:02}", exponent.abs())
        }
        None => raw,
    }
}

/// Header line (without trailing newline).
pub fn report_header(table: &ParameterTable, fisher_parameters: &FisherParameters, errors: &NetworkErrors) -> String {
    let mut cols: Vec<String> = Vec::new();
    if table.ids().is_some() {
        cols.push("signal".to_string());
    }
    cols.push("network_SNR".to_string());
    cols.extend(table.columns().iter().cloned());
    cols.extend(fisher_parameters.names().iter().map(|p| format!("err_{p}")));
    if errors.sky_localization.is_some() {
        cols.push("err_sky_location".to_string());
    }
    cols.join(" ")
}

/// Data rows (without trailing newlines), one per detected signal.
pub fn report_rows(table: &ParameterTable, errors: &NetworkErrors) -> Vec<String> {
    let ids = table.ids();
    let (precision, uppercase) = if ids.is_some() { (3, true) } else { (18, false) };
    let fmt = |v: f64| format_scientific(v, precision, uppercase);

    errors
        .detected
        .iter()
        .enumerate()
        .map(|(r, &k)| {
            let mut fields: Vec<String> = Vec::new();
            if let Some(ids) = ids {
                fields.push(ids[k].clone());
            }
            fields.push(fmt(errors.network_snr[r]));
            fields.extend(table.values(k).iter().map(|&v| fmt(v)));
            fields.extend(errors.parameter_errors.row(r).iter().map(|&v| fmt(v)));
            if let Some(sky) = &errors.sky_localization {
                fields.push(fmt(sky[r]));
            }
            fields.join(" ")
        })
        .collect()
}

/// Complete report contents.
pub fn format_report(table: &ParameterTable, fisher_parameters: &FisherParameters, errors: &NetworkErrors) -> String {
    let mut out = report_header(table, fisher_parameters, errors);
    out.push('\n');
    for row in report_rows(table, errors) {
        out.push_str(&row);
        out.push('\n');
    }
    out
}
