//! Normalized truncated-SVD pseudo-inverse.
//!
//! Fisher matrices mix parameters of wildly different scale (solar masses,
//! megaparsecs, seconds), so their condition number is dominated by units
//! rather than information content. We therefore:
//!
//! 1. scale rows and columns by `d_i = sqrt(M_ii)` so the diagonal becomes 1
//! 2. take the SVD of the normalized matrix
//! 3. drop singular values `<= SINGULAR_VALUE_THRESHOLD`
//! 4. rebuild the pseudo-inverse and undo the scaling
//!
//! The result is not symmetrized. Callers that need exact symmetry should do it
//! explicitly.

use nalgebra::DMatrix;
use tracing::debug;

use crate::error::{FisherError, FisherResult};

/// Singular values of the normalized matrix at or below this are treated as zero.
pub const SINGULAR_VALUE_THRESHOLD: f64 = 1e-10;

/// Compute the normalized pseudo-inverse of a square symmetric matrix.
///
/// Fails with [`FisherError::DegenerateMatrix`] when a diagonal entry is zero,
/// negative or non-finite, since the normalizer is undefined there.
pub fn invert_svd(matrix: &DMatrix<f64>) -> FisherResult<DMatrix<f64>> {
    let n = matrix.nrows();
    if matrix.ncols() != n {
        return Err(FisherError::shapes("matrix columns", n, matrix.ncols()));
    }

    let normalizer = diagonal_normalizer(matrix)?;
    let outer = &normalizer * normalizer.transpose();
    let normalized = matrix.component_div(&outer);

    let svd = normalized.svd(true, true);
    let (Some(u), Some(v_t)) = (svd.u.as_ref(), svd.v_t.as_ref()) else {
        return Err(FisherError::Collaborator {
            stage: "singular value decomposition",
            message: "missing singular vectors".to_string(),
        });
    };

    // Do not rely on the ordering of the singular values; sum the retained
    // rank-one terms directly.
    let mut inverse = DMatrix::<f64>::zeros(n, n);
    let mut kept = 0usize;
    for (i, &s) in svd.singular_values.iter().enumerate() {
        if s > SINGULAR_VALUE_THRESHOLD {
            inverse += (u.column(i) * v_t.row(i)) / s;
            kept += 1;
        }
    }
    if kept < n {
        debug!(dim = n, kept, "truncated near-zero singular values");
    }

    Ok(inverse.component_div(&outer))
}

/// Column vector `d` with `d_i = sqrt(M_ii)`.
fn diagonal_normalizer(matrix: &DMatrix<f64>) -> FisherResult<DMatrix<f64>> {
    let n = matrix.nrows();
    let mut d = DMatrix::<f64>::zeros(n, 1);
    for i in 0..n {
        let value = matrix[(i, i)];
        if !(value.is_finite() && value > 0.0) {
            return Err(FisherError::DegenerateMatrix { index: i, value });
        }
        d[(i, 0)] = value.sqrt();
    }
    Ok(d)
}
