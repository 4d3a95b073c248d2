// Copyright (c) 2025-2026 brdigetrlol. All rights reserved.
// SPDX-License-Identifier: LicenseRef-Icarus-Proprietary
// See LICENSE in the repository root for full license terms.

//! Parameter-space metric
//!
//! A symmetric positive-definite matrix g giving the mismatch
//! μ(Δx) = Δxᵀ g Δx between two nearby parameter-space points.
//!
//! Physical metrics routinely span tens of orders of magnitude along the
//! diagonal, so every factorization here runs on the diagonally normalized
//! metric gn = S⁻¹ g S⁻¹ with S = diag(sqrt(g_ii)), which has unit diagonal.

use crate::error::{MathError, Result};
use nalgebra::DMatrix;

/// Tolerance on |g_ij - g_ji| relative to sqrt(g_ii g_jj)
const SYMMETRY_TOLERANCE: f64 = 1e-10;

#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    matrix: DMatrix<f64>,
}

impl Metric {
    /// Validate and wrap a symmetric matrix with positive diagonal.
    ///
    /// Small asymmetries within rounding are averaged away. Positive
    /// definiteness beyond the diagonal is checked by the factorizations.
    pub fn new(matrix: DMatrix<f64>) -> Result<Self> {
        if !matrix.is_square() {
            return Err(MathError::NotSquare {
                rows: matrix.nrows(),
                cols: matrix.ncols(),
            });
        }
        let n = matrix.nrows();
        if n == 0 {
            return Err(MathError::InvalidDimension(0));
        }
        for i in 0..n {
            for j in 0..n {
                let (a, b) = (matrix[(i, j)], matrix[(j, i)]);
                if !a.is_finite() {
                    return Err(MathError::NonFinite { row: i, col: j });
                }
                let scale = (matrix[(i, i)] * matrix[(j, j)]).abs().sqrt();
                if (a - b).abs() > SYMMETRY_TOLERANCE * scale {
                    return Err(MathError::NotSymmetric { row: i, col: j });
                }
            }
            if matrix[(i, i)] <= 0.0 {
                return Err(MathError::NotPositiveDefinite);
            }
        }
        let matrix = (&matrix + matrix.transpose()) * 0.5;
        Ok(Self { matrix })
    }

    /// Build from a function of (row, col).
    pub fn from_fn(dim: usize, f: impl FnMut(usize, usize) -> f64) -> Result<Self> {
        Self::new(DMatrix::from_fn(dim, dim, f))
    }

    pub fn identity(dim: usize) -> Self {
        Self {
            matrix: DMatrix::identity(dim, dim),
        }
    }

    pub fn dim(&self) -> usize {
        self.matrix.nrows()
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.matrix[(i, j)]
    }

    pub fn as_matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }

    /// Metric restricted to the given dimensions, in the given order.
    pub fn submetric(&self, dims: &[usize]) -> Result<Self> {
        if let Some(&bad) = dims.iter().find(|&&d| d >= self.dim()) {
            return Err(MathError::DimensionMismatch {
                expected: self.dim(),
                actual: bad + 1,
            });
        }
        if dims.is_empty() {
            return Err(MathError::InvalidDimension(0));
        }
        Ok(Self {
            matrix: DMatrix::from_fn(dims.len(), dims.len(), |i, j| {
                self.matrix[(dims[i], dims[j])]
            }),
        })
    }

    /// sqrt(g_ii) for every dimension
    pub fn diagonal_scale(&self) -> Vec<f64> {
        self.matrix.diagonal().iter().map(|g| g.sqrt()).collect()
    }

    /// S⁻¹ g S⁻¹, which has unit diagonal
    pub fn normalized(&self) -> Self {
        let scale = self.diagonal_scale();
        Self {
            matrix: DMatrix::from_fn(self.dim(), self.dim(), |i, j| {
                self.matrix[(i, j)] / (scale[i] * scale[j])
            }),
        }
    }

    pub fn is_positive_definite(&self) -> bool {
        self.normalized().matrix.cholesky().is_some()
    }

    pub fn determinant(&self) -> f64 {
        self.matrix.determinant()
    }

    /// g⁻¹, computed through the normalized Cholesky factor.
    pub fn inverse(&self) -> Result<DMatrix<f64>> {
        let scale = self.diagonal_scale();
        let normalized_inv = self
            .normalized()
            .matrix
            .cholesky()
            .ok_or(MathError::NotPositiveDefinite)?
            .inverse();
        Ok(DMatrix::from_fn(self.dim(), self.dim(), |i, j| {
            normalized_inv[(i, j)] / (scale[i] * scale[j])
        }))
    }

    /// Lower-triangular D with Dᵀ g D = I.
    ///
    /// Factor g = U Uᵀ with U upper triangular (Cholesky of the index-reversed
    /// matrix), then D = (Uᵀ)⁻¹.
    pub fn orthonormal_basis(&self) -> Result<DMatrix<f64>> {
        let n = self.dim();
        let chol = reverse_dims(&self.matrix)
            .cholesky()
            .ok_or(MathError::NotPositiveDefinite)?;
        let upper_t = reverse_dims(&chol.l().transpose());
        let mut basis = upper_t
            .solve_lower_triangular(&DMatrix::identity(n, n))
            .ok_or(MathError::NotPositiveDefinite)?;
        basis.fill_upper_triangle(0.0, 1);
        Ok(basis)
    }

    /// Full extent along each axis of the ellipsoid Δxᵀ g Δx <= `max_mismatch`:
    /// 2 sqrt(max_mismatch (g⁻¹)_ii).
    pub fn ellipse_bounding_box(&self, max_mismatch: f64) -> Result<Vec<f64>> {
        let inv = self.inverse()?;
        Ok((0..self.dim())
            .map(|i| 2.0 * (max_mismatch * inv[(i, i)]).sqrt())
            .collect())
    }

    /// Δxᵀ g Δx
    pub fn mismatch(&self, dx: &[f64]) -> f64 {
        debug_assert_eq!(dx.len(), self.dim());
        let n = self.dim();
        let mut total = 0.0;
        for i in 0..n {
            let mut row = 0.0;
            for j in 0..n {
                row += self.matrix[(i, j)] * dx[j];
            }
            total += dx[i] * row;
        }
        total
    }
}

/// J M J where J reverses the order of rows and columns.
pub(crate) fn reverse_dims(m: &DMatrix<f64>) -> DMatrix<f64> {
    let (r, c) = m.shape();
    DMatrix::from_fn(r, c, |i, j| m[(r - 1 - i, c - 1 - j)])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lehmer(n: usize) -> Metric {
        Metric::from_fn(n, |i, j| (i.min(j) + 1) as f64 / (i.max(j) + 1) as f64).unwrap()
    }

    /// Widely scaled 3x3 positive-definite metric
    const STIFF_SCALE: [f64; 3] = [1.0e4, 3.0e9, 2.0e16];

    fn stiff() -> Metric {
        let base = lehmer(3);
        Metric::from_fn(3, |i, j| base.get(i, j) * STIFF_SCALE[i] * STIFF_SCALE[j]).unwrap()
    }

    #[test]
    fn test_identity_metric() {
        let m = Metric::identity(4);
        assert_eq!(m.dim(), 4);
        assert!((m.determinant() - 1.0).abs() < 1e-12);
        assert_eq!(m.diagonal_scale(), vec![1.0; 4]);
        assert!((m.mismatch(&[1.0, 2.0, 0.0, -1.0]) - 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_invalid_matrices() {
        assert_eq!(
            Metric::new(DMatrix::zeros(2, 3)).unwrap_err(),
            MathError::NotSquare { rows: 2, cols: 3 }
        );
        let asym = DMatrix::from_row_slice(2, 2, &[1.0, 0.5, 0.2, 1.0]);
        assert!(matches!(
            Metric::new(asym),
            Err(MathError::NotSymmetric { .. })
        ));
        let nan = DMatrix::from_row_slice(2, 2, &[1.0, f64::NAN, f64::NAN, 1.0]);
        assert!(matches!(Metric::new(nan), Err(MathError::NonFinite { .. })));
        let neg = DMatrix::from_row_slice(2, 2, &[-1.0, 0.0, 0.0, 1.0]);
        assert_eq!(Metric::new(neg).unwrap_err(), MathError::NotPositiveDefinite);
    }

    #[test]
    fn test_indefinite_metric_fails_factorization() {
        let m = Metric::new(DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 1.0])).unwrap();
        assert!(!m.is_positive_definite());
        assert_eq!(m.orthonormal_basis().unwrap_err(), MathError::NotPositiveDefinite);
        assert_eq!(m.inverse().unwrap_err(), MathError::NotPositiveDefinite);
    }

    #[test]
    fn test_submetric() {
        let m = lehmer(4);
        let sub = m.submetric(&[1, 3]).unwrap();
        assert_eq!(sub.dim(), 2);
        assert_eq!(sub.get(0, 0), 1.0);
        assert!((sub.get(0, 1) - 0.5).abs() < 1e-15);
        assert!(m.submetric(&[4]).is_err());
        assert!(m.submetric(&[]).is_err());
    }

    #[test]
    fn test_normalized_has_unit_diagonal() {
        let n = stiff().normalized();
        for i in 0..3 {
            assert!((n.get(i, i) - 1.0).abs() < 1e-14);
        }
        assert!((n.get(0, 2) - lehmer(3).get(0, 2)).abs() < 1e-14);
    }

    #[test]
    fn test_orthonormal_basis() {
        for m in [lehmer(4), stiff().normalized()] {
            let d = m.orthonormal_basis().unwrap();
            for i in 0..m.dim() {
                for j in (i + 1)..m.dim() {
                    assert_eq!(d[(i, j)], 0.0);
                }
            }
            let gram = d.transpose() * m.as_matrix() * &d;
            let err = (gram - DMatrix::<f64>::identity(m.dim(), m.dim())).amax();
            assert!(err < 1e-10, "DᵀgD deviates from identity by {err}");
        }
    }

    #[test]
    fn test_inverse_of_stiff_metric() {
        let m = stiff();
        let inv = m.inverse().unwrap();
        // g g⁻¹ = S (A A⁻¹) S⁻¹, so undo the scales before comparing with I
        let product = m.as_matrix() * &inv;
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                let unscaled = product[(i, j)] * STIFF_SCALE[j] / STIFF_SCALE[i];
                assert!((unscaled - expected).abs() < 1e-10, "({i}, {j}): {unscaled}");
            }
        }
    }

    #[test]
    fn test_bounding_box_diagonal_metric() {
        let m = Metric::new(DMatrix::from_diagonal(&nalgebra::DVector::from_vec(vec![4.0, 0.25])))
            .unwrap();
        let bbox = m.ellipse_bounding_box(1.0).unwrap();
        assert!((bbox[0] - 1.0).abs() < 1e-12);
        assert!((bbox[1] - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_bounding_box_contains_ellipse() {
        let m = lehmer(2);
        let mu = 0.3;
        let bbox = m.ellipse_bounding_box(mu).unwrap();
        let d = m.orthonormal_basis().unwrap();
        // Boundary points are D u sqrt(mu) for unit vectors u
        let mut extent = [0.0f64; 2];
        for step in 0..3600 {
            let t = step as f64 * std::f64::consts::PI / 1800.0;
            let u = nalgebra::DVector::from_vec(vec![t.cos(), t.sin()]);
            let x = &d * u * mu.sqrt();
            assert!((m.mismatch(x.as_slice()) - mu).abs() < 1e-12);
            for i in 0..2 {
                extent[i] = extent[i].max(x[i].abs());
            }
        }
        for i in 0..2 {
            assert!(extent[i] <= 0.5 * bbox[i] + 1e-12);
            assert!(extent[i] > 0.5 * bbox[i] * 0.999);
        }
    }

    #[test]
    fn test_reverse_dims() {
        let m = DMatrix::from_row_slice(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let r = reverse_dims(&m);
        assert_eq!(r, DMatrix::from_row_slice(2, 3, &[6.0, 5.0, 4.0, 3.0, 2.0, 1.0]));
    }
}
