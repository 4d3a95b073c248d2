// Copyright (c) 2025-2026 brdigetrlol. All rights reserved.
// SPDX-License-Identifier: LicenseRef-Icarus-Proprietary
// See LICENSE in the repository root for full license terms.

//! Square generators with unit covering radius
//!
//! A family basis B (m x n, columns generate the lattice) is factored as
//! B = Q L with Q having orthonormal columns and L lower triangular with a
//! positive diagonal, so that LᵀL = BᵀB. The lattice {L k} is isometric to
//! {B k}; dividing L by the covering radius gives a generator whose lattice
//! covers R^n with spheres of radius 1.

use super::{Lattice, LatticeFamily};
use crate::error::{MathError, Result};
use crate::metric::reverse_dims;
use nalgebra::{DMatrix, DVector};

#[derive(Debug)]
pub struct LatticeGenerator {
    lattice: Box<dyn Lattice>,
    /// L with LᵀL = BᵀB
    lower: DMatrix<f64>,
    lower_inv: DMatrix<f64>,
    /// Q = B L⁻¹, maps square coordinates back into the native embedding
    embedding: DMatrix<f64>,
    /// L divided by the covering radius
    unit: DMatrix<f64>,
}

impl LatticeGenerator {
    pub fn new(family: LatticeFamily, dimension: usize) -> Result<Self> {
        let lattice = family.build(dimension)?;
        let basis = lattice.basis();
        let gram = basis.transpose() * &basis;

        let lower = lower_factor(&gram)?;
        let lower_inv = lower
            .solve_lower_triangular(&DMatrix::identity(dimension, dimension))
            .ok_or(MathError::NotPositiveDefinite)?;
        let embedding = &basis * &lower_inv;
        let unit = &lower / lattice.covering_radius();

        Ok(Self {
            lattice,
            lower,
            lower_inv,
            embedding,
            unit,
        })
    }

    pub fn dimension(&self) -> usize {
        self.lattice.dimension()
    }

    pub fn family(&self) -> LatticeFamily {
        self.lattice.family()
    }

    pub fn lattice(&self) -> &dyn Lattice {
        self.lattice.as_ref()
    }

    /// Lower-triangular generator with unit covering radius
    pub fn generator(&self) -> &DMatrix<f64> {
        &self.unit
    }

    /// Given real-valued generating integers `real`, return the generating
    /// integers of the closest lattice point under the Euclidean norm of the
    /// lattice.
    pub fn nearest_integers(&self, real: &[f64]) -> Vec<i64> {
        debug_assert_eq!(real.len(), self.dimension());
        let square = &self.lower * DVector::from_column_slice(real);
        let native = &self.embedding * square;
        let nearest = DVector::from_vec(self.lattice.nearest(native.as_slice()));
        let ints = &self.lower_inv * (self.embedding.transpose() * nearest);
        ints.iter().map(|k| k.round() as i64).collect()
    }
}

/// Lower-triangular L with positive diagonal and LᵀL = `gram`.
///
/// Cholesky of the index-reversed Gram matrix gives J G J = C Cᵀ, hence
/// G = (J Cᵀ J)ᵀ (J Cᵀ J) with J Cᵀ J lower triangular.
fn lower_factor(gram: &DMatrix<f64>) -> Result<DMatrix<f64>> {
    let chol = reverse_dims(gram)
        .cholesky()
        .ok_or(MathError::NotPositiveDefinite)?;
    Ok(reverse_dims(&chol.l().transpose()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn assert_lower_triangular(m: &DMatrix<f64>) {
        for i in 0..m.nrows() {
            assert!(m[(i, i)] > 0.0);
            for j in (i + 1)..m.ncols() {
                assert_eq!(m[(i, j)], 0.0, "upper element ({i}, {j}) nonzero");
            }
        }
    }

    #[test]
    fn test_generator_shape() {
        for family in LatticeFamily::ALL {
            for n in 1..=5 {
                let lg = LatticeGenerator::new(family, n).unwrap();
                assert_eq!(lg.dimension(), n);
                assert_eq!(lg.family(), family);
                assert_eq!(lg.generator().shape(), (n, n));
                assert_lower_triangular(lg.generator());
            }
        }
    }

    #[test]
    fn test_lower_factor_reproduces_gram() {
        for n in 1..=5 {
            let lg = LatticeGenerator::new(LatticeFamily::AnStar, n).unwrap();
            let basis = lg.lattice().basis();
            let gram = basis.transpose() * &basis;
            let err = (lg.lower.transpose() * &lg.lower - gram).amax();
            assert!(err < 1e-12, "n={n}: {err}");
        }
    }

    #[test]
    fn test_cubic_generator_scaling() {
        let lg = LatticeGenerator::new(LatticeFamily::Hypercubic, 4).unwrap();
        // sqrt(4)/2 = 1
        assert!((lg.generator() - DMatrix::<f64>::identity(4, 4)).amax() < 1e-12);
    }

    #[test]
    fn test_integers_round_to_themselves() {
        for family in LatticeFamily::ALL {
            let lg = LatticeGenerator::new(family, 3).unwrap();
            let k = [4.0, -2.0, 7.0];
            assert_eq!(lg.nearest_integers(&k), vec![4, -2, 7]);
        }
    }

    #[test]
    fn test_rounding_stays_within_unit_covering_radius() {
        let mut rng = StdRng::seed_from_u64(3);
        for family in LatticeFamily::ALL {
            for n in 1..=4 {
                let lg = LatticeGenerator::new(family, n).unwrap();
                for _ in 0..300 {
                    let real: Vec<f64> = (0..n).map(|_| rng.gen::<f64>() * 20.0 - 10.0).collect();
                    let ints = lg.nearest_integers(&real);
                    let diff = DVector::from_iterator(
                        n,
                        real.iter().zip(&ints).map(|(r, &k)| r - k as f64),
                    );
                    let dist = (lg.generator() * diff).norm();
                    assert!(dist <= 1.0 + 1e-9, "{family} n={n}: {dist}");
                }
            }
        }
    }
}
