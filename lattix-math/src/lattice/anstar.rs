// Copyright (c) 2025-2026 brdigetrlol. All rights reserved.
// SPDX-License-Identifier: LicenseRef-Icarus-Proprietary
// See LICENSE in the repository root for full license terms.

//! A_n* lattice, the dual of the root lattice A_n
//!
//! Construction: A_n* = union of the cosets [i] + A_n for i = 0..=n, where
//! A_n = {x ∈ Z^{n+1} | Σxᵢ = 0} and the glue vector [i] has n+1-i
//! coordinates equal to i/(n+1) followed by i coordinates equal to
//! -(n+1-i)/(n+1). Everything lives in the sum-zero hyperplane of R^{n+1}.
//!
//! Covering radius: sqrt(n(n+2) / (12(n+1))). A_n* is the thinnest known
//! lattice covering for n <= 5.

use super::{Lattice, LatticeFamily};
use crate::error::{MathError, Result};
use nalgebra::DMatrix;

#[derive(Debug, Clone)]
pub struct AnStarLattice {
    dimension: usize,
    /// Glue vectors, one per coset of A_n
    glue: Vec<Vec<f64>>,
}

impl AnStarLattice {
    pub fn new(dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(MathError::InvalidDimension(dimension));
        }
        let m = dimension + 1;
        let glue = (0..m)
            .map(|i| {
                let j = m - i;
                let mut g = vec![i as f64 / m as f64; j];
                g.extend(std::iter::repeat(-(j as f64) / m as f64).take(i));
                g
            })
            .collect();
        Ok(Self { dimension, glue })
    }

    /// Closest point of A_n to `point`.
    ///
    /// Rounds every coordinate, then repairs a nonzero coordinate sum by
    /// moving the coordinates whose rounding error is largest in the
    /// offending direction.
    fn nearest_a_n(point: &[f64]) -> Vec<f64> {
        let mut rounded: Vec<f64> = point.iter().map(|x| x.round()).collect();
        let deficiency = rounded.iter().sum::<f64>().round() as i64;
        if deficiency == 0 {
            return rounded;
        }

        let mut order: Vec<usize> = (0..point.len()).collect();
        order.sort_by(|&a, &b| (point[a] - rounded[a]).total_cmp(&(point[b] - rounded[b])));

        let correction = (deficiency.unsigned_abs() as usize).min(order.len());
        if deficiency > 0 {
            for &i in order.iter().take(correction) {
                rounded[i] -= 1.0;
            }
        } else {
            for &i in order.iter().rev().take(correction) {
                rounded[i] += 1.0;
            }
        }
        rounded
    }
}

impl Lattice for AnStarLattice {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embedding_dimension(&self) -> usize {
        self.dimension + 1
    }

    fn family(&self) -> LatticeFamily {
        LatticeFamily::AnStar
    }

    /// Columns are e_j - 1/(n+1) for j = 1..=n, the projections of the unit
    /// vectors onto the sum-zero hyperplane.
    fn basis(&self) -> DMatrix<f64> {
        let n = self.dimension;
        let m = n + 1;
        DMatrix::from_fn(m, n, |i, j| {
            let unit = if i == j + 1 { 1.0 } else { 0.0 };
            unit - 1.0 / m as f64
        })
    }

    fn covering_radius(&self) -> f64 {
        let n = self.dimension as f64;
        (n * (n + 2.0) / (12.0 * (n + 1.0))).sqrt()
    }

    fn nearest(&self, point: &[f64]) -> Vec<f64> {
        debug_assert_eq!(point.len(), self.dimension + 1);

        let mut best = point.to_vec();
        let mut best_dist = f64::INFINITY;
        let mut shifted = vec![0.0; point.len()];
        for glue in &self.glue {
            for ((s, &x), &g) in shifted.iter_mut().zip(point).zip(glue) {
                *s = x - g;
            }
            let mut candidate = Self::nearest_a_n(&shifted);
            for (c, &g) in candidate.iter_mut().zip(glue) {
                *c += g;
            }
            let dist = self.distance_sq(point, &candidate);
            if dist < best_dist {
                best_dist = dist;
                best = candidate;
            }
        }
        best
    }

    fn covolume(&self) -> f64 {
        1.0 / ((self.dimension + 1) as f64).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// Random point in the column space of the basis
    fn random_plane_point(lattice: &AnStarLattice, rng: &mut StdRng) -> Vec<f64> {
        let basis = lattice.basis();
        let coeffs: Vec<f64> = (0..lattice.dimension())
            .map(|_| rng.gen::<f64>() * 6.0 - 3.0)
            .collect();
        (0..lattice.embedding_dimension())
            .map(|i| (0..lattice.dimension()).map(|j| basis[(i, j)] * coeffs[j]).sum())
            .collect()
    }

    fn is_anstar_point(lattice: &AnStarLattice, x: &[f64]) -> bool {
        let m = (lattice.dimension() + 1) as f64;
        let scaled: Vec<f64> = x.iter().map(|v| v * m).collect();
        let integral = scaled.iter().all(|s| (s - s.round()).abs() < 1e-9);
        let residue = scaled[0].round().rem_euclid(m);
        let same_coset = scaled
            .iter()
            .all(|s| (s.round().rem_euclid(m) - residue).abs() < 1e-9);
        let sum_zero = x.iter().sum::<f64>().abs() < 1e-9;
        integral && same_coset && sum_zero
    }

    #[test]
    fn test_anstar_creation() {
        let lattice = AnStarLattice::new(3).unwrap();
        assert_eq!(lattice.dimension(), 3);
        assert_eq!(lattice.embedding_dimension(), 4);
        assert_eq!(lattice.family(), LatticeFamily::AnStar);
        assert!(AnStarLattice::new(0).is_err());
    }

    #[test]
    fn test_basis_columns_sum_to_zero() {
        for n in 1..=5 {
            let basis = AnStarLattice::new(n).unwrap().basis();
            for col in basis.column_iter() {
                assert!(col.sum().abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_basis_columns_are_projected_unit_vectors() {
        let lattice = AnStarLattice::new(3).unwrap();
        let basis = lattice.basis();
        for j in 0..3 {
            let col: Vec<f64> = basis.column(j).iter().copied().collect();
            assert!(is_anstar_point(&lattice, &col));
            assert!((col[j + 1] - 0.75).abs() < 1e-15);
            assert!((col[0] + 0.25).abs() < 1e-15);
        }
    }

    #[test]
    fn test_covolume_matches_basis() {
        for n in 1..=5 {
            let lattice = AnStarLattice::new(n).unwrap();
            let basis = lattice.basis();
            let det = (basis.transpose() * &basis).determinant().sqrt();
            assert!((det - lattice.covolume()).abs() < 1e-12, "n={n}");
        }
    }

    #[test]
    fn test_glue_vectors_are_lattice_points() {
        let lattice = AnStarLattice::new(4).unwrap();
        for glue in &lattice.glue {
            assert!(is_anstar_point(&lattice, glue));
        }
    }

    #[test]
    fn test_a_n_sum_repair() {
        // Rounds to (1, 1, -1) with sum 1; the coordinate rounded up
        // furthest is pulled back down.
        let nearest = AnStarLattice::nearest_a_n(&[0.6, 0.55, -1.15]);
        assert_eq!(nearest.iter().sum::<f64>(), 0.0);
        assert_eq!(nearest, vec![1.0, 0.0, -1.0]);
    }

    #[test]
    fn test_nearest_is_lattice_point_within_covering_radius() {
        let mut rng = StdRng::seed_from_u64(7);
        for n in 1..=4 {
            let lattice = AnStarLattice::new(n).unwrap();
            let radius = lattice.covering_radius();
            for _ in 0..500 {
                let x = random_plane_point(&lattice, &mut rng);
                let y = lattice.nearest(&x);
                assert!(is_anstar_point(&lattice, &y), "n={n}: {y:?}");
                assert!(lattice.distance_sq(&x, &y).sqrt() <= radius + 1e-9);
            }
        }
    }

    #[test]
    fn test_nearest_matches_brute_force() {
        let mut rng = StdRng::seed_from_u64(11);
        let lattice = AnStarLattice::new(2).unwrap();
        let basis = lattice.basis();
        for _ in 0..200 {
            let x = random_plane_point(&lattice, &mut rng);
            let mut best = f64::INFINITY;
            for a in -8..=8 {
                for b in -8..=8 {
                    let p: Vec<f64> = (0..3)
                        .map(|i| basis[(i, 0)] * a as f64 + basis[(i, 1)] * b as f64)
                        .collect();
                    best = best.min(lattice.distance_sq(&x, &p));
                }
            }
            let y = lattice.nearest(&x);
            assert!((lattice.distance_sq(&x, &y) - best).abs() < 1e-9);
        }
    }

    #[test]
    fn test_lattice_points_decode_to_themselves() {
        let lattice = AnStarLattice::new(3).unwrap();
        let basis = lattice.basis();
        let k = [2.0, -1.0, 3.0];
        let p: Vec<f64> = (0..4)
            .map(|i| (0..3).map(|j| basis[(i, j)] * k[j]).sum())
            .collect();
        let y = lattice.nearest(&p);
        assert!(lattice.distance_sq(&p, &y) < 1e-18);
    }
}
