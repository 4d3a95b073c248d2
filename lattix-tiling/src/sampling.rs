// Copyright (c) 2025-2026 brdigetrlol. All rights reserved.
// SPDX-License-Identifier: LicenseRef-Icarus-Proprietary
// See LICENSE in the repository root for full license terms.

//! Random points inside a parameter space
//!
//! Each coordinate is drawn uniformly from its bound given the coordinates
//! already drawn, so functional bounds are always respected.

use crate::error::Result;
use crate::space::ParameterSpace;
use crate::tiling::LatticeTiling;
use nalgebra::{DMatrix, DVector};
use rand::Rng;

impl ParameterSpace {
    pub fn random_point<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<DVector<f64>> {
        self.ensure_complete()?;
        let mut point = Vec::with_capacity(self.dimensions());
        for dim in 0..self.dimensions() {
            let (lower, upper) = self.evaluate(dim, &point)?;
            point.push(lower + (upper - lower) * rng.gen::<f64>());
        }
        Ok(DVector::from_vec(point))
    }

    /// `count` random points, one per column.
    pub fn random_points<R: Rng + ?Sized>(&self, rng: &mut R, count: usize) -> Result<DMatrix<f64>> {
        let mut points = DMatrix::zeros(self.dimensions(), count);
        for c in 0..count {
            points.set_column(c, &self.random_point(rng)?);
        }
        Ok(points)
    }
}

impl LatticeTiling {
    /// Random points inside the tiled parameter space, one per column.
    pub fn random_points<R: Rng + ?Sized>(&self, rng: &mut R, count: usize) -> Result<DMatrix<f64>> {
        self.space().random_points(rng, count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::{BoundParams, FunctionalBound};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_points_respect_bounds() {
        let mut space = ParameterSpace::new(3).unwrap();
        space.set_constant_bound(0, 1.0, 2.0).unwrap();
        space
            .set_functional_bound(
                1,
                FunctionalBound::new(
                    |x: &[f64], _: &BoundParams| -x[0],
                    |x: &[f64], _: &BoundParams| x[0] * x[0],
                    BoundParams::new(),
                    vec![0],
                ),
            )
            .unwrap();
        space.set_constant_bound(2, 3.0, 3.0).unwrap();

        let mut rng = StdRng::seed_from_u64(42);
        let points = space.random_points(&mut rng, 500).unwrap();
        assert_eq!(points.shape(), (3, 500));
        for col in points.column_iter() {
            assert!((1.0..=2.0).contains(&col[0]));
            assert!(col[1] >= -col[0] && col[1] <= col[0] * col[0]);
            assert_eq!(col[2], 3.0);
        }
    }

    #[test]
    fn test_seeded_sampling_is_reproducible() {
        let mut space = ParameterSpace::new(2).unwrap();
        space.set_constant_bound(0, 0.0, 1.0).unwrap();
        space.set_constant_bound(1, 0.0, 1.0).unwrap();
        let a = space.random_points(&mut StdRng::seed_from_u64(5), 10).unwrap();
        let b = space.random_points(&mut StdRng::seed_from_u64(5), 10).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_incomplete_space_rejected() {
        let space = ParameterSpace::new(2).unwrap();
        assert!(space.random_point(&mut StdRng::seed_from_u64(1)).is_err());
    }
}
