// Copyright (c) 2025-2026 brdigetrlol. All rights reserved.
// SPDX-License-Identifier: LicenseRef-Icarus-Proprietary
// See LICENSE in the repository root for full license terms.

//! Lattice tiling of a bounded parameter space
//!
//! Templates are the points x = o + P k of a lattice, with k integer, o the
//! lattice origin and P a lower-triangular generator scaled so that
//! every point of the space lies within the maximum mismatch of some
//! template. Because P is lower triangular, the admissible integer range in
//! each dimension depends only on the coordinates already fixed in lower
//! dimensions, which is what makes counting, enumeration and lookup
//! tractable.
//!
//! Each tiled interval is widened by half the mismatch ellipse's bounding
//! box so the lattice also covers the edges of the space. A functional
//! bound is first extended to its extremes over the ± half-box corners of
//! the dimensions it reads.
//!
//! The origin is found by walking the lower bounds one dimension at a time;
//! each tiled coordinate then sits a quarter of the bounding box below its
//! lower bound, halfway into the padding.

use crate::bounds::BoundSpec;
use crate::config::TilingConfig;
use crate::error::{Result, TilingError};
use crate::lookup::LookupTree;
use crate::space::{checked_interval, ParameterSpace};
use lattix_math::{LatticeFamily, LatticeGenerator, Metric};
use nalgebra::DMatrix;
use std::sync::OnceLock;
use tracing::debug;

/// Largest number of tiled dependencies padded over by corner evaluation
const MAX_PADDING_DEPENDENCIES: usize = 16;

/// Largest magnitude accepted for a generating integer
const MAX_GENERATING_INTEGER: f64 = (1u64 << 52) as f64;

#[derive(Debug)]
pub struct LatticeTiling {
    space: ParameterSpace,
    metric: Metric,
    family: LatticeFamily,
    max_mismatch: f64,
    generator: Option<LatticeGenerator>,
    tiled: Vec<bool>,
    tiled_dims: Vec<usize>,
    origin: Vec<f64>,
    /// Full ellipse bounding-box extent, zero for untiled dimensions
    bounding_box: Vec<f64>,
    /// Lower-triangular P, zero rows and columns for untiled dimensions
    phys_from_int: DMatrix<f64>,
    int_from_phys: DMatrix<f64>,
    lookup: OnceLock<Result<LookupTree>>,
}

impl LatticeTiling {
    /// Build a tiling of `space` with lattice `family`, parameter-space
    /// metric `metric` and maximum mismatch `max_mismatch`.
    pub fn new(space: ParameterSpace, family: LatticeFamily, metric: Metric, max_mismatch: f64) -> Result<Self> {
        let n = space.dimensions();
        space.ensure_complete()?;
        if metric.dim() != n {
            return Err(TilingError::InvalidDimension(format!(
                "metric is {}x{} but the parameter space has {n} dimensions",
                metric.dim(),
                metric.dim()
            )));
        }
        if !(max_mismatch > 0.0 && max_mismatch.is_finite()) {
            return Err(TilingError::InvalidMismatch(max_mismatch));
        }
        if !metric.is_positive_definite() {
            return Err(TilingError::SingularMetric(
                "metric is not positive definite".into(),
            ));
        }

        let tiled: Vec<bool> = space.bounds().iter().map(BoundSpec::is_tiled).collect();
        let tiled_dims: Vec<usize> = (0..n).filter(|&d| tiled[d]).collect();
        for (dim, bound) in space.bounds().iter().enumerate() {
            let deps = bound.dependencies().iter().filter(|&&d| tiled[d]).count();
            if deps > MAX_PADDING_DEPENDENCIES {
                return Err(TilingError::InvalidDimension(format!(
                    "bound on dimension {dim} reads {deps} tiled dimensions, at most \
                     {MAX_PADDING_DEPENDENCIES} are supported"
                )));
            }
        }
        let mut bounding_box = vec![0.0; n];
        let mut phys_from_int = DMatrix::zeros(n, n);
        let mut int_from_phys = DMatrix::zeros(n, n);

        let generator = if tiled_dims.is_empty() {
            None
        } else {
            let m = tiled_dims.len();
            let sub = metric.submetric(&tiled_dims)?;
            let scale = sub.diagonal_scale();
            let basis = sub.normalized().orthonormal_basis()?;
            let bbox = sub.ellipse_bounding_box(max_mismatch)?;
            let generator = LatticeGenerator::new(family, m)?;

            // P = sqrt(mu) S⁻¹ D L
            let mut sub_p = &basis * generator.generator() * max_mismatch.sqrt();
            for a in 0..m {
                for b in 0..m {
                    sub_p[(a, b)] /= scale[a];
                }
            }
            let sub_p_inv = sub_p
                .solve_lower_triangular(&DMatrix::identity(m, m))
                .ok_or_else(|| TilingError::SingularMetric("lattice generator is singular".into()))?;

            for (a, &i) in tiled_dims.iter().enumerate() {
                bounding_box[i] = bbox[a];
                for (b, &j) in tiled_dims.iter().enumerate().take(a + 1) {
                    phys_from_int[(i, j)] = sub_p[(a, b)];
                    int_from_phys[(i, j)] = sub_p_inv[(a, b)];
                }
            }
            Some(generator)
        };

        // Bounds are read along the lower corner so none is evaluated
        // outside the space
        let mut lower_corner = Vec::with_capacity(n);
        for dim in 0..n {
            let (lower, _) = space.evaluate(dim, &lower_corner)?;
            lower_corner.push(lower);
        }
        let origin: Vec<f64> = lower_corner
            .iter()
            .zip(&bounding_box)
            .map(|(lower, bbox)| lower - 0.25 * bbox)
            .collect();

        debug!(
            dimensions = n,
            tiled = tiled_dims.len(),
            lattice = %family,
            max_mismatch,
            origin = ?origin,
            bounding_box = ?bounding_box,
            "constructed lattice tiling"
        );

        Ok(Self {
            space,
            metric,
            family,
            max_mismatch,
            generator,
            tiled,
            tiled_dims,
            origin,
            bounding_box,
            phys_from_int,
            int_from_phys,
            lookup: OnceLock::new(),
        })
    }

    pub fn from_config(space: ParameterSpace, metric: Metric, config: &TilingConfig) -> Result<Self> {
        config.validate()?;
        Self::new(space, config.lattice, metric, config.max_mismatch)
    }

    pub fn dimensions(&self) -> usize {
        self.space.dimensions()
    }

    /// Number of dimensions spanned by the lattice
    pub fn tiled_dimensions(&self) -> usize {
        self.tiled_dims.len()
    }

    pub fn is_tiled(&self, dim: usize) -> bool {
        self.tiled.get(dim).copied().unwrap_or(false)
    }

    pub fn tiled_dims(&self) -> &[usize] {
        &self.tiled_dims
    }

    pub fn family(&self) -> LatticeFamily {
        self.family
    }

    pub fn max_mismatch(&self) -> f64 {
        self.max_mismatch
    }

    pub fn metric(&self) -> &Metric {
        &self.metric
    }

    pub fn space(&self) -> &ParameterSpace {
        &self.space
    }

    /// Lattice origin, a quarter bounding box below the lower bounds
    pub fn origin(&self) -> &[f64] {
        &self.origin
    }

    /// Extent of the mismatch ellipse along each axis (zero when untiled)
    pub fn bounding_box(&self) -> &[f64] {
        &self.bounding_box
    }

    /// Lower-triangular map from generating integers to physical offsets
    pub fn generator_matrix(&self) -> &DMatrix<f64> {
        &self.phys_from_int
    }

    pub(crate) fn lattice_generator(&self) -> Option<&LatticeGenerator> {
        self.generator.as_ref()
    }

    pub(crate) fn int_from_phys(&self) -> &DMatrix<f64> {
        &self.int_from_phys
    }

    /// Next tiled dimension above `dim`
    pub(crate) fn next_tiled(&self, dim: usize) -> Option<usize> {
        self.tiled_dims.iter().copied().find(|&d| d > dim)
    }

    /// Initial physical point: every dimension at the origin. Untiled
    /// dimensions keep this value.
    pub(crate) fn origin_point(&self) -> Vec<f64> {
        self.origin.clone()
    }

    /// Physical coordinate of `dim` for the integer point `ints`; only
    /// integers up to `dim` are read.
    #[inline]
    pub(crate) fn physical_coordinate(&self, dim: usize, ints: &[i64]) -> f64 {
        let mut x = self.origin[dim];
        for j in 0..=dim {
            let p = self.phys_from_int[(dim, j)];
            if p != 0.0 {
                x += p * ints[j] as f64;
            }
        }
        x
    }

    /// Padded interval of tiled dimension `dim` given the physical
    /// coordinates of lower dimensions.
    pub(crate) fn padded_interval(&self, dim: usize, phys: &[f64]) -> Result<(f64, f64)> {
        let bound = &self.space.bounds()[dim];
        let (mut lower, mut upper) = checked_interval(dim, bound.evaluate(&phys[..dim]))?;

        let deps: Vec<usize> = bound
            .dependencies()
            .iter()
            .copied()
            .filter(|&d| self.tiled[d])
            .collect();
        if !deps.is_empty() {
            let mut shifted = phys[..dim].to_vec();
            for corner in 0..(1usize << deps.len()) {
                for (bit, &d) in deps.iter().enumerate() {
                    let half = 0.5 * self.bounding_box[d];
                    shifted[d] = if (corner >> bit) & 1 == 1 {
                        phys[d] + half
                    } else {
                        phys[d] - half
                    };
                }
                let (l, u) = checked_interval(dim, bound.evaluate(&shifted))?;
                lower = lower.min(l);
                upper = upper.max(u);
            }
        }

        let half = 0.5 * self.bounding_box[dim];
        Ok((lower - half, upper + half))
    }

    /// Inclusive integer range of tiled dimension `dim`.
    ///
    /// An empty range collapses to the single integer nearest the middle of
    /// the padded interval, so every prefix has at least one point. Ranges
    /// whose integers cannot be represented exactly are rejected as
    /// unbounded.
    pub(crate) fn int_range(&self, dim: usize, phys: &[f64]) -> Result<(i64, i64)> {
        let (lower, upper) = self.padded_interval(dim, phys)?;

        let mut offset = 0.0;
        for j in 0..dim {
            let q = self.int_from_phys[(dim, j)];
            if q != 0.0 {
                offset += q * (phys[j] - self.origin[j]);
            }
        }
        let diag = self.int_from_phys[(dim, dim)];
        let a = offset + diag * (lower - self.origin[dim]);
        let b = offset + diag * (upper - self.origin[dim]);
        if !(a.abs() <= MAX_GENERATING_INTEGER && b.abs() <= MAX_GENERATING_INTEGER) {
            return Err(TilingError::UnboundedDimension { dimension: dim, lower, upper });
        }

        let (lo, hi) = (a.ceil(), b.floor());
        if lo > hi {
            let mid = (0.5 * (a + b)).round() as i64;
            return Ok((mid, mid));
        }
        Ok((lo as i64, hi as i64))
    }

    /// Number of templates in the tiling.
    pub fn total_point_count(&self) -> Result<u64> {
        self.point_count(self.dimensions() - 1)
    }

    /// Number of distinct templates when only dimensions `0..=up_to` are
    /// distinguished.
    pub fn point_count(&self, up_to: usize) -> Result<u64> {
        self.check_up_to(up_to)?;
        let mut ints = vec![0i64; self.dimensions()];
        let mut phys = self.origin_point();
        self.count_from(0, up_to, &mut ints, &mut phys)
    }

    fn count_from(&self, dim: usize, up_to: usize, ints: &mut [i64], phys: &mut [f64]) -> Result<u64> {
        let Some(dim) = self.tiled_dims.iter().copied().find(|&d| d >= dim && d <= up_to) else {
            return Ok(1);
        };
        let (lo, hi) = self.int_range(dim, phys)?;
        match self.next_tiled(dim) {
            Some(next) if next <= up_to => {
                let mut total = 0;
                for k in lo..=hi {
                    ints[dim] = k;
                    phys[dim] = self.physical_coordinate(dim, ints);
                    total += self.count_from(dim + 1, up_to, ints, phys)?;
                }
                Ok(total)
            }
            _ => Ok(hi.abs_diff(lo) + 1),
        }
    }

    pub(crate) fn check_up_to(&self, up_to: usize) -> Result<()> {
        if up_to >= self.dimensions() {
            return Err(TilingError::InvalidDimension(format!(
                "dimension {up_to} out of range for a {}-dimensional tiling",
                self.dimensions()
            )));
        }
        Ok(())
    }

    pub(crate) fn lookup_cell(&self) -> &OnceLock<Result<LookupTree>> {
        &self.lookup
    }
}
