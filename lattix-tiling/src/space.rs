// Copyright (c) 2025-2026 brdigetrlol. All rights reserved.
// SPDX-License-Identifier: LicenseRef-Icarus-Proprietary
// See LICENSE in the repository root for full license terms.

//! Parameter-space registry
//!
//! Holds one bound per dimension. Bounds are registered in strictly
//! increasing dimension order so a functional bound can only read
//! dimensions whose own bounds are already known.

use crate::bounds::{BoundSpec, FunctionalBound};
use crate::error::{Result, TilingError};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct ParameterSpace {
    dimensions: usize,
    bounds: Vec<BoundSpec>,
}

impl ParameterSpace {
    pub fn new(dimensions: usize) -> Result<Self> {
        if dimensions == 0 {
            return Err(TilingError::InvalidDimension(
                "parameter space needs at least one dimension".into(),
            ));
        }
        Ok(Self {
            dimensions,
            bounds: Vec::with_capacity(dimensions),
        })
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Number of dimensions with a registered bound
    pub fn bounded_dimensions(&self) -> usize {
        self.bounds.len()
    }

    pub fn is_complete(&self) -> bool {
        self.bounds.len() == self.dimensions
    }

    pub fn bound(&self, dimension: usize) -> Option<&BoundSpec> {
        self.bounds.get(dimension)
    }

    pub fn bounds(&self) -> &[BoundSpec] {
        &self.bounds
    }

    /// Register the bound for `dimension`, which must be the next unbounded
    /// dimension.
    pub fn set_bound(&mut self, dimension: usize, spec: BoundSpec) -> Result<()> {
        if dimension >= self.dimensions {
            return Err(TilingError::InvalidDimension(format!(
                "dimension {dimension} out of range for a {}-dimensional space",
                self.dimensions
            )));
        }
        if dimension != self.bounds.len() {
            return Err(TilingError::InvalidDimension(format!(
                "bound for dimension {dimension} registered out of order, expected dimension {}",
                self.bounds.len()
            )));
        }
        match &spec {
            BoundSpec::Constant { lower, upper } => {
                if lower.is_nan() || upper.is_nan() || lower > upper {
                    return Err(TilingError::InvalidInterval {
                        dimension,
                        lower: *lower,
                        upper: *upper,
                    });
                }
            }
            BoundSpec::Functional(bound) => {
                if let Some(&dep) = bound.dependencies().iter().find(|&&d| d >= dimension) {
                    return Err(TilingError::InvalidDimension(format!(
                        "bound on dimension {dimension} depends on dimension {dep}"
                    )));
                }
            }
        }
        debug!(dimension, tiled = spec.is_tiled(), "registered bound");
        self.bounds.push(spec);
        Ok(())
    }

    /// Constant closed interval; equal ends pin the dimension.
    pub fn set_constant_bound(&mut self, dimension: usize, lower: f64, upper: f64) -> Result<()> {
        self.set_bound(dimension, BoundSpec::constant(lower, upper))
    }

    pub fn set_functional_bound(&mut self, dimension: usize, bound: FunctionalBound) -> Result<()> {
        self.set_bound(dimension, BoundSpec::functional(bound))
    }

    /// First-spindown bound from a characteristic age and braking-index range.
    pub fn set_f1dot_age_braking_bound(
        &mut self,
        freq_dim: usize,
        f1dot_dim: usize,
        age: f64,
        min_braking: f64,
        max_braking: f64,
    ) -> Result<()> {
        if freq_dim >= f1dot_dim {
            return Err(TilingError::InvalidDimension(format!(
                "frequency dimension {freq_dim} must precede spindown dimension {f1dot_dim}"
            )));
        }
        if !(age > 0.0 && age.is_finite()) {
            return Err(TilingError::InvalidInterval {
                dimension: f1dot_dim,
                lower: 0.0,
                upper: age,
            });
        }
        check_braking(f1dot_dim, min_braking, max_braking)?;
        self.set_bound(
            f1dot_dim,
            BoundSpec::f1dot_age_braking(freq_dim, age, min_braking, max_braking),
        )
    }

    /// Second-spindown bound from a braking-index range.
    pub fn set_f2dot_braking_bound(
        &mut self,
        freq_dim: usize,
        f1dot_dim: usize,
        f2dot_dim: usize,
        min_braking: f64,
        max_braking: f64,
    ) -> Result<()> {
        if !(freq_dim < f1dot_dim && f1dot_dim < f2dot_dim) {
            return Err(TilingError::InvalidDimension(format!(
                "expected frequency {freq_dim} < first spindown {f1dot_dim} < second spindown {f2dot_dim}"
            )));
        }
        check_braking(f2dot_dim, min_braking, max_braking)?;
        self.set_bound(
            f2dot_dim,
            BoundSpec::f2dot_braking(freq_dim, f1dot_dim, min_braking, max_braking),
        )
    }

    pub(crate) fn ensure_complete(&self) -> Result<()> {
        if !self.is_complete() {
            return Err(TilingError::InvalidDimension(format!(
                "no bound registered for dimension {}",
                self.bounds.len()
            )));
        }
        Ok(())
    }

    /// Raw interval of `dimension` given a point whose lower coordinates are
    /// set; coordinates at and above `dimension` are ignored.
    pub fn evaluate(&self, dimension: usize, point: &[f64]) -> Result<(f64, f64)> {
        let spec = self.bounds.get(dimension).ok_or_else(|| {
            TilingError::InvalidDimension(format!("no bound registered for dimension {dimension}"))
        })?;
        if point.len() < dimension {
            return Err(TilingError::InvalidDimension(format!(
                "need {dimension} leading coordinates, got {}",
                point.len()
            )));
        }
        checked_interval(dimension, spec.evaluate(&point[..dimension]))
    }
}

fn check_braking(dimension: usize, min_braking: f64, max_braking: f64) -> Result<()> {
    if !(min_braking > 1.0 && min_braking <= max_braking && max_braking.is_finite()) {
        return Err(TilingError::InvalidInterval {
            dimension,
            lower: min_braking,
            upper: max_braking,
        });
    }
    Ok(())
}

/// Reject evaluated intervals that are not finite or have lower > upper.
pub(crate) fn checked_interval(dimension: usize, (lower, upper): (f64, f64)) -> Result<(f64, f64)> {
    if lower.is_infinite() || upper.is_infinite() {
        return Err(TilingError::UnboundedDimension {
            dimension,
            lower,
            upper,
        });
    }
    if lower.is_nan() || upper.is_nan() || lower > upper {
        return Err(TilingError::BoundEvaluation {
            dimension,
            lower,
            upper,
        });
    }
    Ok((lower, upper))
}
