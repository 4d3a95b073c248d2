// Copyright (c) 2025-2026 brdigetrlol. All rights reserved.
// SPDX-License-Identifier: LicenseRef-Icarus-Proprietary
// See LICENSE in the repository root for full license terms.

use lattix_math::MathError;
use thiserror::Error;

/// Failure kinds for parameter-space registration, tiling construction and
/// lookup.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TilingError {
    #[error("invalid dimension: {0}")]
    InvalidDimension(String),

    #[error("invalid interval in dimension {dimension}: [{lower}, {upper}]")]
    InvalidInterval { dimension: usize, lower: f64, upper: f64 },

    #[error("singular metric: {0}")]
    SingularMetric(String),

    #[error("maximum mismatch must be positive and finite, got {0}")]
    InvalidMismatch(f64),

    #[error("dimension {dimension} is unbounded: [{lower}, {upper}]")]
    UnboundedDimension { dimension: usize, lower: f64, upper: f64 },

    #[error("bound on dimension {dimension} evaluated to [{lower}, {upper}]")]
    BoundEvaluation { dimension: usize, lower: f64, upper: f64 },

    #[error("unsupported lattice: {0}")]
    UnsupportedLattice(String),
}

impl From<MathError> for TilingError {
    fn from(err: MathError) -> Self {
        match err {
            MathError::UnsupportedLattice(name) => TilingError::UnsupportedLattice(name),
            MathError::InvalidDimension(_)
            | MathError::DimensionMismatch { .. }
            | MathError::NotSquare { .. } => TilingError::InvalidDimension(err.to_string()),
            MathError::NonFinite { .. }
            | MathError::NotSymmetric { .. }
            | MathError::NotPositiveDefinite => TilingError::SingularMetric(err.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, TilingError>;
