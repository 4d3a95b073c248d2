// Copyright (c) 2025-2026 brdigetrlol. All rights reserved.
// SPDX-License-Identifier: LicenseRef-Icarus-Proprietary
// See LICENSE in the repository root for full license terms.

use thiserror::Error;

/// Errors raised by lattice construction and metric linear algebra.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("lattice dimension must be at least 1, got {0}")]
    InvalidDimension(usize),

    #[error("matrix is not square: {rows}x{cols}")]
    NotSquare { rows: usize, cols: usize },

    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("matrix element ({row}, {col}) is not finite")]
    NonFinite { row: usize, col: usize },

    #[error("matrix is not symmetric at ({row}, {col})")]
    NotSymmetric { row: usize, col: usize },

    #[error("matrix is not positive definite")]
    NotPositiveDefinite,

    #[error("unsupported lattice family: {0}")]
    UnsupportedLattice(String),
}

pub type Result<T> = std::result::Result<T, MathError>;
