// Copyright (c) 2025-2026 brdigetrlol. All rights reserved.
// SPDX-License-Identifier: LicenseRef-Icarus-Proprietary
// See LICENSE in the repository root for full license terms.

//! Hypercubic Lattice (Z^n) Implementation
//!
//! The simplest lattice: integer coordinates in n dimensions.
//!
//! Properties:
//! - Covering radius: sqrt(n)/2
//! - Orthogonal axes, identity generator
//! - Fast quantization (just rounding)

use super::{Lattice, LatticeFamily};
use crate::error::{MathError, Result};
use nalgebra::DMatrix;

#[derive(Debug, Clone)]
pub struct HypercubicLattice {
    dimension: usize,
}

impl HypercubicLattice {
    pub fn new(dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(MathError::InvalidDimension(dimension));
        }
        Ok(Self { dimension })
    }
}

impl Lattice for HypercubicLattice {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embedding_dimension(&self) -> usize {
        self.dimension
    }

    fn family(&self) -> LatticeFamily {
        LatticeFamily::Hypercubic
    }

    fn basis(&self) -> DMatrix<f64> {
        DMatrix::identity(self.dimension, self.dimension)
    }

    fn covering_radius(&self) -> f64 {
        (self.dimension as f64).sqrt() / 2.0
    }

    fn nearest(&self, point: &[f64]) -> Vec<f64> {
        debug_assert_eq!(point.len(), self.dimension);
        point.iter().map(|&x| x.round()).collect()
    }

    fn covolume(&self) -> f64 {
        1.0
    }
}
