// Copyright (c) 2025-2026 brdigetrlol. All rights reserved.
// SPDX-License-Identifier: LicenseRef-Icarus-Proprietary
// See LICENSE in the repository root for full license terms.

//! Covering lattices for template placement
//!
//! Two families are supported:
//! - Hypercubic (Z_n): the integer grid, decoded by rounding
//! - A_n*: dual of the root lattice A_n, the thinnest known covering in
//!   low dimensions, decoded by searching the n+1 cosets of A_n
//!
//! Each family is described in its native embedding space by a basis whose
//! columns generate the lattice, plus its covering radius. [`LatticeGenerator`]
//! turns that description into a square lower-triangular generator with unit
//! covering radius.

pub mod anstar;
pub mod generator;
pub mod hypercubic;

pub use anstar::AnStarLattice;
pub use generator::LatticeGenerator;
pub use hypercubic::HypercubicLattice;

use crate::error::{MathError, Result};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lattice family used to tile a parameter space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LatticeFamily {
    /// Z_n, the hypercubic lattice
    Hypercubic,
    /// A_n*, the optimal covering lattice for n <= 5
    AnStar,
}

impl LatticeFamily {
    pub const ALL: [LatticeFamily; 2] = [LatticeFamily::Hypercubic, LatticeFamily::AnStar];

    /// Map a numeric family tag (0 = hypercubic, 1 = A_n*).
    pub fn from_tag(tag: u32) -> Result<Self> {
        match tag {
            0 => Ok(LatticeFamily::Hypercubic),
            1 => Ok(LatticeFamily::AnStar),
            other => Err(MathError::UnsupportedLattice(format!("tag {other}"))),
        }
    }

    pub fn tag(self) -> u32 {
        match self {
            LatticeFamily::Hypercubic => 0,
            LatticeFamily::AnStar => 1,
        }
    }

    /// Instantiate the family in `dimension` dimensions.
    pub fn build(self, dimension: usize) -> Result<Box<dyn Lattice>> {
        let lattice: Box<dyn Lattice> = match self {
            LatticeFamily::Hypercubic => Box::new(HypercubicLattice::new(dimension)?),
            LatticeFamily::AnStar => Box::new(AnStarLattice::new(dimension)?),
        };
        Ok(lattice)
    }
}

impl fmt::Display for LatticeFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LatticeFamily::Hypercubic => write!(f, "Zn"),
            LatticeFamily::AnStar => write!(f, "An*"),
        }
    }
}

impl FromStr for LatticeFamily {
    type Err = MathError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zn" | "z" | "cubic" | "hypercubic" => Ok(LatticeFamily::Hypercubic),
            "an*" | "ans" | "anstar" | "an-star" => Ok(LatticeFamily::AnStar),
            _ => Err(MathError::UnsupportedLattice(s.to_string())),
        }
    }
}

/// A lattice in its native embedding space.
///
/// The embedding dimension may exceed the lattice dimension (A_n* lives in
/// the sum-zero hyperplane of R^{n+1}).
pub trait Lattice: Send + Sync + fmt::Debug {
    /// Lattice dimension n
    fn dimension(&self) -> usize;

    /// Dimension of the space the basis vectors live in
    fn embedding_dimension(&self) -> usize;

    fn family(&self) -> LatticeFamily;

    /// Generator with one lattice basis vector per column
    /// (`embedding_dimension` x `dimension`)
    fn basis(&self) -> DMatrix<f64>;

    /// Covering radius of the lattice generated by [`Lattice::basis`]
    fn covering_radius(&self) -> f64;

    /// Closest lattice point to `point` (embedding coordinates) under the
    /// Euclidean norm
    fn nearest(&self, point: &[f64]) -> Vec<f64>;

    /// Volume of the fundamental cell
    fn covolume(&self) -> f64 {
        let basis = self.basis();
        (basis.transpose() * &basis).determinant().sqrt()
    }

    /// Covering radius to the power n divided by the covolume
    fn normalized_thickness(&self) -> f64 {
        self.covering_radius().powi(self.dimension() as i32) / self.covolume()
    }

    /// Squared Euclidean distance between two embedding-space points
    fn distance_sq(&self, a: &[f64], b: &[f64]) -> f64 {
        debug_assert_eq!(a.len(), b.len());
        a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
    }
}
