// Copyright (c) 2025-2026 brdigetrlol. All rights reserved.
// SPDX-License-Identifier: LicenseRef-Icarus-Proprietary
// See LICENSE in the repository root for full license terms.

//! Lattix mathematical foundations
//!
//! Covering lattices and the metric linear algebra used to place templates:
//! - Lattice families (hypercubic Z_n and the A_n* covering lattice) with
//!   exact closest-point decoders
//! - Unit-covering lower-triangular generators built from a family's basis
//! - Positive-definite parameter-space metrics with diagonal normalization,
//!   orthonormal bases and mismatch-ellipse bounding boxes

pub mod error;
pub mod lattice;
pub mod metric;

pub use error::{MathError, Result};
pub use lattice::{AnStarLattice, HypercubicLattice, Lattice, LatticeFamily, LatticeGenerator};
pub use metric::Metric;
