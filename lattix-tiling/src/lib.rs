// Copyright (c) 2025-2026 brdigetrlol. All rights reserved.
// SPDX-License-Identifier: LicenseRef-Icarus-Proprietary
// See LICENSE in the repository root for full license terms.

//! Lattice template banks
//!
//! Covers a bounded parameter space with a lattice of templates so that every
//! point is within a given metric mismatch of some template, then counts,
//! enumerates and searches that bank.

pub mod bounds;
pub mod config;
pub mod error;
pub mod histogram;
pub mod iter;
pub mod lookup;
pub mod sampling;
pub mod space;
pub mod tiling;

pub use bounds::{BoundFn, BoundParams, BoundSpec, FunctionalBound};
pub use config::{TilingConfig, DEFAULT_MAX_MISMATCH};
pub use error::{Result, TilingError};
pub use histogram::{MismatchHistogram, MISMATCH_HISTOGRAM_BINS};
pub use iter::PointIter;
pub use lookup::NearestPoint;
pub use space::ParameterSpace;
pub use tiling::LatticeTiling;

pub use lattix_math::{LatticeFamily, Metric};
