// Copyright (c) 2025-2026 brdigetrlol. All rights reserved.
// SPDX-License-Identifier: LicenseRef-Icarus-Proprietary
// See LICENSE in the repository root for full license terms.

//! Tiling configuration
//!
//! Lattice family and maximum mismatch, serializable so that a template
//! bank can be regenerated from a stored configuration.

use crate::error::{Result, TilingError};
use lattix_math::LatticeFamily;
use serde::{Deserialize, Serialize};

/// Mismatch used by the presets when none is given
pub const DEFAULT_MAX_MISMATCH: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TilingConfig {
    /// Lattice family used to place templates
    pub lattice: LatticeFamily,
    /// Largest metric mismatch allowed between any point and its nearest
    /// template
    pub max_mismatch: f64,
}

impl TilingConfig {
    /// Hypercubic lattice
    pub fn cubic(max_mismatch: f64) -> Self {
        Self {
            lattice: LatticeFamily::Hypercubic,
            max_mismatch,
        }
    }

    /// A_n* lattice, the thinnest covering in up to five tiled dimensions
    pub fn anstar(max_mismatch: f64) -> Self {
        Self {
            lattice: LatticeFamily::AnStar,
            max_mismatch,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.max_mismatch > 0.0 && self.max_mismatch.is_finite()) {
            return Err(TilingError::InvalidMismatch(self.max_mismatch));
        }
        Ok(())
    }
}

impl Default for TilingConfig {
    fn default() -> Self {
        Self::anstar(DEFAULT_MAX_MISMATCH)
    }
}
