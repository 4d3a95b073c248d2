// Copyright (c) 2025-2026 brdigetrlol. All rights reserved.
// SPDX-License-Identifier: LicenseRef-Icarus-Proprietary
// See LICENSE in the repository root for full license terms.

//! Template enumeration
//!
//! Points come out in lexicographic order of their generating integers with
//! dimension 0 outermost, which is the order the lookup tree indexes.

use crate::error::Result;
use crate::tiling::LatticeTiling;
use nalgebra::{DMatrix, DVector};
use std::iter::FusedIterator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IterState {
    Fresh,
    Running,
    Done,
}

/// Iterator over the templates of a tiling, optionally distinguishing only
/// the dimensions up to a given one. Higher dimensions take the first point
/// of their range.
#[derive(Debug)]
pub struct PointIter<'a> {
    tiling: &'a LatticeTiling,
    up_to: usize,
    ints: Vec<i64>,
    upper: Vec<i64>,
    phys: Vec<f64>,
    state: IterState,
}

impl<'a> PointIter<'a> {
    pub(crate) fn new(tiling: &'a LatticeTiling, up_to: usize) -> Self {
        let n = tiling.dimensions();
        Self {
            tiling,
            up_to,
            ints: vec![0; n],
            upper: vec![0; n],
            phys: tiling.origin_point(),
            state: IterState::Fresh,
        }
    }

    /// Generating integers of the current point
    pub fn integers(&self) -> &[i64] {
        &self.ints
    }

    /// Reset every tiled dimension from `from` upwards to the start of its
    /// range.
    fn descend(&mut self, from: usize) -> Result<()> {
        for dim in from..self.tiling.dimensions() {
            if !self.tiling.is_tiled(dim) {
                continue;
            }
            let (lo, hi) = self.tiling.int_range(dim, &self.phys)?;
            self.ints[dim] = lo;
            self.upper[dim] = hi;
            self.phys[dim] = self.tiling.physical_coordinate(dim, &self.ints);
        }
        Ok(())
    }

    /// Advance the innermost iterated dimension that still has room.
    fn advance(&mut self) -> Option<usize> {
        (0..=self.up_to).rev().find(|&dim| {
            self.tiling.is_tiled(dim) && self.ints[dim] < self.upper[dim]
        })
    }

    fn emit(&mut self, from: usize) -> Option<Result<DVector<f64>>> {
        match self.descend(from) {
            Ok(()) => Some(Ok(DVector::from_column_slice(&self.phys))),
            Err(err) => {
                self.state = IterState::Done;
                Some(Err(err))
            }
        }
    }
}

impl Iterator for PointIter<'_> {
    type Item = Result<DVector<f64>>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.state {
            IterState::Done => None,
            IterState::Fresh => {
                self.state = IterState::Running;
                self.emit(0)
            }
            IterState::Running => match self.advance() {
                Some(dim) => {
                    self.ints[dim] += 1;
                    self.phys[dim] = self.tiling.physical_coordinate(dim, &self.ints);
                    self.emit(dim + 1)
                }
                None => {
                    self.state = IterState::Done;
                    None
                }
            },
        }
    }
}

impl FusedIterator for PointIter<'_> {}

impl LatticeTiling {
    /// Iterate over every template.
    pub fn points(&self) -> PointIter<'_> {
        PointIter::new(self, self.dimensions() - 1)
    }

    /// Iterate over templates distinct in dimensions `0..=up_to`.
    pub fn points_up_to(&self, up_to: usize) -> Result<PointIter<'_>> {
        self.check_up_to(up_to)?;
        Ok(PointIter::new(self, up_to))
    }

    /// Templates distinct in dimensions `0..=up_to`, one per column, in
    /// enumeration order.
    pub fn unique_points(&self, up_to: usize) -> Result<DMatrix<f64>> {
        let columns = self.points_up_to(up_to)?.collect::<Result<Vec<_>>>()?;
        if columns.is_empty() {
            return Ok(DMatrix::zeros(self.dimensions(), 0));
        }
        Ok(DMatrix::from_columns(&columns))
    }
}
