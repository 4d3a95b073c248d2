// Copyright (c) 2025-2026 brdigetrlol. All rights reserved.
// SPDX-License-Identifier: LicenseRef-Icarus-Proprietary
// See LICENSE in the repository root for full license terms.

//! Nearest-template lookup
//!
//! A trie over the tiled dimensions records, for every integer prefix, the
//! admissible integer range of the next dimension. The last level stores
//! the enumeration index of the first point in its row instead of
//! children. Lookup rounds a query to the closest lattice point, then walks
//! the trie clamping each integer into range, which both lands on a
//! template of the bank and yields its index.

use crate::error::{Result, TilingError};
use crate::tiling::LatticeTiling;
use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;
use tracing::trace;

/// Template nearest to a query point
#[derive(Debug, Clone, PartialEq)]
pub struct NearestPoint {
    pub point: DVector<f64>,
    /// Position of `point` in the enumeration order
    pub index: u64,
}

#[derive(Debug)]
pub(crate) struct LookupTree {
    root: Option<LookupNode>,
    points: u64,
}

#[derive(Debug)]
struct LookupNode {
    int_lower: i64,
    int_upper: i64,
    next: LookupNext,
}

#[derive(Debug)]
enum LookupNext {
    Children(Vec<LookupNode>),
    Row { first_index: u64 },
}

impl LookupTree {
    fn build(tiling: &LatticeTiling) -> Result<Self> {
        let mut ints = vec![0i64; tiling.dimensions()];
        let mut phys = tiling.origin_point();
        let mut next_index = 0u64;
        let root = match tiling.tiled_dims().first() {
            Some(_) => Some(Self::build_node(tiling, 0, &mut ints, &mut phys, &mut next_index)?),
            None => {
                next_index = 1;
                None
            }
        };
        trace!(points = next_index, "built lookup tree");
        Ok(Self {
            root,
            points: next_index,
        })
    }

    fn build_node(
        tiling: &LatticeTiling,
        level: usize,
        ints: &mut [i64],
        phys: &mut [f64],
        next_index: &mut u64,
    ) -> Result<LookupNode> {
        let dims = tiling.tiled_dims();
        let dim = dims[level];
        let (int_lower, int_upper) = tiling.int_range(dim, phys)?;

        let next = if level + 1 == dims.len() {
            let first_index = *next_index;
            *next_index += (int_upper - int_lower + 1) as u64;
            LookupNext::Row { first_index }
        } else {
            let mut children = Vec::with_capacity((int_upper - int_lower + 1) as usize);
            for k in int_lower..=int_upper {
                ints[dim] = k;
                phys[dim] = tiling.physical_coordinate(dim, ints);
                children.push(Self::build_node(tiling, level + 1, ints, phys, next_index)?);
            }
            LookupNext::Children(children)
        };

        Ok(LookupNode {
            int_lower,
            int_upper,
            next,
        })
    }

    /// Clamp `ints` onto the bank in place and return the index of the
    /// resulting template.
    fn locate(&self, dims: &[usize], ints: &mut [i64]) -> u64 {
        let mut node = match &self.root {
            Some(root) => root,
            None => return 0,
        };
        for &dim in dims {
            let k = ints[dim].clamp(node.int_lower, node.int_upper);
            ints[dim] = k;
            match &node.next {
                LookupNext::Children(children) => {
                    node = &children[(k - node.int_lower) as usize];
                }
                LookupNext::Row { first_index } => {
                    return first_index + (k - node.int_lower) as u64;
                }
            }
        }
        0
    }
}

impl LatticeTiling {
    /// Lookup tree, built on first use; a failed build is cached too.
    fn lookup_tree(&self) -> Result<&LookupTree> {
        self.lookup_cell()
            .get_or_init(|| LookupTree::build(self))
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Number of templates held by the lookup tree
    pub fn lookup_point_count(&self) -> Result<u64> {
        Ok(self.lookup_tree()?.points)
    }

    /// Template closest to `point` under the lattice norm, restricted to
    /// the bank, with its enumeration index.
    pub fn nearest_point(&self, point: &[f64]) -> Result<NearestPoint> {
        let n = self.dimensions();
        if point.len() != n {
            return Err(TilingError::InvalidDimension(format!(
                "query point has {} coordinates, expected {n}",
                point.len()
            )));
        }
        let tree = self.lookup_tree()?;
        let dims = self.tiled_dims();
        let origin = self.origin();

        let mut ints = vec![0i64; n];
        if let Some(generator) = self.lattice_generator() {
            let q = self.int_from_phys();
            let real: Vec<f64> = dims
                .iter()
                .map(|&i| {
                    dims.iter()
                        .take_while(|&&j| j <= i)
                        .map(|&j| q[(i, j)] * (point[j] - origin[j]))
                        .sum::<f64>()
                })
                .collect();
            for (&i, k) in dims.iter().zip(generator.nearest_integers(&real)) {
                ints[i] = k;
            }
        }

        let index = tree.locate(dims, &mut ints);
        let coords = DVector::from_fn(n, |i, _| self.physical_coordinate(i, &ints));
        Ok(NearestPoint {
            point: coords,
            index,
        })
    }

    /// Nearest templates for every column of `points`, computed in parallel.
    /// Returns the templates as columns alongside their indices.
    pub fn nearest_points(&self, points: &DMatrix<f64>) -> Result<(DMatrix<f64>, Vec<u64>)> {
        let n = self.dimensions();
        if points.nrows() != n {
            return Err(TilingError::InvalidDimension(format!(
                "query matrix has {} rows, expected {n}",
                points.nrows()
            )));
        }
        self.lookup_tree()?;
        if points.ncols() == 0 {
            return Ok((DMatrix::zeros(n, 0), Vec::new()));
        }

        let found: Vec<NearestPoint> = (0..points.ncols())
            .into_par_iter()
            .map(|c| {
                let query: Vec<f64> = points.column(c).iter().copied().collect();
                self.nearest_point(&query)
            })
            .collect::<Result<_>>()?;

        let indices = found.iter().map(|p| p.index).collect();
        let columns: Vec<DVector<f64>> = found.into_iter().map(|p| p.point).collect();
        Ok((DMatrix::from_columns(&columns), indices))
    }
}
