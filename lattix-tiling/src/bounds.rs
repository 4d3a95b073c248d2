// Copyright (c) 2025-2026 brdigetrlol. All rights reserved.
// SPDX-License-Identifier: LicenseRef-Icarus-Proprietary
// See LICENSE in the repository root for full license terms.

//! Per-dimension parameter-space bounds
//!
//! A bound is either a constant interval or a pair of functions of the
//! coordinates in lower dimensions, evaluated with an opaque set of named
//! parameters. Bounds are closed: a point on either end is inside.

use std::fmt;
use std::sync::Arc;

/// Function of the lower-dimension prefix and the bound's parameters
pub type BoundFn = Arc<dyn Fn(&[f64], &BoundParams) -> f64 + Send + Sync>;

/// Named parameters handed to functional bounds
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundParams {
    values: Vec<(String, f64)>,
}

impl BoundParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a parameter, builder style.
    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: f64) {
        let name = name.into();
        match self.values.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.values.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, v)| *v)
    }

    /// Parameter value, or NaN when missing so the evaluation is rejected
    /// downstream.
    pub fn value(&self, name: &str) -> f64 {
        self.get(name).unwrap_or(f64::NAN)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(n, v)| (n.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Lower and upper bound functions sharing one parameter set
#[derive(Clone)]
pub struct FunctionalBound {
    lower: BoundFn,
    upper: BoundFn,
    params: BoundParams,
    dependencies: Vec<usize>,
}

impl FunctionalBound {
    /// `dependencies` lists the lower dimensions the functions read; they
    /// drive the extremal padding of the bound.
    pub fn new<L, U>(lower: L, upper: U, params: BoundParams, dependencies: impl Into<Vec<usize>>) -> Self
    where
        L: Fn(&[f64], &BoundParams) -> f64 + Send + Sync + 'static,
        U: Fn(&[f64], &BoundParams) -> f64 + Send + Sync + 'static,
    {
        let mut dependencies = dependencies.into();
        dependencies.sort_unstable();
        dependencies.dedup();
        Self {
            lower: Arc::new(lower),
            upper: Arc::new(upper),
            params,
            dependencies,
        }
    }

    pub fn evaluate(&self, prefix: &[f64]) -> (f64, f64) {
        (
            (self.lower)(prefix, &self.params),
            (self.upper)(prefix, &self.params),
        )
    }

    pub fn params(&self) -> &BoundParams {
        &self.params
    }

    pub fn dependencies(&self) -> &[usize] {
        &self.dependencies
    }
}

impl fmt::Debug for FunctionalBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionalBound")
            .field("params", &self.params)
            .field("dependencies", &self.dependencies)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub enum BoundSpec {
    Constant { lower: f64, upper: f64 },
    Functional(FunctionalBound),
}

impl BoundSpec {
    pub fn constant(lower: f64, upper: f64) -> Self {
        BoundSpec::Constant { lower, upper }
    }

    pub fn functional(bound: FunctionalBound) -> Self {
        BoundSpec::Functional(bound)
    }

    /// First spindown bounded by a characteristic age and a braking-index
    /// range: f1dot in [-f/((n_min-1) age), -f/((n_max-1) age)] with f read
    /// from `freq_dim`.
    pub fn f1dot_age_braking(freq_dim: usize, age: f64, min_braking: f64, max_braking: f64) -> Self {
        let params = BoundParams::new()
            .with("age", age)
            .with("min_braking", min_braking)
            .with("max_braking", max_braking);
        BoundSpec::Functional(FunctionalBound::new(
            move |x: &[f64], p: &BoundParams| {
                -x[freq_dim] / ((p.value("min_braking") - 1.0) * p.value("age"))
            },
            move |x: &[f64], p: &BoundParams| {
                -x[freq_dim] / ((p.value("max_braking") - 1.0) * p.value("age"))
            },
            params,
            vec![freq_dim],
        ))
    }

    /// Second spindown bounded by a braking-index range:
    /// f2dot in [n_min f1dot²/f, n_max f1dot²/f].
    pub fn f2dot_braking(freq_dim: usize, f1dot_dim: usize, min_braking: f64, max_braking: f64) -> Self {
        let params = BoundParams::new()
            .with("min_braking", min_braking)
            .with("max_braking", max_braking);
        BoundSpec::Functional(FunctionalBound::new(
            move |x: &[f64], p: &BoundParams| {
                p.value("min_braking") * x[f1dot_dim] * x[f1dot_dim] / x[freq_dim]
            },
            move |x: &[f64], p: &BoundParams| {
                p.value("max_braking") * x[f1dot_dim] * x[f1dot_dim] / x[freq_dim]
            },
            params,
            vec![freq_dim, f1dot_dim],
        ))
    }

    /// Raw (unpadded) interval for the given lower-dimension prefix.
    pub fn evaluate(&self, prefix: &[f64]) -> (f64, f64) {
        match self {
            BoundSpec::Constant { lower, upper } => (*lower, *upper),
            BoundSpec::Functional(bound) => bound.evaluate(prefix),
        }
    }

    /// Degenerate constant intervals pin their dimension to one value and
    /// take no part in the lattice.
    pub fn is_tiled(&self) -> bool {
        match self {
            BoundSpec::Constant { lower, upper } => lower != upper,
            BoundSpec::Functional(_) => true,
        }
    }

    pub fn dependencies(&self) -> &[usize] {
        match self {
            BoundSpec::Constant { .. } => &[],
            BoundSpec::Functional(bound) => bound.dependencies(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params() {
        let mut params = BoundParams::new().with("a", 1.0).with("b", 2.0);
        assert_eq!(params.get("a"), Some(1.0));
        assert_eq!(params.get("c"), None);
        assert!(params.value("c").is_nan());
        params.set("a", 5.0);
        assert_eq!(params.value("a"), 5.0);
        assert_eq!(params.len(), 2);
        let names: Vec<&str> = params.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_constant_bound() {
        let bound = BoundSpec::constant(-1.0, 2.0);
        assert_eq!(bound.evaluate(&[]), (-1.0, 2.0));
        assert!(bound.is_tiled());
        assert!(bound.dependencies().is_empty());
        assert!(!BoundSpec::constant(3.0, 3.0).is_tiled());
    }

    #[test]
    fn test_functional_bound() {
        let bound = FunctionalBound::new(
            |x: &[f64], p: &BoundParams| x[0] - p.value("w"),
            |x: &[f64], p: &BoundParams| x[0] + p.value("w"),
            BoundParams::new().with("w", 0.5),
            vec![0, 0],
        );
        assert_eq!(bound.dependencies(), &[0]);
        let spec = BoundSpec::functional(bound);
        assert!(spec.is_tiled());
        assert_eq!(spec.evaluate(&[2.0]), (1.5, 2.5));
    }

    #[test]
    fn test_f1dot_age_braking() {
        let bound = BoundSpec::f1dot_age_braking(0, 1.0e11, 2.0, 5.0);
        let (lower, upper) = bound.evaluate(&[100.0]);
        assert!((lower - -100.0 / 1.0e11).abs() < 1e-24);
        assert!((upper - -100.0 / 4.0e11).abs() < 1e-24);
        assert!(lower < upper);
        assert_eq!(bound.dependencies(), &[0]);
    }

    #[test]
    fn test_f2dot_braking() {
        let bound = BoundSpec::f2dot_braking(0, 1, 2.0, 5.0);
        let f1dot = -1.0e-9;
        let (lower, upper) = bound.evaluate(&[100.0, f1dot]);
        assert!((lower - 2.0 * f1dot * f1dot / 100.0).abs() < 1e-30);
        assert!((upper - 5.0 * f1dot * f1dot / 100.0).abs() < 1e-30);
        assert_eq!(bound.dependencies(), &[0, 1]);
    }
}
