// Copyright (c) 2025-2026 brdigetrlol. All rights reserved.
// SPDX-License-Identifier: LicenseRef-Icarus-Proprietary
// See LICENSE in the repository root for full license terms.

//! Mismatch histograms
//!
//! Injects random points, finds their nearest templates and bins the
//! normalized mismatch μ/μ_max over [0, 1] into twenty bins plus an overflow
//! bin. The shape of the distribution is a fingerprint of the lattice: for
//! a tiling large enough that edges are negligible it converges to the
//! distribution of the infinite lattice.

use crate::error::Result;
use crate::tiling::LatticeTiling;
use lattix_math::LatticeFamily;
use rand::Rng;
use tracing::debug;

pub const MISMATCH_HISTOGRAM_BINS: usize = 20;

/// Injections handed to one parallel nearest-point batch
const INJECTION_BATCH: usize = 4096;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MismatchHistogram {
    counts: [u64; MISMATCH_HISTOGRAM_BINS + 1],
}

impl MismatchHistogram {
    pub fn new() -> Self {
        Self {
            counts: [0; MISMATCH_HISTOGRAM_BINS + 1],
        }
    }

    /// Record one normalized mismatch. Values outside [0, 1) go to the
    /// overflow bin.
    pub fn add(&mut self, normalized_mismatch: f64) {
        let bin = if (0.0..=1.0).contains(&normalized_mismatch) {
            ((normalized_mismatch * MISMATCH_HISTOGRAM_BINS as f64).floor() as usize)
                .min(MISMATCH_HISTOGRAM_BINS)
        } else {
            MISMATCH_HISTOGRAM_BINS
        };
        self.counts[bin] += 1;
    }

    pub fn merge(&mut self, other: &MismatchHistogram) {
        for (a, b) in self.counts.iter_mut().zip(other.counts.iter()) {
            *a += b;
        }
    }

    pub fn counts(&self) -> &[u64; MISMATCH_HISTOGRAM_BINS + 1] {
        &self.counts
    }

    pub fn overflow(&self) -> u64 {
        self.counts[MISMATCH_HISTOGRAM_BINS]
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Bin counts scaled to a probability density over [0, 1].
    pub fn normalized(&self) -> [f64; MISMATCH_HISTOGRAM_BINS + 1] {
        let total = self.total().max(1) as f64;
        let mut out = [0.0; MISMATCH_HISTOGRAM_BINS + 1];
        for (o, &c) in out.iter_mut().zip(self.counts.iter()) {
            *o = c as f64 * MISMATCH_HISTOGRAM_BINS as f64 / total;
        }
        out
    }

    /// Mean absolute difference between the normalized histogram and a
    /// reference density.
    pub fn error_against(&self, reference: &[f64; MISMATCH_HISTOGRAM_BINS + 1]) -> f64 {
        let normalized = self.normalized();
        normalized
            .iter()
            .zip(reference.iter())
            .map(|(a, b)| (a - b).abs())
            .sum::<f64>()
            / (MISMATCH_HISTOGRAM_BINS + 1) as f64
    }

    /// Normalized mismatch density of an infinite lattice, where known.
    pub fn reference(family: LatticeFamily, tiled_dimensions: usize) -> Option<&'static [f64; MISMATCH_HISTOGRAM_BINS + 1]> {
        match (family, tiled_dimensions) {
            (_, 1) => Some(&ONE_DIMENSIONAL_REFERENCE),
            (LatticeFamily::Hypercubic, 2) => Some(&CUBIC_2D_REFERENCE),
            (LatticeFamily::Hypercubic, 3) => Some(&CUBIC_3D_REFERENCE),
            (LatticeFamily::AnStar, 2) => Some(&ANSTAR_2D_REFERENCE),
            (LatticeFamily::AnStar, 3) => Some(&ANSTAR_3D_REFERENCE),
            _ => None,
        }
    }
}

impl Default for MismatchHistogram {
    fn default() -> Self {
        Self::new()
    }
}

impl LatticeTiling {
    /// Histogram of normalized mismatch between `injections` random points
    /// of the space and their nearest templates.
    pub fn mismatch_histogram<R: Rng + ?Sized>(&self, rng: &mut R, injections: usize) -> Result<MismatchHistogram> {
        let mut histogram = MismatchHistogram::new();
        let mut remaining = injections;
        while remaining > 0 {
            let batch = remaining.min(INJECTION_BATCH);
            let injected = self.random_points(rng, batch)?;
            let (nearest, _) = self.nearest_points(&injected)?;
            let mut dx = vec![0.0; self.dimensions()];
            for c in 0..batch {
                for (i, d) in dx.iter_mut().enumerate() {
                    *d = injected[(i, c)] - nearest[(i, c)];
                }
                histogram.add(self.metric().mismatch(&dx) / self.max_mismatch());
            }
            remaining -= batch;
        }
        debug!(
            injections,
            overflow = histogram.overflow(),
            "computed mismatch histogram"
        );
        Ok(histogram)
    }
}

const ONE_DIMENSIONAL_REFERENCE: [f64; MISMATCH_HISTOGRAM_BINS + 1] = [
    4.531107, 1.870257, 1.430467, 1.202537, 1.057047, 0.953084, 0.875050, 0.813050, 0.762368,
    0.719968, 0.683877, 0.652659, 0.625394, 0.601300, 0.579724, 0.560515, 0.542944, 0.527142,
    0.512487, 0.499022, 0.0,
];

const CUBIC_2D_REFERENCE: [f64; MISMATCH_HISTOGRAM_BINS + 1] = [
    1.570963, 1.571131, 1.571074, 1.571102, 1.570808, 1.570789, 1.570617, 1.570716, 1.570671,
    1.570867, 1.157132, 0.835785, 0.645424, 0.503305, 0.389690, 0.295014, 0.214022, 0.143584,
    0.081427, 0.025878, 0.0,
];

const CUBIC_3D_REFERENCE: [f64; MISMATCH_HISTOGRAM_BINS + 1] = [
    0.608404, 1.112392, 1.440652, 1.705502, 1.934785, 2.139464, 2.296868, 2.071379, 1.748278,
    1.443955, 1.155064, 0.879719, 0.616210, 0.375368, 0.223752, 0.131196, 0.071216, 0.033130,
    0.011178, 0.001489, 0.0,
];

const ANSTAR_2D_REFERENCE: [f64; MISMATCH_HISTOGRAM_BINS + 1] = [
    1.210152, 1.210142, 1.209837, 1.209697, 1.209368, 1.209214, 1.209399, 1.209170, 1.208805,
    1.208681, 1.208631, 1.208914, 1.208775, 1.209021, 1.208797, 0.816672, 0.505394, 0.315665,
    0.170942, 0.052727, 0.0,
];

const ANSTAR_3D_REFERENCE: [f64; MISMATCH_HISTOGRAM_BINS + 1] = [
    0.327328, 0.598545, 0.774909, 0.917710, 1.040699, 1.150991, 1.250963, 1.344026, 1.431020,
    1.512883, 1.590473, 1.664510, 1.595423, 1.391209, 1.194340, 1.004085, 0.729054, 0.371869,
    0.098727, 0.011236, 0.0,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binning() {
        let mut h = MismatchHistogram::new();
        h.add(0.0);
        h.add(0.049);
        h.add(0.05);
        h.add(0.999);
        h.add(1.0);
        h.add(1.5);
        h.add(-0.1);
        h.add(f64::NAN);
        assert_eq!(h.counts()[0], 2);
        assert_eq!(h.counts()[1], 1);
        assert_eq!(h.counts()[19], 1);
        assert_eq!(h.overflow(), 4);
        assert_eq!(h.total(), 8);
    }

    #[test]
    fn test_normalized_integrates_to_one() {
        let mut h = MismatchHistogram::new();
        for i in 0..1000 {
            h.add(i as f64 / 1000.0);
        }
        let density = h.normalized();
        let integral: f64 = density[..MISMATCH_HISTOGRAM_BINS].iter().sum::<f64>()
            / MISMATCH_HISTOGRAM_BINS as f64;
        assert!((integral - 1.0).abs() < 1e-12);
        assert!(density.iter().take(MISMATCH_HISTOGRAM_BINS).all(|&d| (d - 1.0).abs() < 1e-12));
    }

    #[test]
    fn test_error_against_self_is_zero() {
        let mut h = MismatchHistogram::new();
        for i in 0..200 {
            h.add((i % 20) as f64 / 20.0 + 0.01);
        }
        let density = h.normalized();
        assert!(h.error_against(&density).abs() < 1e-15);
    }

    #[test]
    fn test_merge() {
        let mut a = MismatchHistogram::new();
        let mut b = MismatchHistogram::new();
        a.add(0.1);
        b.add(0.1);
        b.add(2.0);
        a.merge(&b);
        assert_eq!(a.counts()[2], 2);
        assert_eq!(a.overflow(), 1);
    }

    #[test]
    fn test_references_are_densities() {
        for family in LatticeFamily::ALL {
            for n in 1..=3 {
                let reference = MismatchHistogram::reference(family, n).unwrap();
                let integral: f64 = reference.iter().sum::<f64>() / MISMATCH_HISTOGRAM_BINS as f64;
                assert!((integral - 1.0).abs() < 1e-3, "{family} n={n}: {integral}");
                assert_eq!(reference[MISMATCH_HISTOGRAM_BINS], 0.0);
            }
        }
        assert!(MismatchHistogram::reference(LatticeFamily::AnStar, 4).is_none());
    }
}
