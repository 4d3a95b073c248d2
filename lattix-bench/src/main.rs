// Copyright (c) 2025-2026 brdigetrlol. All rights reserved.
// SPDX-License-Identifier: LicenseRef-Icarus-Proprietary
// See LICENSE in the repository root for full license terms.

//! Lattix Template Bank Benchmarks and Validation
//!
//! Measures:
//! 1. Construction, counting and enumeration of Lehmer-metric hypercubes
//! 2. Lookup latency over every template, with index self-consistency
//! 3. Mismatch histograms for square frequency/spindown spaces
//! 4. Age and braking-index bounded spaces at 100, 200 and 300 Hz
//!
//! Set `RUST_LOG=debug` to trace construction and lookup.

use std::f64::consts::PI;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use lattix_tiling::{LatticeFamily, LatticeTiling, Metric, MismatchHistogram, ParameterSpace};

const MAX_MISMATCH: f64 = 0.3;
const HISTOGRAM_TOLERANCE: f64 = 0.05;
const INJECTIONS: usize = 200_000;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut failures = 0usize;

    println!("=== Lehmer Hypercubes ===\n");
    let expected = [(93, 93), (190, 144), (572, 295), (2408, 781)];
    for (n, &(cubic, anstar)) in (1..=4).zip(expected.iter()) {
        failures += bench_lehmer(n, LatticeFamily::Hypercubic, cubic)?;
        failures += bench_lehmer(n, LatticeFamily::AnStar, anstar)?;
    }
    println!();

    println!("=== Square Spindown Spaces ===\n");
    let t_span = 432000.0;
    let square: [(LatticeFamily, [(f64, f64); 3], u64); 6] = [
        (LatticeFamily::Hypercubic, [(100.0, 100.03), (0.0, 0.0), (0.0, 0.0)], 21460),
        (LatticeFamily::AnStar, [(100.0, 100.03), (0.0, 0.0), (0.0, 0.0)], 21460),
        (LatticeFamily::Hypercubic, [(100.0, 100.0 + 2.0e-4), (-2.0e-9, 0.0), (0.0, 0.0)], 23764),
        (LatticeFamily::AnStar, [(100.0, 100.0 + 2.0e-4), (-2.0e-9, 0.0), (0.0, 0.0)], 18283),
        (LatticeFamily::Hypercubic, [(100.0, 100.0 + 1.0e-4), (-1.0e-9, 0.0), (0.0, 1.0e-17)], 19590),
        (LatticeFamily::AnStar, [(100.0, 100.0 + 1.0e-4), (-2.0e-9, 0.0), (0.0, 2.0e-17)], 20268),
    ];
    for (seed, (family, bounds, expected)) in square.iter().enumerate() {
        let space = box_space(bounds)?;
        let tiling = LatticeTiling::new(space, *family, spindown_metric(t_span)?, MAX_MISMATCH)?;
        failures += bench_mismatch(&tiling, (*expected, 0), seed as u64, true)?;
    }
    println!();

    println!("=== Age / Braking-Index Spaces ===\n");
    let t_span = 1036800.0;
    for (seed, &(freq, band, expected)) in [(100.0, 4.0e-5, 40990), (200.0, 1.5e-5, 37227), (300.0, 1.0e-5, 37001)]
        .iter()
        .enumerate()
    {
        println!("[CPU] f = {freq} Hz, band {band:e} Hz");
        let tiling = LatticeTiling::new(
            age_braking_space(freq, band)?,
            LatticeFamily::AnStar,
            spindown_metric(t_span)?,
            MAX_MISMATCH,
        )?;
        // One template per thousand of slack: rows of one or two templates make
        // these counts sensitive to rounding
        failures += bench_mismatch(&tiling, (expected, expected / 1000), 100 + seed as u64, false)?;
    }
    println!();

    if failures > 0 {
        bail!("{failures} validation checks failed");
    }
    println!("=== All benchmarks complete ===");
    Ok(())
}

// ─── Fixtures ──────────────────────────────────

fn lehmer_metric(n: usize) -> Result<Metric> {
    Ok(Metric::from_fn(n, |i, j| {
        (i.min(j) + 1) as f64 / (i.max(j) + 1) as f64
    })?)
}

fn factorial(k: usize) -> f64 {
    (1..=k).map(|v| v as f64).product()
}

fn spindown_metric(t_span: f64) -> Result<Metric> {
    Ok(Metric::from_fn(3, |i, j| {
        let (a, b) = ((i + 1) as f64, (j + 1) as f64);
        4.0 * PI * PI * t_span.powi((i + j + 2) as i32) * a * b
            / (factorial(i + 1) * factorial(j + 1) * (a + 1.0) * (b + 1.0) * (i + j + 3) as f64)
    })?)
}

fn box_space(bounds: &[(f64, f64)]) -> Result<ParameterSpace> {
    let mut space = ParameterSpace::new(bounds.len())?;
    for (dim, &(lower, upper)) in bounds.iter().enumerate() {
        space.set_constant_bound(dim, lower, upper)?;
    }
    Ok(space)
}

fn age_braking_space(freq: f64, band: f64) -> Result<ParameterSpace> {
    let mut space = ParameterSpace::new(3)?;
    space.set_constant_bound(0, freq, freq + band)?;
    space.set_f1dot_age_braking_bound(0, 1, 1.0e11, 2.0, 5.0)?;
    space.set_f2dot_braking_bound(0, 1, 2, 2.0, 5.0)?;
    Ok(space)
}

// ─── Benchmarks ──────────────────────────────────

/// Time counting, enumeration and self-lookup; returns the number of
/// failed checks.
fn bench_lehmer(n: usize, family: LatticeFamily, expected: u64) -> Result<usize> {
    let upper = 100f64.powf(1.0 / n as f64);
    let space = box_space(&vec![(0.0, upper); n])?;

    info!(%family, dimensions = n, "lehmer case");
    let start = Instant::now();
    let tiling = LatticeTiling::new(space, family, lehmer_metric(n)?, MAX_MISMATCH)
        .with_context(|| format!("building {family} tiling in {n} dimensions"))?;
    let total = tiling.total_point_count()?;
    let count_time = start.elapsed();

    let bad = self_lookup_failures(&tiling)?;
    let status = if total == expected && bad == 0 { "ok" } else { "FAIL" };
    println!(
        "[CPU] {family} n={n}: {total} templates (expected {expected}), count {:.2}ms, {bad} bad indices [{status}]",
        count_time.as_secs_f64() * 1000.0,
    );
    Ok(usize::from(total != expected) + usize::from(bad != 0))
}

/// Enumerate every template and look each one up again.
fn self_lookup_failures(tiling: &LatticeTiling) -> Result<usize> {
    let start = Instant::now();
    let points = tiling.unique_points(tiling.dimensions() - 1)?;
    let mut bad = 0;
    for (i, col) in points.column_iter().enumerate() {
        let query: Vec<f64> = col.iter().copied().collect();
        if tiling.nearest_point(&query)?.index != i as u64 {
            bad += 1;
        }
    }
    let elapsed = start.elapsed();
    info!(
        points = points.ncols(),
        micros_per_lookup = elapsed.as_micros() as f64 / points.ncols().max(1) as f64,
        "self lookup"
    );
    Ok(bad)
}

/// Histogram the mismatch of random injections; returns the number of
/// failed checks.
fn bench_mismatch(
    tiling: &LatticeTiling,
    (expected, tolerance): (u64, u64),
    seed: u64,
    strict_covering: bool,
) -> Result<usize> {
    let family = tiling.family();
    let tiled = tiling.tiled_dimensions();
    let Some(reference) = MismatchHistogram::reference(family, tiled) else {
        println!("[CPU] {family} {tiled}D: no reference histogram, skipped");
        return Ok(0);
    };

    info!(%family, tiled, seed, strict_covering, "mismatch case");
    let total = tiling.total_point_count()?;
    let bad = self_lookup_failures(tiling)?;

    let mut rng = StdRng::seed_from_u64(seed);
    let start = Instant::now();
    let histogram = tiling.mismatch_histogram(&mut rng, INJECTIONS)?;
    let elapsed = start.elapsed();

    let error = histogram.error_against(reference);
    let covered = if strict_covering {
        histogram.overflow() == 0
    } else {
        histogram.overflow() * 1000 <= INJECTIONS as u64
    };
    let passed = total.abs_diff(expected) <= tolerance && error < HISTOGRAM_TOLERANCE && covered && bad == 0;
    println!(
        "[CPU] {family} {tiled}D: {total} templates (expected {expected}), {INJECTIONS} injections in {:.2}ms ({:.2}us/lookup), error {error:.4}, overflow {}, {bad} bad indices [{}]",
        elapsed.as_secs_f64() * 1000.0,
        elapsed.as_micros() as f64 / INJECTIONS as f64,
        histogram.overflow(),
        if passed { "ok" } else { "FAIL" },
    );
    Ok(usize::from(!passed))
}
