//! Per-fiber random sampling: displacement fields and between-curve blends.

use std::f64::consts::TAU;

use bundle_core::SampleKind;
use bundle_math::{dvec3, Point3, Vector3};
use rand::Rng;
use rand_distr::StandardNormal;

/// Random direction shared by every point of one fiber.
fn sample_direction<R: Rng + ?Sized>(rng: &mut R, kind: SampleKind) -> Vector3 {
    match kind {
        SampleKind::Uniform => dvec3(
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
        ),
        SampleKind::Normal => dvec3(
            rng.sample(StandardNormal),
            rng.sample(StandardNormal),
            rng.sample(StandardNormal),
        ),
    }
}

/// Displacement of every point of one fiber.
///
/// One random direction is drawn per fiber and modulated along it by
/// `sin(phase + 2π · sine_cycles · s)`, with `s` running from 0 at the first
/// point to 1 at the last and a random phase in `[0, 2π)`. Each point is
/// further scaled by its spread. Only the first `count` spreads are used;
/// missing spreads count as zero.
pub fn sample_displacement<R: Rng + ?Sized>(
    rng: &mut R,
    kind: SampleKind,
    sine_cycles: f64,
    spreads: &[f64],
    count: usize,
) -> Vec<Vector3> {
    let direction = sample_direction(rng, kind);
    let phase = rng.random_range(0.0..TAU);
    let last = count.saturating_sub(1).max(1) as f64;

    (0..count)
        .map(|i| {
            let s = i as f64 / last;
            let sine = (phase + TAU * sine_cycles * s).sin();
            let spread = spreads.get(i).copied().unwrap_or(0.0);
            direction * (spread * sine)
        })
        .collect()
}

/// Points on the straight blend from `from` towards `to`, at one random
/// fraction in `[0, 1)` shared by every point pair.
///
/// The output has as many points as the shorter input.
pub fn sample_between<R: Rng + ?Sized>(rng: &mut R, from: &[Point3], to: &[Point3]) -> Vec<Point3> {
    let fraction: f64 = rng.random_range(0.0..1.0);
    from.iter()
        .zip(to.iter())
        .map(|(&a, &b)| a + (b - a) * fraction)
        .collect()
}
