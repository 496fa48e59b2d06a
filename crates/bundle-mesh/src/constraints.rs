//! Geometric constraints applied to generated fibers.

use bundle_math::Point3;
use rayon::prelude::*;

use crate::bundle::FiberBundle;
use crate::surface::ImplicitSurface;

/// Trim a fiber to the part running from its first point inside `start` to
/// its last point inside `end`.
///
/// The forward scan stops at the first point with a negative signed distance
/// to `start`; the backward scan stops at the last point with a negative
/// signed distance to `end`. A scan that finds no such point collapses the
/// range to empty. Missing surfaces leave the corresponding end untouched.
pub fn trim_by_start_end<'a>(
    points: &'a [Point3],
    start: Option<&dyn ImplicitSurface>,
    end: Option<&dyn ImplicitSurface>,
) -> &'a [Point3] {
    let mut first = 0;
    let mut last = points.len();

    if let Some(surface) = start {
        while first != last && surface.signed_distance(points[first]) >= 0.0 {
            first += 1;
        }
    }
    if let Some(surface) = end {
        while last != first && surface.signed_distance(points[last - 1]) >= 0.0 {
            last -= 1;
        }
    }

    &points[first..last]
}

/// Keep fibers touching every `inside` surface, then drop fibers touching any
/// `outside` surface.
///
/// Each inside surface retains fibers with at least one point strictly
/// inside; each outside surface then retains only fibers whose points are
/// all strictly outside. Surfaces are applied one after another, each to the
/// result of the previous one.
pub fn filter_inside_outside(
    bundle: &mut FiberBundle,
    inside: &[&dyn ImplicitSurface],
    outside: &[&dyn ImplicitSurface],
) {
    let before = bundle.fiber_count();

    for surface in inside {
        let keep = classify(bundle, |p| surface.signed_distance(p) < 0.0, false);
        bundle.retain_fibers(&keep);
    }
    for surface in outside {
        let keep = classify(bundle, |p| surface.signed_distance(p) <= 0.0, true);
        bundle.retain_fibers(&keep);
    }

    if !inside.is_empty() || !outside.is_empty() {
        log::debug!(
            "Inside/outside filtering kept {} of {} fibers ({} inside, {} outside surfaces)",
            bundle.fiber_count(),
            before,
            inside.len(),
            outside.len()
        );
    }
}

/// Per-fiber keep flags: whether any point satisfies `hit`, negated when
/// `reject_on_hit` is set.
fn classify<F>(bundle: &FiberBundle, hit: F, reject_on_hit: bool) -> Vec<bool>
where
    F: Fn(Point3) -> bool + Sync,
{
    bundle
        .lines
        .par_iter()
        .map(|line| {
            let touched = line.iter().any(|&i| hit(bundle.positions[i as usize]));
            touched != reject_on_hit
        })
        .collect()
}
