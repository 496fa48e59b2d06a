//! Bundle assembly: resample the centerline, sample every fiber, apply
//! constraints and hand the polyline mesh to a sink.

use bundle_core::traits::Validate;
use bundle_core::{BundleError, BundleParams, Result, Tolerance};
use bundle_geometry::{Curve, Polyline, SpreadProfile};
use bundle_math::Point3;
use bundle_mesh::{filter_inside_outside, trim_by_start_end, FiberBundle, ImplicitSurface};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::sampler::{sample_between, sample_displacement};

/// Receiver of a generated bundle.
pub trait BundleSink {
    fn accept(&mut self, bundle: FiberBundle);
}

impl BundleSink for FiberBundle {
    fn accept(&mut self, bundle: FiberBundle) {
        *self = bundle;
    }
}

impl BundleSink for Vec<FiberBundle> {
    fn accept(&mut self, bundle: FiberBundle) {
        self.push(bundle);
    }
}

/// Geometric inputs of one generation run, borrowed for its duration.
#[derive(Default, Clone)]
pub struct BundleInputs<'a> {
    pub centerline: Option<&'a dyn Curve>,
    /// Fibers start on a random blend between this curve and the centerline.
    pub between: Option<&'a dyn Curve>,
    /// Fibers begin at their first point inside this surface.
    pub start: Option<&'a dyn ImplicitSurface>,
    /// Fibers end at their last point inside this surface.
    pub end: Option<&'a dyn ImplicitSurface>,
    pub inside: Vec<&'a dyn ImplicitSurface>,
    pub outside: Vec<&'a dyn ImplicitSurface>,
}

impl<'a> BundleInputs<'a> {
    pub fn new(centerline: &'a dyn Curve) -> Self {
        Self {
            centerline: Some(centerline),
            ..Self::default()
        }
    }

    pub fn with_between(mut self, curve: &'a dyn Curve) -> Self {
        self.between = Some(curve);
        self
    }

    pub fn with_start(mut self, surface: &'a dyn ImplicitSurface) -> Self {
        self.start = Some(surface);
        self
    }

    pub fn with_end(mut self, surface: &'a dyn ImplicitSurface) -> Self {
        self.end = Some(surface);
        self
    }

    pub fn with_inside(mut self, surface: &'a dyn ImplicitSurface) -> Self {
        self.inside.push(surface);
        self
    }

    pub fn with_outside(mut self, surface: &'a dyn ImplicitSurface) -> Self {
        self.outside.push(surface);
        self
    }
}

/// Generate a bundle from `inputs` and pass it to `sink`, returning the
/// number of fibers produced.
///
/// Fails without touching the sink when the centerline or the sink is
/// missing.
pub fn process(
    inputs: &BundleInputs<'_>,
    params: &BundleParams,
    sink: Option<&mut dyn BundleSink>,
) -> Result<usize> {
    let sink = sink.ok_or_else(|| BundleError::InvalidInput("no output bundle given".into()))?;
    let bundle = generate(inputs, params)?;
    let count = bundle.fiber_count();
    sink.accept(bundle);
    Ok(count)
}

/// Generate the fiber bundle described by `inputs` and `params`.
pub fn generate(inputs: &BundleInputs<'_>, params: &BundleParams) -> Result<FiberBundle> {
    let centerline = inputs
        .centerline
        .ok_or_else(|| BundleError::InvalidInput("no centerline curve given".into()))?;
    params.validate()?;
    check_centerline(centerline)?;

    let closed = centerline.is_closed();
    let resampled = centerline.resample(params.resample_spacing)?;
    let count = resampled.len();

    let between = inputs
        .between
        .map(|curve| resample_between(curve, closed, count))
        .transpose()?;

    let spreads = SpreadProfile::fit(&params.waypoints, params.spline_order, params.extrapolate, closed)?
        .sample(count);

    let seed = params.seed.unwrap_or_else(rand::random);
    let mut master = StdRng::seed_from_u64(seed);
    let fiber_seeds: Vec<u64> = (0..params.fiber_count).map(|_| master.random()).collect();
    log::debug!(
        "Generating {} fibers over {} centerline points (seed {})",
        params.fiber_count,
        count,
        seed
    );

    let fibers: Vec<Option<Vec<Point3>>> = fiber_seeds
        .par_iter()
        .map(|&fiber_seed| {
            let mut rng = StdRng::seed_from_u64(fiber_seed);
            let displacements =
                sample_displacement(&mut rng, params.sample_kind, params.sine_cycles, &spreads, count);
            let base = match &between {
                Some(points) => sample_between(&mut rng, points, &resampled.points),
                None => resampled.points.clone(),
            };
            let displaced: Vec<Point3> = base
                .iter()
                .zip(&displacements)
                .map(|(&p, &d)| p + d)
                .collect();

            let kept = trim_by_start_end(&displaced, inputs.start, inputs.end);
            (kept.len() >= 2).then(|| kept.to_vec())
        })
        .collect();

    let mut bundle = FiberBundle::new();
    for points in fibers.iter().flatten() {
        bundle.add_fiber(points, closed);
    }
    let trimmed = bundle.fiber_count();

    filter_inside_outside(&mut bundle, &inputs.inside, &inputs.outside);

    log::info!(
        "Generated {} of {} fibers ({} after start/end trimming, {} points)",
        bundle.fiber_count(),
        params.fiber_count,
        trimmed,
        bundle.point_count()
    );
    Ok(bundle)
}

fn check_centerline(curve: &dyn Curve) -> Result<()> {
    let n = curve.points().len();
    if n < 2 {
        return Err(BundleError::InvalidInput(format!(
            "centerline needs at least 2 points, got {}",
            n
        )));
    }
    let length = curve.length();
    if Tolerance::default().is_zero(length) || !length.is_finite() {
        return Err(BundleError::InvalidInput(format!(
            "centerline length {} is degenerate",
            length
        )));
    }
    Ok(())
}

/// Points of `curve` resampled to `count` points, treating it as closed
/// whenever the centerline is.
fn resample_between(curve: &dyn Curve, closed: bool, count: usize) -> Result<Vec<Point3>> {
    let polyline = Polyline {
        points: curve.points().to_vec(),
        closed,
    };
    Ok(polyline.resample_to_count(count)?.points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bundle_core::{SampleKind, Waypoint, Waypoints};
    use bundle_math::dvec3;
    use bundle_mesh::SphereSurface;

    fn straight_line() -> Polyline {
        Polyline::open(vec![dvec3(0.0, 0.0, 0.0), dvec3(100.0, 0.0, 0.0)])
    }

    fn seeded(fibers: usize) -> BundleParams {
        BundleParams {
            fiber_count: fibers,
            seed: Some(42),
            ..BundleParams::default()
        }
    }

    #[test]
    fn test_generates_requested_fibers() {
        let line = straight_line();
        let bundle = generate(&BundleInputs::new(&line), &seeded(12)).unwrap();
        assert_eq!(bundle.fiber_count(), 12);
        assert_eq!(bundle.point_count(), 12 * 101);
        assert!(bundle.lines.iter().all(|l| l.len() == 101));
    }

    #[test]
    fn test_missing_centerline_or_sink_is_invalid_input() {
        let params = seeded(3);
        let err = generate(&BundleInputs::default(), &params).unwrap_err();
        assert!(matches!(err, BundleError::InvalidInput(_)));

        let line = straight_line();
        let err = process(&BundleInputs::new(&line), &params, None).unwrap_err();
        assert!(matches!(err, BundleError::InvalidInput(_)));
    }

    #[test]
    fn test_degenerate_centerline_rejected() {
        let point = Polyline::open(vec![dvec3(1.0, 1.0, 1.0)]);
        let err = generate(&BundleInputs::new(&point), &seeded(3)).unwrap_err();
        assert!(matches!(err, BundleError::InvalidInput(_)));

        let collapsed = Polyline::open(vec![dvec3(1.0, 1.0, 1.0); 4]);
        let err = generate(&BundleInputs::new(&collapsed), &seeded(3)).unwrap_err();
        assert!(matches!(err, BundleError::InvalidInput(_)));
    }

    #[test]
    fn test_invalid_params_rejected() {
        let line = straight_line();
        let params = BundleParams {
            spline_order: 0,
            ..seeded(3)
        };
        assert!(generate(&BundleInputs::new(&line), &params).is_err());
    }

    #[test]
    fn test_process_fills_sink() {
        let line = straight_line();
        let mut out = FiberBundle::new();
        let n = process(&BundleInputs::new(&line), &seeded(4), Some(&mut out)).unwrap();
        assert_eq!(n, 4);
        assert_eq!(out.fiber_count(), 4);
    }

    #[test]
    fn test_start_surface_outside_curve_drops_every_fiber() {
        let line = straight_line();
        let far = SphereSurface::new(dvec3(0.0, 500.0, 0.0), 1.0);
        let inputs = BundleInputs::new(&line).with_start(&far);
        let bundle = generate(&inputs, &seeded(6)).unwrap();
        assert!(bundle.is_empty());
    }

    #[test]
    fn test_zero_spread_follows_centerline() {
        let line = straight_line();
        let params = BundleParams {
            waypoints: Waypoints::new(vec![Waypoint::new(50.0, 0.0)]),
            sample_kind: SampleKind::Uniform,
            ..seeded(2)
        };
        let bundle = generate(&BundleInputs::new(&line), &params).unwrap();
        for p in &bundle.positions {
            assert!(p.y.abs() < 1e-12 && p.z.abs() < 1e-12);
        }
    }
}
