//! Spread profile: one spread value per resampled curve point, interpolated
//! from sparse waypoints.
//!
//! The work is split in three stages that can be used on their own:
//! 1. [`control_points`] sorts and merges waypoints and, for closed curves,
//!    wraps them into one extra period ([`periodic_control_points`]);
//! 2. [`SpreadProfile::fit`] fits an interpolating spline through them;
//! 3. [`SpreadProfile::sample`] evaluates the profile at evenly spaced
//!    arclength positions.

use bundle_core::{BundleError, Result, Tolerance, Waypoint, Waypoints};

use crate::curve::Curve;
use crate::spline::{Extrapolation, InterpolatingSpline};

/// Length of one period of the position axis, in percent.
pub const PERIOD: f64 = 100.0;

/// Closed profiles are sampled over `[SEAM_OFFSET, SEAM_OFFSET + PERIOD]` so
/// the seam falls in the middle of the fitted range.
pub const SEAM_OFFSET: f64 = 50.0;

/// Sorted, merged waypoints ready for fitting, with the effective spline order.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlPoints {
    pub points: Vec<Waypoint>,
    pub order: usize,
}

/// Build the control points a profile is fitted through.
///
/// The spline order is clamped to one less than the number of distinct
/// waypoint positions.
pub fn control_points(waypoints: &Waypoints, spline_order: usize, closed: bool) -> Result<ControlPoints> {
    if waypoints.is_empty() {
        return Err(BundleError::InvalidInput("at least one waypoint is required".into()));
    }
    if spline_order == 0 {
        return Err(BundleError::InvalidInput("spline order must be at least 1".into()));
    }
    if waypoints
        .iter()
        .any(|w| !w.position.is_finite() || !w.spread.is_finite())
    {
        return Err(BundleError::InvalidInput("waypoints must be finite".into()));
    }

    let merged = waypoints.sorted_merged(Tolerance::default());
    let order = spline_order.min(merged.len().saturating_sub(1));
    let points = if closed && merged.len() > 1 {
        periodic_control_points(&merged)
    } else {
        merged
    };
    let order = order.min(points.len().saturating_sub(1));

    Ok(ControlPoints { points, order })
}

/// Wrap sorted waypoints into two consecutive periods.
///
/// When the waypoints already cover a full period, the first and last ones
/// describe the same place on the curve: their spreads are averaged into
/// the first and the last is dropped before wrapping.
pub fn periodic_control_points(sorted: &[Waypoint]) -> Vec<Waypoint> {
    let mut base = sorted.to_vec();
    if let (Some(first), Some(last)) = (base.first().copied(), base.last().copied()) {
        if base.len() > 1 && first.position + PERIOD <= last.position {
            base[0].spread = 0.5 * (first.spread + last.spread);
            base.pop();
        }
    }
    let shifted: Vec<Waypoint> = base
        .iter()
        .map(|w| Waypoint::new(w.position + PERIOD, w.spread))
        .collect();
    base.extend(shifted);
    base
}

/// A fitted spread profile over the `[0, 100]` position axis.
#[derive(Debug, Clone)]
pub enum SpreadProfile {
    /// A single waypoint: the same spread everywhere.
    Constant(f64),
    Spline {
        spline: InterpolatingSpline,
        extrapolation: Extrapolation,
        closed: bool,
    },
}

impl SpreadProfile {
    pub fn fit(waypoints: &Waypoints, spline_order: usize, extrapolate: bool, closed: bool) -> Result<Self> {
        let control = control_points(waypoints, spline_order, closed)?;
        Self::from_control_points(&control, extrapolate, closed)
    }

    pub fn from_control_points(control: &ControlPoints, extrapolate: bool, closed: bool) -> Result<Self> {
        if control.points.len() == 1 || control.order == 0 {
            let spread = control
                .points
                .first()
                .map(|w| w.spread)
                .ok_or_else(|| BundleError::InvalidInput("no control points".into()))?;
            return Ok(Self::Constant(spread));
        }

        let x: Vec<f64> = control.points.iter().map(|w| w.position).collect();
        let y: Vec<f64> = control.points.iter().map(|w| w.spread).collect();
        let spline = InterpolatingSpline::fit(&x, &y, control.order)?;
        log::debug!(
            "Fitted spread spline: order {}, {} control points, closed={}",
            control.order,
            x.len(),
            closed
        );

        Ok(Self::Spline {
            spline,
            extrapolation: Extrapolation::from_flag(extrapolate),
            closed,
        })
    }

    /// Spread at each of `count` evenly spaced arclength positions.
    ///
    /// Open profiles map sample 0 to position 0 and the last sample to
    /// position 100. Closed profiles are evaluated across the seam and
    /// rotated so sample 0 again sits at position 0.
    pub fn sample(&self, count: usize) -> Vec<f64> {
        match self {
            Self::Constant(spread) => vec![*spread; count],
            Self::Spline {
                spline,
                extrapolation,
                closed: false,
            } => linspace(0.0, PERIOD, count)
                .map(|t| spline.evaluate(t, *extrapolation))
                .collect(),
            Self::Spline {
                spline,
                extrapolation,
                closed: true,
            } => {
                let mut values: Vec<f64> = linspace(SEAM_OFFSET, SEAM_OFFSET + PERIOD, count)
                    .map(|t| spline.evaluate(t, *extrapolation))
                    .collect();
                if count > 0 {
                    values.rotate_left(count.div_ceil(2) % count);
                }
                values
            }
        }
    }
}

fn linspace(start: f64, end: f64, count: usize) -> impl Iterator<Item = f64> {
    let step = if count > 1 {
        (end - start) / (count - 1) as f64
    } else {
        0.0
    };
    (0..count).map(move |i| start + step * i as f64)
}

/// Interpolate spreads given as parallel value/position lists.
pub fn interpolate(
    spread_values: &[f64],
    spread_positions: &[f64],
    spline_order: usize,
    extrapolate: bool,
    samples: usize,
    closed: bool,
) -> Result<Vec<f64>> {
    if spread_values.len() != spread_positions.len() {
        return Err(BundleError::InvalidInput(format!(
            "{} spread values but {} positions",
            spread_values.len(),
            spread_positions.len()
        )));
    }
    let waypoints: Waypoints = spread_positions
        .iter()
        .zip(spread_values)
        .map(|(&position, &spread)| Waypoint::new(position, spread))
        .collect::<Vec<_>>()
        .into();
    let profile = SpreadProfile::fit(&waypoints, spline_order, extrapolate, closed)?;
    Ok(profile.sample(samples))
}

/// Add a waypoint at the arclength position of one of the curve's control
/// points, returning the new waypoint's index.
pub fn insert_waypoint_at_control_point(
    waypoints: &mut Waypoints,
    curve: &dyn Curve,
    index: usize,
) -> Result<usize> {
    let position = curve.percent_at_point(index)?;
    waypoints.insert(position.clamp(0.0, PERIOD))
}
