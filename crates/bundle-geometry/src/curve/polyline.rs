use bundle_core::{BundleError, Result, Tolerance};
use bundle_math::Point3;
use serde::{Deserialize, Serialize};

use super::Curve;

/// Smallest number of points a resampled closed curve keeps.
const MIN_CLOSED_POINTS: usize = 3;

/// A piecewise-linear curve through its points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    pub points: Vec<Point3>,
    #[serde(default)]
    pub closed: bool,
}

impl Polyline {
    pub fn open(points: Vec<Point3>) -> Self {
        Self {
            points,
            closed: false,
        }
    }

    pub fn closed(points: Vec<Point3>) -> Self {
        Self {
            points,
            closed: true,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl Curve for Polyline {
    fn points(&self) -> &[Point3] {
        &self.points
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

/// Running arclength at every point; closed curves get one extra entry for
/// the closing segment back to the first point.
pub(crate) fn cumulative_lengths(points: &[Point3], closed: bool) -> Vec<f64> {
    if points.is_empty() {
        return Vec::new();
    }
    let mut lengths = Vec::with_capacity(points.len() + 1);
    let mut total = 0.0;
    lengths.push(total);
    for pair in points.windows(2) {
        total += pair[0].distance(pair[1]);
        lengths.push(total);
    }
    if closed && points.len() > 1 {
        total += points[points.len() - 1].distance(points[0]);
        lengths.push(total);
    }
    lengths
}

pub(crate) fn percent_at_point(points: &[Point3], closed: bool, index: usize) -> Result<f64> {
    if index >= points.len() {
        return Err(BundleError::InvalidInput(format!(
            "control point index {} out of range ({} points)",
            index,
            points.len()
        )));
    }
    let cumulative = validated_lengths(points, closed)?;
    let total = cumulative[cumulative.len() - 1];
    Ok(cumulative[index] / total * 100.0)
}

fn validated_lengths(points: &[Point3], closed: bool) -> Result<Vec<f64>> {
    if points.len() < 2 {
        return Err(BundleError::InvalidInput(format!(
            "curve needs at least 2 points, got {}",
            points.len()
        )));
    }
    let cumulative = cumulative_lengths(points, closed);
    let total = cumulative[cumulative.len() - 1];
    if Tolerance::default().is_zero(total) || !total.is_finite() {
        return Err(BundleError::Geometry(format!(
            "curve length {} cannot be resampled",
            total
        )));
    }
    Ok(cumulative)
}

fn sample_at(points: &[Point3], cumulative: &[f64], s: f64) -> Point3 {
    let segments = cumulative.len() - 1;
    let total = cumulative[segments];
    let s = s.clamp(0.0, total);

    let seg = cumulative
        .partition_point(|&c| c <= s)
        .saturating_sub(1)
        .min(segments - 1);
    let a = points[seg];
    let b = points[(seg + 1) % points.len()];
    let seg_len = cumulative[seg + 1] - cumulative[seg];
    if seg_len <= 0.0 {
        return a;
    }
    a.lerp(b, (s - cumulative[seg]) / seg_len)
}

fn sample_uniform(points: &[Point3], closed: bool, cumulative: &[f64], count: usize) -> Polyline {
    let total = cumulative[cumulative.len() - 1];
    let divisions = if closed { count } else { count.saturating_sub(1).max(1) };
    let step = total / divisions as f64;
    let resampled = (0..count)
        .map(|i| sample_at(points, cumulative, i as f64 * step))
        .collect();
    Polyline {
        points: resampled,
        closed,
    }
}

pub(crate) fn resample_spacing(points: &[Point3], closed: bool, spacing: f64) -> Result<Polyline> {
    if !spacing.is_finite() || spacing <= 0.0 {
        return Err(BundleError::InvalidInput(format!(
            "resample spacing must be positive, got {}",
            spacing
        )));
    }
    let cumulative = validated_lengths(points, closed)?;
    let total = cumulative[cumulative.len() - 1];

    let segments = ((total / spacing).round() as usize).max(1);
    let count = if closed {
        segments.max(MIN_CLOSED_POINTS)
    } else {
        segments + 1
    };
    log::debug!(
        "Resampling {} curve of length {:.3} at spacing {} -> {} points",
        if closed { "closed" } else { "open" },
        total,
        spacing,
        count
    );
    Ok(sample_uniform(points, closed, &cumulative, count))
}

pub(crate) fn resample_count(points: &[Point3], closed: bool, count: usize) -> Result<Polyline> {
    if count == 0 {
        return Err(BundleError::InvalidInput("cannot resample to 0 points".into()));
    }
    let cumulative = validated_lengths(points, closed)?;
    Ok(sample_uniform(points, closed, &cumulative, count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use bundle_math::dvec3;
    use std::f64::consts::PI;

    fn circle(n: usize, radius: f64) -> Polyline {
        Polyline::closed(
            (0..n)
                .map(|i| {
                    let a = 2.0 * PI * i as f64 / n as f64;
                    dvec3(radius * a.cos(), radius * a.sin(), 0.0)
                })
                .collect(),
        )
    }

    #[test]
    fn test_length_open_and_closed() {
        let pts = vec![dvec3(0.0, 0.0, 0.0), dvec3(3.0, 0.0, 0.0), dvec3(3.0, 4.0, 0.0)];
        assert_relative_eq!(Polyline::open(pts.clone()).length(), 7.0);
        assert_relative_eq!(Polyline::closed(pts).length(), 12.0);
    }

    #[test]
    fn test_resample_straight_line() {
        let line = Polyline::open(vec![dvec3(0.0, 0.0, 0.0), dvec3(100.0, 0.0, 0.0)]);
        let resampled = line.resample(1.0).unwrap();
        assert_eq!(resampled.len(), 101);
        assert!(!resampled.closed);
        for (i, p) in resampled.points.iter().enumerate() {
            assert_relative_eq!(p.x, i as f64, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_resample_spacing_is_uniform() {
        let line = Polyline::open(vec![
            dvec3(0.0, 0.0, 0.0),
            dvec3(2.5, 0.0, 0.0),
            dvec3(2.5, 7.5, 0.0),
        ]);
        let resampled = line.resample(1.0).unwrap();
        assert_eq!(resampled.len(), 11);
        // every sample sits one unit of arclength after the previous one
        assert!((resampled.points[2] - dvec3(2.0, 0.0, 0.0)).length() < 1e-9);
        assert!((resampled.points[5] - dvec3(2.5, 2.5, 0.0)).length() < 1e-9);
        assert!((resampled.points[10] - dvec3(2.5, 7.5, 0.0)).length() < 1e-9);
    }

    #[test]
    fn test_resample_closed_does_not_repeat_first_point() {
        let c = circle(64, 10.0);
        let resampled = c.resample(1.0).unwrap();
        let expected = c.length().round() as usize;
        assert_eq!(resampled.len(), expected);
        assert!(resampled.closed);
        assert!(resampled.points[0].distance(resampled.points[expected - 1]) > 0.5);
    }

    #[test]
    fn test_resample_to_count() {
        let line = Polyline::open(vec![dvec3(0.0, 0.0, 0.0), dvec3(0.0, 0.0, 9.0)]);
        let resampled = line.resample_to_count(4).unwrap();
        assert_eq!(resampled.points, vec![
            dvec3(0.0, 0.0, 0.0),
            dvec3(0.0, 0.0, 3.0),
            dvec3(0.0, 0.0, 6.0),
            dvec3(0.0, 0.0, 9.0),
        ]);
        assert!(line.resample_to_count(0).is_err());
    }

    #[test]
    fn test_degenerate_curves_rejected() {
        assert!(Polyline::open(vec![dvec3(1.0, 1.0, 1.0)]).resample(1.0).is_err());
        let zero = Polyline::open(vec![dvec3(1.0, 1.0, 1.0), dvec3(1.0, 1.0, 1.0)]);
        assert!(matches!(zero.resample(1.0), Err(BundleError::Geometry(_))));
        let line = Polyline::open(vec![dvec3(0.0, 0.0, 0.0), dvec3(1.0, 0.0, 0.0)]);
        assert!(line.resample(0.0).is_err());
    }

    #[test]
    fn test_percent_at_point() {
        let line = Polyline::open(vec![
            dvec3(0.0, 0.0, 0.0),
            dvec3(1.0, 0.0, 0.0),
            dvec3(4.0, 0.0, 0.0),
        ]);
        assert_relative_eq!(line.percent_at_point(0).unwrap(), 0.0);
        assert_relative_eq!(line.percent_at_point(1).unwrap(), 25.0);
        assert_relative_eq!(line.percent_at_point(2).unwrap(), 100.0);
        assert!(line.percent_at_point(3).is_err());
    }
}
