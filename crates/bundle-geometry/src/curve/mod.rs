//! Curve provider trait and the polyline implementation.

mod polyline;

use bundle_core::Result;
use bundle_math::Point3;

pub use polyline::Polyline;

/// An ordered sequence of 3-D points, open or closed.
///
/// Closed curves wrap: the last point is adjacent to the first and the
/// closing segment counts towards the length.
pub trait Curve: Send + Sync {
    /// The points defining the curve, in order.
    fn points(&self) -> &[Point3];

    /// Whether the curve wraps from its last point back to its first.
    fn is_closed(&self) -> bool {
        false
    }

    /// Total arclength, including the closing segment of closed curves.
    fn length(&self) -> f64 {
        polyline::cumulative_lengths(self.points(), self.is_closed())
            .last()
            .copied()
            .unwrap_or(0.0)
    }

    /// Resample to uniform arclength spacing close to `spacing`.
    fn resample(&self, spacing: f64) -> Result<Polyline> {
        polyline::resample_spacing(self.points(), self.is_closed(), spacing)
    }

    /// Arclength position of the control point at `index`, as a percentage
    /// of the total length.
    fn percent_at_point(&self, index: usize) -> Result<f64> {
        polyline::percent_at_point(self.points(), self.is_closed(), index)
    }

    /// Resample to exactly `count` points, uniformly spaced along the arclength.
    fn resample_to_count(&self, count: usize) -> Result<Polyline> {
        polyline::resample_count(self.points(), self.is_closed(), count)
    }
}
