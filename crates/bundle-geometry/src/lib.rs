//! Geometry for fiber bundle generation: polyline curves with arclength
//! resampling, interpolating B-splines, and spread profiles.

pub mod curve;
pub mod spline;
pub mod spread;

pub use curve::{Curve, Polyline};
pub use spline::{Extrapolation, InterpolatingSpline};
pub use spread::{interpolate, SpreadProfile};
