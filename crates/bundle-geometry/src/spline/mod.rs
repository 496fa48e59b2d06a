//! Interpolating B-splines over scalar data: knot utilities and the fit.

pub mod fit;
pub mod knot;

pub use fit::{Extrapolation, InterpolatingSpline};
pub use knot::{basis_functions, find_span, interpolation_knots};
