//! Interpolating B-spline through scalar samples.

use bundle_core::{BundleError, Result};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use super::knot::{basis_functions, find_span, interpolation_knots};

/// Behaviour of a spline evaluated outside its data range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Extrapolation {
    /// Continue the outermost polynomial pieces.
    Extend,
    /// Hold the value at the nearest end of the data range.
    Clamp,
}

impl Extrapolation {
    pub fn from_flag(extrapolate: bool) -> Self {
        if extrapolate {
            Self::Extend
        } else {
            Self::Clamp
        }
    }
}

/// A B-spline `y(x)` passing exactly through every sample it was fitted to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterpolatingSpline {
    pub degree: usize,
    pub knots: Vec<f64>,
    pub coefficients: Vec<f64>,
}

impl InterpolatingSpline {
    /// Fit a spline of `degree` through `(x[i], y[i])`.
    ///
    /// `x` must be strictly increasing and hold more than `degree` samples.
    pub fn fit(x: &[f64], y: &[f64], degree: usize) -> Result<Self> {
        if x.len() != y.len() {
            return Err(BundleError::Spline(format!(
                "{} abscissae but {} values",
                x.len(),
                y.len()
            )));
        }
        if degree == 0 {
            return Err(BundleError::Spline("degree must be at least 1".into()));
        }
        if x.len() <= degree {
            return Err(BundleError::Spline(format!(
                "degree {} needs at least {} samples, got {}",
                degree,
                degree + 1,
                x.len()
            )));
        }
        if x.windows(2).any(|w| !(w[1] > w[0])) {
            return Err(BundleError::Spline(
                "abscissae must be strictly increasing".into(),
            ));
        }

        let m = x.len();
        let knots = interpolation_knots(x, degree);

        let mut collocation = DMatrix::<f64>::zeros(m, m);
        for (row, &xi) in x.iter().enumerate() {
            let span = find_span(degree, &knots, m - 1, xi);
            let basis = basis_functions(degree, &knots, span, xi);
            for (j, b) in basis.into_iter().enumerate() {
                collocation[(row, span - degree + j)] = b;
            }
        }

        let rhs = DVector::from_column_slice(y);
        let solution = collocation
            .lu()
            .solve(&rhs)
            .ok_or_else(|| BundleError::Spline("singular collocation matrix".into()))?;

        Ok(Self {
            degree,
            knots,
            coefficients: solution.iter().copied().collect(),
        })
    }

    /// Data range `(x_min, x_max)` the spline was fitted over.
    pub fn domain(&self) -> (f64, f64) {
        (self.knots[0], self.knots[self.knots.len() - 1])
    }

    pub fn evaluate(&self, t: f64, extrapolation: Extrapolation) -> f64 {
        let t = match extrapolation {
            Extrapolation::Extend => t,
            Extrapolation::Clamp => {
                let (lo, hi) = self.domain();
                t.clamp(lo, hi)
            }
        };

        let n = self.coefficients.len() - 1;
        let span = find_span(self.degree, &self.knots, n, t);
        let basis = basis_functions(self.degree, &self.knots, span, t);

        basis
            .iter()
            .enumerate()
            .map(|(i, b)| b * self.coefficients[span - self.degree + i])
            .sum()
    }
}
