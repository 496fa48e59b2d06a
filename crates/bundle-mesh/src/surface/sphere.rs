//! Spherical constraint surface.

use bundle_math::Point3;
use serde::{Deserialize, Serialize};

use super::ImplicitSurface;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SphereSurface {
    pub center: Point3,
    pub radius: f64,
}

impl SphereSurface {
    pub fn new(center: Point3, radius: f64) -> Self {
        Self { center, radius }
    }
}

impl ImplicitSurface for SphereSurface {
    fn signed_distance(&self, point: Point3) -> f64 {
        point.distance(self.center) - self.radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bundle_math::dvec3;

    #[test]
    fn test_sphere_signed_distance() {
        let sphere = SphereSurface::new(dvec3(1.0, 2.0, 3.0), 2.0);
        assert!((sphere.signed_distance(dvec3(1.0, 2.0, 3.0)) + 2.0).abs() < 1e-12);
        assert!((sphere.signed_distance(dvec3(1.0, 2.0, 8.0)) - 3.0).abs() < 1e-12);
        assert_eq!(sphere.signed_distance(dvec3(3.0, 2.0, 3.0)), 0.0);
    }

    #[test]
    fn test_sphere_contains_excludes_boundary() {
        let sphere = SphereSurface::new(Point3::ZERO, 1.0);
        assert!(sphere.contains(dvec3(0.5, 0.0, 0.0)));
        assert!(!sphere.contains(dvec3(1.0, 0.0, 0.0)));
        assert!(!sphere.contains(dvec3(0.0, 2.0, 0.0)));
    }
}
