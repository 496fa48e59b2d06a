//! Half-space bounded by a plane; the side opposite the normal is inside.

use bundle_math::{Plane, Point3, Vector3};
use serde::{Deserialize, Serialize};

use super::ImplicitSurface;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HalfSpace {
    pub plane: Plane,
}

impl HalfSpace {
    /// `None` when `outward_normal` has zero length.
    pub fn new(origin: Point3, outward_normal: Vector3) -> Option<Self> {
        Plane::new(origin, outward_normal).map(|plane| Self { plane })
    }
}

impl ImplicitSurface for HalfSpace {
    fn signed_distance(&self, point: Point3) -> f64 {
        self.plane.signed_distance(point)
    }
}
