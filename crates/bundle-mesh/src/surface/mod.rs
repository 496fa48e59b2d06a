//! Constraint surfaces: closed shapes answering signed-distance queries.

mod closed_mesh;
mod half_space;
mod sphere;

use bundle_math::Point3;

pub use closed_mesh::ClosedMesh;
pub use half_space::HalfSpace;
pub use sphere::SphereSurface;

/// A closed surface that can classify points by signed distance.
///
/// Negative distances are inside, positive outside, zero on the surface.
pub trait ImplicitSurface: Send + Sync {
    fn signed_distance(&self, point: Point3) -> f64;

    /// Strictly inside the surface.
    fn contains(&self, point: Point3) -> bool {
        self.signed_distance(point) < 0.0
    }
}
