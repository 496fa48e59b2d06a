//! Closed triangle mesh used as a constraint surface (e.g. an anatomical model).

use std::f64::consts::PI;

use bundle_core::traits::BoundingBox;
use bundle_core::{BundleError, Result};
use bundle_math::{dvec3, Aabb3, Point3, Vector3};
use serde::{Deserialize, Serialize};

use super::ImplicitSurface;

/// Generalized winding number above which a point counts as enclosed.
const WINDING_THRESHOLD: f64 = 0.5;

/// Watertight triangle mesh.
///
/// The distance magnitude is the distance to the nearest triangle; the sign
/// comes from the generalized winding number, so either triangle orientation
/// works as long as it is consistent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClosedMesh {
    positions: Vec<Point3>,
    triangles: Vec<[u32; 3]>,
    bounds: Aabb3,
}

impl ClosedMesh {
    pub fn new(positions: Vec<Point3>, triangles: Vec<[u32; 3]>) -> Result<Self> {
        if triangles.is_empty() {
            return Err(BundleError::InvalidInput("closed mesh has no triangles".into()));
        }
        let n = positions.len() as u32;
        if let Some(bad) = triangles.iter().flatten().find(|&&i| i >= n) {
            return Err(BundleError::InvalidInput(format!(
                "triangle index {} out of bounds ({} vertices)",
                bad, n
            )));
        }
        let bounds = Aabb3::from_points(&positions)
            .ok_or_else(|| BundleError::InvalidInput("closed mesh has no vertices".into()))?;
        Ok(Self {
            positions,
            triangles,
            bounds,
        })
    }

    /// Latitude/longitude tessellation of a sphere, outward facing.
    pub fn uv_sphere(center: Point3, radius: f64, u_divs: usize, v_divs: usize) -> Result<Self> {
        if u_divs < 3 || v_divs < 2 || radius <= 0.0 {
            return Err(BundleError::InvalidInput(format!(
                "uv sphere needs radius > 0, u_divs >= 3 and v_divs >= 2 (got {}, {}, {})",
                radius, u_divs, v_divs
            )));
        }
        let v_count = v_divs + 1;
        let mut positions = Vec::with_capacity(u_divs * v_count);
        for i in 0..u_divs {
            let u = 2.0 * PI * i as f64 / u_divs as f64;
            for j in 0..v_count {
                let v = -PI / 2.0 + PI * j as f64 / v_divs as f64;
                positions.push(center + radius * dvec3(v.cos() * u.cos(), v.cos() * u.sin(), v.sin()));
            }
        }

        let idx = |ii: usize, jj: usize| -> u32 { ((ii % u_divs) * v_count + jj) as u32 };
        let mut triangles = Vec::with_capacity(u_divs * v_divs * 2);
        for i in 0..u_divs {
            for j in 0..v_divs {
                triangles.push([idx(i, j), idx(i + 1, j), idx(i + 1, j + 1)]);
                triangles.push([idx(i, j), idx(i + 1, j + 1), idx(i, j + 1)]);
            }
        }

        Self::new(positions, triangles)
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    fn corners(&self, tri: &[u32; 3]) -> (Point3, Point3, Point3) {
        (
            self.positions[tri[0] as usize],
            self.positions[tri[1] as usize],
            self.positions[tri[2] as usize],
        )
    }

    /// Distance from `p` to the nearest triangle.
    pub fn unsigned_distance(&self, p: Point3) -> f64 {
        self.triangles
            .iter()
            .map(|tri| {
                let (a, b, c) = self.corners(tri);
                p.distance(closest_point_on_triangle(p, a, b, c))
            })
            .fold(f64::INFINITY, f64::min)
    }

    /// Generalized winding number of the mesh around `p`: about ±1 inside,
    /// about 0 outside.
    pub fn winding_number(&self, p: Point3) -> f64 {
        let total: f64 = self
            .triangles
            .iter()
            .map(|tri| {
                let (a, b, c) = self.corners(tri);
                solid_angle(a - p, b - p, c - p)
            })
            .sum();
        total / (4.0 * PI)
    }
}

impl ImplicitSurface for ClosedMesh {
    fn signed_distance(&self, point: Point3) -> f64 {
        let distance = self.unsigned_distance(point);
        if self.bounds.contains_point(point) && self.winding_number(point).abs() > WINDING_THRESHOLD {
            -distance
        } else {
            distance
        }
    }
}

impl BoundingBox for ClosedMesh {
    type Point = Point3;

    fn bounding_box(&self) -> Option<(Point3, Point3)> {
        Some((self.bounds.min, self.bounds.max))
    }
}

/// Signed solid angle subtended by triangle `(a, b, c)` seen from the origin.
fn solid_angle(a: Vector3, b: Vector3, c: Vector3) -> f64 {
    let (la, lb, lc) = (a.length(), b.length(), c.length());
    let numerator = a.dot(b.cross(c));
    let denominator = la * lb * lc + a.dot(b) * lc + a.dot(c) * lb + b.dot(c) * la;
    2.0 * numerator.atan2(denominator)
}

/// Closest point to `p` on triangle `(a, b, c)`, by Voronoi region.
fn closest_point_on_triangle(p: Point3, a: Point3, b: Point3, c: Point3) -> Point3 {
    let ab = b - a;
    let ac = c - a;
    let ap = p - a;
    let d1 = ab.dot(ap);
    let d2 = ac.dot(ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return a;
    }

    let bp = p - b;
    let d3 = ab.dot(bp);
    let d4 = ac.dot(bp);
    if d3 >= 0.0 && d4 <= d3 {
        return b;
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let denom = d1 - d3;
        return if denom > 0.0 { a + ab * (d1 / denom) } else { a };
    }

    let cp = p - c;
    let d5 = ab.dot(cp);
    let d6 = ac.dot(cp);
    if d6 >= 0.0 && d5 <= d6 {
        return c;
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let denom = d2 - d6;
        return if denom > 0.0 { a + ac * (d2 / denom) } else { a };
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let denom = (d4 - d3) + (d5 - d6);
        return if denom > 0.0 { b + (c - b) * ((d4 - d3) / denom) } else { b };
    }

    let sum = va + vb + vc;
    if sum.abs() < f64::EPSILON {
        // degenerate triangle
        return a;
    }
    let v = vb / sum;
    let w = vc / sum;
    a + ab * v + ac * w
}
