use bundle_core::traits::BoundingBox;
use bundle_math::{Aabb3, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Polyline mesh holding every fiber of a bundle.
///
/// Each entry of `lines` lists the indices of one fiber's points in order.
/// Closed fibers repeat their first index at the end.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FiberBundle {
    pub positions: Vec<Point3>,
    pub lines: Vec<Vec<u32>>,
}

impl FiberBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of fibers (polylines) in the bundle.
    pub fn fiber_count(&self) -> usize {
        self.lines.len()
    }

    /// Number of stored points.
    pub fn point_count(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Append one fiber, closing the loop when `closed` is set.
    ///
    /// Fibers with fewer than 2 points are not added; returns whether the
    /// fiber was added.
    pub fn add_fiber(&mut self, points: &[Point3], closed: bool) -> bool {
        if points.len() < 2 {
            return false;
        }
        let first = self.positions.len() as u32;
        self.positions.extend_from_slice(points);
        let mut line: Vec<u32> = (first..first + points.len() as u32).collect();
        if closed {
            line.push(first);
        }
        self.lines.push(line);
        true
    }

    /// Points of fiber `index` in line order.
    pub fn fiber_points(&self, index: usize) -> impl Iterator<Item = Point3> + '_ {
        self.lines
            .get(index)
            .into_iter()
            .flatten()
            .map(move |&i| self.positions[i as usize])
    }

    /// Whether fiber `index` ends on its own first point.
    pub fn is_closed_fiber(&self, index: usize) -> bool {
        self.lines
            .get(index)
            .map(|line| line.len() > 2 && line.first() == line.last())
            .unwrap_or(false)
    }

    /// Keep only the fibers whose entry in `keep` is true, dropping the
    /// points no remaining fiber references.
    pub fn retain_fibers(&mut self, keep: &[bool]) {
        debug_assert_eq!(keep.len(), self.lines.len());

        let mut remap: Vec<Option<u32>> = vec![None; self.positions.len()];
        let mut positions: Vec<Point3> = Vec::new();
        let mut lines = Vec::new();

        for (line, _) in self
            .lines
            .iter()
            .zip(keep.iter())
            .filter(|(_, k)| **k)
        {
            let new_line: Vec<u32> = line
                .iter()
                .map(|&old| {
                    *remap[old as usize].get_or_insert_with(|| {
                        positions.push(self.positions[old as usize]);
                        (positions.len() - 1) as u32
                    })
                })
                .collect();
            lines.push(new_line);
        }

        self.positions = positions;
        self.lines = lines;
    }

    /// Unit tangent direction at every point, from central differences along
    /// its fiber. Points on degenerate segments get a zero vector.
    pub fn point_orientations(&self) -> Vec<Vector3> {
        let mut orientations = vec![Vector3::ZERO; self.positions.len()];
        for line in &self.lines {
            let n = line.len();
            let closed = n > 2 && line[0] == line[n - 1];
            let pts = if closed { &line[..n - 1] } else { &line[..] };
            let m = pts.len();
            for (j, &idx) in pts.iter().enumerate() {
                let (prev, next) = if closed {
                    (pts[(j + m - 1) % m], pts[(j + 1) % m])
                } else {
                    (pts[j.saturating_sub(1)], pts[(j + 1).min(m - 1)])
                };
                orientations[idx as usize] = (self.positions[next as usize]
                    - self.positions[prev as usize])
                    .normalize_or_zero();
            }
        }
        orientations
    }

    /// Per-point RGB colors for fiber orientation display: absolute tangent
    /// components scaled to `0..=255`.
    pub fn orientation_colors(&self) -> Vec<[u8; 3]> {
        self.point_orientations()
            .into_iter()
            .map(|d| {
                let c = d.abs() * 255.0;
                [c.x.round() as u8, c.y.round() as u8, c.z.round() as u8]
            })
            .collect()
    }
}

impl BoundingBox for FiberBundle {
    type Point = Point3;

    fn bounding_box(&self) -> Option<(Point3, Point3)> {
        Aabb3::from_points(&self.positions).map(|b| (b.min, b.max))
    }
}
