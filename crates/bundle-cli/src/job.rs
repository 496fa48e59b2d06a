//! JSON job description: curves, parameters, constraint surfaces and the
//! optional TrackVis reference.

use std::path::Path;

use bundle_core::{BundleError, BundleParams, Result};
use bundle_geometry::{Curve, Polyline};
use bundle_math::{DMat4, Point3, Vector3};
use bundle_mesh::{ClosedMesh, FiberBundle, HalfSpace, ImplicitSurface, SphereSurface};
use bundle_synth::{process, BundleInputs};
use bundle_trk::{CoordinateSystem, TrkReference};
use serde::Deserialize;

/// A constraint surface as written in a job file.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SurfaceSpec {
    Sphere {
        center: Point3,
        radius: f64,
    },
    HalfSpace {
        origin: Point3,
        /// Points away from the inside.
        normal: Vector3,
    },
    Mesh {
        positions: Vec<Point3>,
        triangles: Vec<[u32; 3]>,
    },
    UvSphere {
        center: Point3,
        radius: f64,
        #[serde(default = "default_u_divs")]
        u_divs: usize,
        #[serde(default = "default_v_divs")]
        v_divs: usize,
    },
}

fn default_u_divs() -> usize {
    32
}

fn default_v_divs() -> usize {
    16
}

impl SurfaceSpec {
    pub fn build(&self) -> Result<Box<dyn ImplicitSurface>> {
        let surface: Box<dyn ImplicitSurface> = match self {
            Self::Sphere { center, radius } => {
                if *radius <= 0.0 || !radius.is_finite() {
                    return Err(BundleError::InvalidInput(format!(
                        "sphere radius must be positive, got {}",
                        radius
                    )));
                }
                Box::new(SphereSurface::new(*center, *radius))
            }
            Self::HalfSpace { origin, normal } => Box::new(
                HalfSpace::new(*origin, *normal)
                    .ok_or_else(|| BundleError::InvalidInput("half-space normal is zero".into()))?,
            ),
            Self::Mesh {
                positions,
                triangles,
            } => Box::new(ClosedMesh::new(positions.clone(), triangles.clone())?),
            Self::UvSphere {
                center,
                radius,
                u_divs,
                v_divs,
            } => Box::new(ClosedMesh::uv_sphere(*center, *radius, *u_divs, *v_divs)?),
        };
        Ok(surface)
    }
}

/// Reference volume for TrackVis export. The affine is given as rows and
/// defaults to a scaling by the voxel size.
#[derive(Debug, Clone, Deserialize)]
pub struct ReferenceSpec {
    pub dimensions: [i16; 3],
    pub voxel_size: Vector3,
    #[serde(default)]
    pub vox_to_ras: Option<[[f64; 4]; 4]>,
}

impl ReferenceSpec {
    pub fn build(&self) -> Result<TrkReference> {
        match self.vox_to_ras {
            Some(rows) => {
                let mut array = [0.0; 16];
                for (dst, src) in array.iter_mut().zip(rows.iter().flatten()) {
                    *dst = *src;
                }
                let affine: DMat4 = TrkReference::from_affine_rows(&array);
                TrkReference::new(self.dimensions, self.voxel_size, affine)
            }
            None => TrkReference::axis_aligned(self.dimensions, self.voxel_size),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Job {
    pub centerline: Polyline,
    #[serde(default)]
    pub between: Option<Polyline>,
    #[serde(default)]
    pub params: BundleParams,
    #[serde(default)]
    pub start: Option<SurfaceSpec>,
    #[serde(default)]
    pub end: Option<SurfaceSpec>,
    #[serde(default)]
    pub inside: Vec<SurfaceSpec>,
    #[serde(default)]
    pub outside: Vec<SurfaceSpec>,
    #[serde(default)]
    pub reference: Option<ReferenceSpec>,
    /// Convention of every coordinate in the job.
    #[serde(default)]
    pub coordinate_system: CoordinateSystem,
}

impl Job {
    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Generate the bundle this job describes.
    pub fn run(&self) -> Result<FiberBundle> {
        let start = self.start.as_ref().map(SurfaceSpec::build).transpose()?;
        let end = self.end.as_ref().map(SurfaceSpec::build).transpose()?;
        let inside = self
            .inside
            .iter()
            .map(SurfaceSpec::build)
            .collect::<Result<Vec<_>>>()?;
        let outside = self
            .outside
            .iter()
            .map(SurfaceSpec::build)
            .collect::<Result<Vec<_>>>()?;

        let inputs = BundleInputs {
            centerline: Some(&self.centerline as &dyn Curve),
            between: self.between.as_ref().map(|c| c as &dyn Curve),
            start: start.as_deref(),
            end: end.as_deref(),
            inside: inside.iter().map(|s| s.as_ref()).collect(),
            outside: outside.iter().map(|s| s.as_ref()).collect(),
        };

        let mut bundle = FiberBundle::new();
        process(&inputs, &self.params, Some(&mut bundle))?;
        Ok(bundle)
    }
}
