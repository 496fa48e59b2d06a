//! Reference volume geometry and bundle coordinate conventions.

use bundle_core::{BundleError, Result};
use bundle_math::{dvec3, DMat4, DVec4, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// World convention the bundle coordinates are expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordinateSystem {
    /// Right, anterior, superior.
    #[default]
    Ras,
    /// Left, posterior, superior: x and y negated with respect to RAS.
    Lps,
}

impl CoordinateSystem {
    /// Convert a point in this convention to RAS. The conversion is its own
    /// inverse, so it also maps RAS points back.
    pub fn to_ras(self, p: Point3) -> Point3 {
        match self {
            Self::Ras => p,
            Self::Lps => dvec3(-p.x, -p.y, p.z),
        }
    }
}

/// Geometry of the image the streamlines are registered to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrkReference {
    pub dimensions: [i16; 3],
    pub voxel_size: Vector3,
    /// Voxel index to RAS millimetres.
    pub vox_to_ras: DMat4,
}

impl TrkReference {
    pub fn new(dimensions: [i16; 3], voxel_size: Vector3, vox_to_ras: DMat4) -> Result<Self> {
        if !(voxel_size.cmpgt(Vector3::ZERO).all() && voxel_size.is_finite()) {
            return Err(BundleError::InvalidInput(format!(
                "voxel sizes must be positive, got {:?}",
                voxel_size
            )));
        }
        if vox_to_ras.determinant().abs() < f64::EPSILON || !vox_to_ras.is_finite() {
            return Err(BundleError::InvalidInput(
                "voxel to RAS affine is not invertible".into(),
            ));
        }
        Ok(Self {
            dimensions,
            voxel_size,
            vox_to_ras,
        })
    }

    /// Axis-aligned RAS volume with its first voxel at the world origin.
    pub fn axis_aligned(dimensions: [i16; 3], voxel_size: Vector3) -> Result<Self> {
        Self::new(dimensions, voxel_size, DMat4::from_scale(voxel_size))
    }

    /// Orientation code of each voxel axis, e.g. `*b"RAS"` or `*b"LPS"`.
    ///
    /// Each voxel axis is labelled with the world axis its direction is
    /// closest to.
    pub fn voxel_order(&self) -> [u8; 3] {
        const POSITIVE: [u8; 3] = *b"RAS";
        const NEGATIVE: [u8; 3] = *b"LPI";

        let mut order = [0u8; 3];
        for (axis, code) in order.iter_mut().enumerate() {
            let column = self.vox_to_ras.col(axis).truncate();
            let magnitudes = column.abs();
            let world = if magnitudes.x >= magnitudes.y && magnitudes.x >= magnitudes.z {
                0
            } else if magnitudes.y >= magnitudes.z {
                1
            } else {
                2
            };
            *code = if column[world] >= 0.0 {
                POSITIVE[world]
            } else {
                NEGATIVE[world]
            };
        }
        order
    }

    /// Map a RAS point to TrackVis "voxmm" space: voxel coordinates shifted
    /// by half a voxel and scaled by the voxel size.
    pub fn ras_to_voxmm(&self, p: Point3) -> Point3 {
        let ijk = self.vox_to_ras.inverse().transform_point3(p);
        (ijk + 0.5) * self.voxel_size
    }

    pub fn voxmm_to_ras(&self, p: Point3) -> Point3 {
        let ijk = p / self.voxel_size - 0.5;
        self.vox_to_ras.transform_point3(ijk)
    }

    /// The affine as 16 row-major values.
    pub fn affine_rows(&self) -> [f64; 16] {
        let mut rows = [0.0; 16];
        for r in 0..4 {
            let row: DVec4 = self.vox_to_ras.row(r);
            rows[r * 4..r * 4 + 4].copy_from_slice(&row.to_array());
        }
        rows
    }

    pub fn from_affine_rows(rows: &[f64; 16]) -> DMat4 {
        DMat4::from_cols_array(rows).transpose()
    }
}
