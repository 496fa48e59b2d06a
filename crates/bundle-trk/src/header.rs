//! TrackVis header (version 2, 1000 bytes, little-endian).
//!
//! Layout:
//!   [6 id "TRACK\0"][3 i16 dim][3 f32 voxel_size][3 f32 origin]
//!   [i16 n_scalars][200 scalar_name][i16 n_properties][200 property_name]
//!   [16 f32 vox_to_ras, row-major][444 reserved][4 voxel_order][4 pad2]
//!   [6 f32 image_orientation_patient][2 pad1][6 u8 invert/swap flags]
//!   [i32 n_count][i32 version][i32 hdr_size]

use bundle_core::{BundleError, Result};
use bundle_math::{dvec3, DMat4};

use crate::reference::TrkReference;

pub const HEADER_SIZE: usize = 1000;
pub const MAGIC: &[u8; 6] = b"TRACK\0";
pub const VERSION: i32 = 2;

const SCALAR_NAME_OFFSET: usize = 38;
const PROPERTY_NAME_OFFSET: usize = 240;
const VOX_TO_RAS_OFFSET: usize = 440;
const VOXEL_ORDER_OFFSET: usize = 948;
const N_COUNT_OFFSET: usize = 988;

#[derive(Debug, Clone, PartialEq)]
pub struct TrkHeader {
    pub dimensions: [i16; 3],
    pub voxel_size: [f32; 3],
    pub n_scalars: i16,
    pub n_properties: i16,
    /// Row-major; all zero in files that carry no affine.
    pub vox_to_ras: [f32; 16],
    pub voxel_order: [u8; 3],
    /// Number of streamlines, 0 when unknown.
    pub n_count: i32,
    pub version: i32,
}

impl TrkHeader {
    pub fn for_reference(reference: &TrkReference, n_count: usize) -> Result<Self> {
        let n_count = i32::try_from(n_count).map_err(|_| {
            BundleError::InvalidInput(format!("{} streamlines do not fit a TrackVis header", n_count))
        })?;
        let v = reference.voxel_size;
        let mut vox_to_ras = [0f32; 16];
        for (dst, src) in vox_to_ras.iter_mut().zip(reference.affine_rows()) {
            *dst = src as f32;
        }
        Ok(Self {
            dimensions: reference.dimensions,
            voxel_size: [v.x as f32, v.y as f32, v.z as f32],
            n_scalars: 0,
            n_properties: 0,
            vox_to_ras,
            voxel_order: reference.voxel_order(),
            n_count,
            version: VERSION,
        })
    }

    /// The reference volume described by this header. Headers without an
    /// affine fall back to an axis-aligned volume.
    pub fn reference(&self) -> Result<TrkReference> {
        let voxel_size = dvec3(
            self.voxel_size[0] as f64,
            self.voxel_size[1] as f64,
            self.voxel_size[2] as f64,
        );
        if self.vox_to_ras[15] == 0.0 {
            return TrkReference::axis_aligned(self.dimensions, voxel_size);
        }
        let mut rows = [0f64; 16];
        for (dst, &src) in rows.iter_mut().zip(self.vox_to_ras.iter()) {
            *dst = src as f64;
        }
        let affine: DMat4 = TrkReference::from_affine_rows(&rows);
        TrkReference::new(self.dimensions, voxel_size, affine)
    }

    /// Extra floats stored after the coordinates of every point.
    pub fn scalars_per_point(&self) -> usize {
        self.n_scalars.max(0) as usize
    }

    pub fn properties_per_streamline(&self) -> usize {
        self.n_properties.max(0) as usize
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        let mut w = FieldWriter::new(&mut buf);
        w.bytes(MAGIC);
        for d in self.dimensions {
            w.bytes(&d.to_le_bytes());
        }
        for v in self.voxel_size {
            w.bytes(&v.to_le_bytes());
        }
        // origin stays zero
        w.skip(12);
        w.bytes(&self.n_scalars.to_le_bytes());
        w.seek(PROPERTY_NAME_OFFSET - 2);
        w.bytes(&self.n_properties.to_le_bytes());
        w.seek(VOX_TO_RAS_OFFSET);
        for v in self.vox_to_ras {
            w.bytes(&v.to_le_bytes());
        }
        w.seek(VOXEL_ORDER_OFFSET);
        w.bytes(&self.voxel_order);
        w.seek(N_COUNT_OFFSET);
        w.bytes(&self.n_count.to_le_bytes());
        w.bytes(&self.version.to_le_bytes());
        w.bytes(&(HEADER_SIZE as i32).to_le_bytes());
        buf
    }

    pub fn from_bytes(buf: &[u8; HEADER_SIZE]) -> Result<Self> {
        if &buf[..6] != MAGIC {
            return Err(BundleError::Parse("not a TrackVis file (bad magic)".into()));
        }
        let hdr_size = i32::from_le_bytes(field(buf, HEADER_SIZE - 4));
        if hdr_size != HEADER_SIZE as i32 {
            if i32::from_be_bytes(field(buf, HEADER_SIZE - 4)) == HEADER_SIZE as i32 {
                return Err(BundleError::Parse("big-endian TrackVis files are not supported".into()));
            }
            return Err(BundleError::Parse(format!("unexpected header size {}", hdr_size)));
        }
        let version = i32::from_le_bytes(field(buf, HEADER_SIZE - 8));
        if !(1..=2).contains(&version) {
            return Err(BundleError::Parse(format!("unsupported TrackVis version {}", version)));
        }

        let mut dimensions = [0i16; 3];
        for (i, d) in dimensions.iter_mut().enumerate() {
            *d = i16::from_le_bytes(field(buf, 6 + 2 * i));
        }
        let mut voxel_size = [0f32; 3];
        for (i, v) in voxel_size.iter_mut().enumerate() {
            *v = f32::from_le_bytes(field(buf, 12 + 4 * i));
        }
        let mut vox_to_ras = [0f32; 16];
        if version == 2 {
            for (i, v) in vox_to_ras.iter_mut().enumerate() {
                *v = f32::from_le_bytes(field(buf, VOX_TO_RAS_OFFSET + 4 * i));
            }
        }
        let mut voxel_order = [0u8; 3];
        voxel_order.copy_from_slice(&buf[VOXEL_ORDER_OFFSET..VOXEL_ORDER_OFFSET + 3]);

        Ok(Self {
            dimensions,
            voxel_size,
            n_scalars: i16::from_le_bytes(field(buf, SCALAR_NAME_OFFSET - 2)),
            n_properties: i16::from_le_bytes(field(buf, PROPERTY_NAME_OFFSET - 2)),
            vox_to_ras,
            voxel_order,
            n_count: i32::from_le_bytes(field(buf, N_COUNT_OFFSET)),
            version,
        })
    }
}

fn field<const N: usize>(buf: &[u8], offset: usize) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&buf[offset..offset + N]);
    out
}

/// Sequential writer over the fixed header buffer.
struct FieldWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> FieldWriter<'a> {
    fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn bytes(&mut self, data: &[u8]) {
        self.buf[self.pos..self.pos + data.len()].copy_from_slice(data);
        self.pos += data.len();
    }

    fn skip(&mut self, n: usize) {
        self.pos += n;
    }

    fn seek(&mut self, pos: usize) {
        self.pos = pos;
    }
}
