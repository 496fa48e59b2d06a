use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;

use bundle_core::{BundleError, Result};
use bundle_math::{dvec3, Point3};
use bundle_mesh::FiberBundle;

use crate::header::{TrkHeader, HEADER_SIZE};
use crate::reference::{CoordinateSystem, TrkReference};

/// Contents of a `.trk` file.
#[derive(Debug, Clone)]
pub struct TrkFile {
    pub header: TrkHeader,
    pub reference: TrkReference,
    pub bundle: FiberBundle,
}

/// Read a TrackVis stream, returning fiber coordinates in `space`.
///
/// Per-point scalars and per-streamline properties are skipped, as are
/// streamlines with fewer than 2 points. Streamlines whose last point
/// repeats the first become closed fibers.
pub fn read_trk<R: Read>(reader: &mut R, space: CoordinateSystem) -> Result<TrkFile> {
    let mut raw = [0u8; HEADER_SIZE];
    reader.read_exact(&mut raw)?;
    let header = TrkHeader::from_bytes(&raw)?;
    let reference = header.reference()?;

    let floats_per_point = 3 + header.scalars_per_point();
    let mut bundle = FiberBundle::new();
    let mut values = Vec::new();
    let mut count_bytes = [0u8; 4];
    let mut streamlines = 0usize;

    // n_count of 0 means the count is unknown: read until end of file
    loop {
        if header.n_count > 0 && streamlines >= header.n_count as usize {
            break;
        }
        match reader.read_exact(&mut count_bytes) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::UnexpectedEof && header.n_count == 0 => break,
            Err(e) => return Err(e.into()),
        }
        let n_points = i32::from_le_bytes(count_bytes);
        if n_points < 0 {
            return Err(BundleError::Parse(format!("negative point count {}", n_points)));
        }

        let n = n_points as usize;
        streamlines += 1;
        let count = n
            .checked_mul(floats_per_point)
            .and_then(|c| c.checked_add(header.properties_per_streamline()))
            .ok_or_else(|| BundleError::Parse(format!("streamline of {} points is too large", n)))?;
        read_f32s(reader, &mut values, count)?;
        let mut points: Vec<Point3> = values[..n * floats_per_point]
            .chunks_exact(floats_per_point)
            .map(|v| {
                let voxmm = dvec3(v[0] as f64, v[1] as f64, v[2] as f64);
                space.to_ras(reference.voxmm_to_ras(voxmm))
            })
            .collect();

        let closed = points.len() > 3 && values[..3] == values[(n - 1) * floats_per_point..][..3];
        if closed {
            points.pop();
        }
        bundle.add_fiber(&points, closed);
    }

    log::debug!(
        "Read {} streamlines ({} points) from TrackVis",
        bundle.fiber_count(),
        bundle.point_count()
    );
    Ok(TrkFile {
        header,
        reference,
        bundle,
    })
}

/// Read a `.trk` file at `path`.
pub fn load_trk(path: impl AsRef<Path>, space: CoordinateSystem) -> Result<TrkFile> {
    let mut reader = BufReader::new(File::open(path.as_ref())?);
    read_trk(&mut reader, space)
}

/// Read `count` little-endian floats. The buffer grows with the data actually
/// read, so a bogus count in a short file fails as a parse error.
fn read_f32s<R: Read>(reader: &mut R, out: &mut Vec<f32>, count: usize) -> Result<()> {
    let len = count
        .checked_mul(4)
        .and_then(|len| u64::try_from(len).ok())
        .ok_or_else(|| BundleError::Parse(format!("streamline of {} values is too large", count)))?;
    let mut bytes = Vec::new();
    reader.by_ref().take(len).read_to_end(&mut bytes)?;
    if (bytes.len() as u64) < len {
        return Err(BundleError::Parse("TrackVis file ends inside a streamline".into()));
    }
    out.clear();
    out.extend(
        bytes
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]])),
    );
    Ok(())
}
