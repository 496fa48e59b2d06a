use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use bundle_core::Result;
use bundle_mesh::FiberBundle;

use crate::header::TrkHeader;
use crate::reference::{CoordinateSystem, TrkReference};

/// Write `bundle` as a TrackVis stream.
///
/// Fiber coordinates are read in `space` and stored in the reference's
/// voxmm space. Closed fibers are written with their closing point.
pub fn write_trk<W: Write>(
    writer: &mut W,
    bundle: &FiberBundle,
    reference: &TrkReference,
    space: CoordinateSystem,
) -> Result<()> {
    let header = TrkHeader::for_reference(reference, bundle.fiber_count())?;
    writer.write_all(&header.to_bytes())?;

    let mut buf = Vec::new();
    for (index, line) in bundle.lines.iter().enumerate() {
        buf.clear();
        buf.extend_from_slice(&(line.len() as i32).to_le_bytes());
        for p in bundle.fiber_points(index) {
            let voxmm = reference.ras_to_voxmm(space.to_ras(p));
            buf.extend_from_slice(&(voxmm.x as f32).to_le_bytes());
            buf.extend_from_slice(&(voxmm.y as f32).to_le_bytes());
            buf.extend_from_slice(&(voxmm.z as f32).to_le_bytes());
        }
        writer.write_all(&buf)?;
    }
    writer.flush()?;

    log::debug!(
        "Wrote {} streamlines ({} points) to TrackVis",
        bundle.fiber_count(),
        bundle.point_count()
    );
    Ok(())
}

/// Write `bundle` to a `.trk` file at `path`.
pub fn save_trk(
    path: impl AsRef<Path>,
    bundle: &FiberBundle,
    reference: &TrkReference,
    space: CoordinateSystem,
) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path.as_ref())?);
    write_trk(&mut writer, bundle, reference, space)?;
    log::info!("Saved {} fibers to {}", bundle.fiber_count(), path.as_ref().display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::HEADER_SIZE;
    use bundle_math::dvec3;

    #[test]
    fn test_streamline_records() {
        let mut bundle = FiberBundle::new();
        bundle.add_fiber(&[dvec3(0.0, 0.0, 0.0), dvec3(2.0, 0.0, 0.0)], false);
        bundle.add_fiber(
            &[dvec3(0.0, 0.0, 0.0), dvec3(2.0, 0.0, 0.0), dvec3(2.0, 2.0, 0.0)],
            true,
        );
        let reference = TrkReference::axis_aligned([10, 10, 10], dvec3(2.0, 2.0, 2.0)).unwrap();

        let mut out = Vec::new();
        write_trk(&mut out, &bundle, &reference, CoordinateSystem::Ras).unwrap();
        // header + (count + 2 points) + (count + 4 points)
        assert_eq!(out.len(), HEADER_SIZE + (4 + 2 * 12) + (4 + 4 * 12));

        let body = &out[HEADER_SIZE..];
        assert_eq!(i32::from_le_bytes([body[0], body[1], body[2], body[3]]), 2);
        // origin maps to the center of voxel 0
        let x0 = f32::from_le_bytes([body[4], body[5], body[6], body[7]]);
        assert_eq!(x0, 1.0);
        let x1 = f32::from_le_bytes([body[16], body[17], body[18], body[19]]);
        assert_eq!(x1, 3.0);
    }

    #[test]
    fn test_lps_input_is_flipped() {
        let mut bundle = FiberBundle::new();
        bundle.add_fiber(&[dvec3(-4.0, -4.0, 0.0), dvec3(-4.0, -4.0, 2.0)], false);
        let reference = TrkReference::axis_aligned([10, 10, 10], dvec3(1.0, 1.0, 1.0)).unwrap();
        let mut out = Vec::new();
        write_trk(&mut out, &bundle, &reference, CoordinateSystem::Lps).unwrap();
        let body = &out[HEADER_SIZE + 4..];
        let x = f32::from_le_bytes([body[0], body[1], body[2], body[3]]);
        let y = f32::from_le_bytes([body[4], body[5], body[6], body[7]]);
        assert_eq!((x, y), (4.5, 4.5));
    }
}
