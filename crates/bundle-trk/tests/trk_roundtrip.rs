use bundle_core::BundleError;
use bundle_math::{dvec3, DMat4, DVec4, Point3};
use bundle_mesh::FiberBundle;
use bundle_trk::{load_trk, read_trk, save_trk, CoordinateSystem, TrkHeader, TrkReference};

fn sample_bundle() -> FiberBundle {
    let mut bundle = FiberBundle::new();
    bundle.add_fiber(
        &[dvec3(-10.0, 4.0, 2.5), dvec3(-8.5, 5.0, 3.0), dvec3(-7.0, 6.5, 3.25)],
        false,
    );
    bundle.add_fiber(
        &[
            dvec3(0.0, 0.0, 0.0),
            dvec3(4.0, 0.0, 0.0),
            dvec3(4.0, 4.0, 0.0),
            dvec3(0.0, 4.0, 1.0),
        ],
        true,
    );
    bundle
}

fn tilted_reference() -> TrkReference {
    let mut affine = DMat4::from_scale(dvec3(-1.25, 1.25, 2.0));
    affine.w_axis = DVec4::new(90.0, -126.0, -72.0, 1.0);
    TrkReference::new([145, 174, 145], dvec3(1.25, 1.25, 2.0), affine).unwrap()
}

fn assert_same_fibers(a: &FiberBundle, b: &FiberBundle) {
    assert_eq!(a.fiber_count(), b.fiber_count());
    for fiber in 0..a.fiber_count() {
        assert_eq!(a.is_closed_fiber(fiber), b.is_closed_fiber(fiber));
        let pa: Vec<Point3> = a.fiber_points(fiber).collect();
        let pb: Vec<Point3> = b.fiber_points(fiber).collect();
        assert_eq!(pa.len(), pb.len());
        for (p, q) in pa.iter().zip(&pb) {
            // coordinates are stored as f32
            assert!((*p - *q).length() < 1e-4, "{:?} != {:?}", p, q);
        }
    }
}

#[test]
fn test_file_round_trip_ras() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bundle.trk");
    let bundle = sample_bundle();
    let reference = tilted_reference();

    save_trk(&path, &bundle, &reference, CoordinateSystem::Ras).unwrap();
    let loaded = load_trk(&path, CoordinateSystem::Ras).unwrap();

    assert_eq!(loaded.header.n_count, 2);
    assert_eq!(&loaded.header.voxel_order, b"LAS");
    assert_same_fibers(&bundle, &loaded.bundle);
}

#[test]
fn test_round_trip_lps() {
    let bundle = sample_bundle();
    let reference = TrkReference::axis_aligned([64, 64, 64], dvec3(1.0, 1.0, 1.0)).unwrap();

    let mut bytes = Vec::new();
    bundle_trk::write_trk(&mut bytes, &bundle, &reference, CoordinateSystem::Lps).unwrap();
    let loaded = read_trk(&mut bytes.as_slice(), CoordinateSystem::Lps).unwrap();
    assert_same_fibers(&bundle, &loaded.bundle);

    // the same file read as RAS has x and y negated
    let ras = read_trk(&mut bytes.as_slice(), CoordinateSystem::Ras).unwrap();
    let p = ras.bundle.fiber_points(0).next().unwrap();
    assert!((p - dvec3(10.0, -4.0, 2.5)).length() < 1e-4);
}

#[test]
fn test_truncated_file_is_an_error() {
    let bundle = sample_bundle();
    let reference = tilted_reference();
    let mut bytes = Vec::new();
    bundle_trk::write_trk(&mut bytes, &bundle, &reference, CoordinateSystem::Ras).unwrap();
    bytes.truncate(bytes.len() - 6);
    assert!(read_trk(&mut bytes.as_slice(), CoordinateSystem::Ras).is_err());
}

#[test]
fn test_unknown_count_reads_to_end() {
    let bundle = sample_bundle();
    let reference = tilted_reference();
    let mut bytes = Vec::new();
    bundle_trk::write_trk(&mut bytes, &bundle, &reference, CoordinateSystem::Ras).unwrap();
    bytes[988..992].copy_from_slice(&0i32.to_le_bytes());
    let loaded = read_trk(&mut bytes.as_slice(), CoordinateSystem::Ras).unwrap();
    assert_eq!(loaded.bundle.fiber_count(), 2);
}

#[test]
fn test_oversized_streamline_is_a_parse_error() {
    let reference = TrkReference::axis_aligned([8, 8, 8], dvec3(1.0, 1.0, 1.0)).unwrap();
    let mut header = TrkHeader::for_reference(&reference, 1).unwrap();
    header.n_scalars = i16::MAX;
    let mut bytes = header.to_bytes().to_vec();
    bytes.extend_from_slice(&i32::MAX.to_le_bytes());
    bytes.extend_from_slice(&1.0f32.to_le_bytes());

    let err = read_trk(&mut bytes.as_slice(), CoordinateSystem::Ras).unwrap_err();
    assert!(matches!(err, BundleError::Parse(_)), "{:?}", err);
}

#[test]
fn test_short_streamline_is_a_parse_error() {
    let reference = TrkReference::axis_aligned([8, 8, 8], dvec3(1.0, 1.0, 1.0)).unwrap();
    let header = TrkHeader::for_reference(&reference, 1).unwrap();
    let mut bytes = header.to_bytes().to_vec();
    bytes.extend_from_slice(&4i32.to_le_bytes());
    for v in [0.5f32, 0.5, 0.5, 1.5, 1.5] {
        bytes.extend_from_slice(&v.to_le_bytes());
    }

    let err = read_trk(&mut bytes.as_slice(), CoordinateSystem::Ras).unwrap_err();
    assert!(matches!(err, BundleError::Parse(_)), "{:?}", err);
}
