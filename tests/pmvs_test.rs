use mvs_scene::model::{SceneFormat, SceneModel};
use mvs_scene::reconstruction::{ReconstructionSource, SparseReconstruction};
use mvs_scene::SceneError;
use nalgebra as na;
use std::path::Path;
use tempfile::TempDir;

/// The legacy reader must never consult the reconstruction collaborator.
struct NoRecon;

impl ReconstructionSource for NoRecon {
    fn load(&self, _sparse_dir: &Path) -> Result<SparseReconstruction, SceneError> {
        panic!("reconstruction source consulted for PMVS load");
    }
}

const BUNDLE_OK: &str = "\
# Bundle file v0.3
2 2
800
0 0
1 0 0
0 1 0
0 0 1
0.5 1.5 2.5
600
0 0
0 0 1
0 1 0
1 0 0
1 2 3
0.25 0.5 0.75
255 128 0
2 0 10 1.0 2.0 1 11 3.0 4.0
-1 -2 -3
0 0 0
1
1 12 5.0 6.0
";

fn write_scene(bundle: &str, dims: &[(u32, u32)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("bundle.rd.out"), bundle).unwrap();
    let visualize = dir.path().join("visualize");
    std::fs::create_dir_all(&visualize).unwrap();
    for (i, &(w, h)) in dims.iter().enumerate() {
        let img = image::RgbImage::new(w, h);
        img.save(visualize.join(format!("{i:08}.jpg"))).unwrap();
    }
    dir
}

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn test_bundle_load() {
    init_logger();
    let dir = write_scene(BUNDLE_OK, &[(640, 480), (320, 240)]);
    let model = SceneModel::read(dir.path(), SceneFormat::Pmvs, &NoRecon).unwrap();

    assert_eq!(model.num_frames(), 2);
    assert_eq!(model.points.len(), 2);
    assert_eq!(model.image_names(), ["00000000.jpg", "00000001.jpg"]);
    assert_eq!(
        model.frames[0].image_path,
        dir.path().join("visualize").join("00000000.jpg")
    );

    // Names are positional, so the lookup table round-trips.
    for i in 0..model.num_frames() {
        assert_eq!(model.index_of(model.name_of(i).unwrap()).unwrap(), i);
    }

    assert_eq!(model.points[0].track, [0, 1]);
    assert_eq!(model.points[1].track, [1]);
    assert_eq!(model.points[0].xyz, glam::Vec3::new(0.25, 0.5, 0.75));
    assert_eq!(model.depth_maps.len(), 2);
}

#[test]
fn test_focal_and_principal_point_from_metadata() {
    let dir = write_scene(BUNDLE_OK, &[(640, 480), (320, 240)]);
    let model = mvs_scene::pmvs::read(dir.path()).unwrap();

    let expected = na::Matrix3::new(800.0, 0.0, 320.0, 0.0, 800.0, 240.0, 0.0, 0.0, 1.0);
    assert_eq!(model.frames[0].k, expected);

    let expected = na::Matrix3::new(600.0, 0.0, 160.0, 0.0, 600.0, 120.0, 0.0, 0.0, 1.0);
    assert_eq!(model.frames[1].k, expected);
}

#[test]
fn test_pose_axis_flip() {
    let dir = write_scene(BUNDLE_OK, &[(640, 480), (320, 240)]);
    let model = mvs_scene::pmvs::read(dir.path()).unwrap();

    // Rows 1 and 2 of the rotation are negated.
    let expected = na::Matrix3::new(1.0, 0.0, 0.0, 0.0, -1.0, 0.0, 0.0, 0.0, -1.0);
    assert_eq!(model.frames[0].r, expected);
    let expected = na::Matrix3::new(0.0, 0.0, 1.0, 0.0, -1.0, 0.0, -1.0, 0.0, 0.0);
    assert_eq!(model.frames[1].r, expected);

    // Components 1 and 2 of the translation are negated.
    assert_eq!(model.frames[0].t, na::Vector3::new(0.5, -1.5, -2.5));
    assert_eq!(model.frames[1].t, na::Vector3::new(1.0, -2.0, -3.0));
}

#[test]
fn test_non_zero_distortion_is_fatal() {
    let bundle = BUNDLE_OK.replacen("800\n0 0", "800\n0.1 0", 1);
    let dir = write_scene(&bundle, &[(640, 480), (320, 240)]);

    let err = mvs_scene::pmvs::read(dir.path()).unwrap_err();
    assert!(matches!(
        err,
        SceneError::NonZeroDistortion { image_index: 0, .. }
    ));
}

#[test]
fn test_track_index_out_of_range_is_fatal() {
    let bundle = BUNDLE_OK.replacen("1 12 5.0 6.0", "5 12 5.0 6.0", 1);
    let dir = write_scene(&bundle, &[(640, 480), (320, 240)]);

    let err = mvs_scene::pmvs::read(dir.path()).unwrap_err();
    assert!(matches!(
        err,
        SceneError::TrackIndexOutOfRange {
            point_index: 1,
            frame_index: 5,
            num_frames: 2
        }
    ));
}

#[test]
fn test_truncated_bundle_is_fatal() {
    let truncated: String = BUNDLE_OK.lines().take(8).collect::<Vec<_>>().join("\n");
    let dir = write_scene(&truncated, &[(640, 480), (320, 240)]);

    let err = mvs_scene::pmvs::read(dir.path()).unwrap_err();
    assert!(matches!(err, SceneError::MalformedBundle { .. }));
}

#[test]
fn test_garbage_token_is_fatal() {
    let bundle = BUNDLE_OK.replacen("0.25 0.5 0.75", "0.25 abc 0.75", 1);
    let dir = write_scene(&bundle, &[(640, 480), (320, 240)]);

    let err = mvs_scene::pmvs::read(dir.path()).unwrap_err();
    assert!(matches!(err, SceneError::MalformedBundle { .. }));
}

#[test]
fn test_missing_bundle_file_is_fatal() {
    let dir = TempDir::new().unwrap();
    let err = mvs_scene::pmvs::read(dir.path()).unwrap_err();
    assert!(matches!(err, SceneError::Io(_)));
}

#[test]
fn test_missing_probe_image_is_fatal() {
    // Only the first image exists on disk.
    let dir = write_scene(BUNDLE_OK, &[(640, 480)]);
    let err = mvs_scene::pmvs::read(dir.path()).unwrap_err();
    assert!(matches!(
        err,
        SceneError::Image(_) | SceneError::Io(_)
    ));
}
