//! Reader for the canonical reconstruction layout: a sparse model under
//! `<root>/sparse` and undistorted images under `<root>/images`.

use nalgebra as na;
use std::collections::HashMap;
use std::path::Path;

use crate::error::SceneError;
use crate::model::SceneModel;
use crate::reconstruction::{PINHOLE_MODEL, ReconstructionSource};
use crate::types::{CameraFrame, SparsePoint};

/// Converts a `(w, x, y, z)` orientation quaternion to a rotation matrix.
///
/// The quaternion is normalized first, matching the upstream convention of
/// storing unnormalized pose quaternions.
pub(crate) fn quaternion_to_rotation(qvec: [f64; 4]) -> na::Matrix3<f64> {
    let q = na::Quaternion::new(qvec[0], qvec[1], qvec[2], qvec[3]);
    na::UnitQuaternion::from_quaternion(q)
        .to_rotation_matrix()
        .into_inner()
}

/// Loads the registered subset of a sparse reconstruction, in the upstream's
/// enumeration order, into a canonical scene model.
///
/// Every referenced camera must use the undistorted pinhole model; any other
/// calibration aborts the load with no partial result.
pub fn read(root: &Path, source: &dyn ReconstructionSource) -> Result<SceneModel, SceneError> {
    let recon = source.load(&root.join("sparse"))?;

    let mut frames = Vec::with_capacity(recon.reg_image_ids.len());
    let mut image_names = Vec::with_capacity(recon.reg_image_ids.len());
    let mut image_id_map = HashMap::with_capacity(recon.reg_image_ids.len());

    for (index, &image_id) in recon.reg_image_ids.iter().enumerate() {
        let image = recon
            .images
            .get(&image_id)
            .ok_or(SceneError::MissingImageRecord(image_id))?;
        let camera = recon.cameras.get(&image.camera_id).ok_or_else(|| {
            SceneError::MissingCameraRecord {
                image: image.name.clone(),
                camera_id: image.camera_id,
            }
        })?;

        if camera.model != PINHOLE_MODEL {
            return Err(SceneError::UnsupportedCameraModel {
                image: image.name.clone(),
                model: camera.model.clone(),
            });
        }

        frames.push(CameraFrame {
            image_path: root.join("images").join(&image.name),
            k: camera.calibration.cast::<f32>(),
            r: quaternion_to_rotation(image.qvec).cast::<f32>(),
            t: image.tvec.cast::<f32>(),
        });
        image_names.push(image.name.clone());
        image_id_map.insert(image_id, index);
    }

    let mut points = Vec::with_capacity(recon.points.len());
    for (point_index, point) in recon.points.iter().enumerate() {
        let mut track = Vec::with_capacity(point.track.len());
        for &(image_id, _feature_index) in &point.track {
            // A track observing an unregistered image is an invariant
            // violation, never dropped.
            let &index =
                image_id_map
                    .get(&image_id)
                    .ok_or(SceneError::UnmappedImageId {
                        point_index,
                        image_id,
                    })?;
            track.push(index);
        }
        points.push(SparsePoint {
            xyz: glam::Vec3::new(point.xyz[0] as f32, point.xyz[1] as f32, point.xyz[2] as f32),
            track,
        });
    }

    log::info!(
        "loaded {} registered frames and {} points from {}",
        frames.len(),
        points.len(),
        root.display()
    );

    SceneModel::from_parts(frames, image_names, points)
}
