//! Interface to the upstream sparse-reconstruction collaborator.
//!
//! The solver that estimates camera poses and triangulates points lives
//! outside this crate; it hands its result over as a [`SparseReconstruction`]
//! through the [`ReconstructionSource`] trait. Only the data this crate
//! consumes is modeled here.

use nalgebra as na;
use std::collections::HashMap;
use std::path::Path;

use crate::error::SceneError;

/// Camera model identifier for the undistorted, no-skew pinhole model, the
/// only calibration this crate accepts.
pub const PINHOLE_MODEL: &str = "PINHOLE";

/// Calibration shared by one or more reconstructed images.
#[derive(Debug, Clone)]
pub struct ReconCamera {
    /// Upstream camera model identifier, e.g. `"PINHOLE"`.
    pub model: String,
    /// Calibration matrix assembled by the upstream solver.
    pub calibration: na::Matrix3<f64>,
}

/// One registered image with its estimated pose.
#[derive(Debug, Clone)]
pub struct ReconImage {
    pub camera_id: u32,
    pub name: String,
    /// World-to-camera orientation quaternion, `(w, x, y, z)`.
    pub qvec: [f64; 4],
    /// World-to-camera translation.
    pub tvec: na::Vector3<f64>,
}

/// One triangulated point with its observation track.
#[derive(Debug, Clone)]
pub struct ReconPoint {
    pub xyz: [f64; 3],
    /// `(image_id, feature_index)` pairs; only the image id is consumed here.
    pub track: Vec<(u32, u32)>,
}

/// A sparse reconstruction as produced by the upstream solver.
///
/// Image ids are the upstream's own, possibly sparse and non-contiguous;
/// `reg_image_ids` carries the registered subset in the upstream's
/// enumeration order.
#[derive(Debug, Clone, Default)]
pub struct SparseReconstruction {
    pub reg_image_ids: Vec<u32>,
    pub images: HashMap<u32, ReconImage>,
    pub cameras: HashMap<u32, ReconCamera>,
    pub points: Vec<ReconPoint>,
}

/// Loads a [`SparseReconstruction`] from a sparse-model directory.
pub trait ReconstructionSource {
    fn load(&self, sparse_dir: &Path) -> Result<SparseReconstruction, SceneError>;
}
