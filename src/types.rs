use nalgebra as na;
use std::path::PathBuf;

/// One camera viewpoint: calibration, world-to-camera pose, and the path of
/// the image it was reconstructed from.
#[derive(Debug, Clone)]
pub struct CameraFrame {
    pub image_path: PathBuf,
    /// Calibration matrix, focal length(s) and principal point only.
    pub k: na::Matrix3<f32>,
    /// World-to-camera rotation, orthonormal.
    pub r: na::Matrix3<f32>,
    /// World-to-camera translation.
    pub t: na::Vector3<f32>,
}

impl CameraFrame {
    /// Depth of a world point along this frame's optical axis (camera-space Z).
    pub fn viewing_depth(&self, p: glam::Vec3) -> f32 {
        self.r[(2, 0)] * p.x + self.r[(2, 1)] * p.y + self.r[(2, 2)] * p.z + self.t.z
    }
}

/// One triangulated 3D point and the frames observing it.
#[derive(Debug, Clone)]
pub struct SparsePoint {
    pub xyz: glam::Vec3,
    /// Dense frame indices observing this point. Duplicates are permitted but
    /// rare.
    pub track: Vec<usize>,
}

/// Per-pixel depth estimates, filled in by the dense stage.
#[derive(Debug, Clone, Default)]
pub struct DepthMap {
    pub width: usize,
    pub height: usize,
    pub data: Vec<f32>,
}

/// Per-pixel surface normals, filled in by the dense stage.
#[derive(Debug, Clone, Default)]
pub struct NormalMap {
    pub width: usize,
    pub height: usize,
    pub data: Vec<[f32; 3]>,
}

/// Per-pixel photo-consistency support, filled in by the dense stage.
#[derive(Debug, Clone, Default)]
pub struct ConsistencyGraph {
    pub data: Vec<i32>,
}
