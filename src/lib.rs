pub mod colmap;
pub mod error;
pub mod io;
pub mod model;
pub mod pmvs;
pub mod reconstruction;
pub mod types;

pub use error::SceneError;
pub use model::{SceneFormat, SceneModel};
pub use types::{CameraFrame, ConsistencyGraph, DepthMap, NormalMap, SparsePoint};
