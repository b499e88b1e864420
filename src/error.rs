use std::path::PathBuf;

/// Errors surfaced while loading a scene or querying a loaded model.
///
/// Every variant is fatal for the load in progress: readers never skip a bad
/// record or substitute a default, they abort and leave no partial model
/// behind. Loading is an offline one-shot stage, so malformed input is data
/// breakage to report upstream, not a condition to work around.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    /// Format tag is not one of the two recognized values.
    #[error("unknown scene format `{0}`, expected COLMAP or PMVS")]
    UnknownFormat(String),

    /// A registered image uses a calibration model other than undistorted
    /// pinhole.
    #[error("image `{image}` uses unsupported camera model `{model}`, only PINHOLE is supported")]
    UnsupportedCameraModel { image: String, model: String },

    /// Bundle file declares radial distortion; the legacy format is assumed
    /// distortion-free.
    #[error("image {image_index} has non-zero distortion (k1={k1}, k2={k2})")]
    NonZeroDistortion {
        image_index: usize,
        k1: f32,
        k2: f32,
    },

    /// Bundle file does not follow the expected grammar.
    #[error("malformed bundle file `{path}`: {detail}")]
    MalformedBundle { path: PathBuf, detail: String },

    /// Two frames carry the same image name, breaking the name table.
    #[error("duplicate image name `{0}`")]
    DuplicateImageName(String),

    /// A track entry references a frame index outside the loaded frame list.
    #[error("point {point_index} track references frame {frame_index}, but only {num_frames} frames exist")]
    TrackIndexOutOfRange {
        point_index: usize,
        frame_index: usize,
        num_frames: usize,
    },

    /// A track entry references an image id with no registered frame.
    #[error("point {point_index} track references unregistered image id {image_id}")]
    UnmappedImageId { point_index: usize, image_id: u32 },

    /// A registered image id has no image record in the reconstruction.
    #[error("registered image id {0} has no image record")]
    MissingImageRecord(u32),

    /// An image references a camera id with no camera record.
    #[error("image `{image}` references missing camera id {camera_id}")]
    MissingCameraRecord { image: String, camera_id: u32 },

    /// Name lookup over a name that no frame carries.
    #[error("no frame named `{0}`")]
    UnknownImageName(String),

    /// Index lookup outside `[0, frame_count)`.
    #[error("frame index {index} out of range, {num_frames} frames loaded")]
    FrameIndexOutOfRange { index: usize, num_frames: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Probe image for principal-point metadata could not be read.
    #[error(transparent)]
    Image(#[from] image::ImageError),
}
