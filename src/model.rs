use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::str::FromStr;

use crate::error::SceneError;
use crate::reconstruction::ReconstructionSource;
use crate::{colmap, pmvs};
use crate::types::{CameraFrame, ConsistencyGraph, DepthMap, NormalMap, SparsePoint};

/// Depth bounds are stretched outward by this ratio after the percentile cut.
const STRETCH_RATIO: f32 = 0.25;

/// The two supported on-disk scene layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneFormat {
    /// Canonical sparse reconstruction under `<root>/sparse`, images under
    /// `<root>/images`.
    Colmap,
    /// Legacy Bundler file at `<root>/bundle.rd.out`, images under
    /// `<root>/visualize`.
    Pmvs,
}

impl FromStr for SceneFormat {
    type Err = SceneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "COLMAP" => Ok(SceneFormat::Colmap),
            "PMVS" => Ok(SceneFormat::Pmvs),
            other => Err(SceneError::UnknownFormat(other.to_string())),
        }
    }
}

/// A normalized sparse scene: camera frames, triangulated points, and the
/// per-frame slots the dense stage fills in later.
///
/// Populated exactly once by one of the format readers, then read-mostly.
/// The frame list, point list, and both lookup tables stay parallel:
/// `frames.len() == image_names.len()` and every track index is a valid
/// frame index.
#[derive(Debug, Clone, Default)]
pub struct SceneModel {
    pub frames: Vec<CameraFrame>,
    pub points: Vec<SparsePoint>,
    image_names: Vec<String>,
    name_to_index: HashMap<String, usize>,
    /// One slot per frame, empty until the dense stage writes into them.
    pub depth_maps: Vec<DepthMap>,
    pub normal_maps: Vec<NormalMap>,
    pub consistency_graphs: Vec<ConsistencyGraph>,
}

impl SceneModel {
    /// Loads a scene rooted at `root` in the given format.
    ///
    /// `source` supplies the upstream sparse reconstruction for
    /// [`SceneFormat::Colmap`]; it is not consulted for the legacy format.
    /// Malformed input of any kind aborts the load, there are no partial
    /// results.
    pub fn read(
        root: &Path,
        format: SceneFormat,
        source: &dyn ReconstructionSource,
    ) -> Result<SceneModel, SceneError> {
        match format {
            SceneFormat::Colmap => colmap::read(root, source),
            SceneFormat::Pmvs => pmvs::read(root),
        }
    }

    /// Assembles a model from already-canonical parts, building the name
    /// table and sizing the dense-stage slots.
    ///
    /// `frames` and `image_names` must be parallel. Duplicate names and track
    /// entries outside the frame list are rejected.
    pub fn from_parts(
        frames: Vec<CameraFrame>,
        image_names: Vec<String>,
        points: Vec<SparsePoint>,
    ) -> Result<SceneModel, SceneError> {
        assert_eq!(frames.len(), image_names.len());

        let mut name_to_index = HashMap::with_capacity(image_names.len());
        for (index, name) in image_names.iter().enumerate() {
            if name_to_index.insert(name.clone(), index).is_some() {
                return Err(SceneError::DuplicateImageName(name.clone()));
            }
        }

        for (point_index, point) in points.iter().enumerate() {
            for &frame_index in &point.track {
                if frame_index >= frames.len() {
                    return Err(SceneError::TrackIndexOutOfRange {
                        point_index,
                        frame_index,
                        num_frames: frames.len(),
                    });
                }
            }
        }

        let num_frames = frames.len();
        Ok(SceneModel {
            frames,
            points,
            image_names,
            name_to_index,
            depth_maps: vec![DepthMap::default(); num_frames],
            normal_maps: vec![NormalMap::default(); num_frames],
            consistency_graphs: vec![ConsistencyGraph::default(); num_frames],
        })
    }

    pub fn num_frames(&self) -> usize {
        self.frames.len()
    }

    /// Dense index of the frame with the given image name.
    pub fn index_of(&self, name: &str) -> Result<usize, SceneError> {
        self.name_to_index
            .get(name)
            .copied()
            .ok_or_else(|| SceneError::UnknownImageName(name.to_string()))
    }

    /// Image name of the frame at the given dense index.
    pub fn name_of(&self, index: usize) -> Result<&str, SceneError> {
        self.image_names
            .get(index)
            .map(String::as_str)
            .ok_or(SceneError::FrameIndexOutOfRange {
                index,
                num_frames: self.image_names.len(),
            })
    }

    pub fn image_names(&self) -> &[String] {
        &self.image_names
    }

    /// Robust `[low, high]` scene-depth interval per frame, in frame order.
    ///
    /// Depths are sampled from the points each frame observes, samples behind
    /// the camera are discarded, and the interval is cut at the 1st and 99th
    /// percentile (truncating index selection, so a single sample yields
    /// `low == high`) before being stretched outward. A frame with no
    /// positive-depth sample gets the sentinel `(-1.0, -1.0)`.
    pub fn compute_depth_ranges(&self) -> Vec<(f32, f32)> {
        let mut depths: Vec<Vec<f32>> = vec![Vec::new(); self.frames.len()];
        for point in &self.points {
            for &frame_index in &point.track {
                let depth = self.frames[frame_index].viewing_depth(point.xyz);
                if depth > 0.0 {
                    depths[frame_index].push(depth);
                }
            }
        }

        depths
            .into_par_iter()
            .map(|mut samples| {
                if samples.is_empty() {
                    return (-1.0, -1.0);
                }
                samples.sort_by(f32::total_cmp);
                let n = samples.len();
                let low = samples[n / 100];
                let high = samples[n * 99 / 100];
                (low * (1.0 - STRETCH_RATIO), high * (1.0 + STRETCH_RATIO))
            })
            .collect()
    }

    /// Number of jointly observed points between every pair of frames.
    ///
    /// One ordered map per frame, keyed by neighbor frame index; frames that
    /// share nothing are absent. Counts are symmetric and self-pairs are
    /// skipped. Quadratic in track length per point, which stays small.
    pub fn compute_shared_points(&self) -> Vec<BTreeMap<usize, usize>> {
        let mut shared: Vec<BTreeMap<usize, usize>> = vec![BTreeMap::new(); self.frames.len()];
        for point in &self.points {
            for (i, &a) in point.track.iter().enumerate() {
                for &b in &point.track[..i] {
                    if a != b {
                        *shared[a].entry(b).or_insert(0) += 1;
                        *shared[b].entry(a).or_insert(0) += 1;
                    }
                }
            }
        }
        shared
    }
}
