use serde::Serialize;
use std::path::Path;

use crate::error::SceneError;
use crate::model::SceneModel;

/// Summary of a loaded scene, one entry per frame.
#[derive(Serialize)]
struct SceneReport {
    num_frames: usize,
    num_points: usize,
    frames: Vec<FrameReport>,
}

#[derive(Serialize)]
struct FrameReport {
    index: usize,
    name: String,
    image_path: String,
    depth_range: (f32, f32),
    num_neighbors: usize,
    num_shared_points: usize,
}

/// Writes a pretty-printed JSON summary of the scene: counts, per-frame depth
/// ranges, and co-visibility totals.
pub fn write_scene_report(output_path: &Path, model: &SceneModel) -> Result<(), SceneError> {
    let depth_ranges = model.compute_depth_ranges();
    let shared_points = model.compute_shared_points();

    let frames = model
        .frames
        .iter()
        .enumerate()
        .map(|(index, frame)| {
            let neighbors = &shared_points[index];
            Ok(FrameReport {
                index,
                name: model.name_of(index)?.to_string(),
                image_path: frame.image_path.to_string_lossy().into_owned(),
                depth_range: depth_ranges[index],
                num_neighbors: neighbors.len(),
                num_shared_points: neighbors.values().sum(),
            })
        })
        .collect::<Result<Vec<_>, SceneError>>()?;

    let report = SceneReport {
        num_frames: model.num_frames(),
        num_points: model.points.len(),
        frames,
    };

    let json = serde_json::to_string_pretty(&report).expect("report serialization is infallible");
    std::fs::write(output_path, json)?;
    Ok(())
}
