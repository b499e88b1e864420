//! Reader for the legacy PMVS layout: a Bundler text file at
//! `<root>/bundle.rd.out` and positionally named images under
//! `<root>/visualize`.

use nalgebra as na;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::SceneError;
use crate::model::SceneModel;
use crate::types::{CameraFrame, SparsePoint};

/// Whitespace-token scanner over the bundle file body.
struct BundleScanner<'a> {
    tokens: std::str::SplitWhitespace<'a>,
    path: &'a Path,
}

impl<'a> BundleScanner<'a> {
    fn new(body: &'a str, path: &'a Path) -> Self {
        BundleScanner {
            tokens: body.split_whitespace(),
            path,
        }
    }

    fn malformed(&self, detail: impl Into<String>) -> SceneError {
        SceneError::MalformedBundle {
            path: self.path.to_path_buf(),
            detail: detail.into(),
        }
    }

    fn next_token(&mut self) -> Result<&'a str, SceneError> {
        self.tokens
            .next()
            .ok_or_else(|| self.malformed("unexpected end of file"))
    }

    fn next<T: FromStr>(&mut self) -> Result<T, SceneError> {
        let token = self.next_token()?;
        token
            .parse()
            .map_err(|_| self.malformed(format!("invalid value `{token}`")))
    }

    fn skip(&mut self, n: usize) -> Result<(), SceneError> {
        for _ in 0..n {
            self.next_token()?;
        }
        Ok(())
    }
}

/// Principal point is taken from the probe image's pixel dimensions; this is
/// the only place image files are consulted, and only their headers are read.
fn principal_point(image_path: &Path) -> Result<(f32, f32), SceneError> {
    let (width, height) = image::image_dimensions(image_path)?;
    Ok((width as f32 / 2.0, height as f32 / 2.0))
}

/// Parses `<root>/bundle.rd.out` into a canonical scene model.
///
/// The bundle convention points the camera down the negative Z axis; rotation
/// rows 1 and 2 and translation components 1 and 2 are negated to bring poses
/// into the canonical axes.
pub fn read(root: &Path) -> Result<SceneModel, SceneError> {
    let bundle_path = root.join("bundle.rd.out");
    let content = std::fs::read_to_string(&bundle_path)?;

    // First line is a version marker.
    let (_header, body) = content.split_once('\n').ok_or(SceneError::MalformedBundle {
        path: bundle_path.clone(),
        detail: "missing header line".into(),
    })?;
    let mut scanner = BundleScanner::new(body, &bundle_path);

    let num_images: usize = scanner.next()?;
    let num_points: usize = scanner.next()?;

    let mut frames = Vec::with_capacity(num_images);
    let mut image_names = Vec::with_capacity(num_images);
    for image_index in 0..num_images {
        let image_name = format!("{image_index:08}.jpg");
        let image_path: PathBuf = root.join("visualize").join(&image_name);

        let f: f32 = scanner.next()?;
        let (cx, cy) = principal_point(&image_path)?;
        let k = na::Matrix3::new(f, 0.0, cx, 0.0, f, cy, 0.0, 0.0, 1.0);

        let k1: f32 = scanner.next()?;
        let k2: f32 = scanner.next()?;
        if k1 != 0.0 || k2 != 0.0 {
            return Err(SceneError::NonZeroDistortion {
                image_index,
                k1,
                k2,
            });
        }

        let mut r = [0.0f32; 9];
        for value in r.iter_mut() {
            *value = scanner.next()?;
        }
        // Axis flip between the bundle camera frame and the canonical one.
        for value in r[3..].iter_mut() {
            *value = -*value;
        }

        let mut t = [0.0f32; 3];
        for value in t.iter_mut() {
            *value = scanner.next()?;
        }
        t[1] = -t[1];
        t[2] = -t[2];

        frames.push(CameraFrame {
            image_path,
            k,
            r: na::Matrix3::from_row_slice(&r),
            t: na::Vector3::new(t[0], t[1], t[2]),
        });
        image_names.push(image_name);
    }

    let mut points = Vec::with_capacity(num_points);
    for point_index in 0..num_points {
        let x: f32 = scanner.next()?;
        let y: f32 = scanner.next()?;
        let z: f32 = scanner.next()?;

        // Color triple is unused.
        scanner.skip(3)?;

        let track_len: usize = scanner.next()?;
        let mut track = Vec::with_capacity(track_len);
        for _ in 0..track_len {
            let frame_index: usize = scanner.next()?;
            if frame_index >= num_images {
                return Err(SceneError::TrackIndexOutOfRange {
                    point_index,
                    frame_index,
                    num_frames: num_images,
                });
            }
            track.push(frame_index);
            // Feature index and projection are unused.
            scanner.skip(3)?;
        }

        points.push(SparsePoint {
            xyz: glam::Vec3::new(x, y, z),
            track,
        });
    }

    log::info!(
        "loaded {num_images} frames and {num_points} points from {}",
        bundle_path.display()
    );

    SceneModel::from_parts(frames, image_names, points)
}
