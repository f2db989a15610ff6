//! Deblurring dataset layout helpers.
//!
//! A dataset directory holds one sub-directory per scenario. Ground-truth
//! frames live in `<scenario>/frame_clip/` and carry their start timestamp in
//! the file name: the text before the first `_`, then before the first `-`,
//! after a one-character prefix, is an integer nanosecond count
//! (`t000001500000000-000_gt.png` starts at 1.5 s).

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Directory inside a scenario that holds ground-truth frames
pub const FRAME_CLIP_DIR: &str = "frame_clip";

/// Output sub-directory for extracted ground truth
pub const GT_DIR: &str = "gt";

pub const TIMESTAMPS_FILE: &str = "timestamps.txt";

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Scenario {} has no frame_clip directory", .0.display())]
    MissingFrameClip(PathBuf),

    #[error("Cannot parse a timestamp from file name {0:?}")]
    BadFileName(String),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> DatasetError + '_ {
    move |source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Parse the start timestamp in nanoseconds from a frame file name.
pub fn parse_frame_timestamp(file_name: &str) -> Result<u64, DatasetError> {
    let bad_name = || DatasetError::BadFileName(file_name.to_string());

    let token = file_name.split('_').next().unwrap_or_default();
    let token = token.split('-').next().unwrap_or_default();
    let mut chars = token.chars();
    chars.next().ok_or_else(bad_name)?;

    chars.as_str().parse().map_err(|_| bad_name())
}

/// Sorted sub-directories of `dataset_dir`.
pub fn list_scenarios(dataset_dir: &Path) -> Result<Vec<PathBuf>, DatasetError> {
    let mut scenarios = Vec::new();
    for entry in fs::read_dir(dataset_dir).map_err(io_err(dataset_dir))? {
        let path = entry.map_err(io_err(dataset_dir))?.path();
        if path.is_dir() {
            scenarios.push(path);
        }
    }
    scenarios.sort();
    Ok(scenarios)
}

/// Sorted `*.png` files directly inside `dir`.
fn list_png_files(dir: &Path) -> Result<Vec<PathBuf>, DatasetError> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err(dir))? {
        let path = entry.map_err(io_err(dir))?.path();
        let is_png = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
        if path.is_file() && is_png {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Copy a scenario's ground-truth frames into `output_dir/gt`.
///
/// Frames are renamed `image_<nanoseconds>.png` and their start times are
/// written to `gt/timestamps.txt`, one value in seconds per line.
///
/// # Returns
/// The frame timestamps in seconds, in file-name order
pub fn extract_ground_truth(
    scenario_dir: &Path,
    output_dir: &Path,
) -> Result<Vec<f64>, DatasetError> {
    let frame_clip = scenario_dir.join(FRAME_CLIP_DIR);
    if !frame_clip.is_dir() {
        return Err(DatasetError::MissingFrameClip(scenario_dir.to_path_buf()));
    }

    let gt_dir = output_dir.join(GT_DIR);
    fs::create_dir_all(&gt_dir).map_err(io_err(&gt_dir))?;

    let mut timestamps = Vec::new();
    for frame in list_png_files(&frame_clip)? {
        let file_name = frame
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default();
        let nanos = parse_frame_timestamp(file_name)?;

        let target = gt_dir.join(format!("image_{nanos}.png"));
        fs::copy(&frame, &target).map_err(io_err(&target))?;
        timestamps.push(nanos as f64 * 1e-9);
    }

    let timestamps_path = gt_dir.join(TIMESTAMPS_FILE);
    let mut file = fs::File::create(&timestamps_path).map_err(io_err(&timestamps_path))?;
    for ts in &timestamps {
        writeln!(file, "{ts:.10}").map_err(io_err(&timestamps_path))?;
    }

    log::info!(
        "Extracted {} ground-truth frames from {}",
        timestamps.len(),
        scenario_dir.display()
    );

    Ok(timestamps)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_frame_timestamp() {
        assert_eq!(parse_frame_timestamp("t000123-abc_gt.png").unwrap(), 123);
        assert_eq!(
            parse_frame_timestamp("t1500000000_frame.png").unwrap(),
            1_500_000_000
        );
    }

    #[test]
    fn test_parse_frame_timestamp_rejects_garbage() {
        assert!(matches!(
            parse_frame_timestamp("frame.png"),
            Err(DatasetError::BadFileName(_))
        ));
        assert!(parse_frame_timestamp("").is_err());
        assert!(parse_frame_timestamp("t-12_x.png").is_err());
    }

    #[test]
    fn test_missing_frame_clip() {
        let dir = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        assert!(matches!(
            extract_ground_truth(dir.path(), out.path()),
            Err(DatasetError::MissingFrameClip(_))
        ));
    }

    #[test]
    fn test_list_scenarios_sorted_dirs_only() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("b")).unwrap();
        fs::create_dir(dir.path().join("a")).unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();

        let scenarios = list_scenarios(dir.path()).unwrap();

        assert_eq!(scenarios, vec![dir.path().join("a"), dir.path().join("b")]);
    }
}
