//! Ground-truth extraction over a synthetic dataset tree

use approx::assert_relative_eq;
use evblur::dataset::{extract_ground_truth, list_scenarios, DatasetError, FRAME_CLIP_DIR};
use evblur::image_proc::image::{load_gray, save_gray};
use ndarray::Array2;
use std::fs;
use std::path::Path;

fn write_frame(dir: &Path, name: &str, value: u8) {
    let frame = Array2::<u8>::from_elem((3, 5), value);
    save_gray(frame.view(), &dir.join(name)).unwrap();
}

#[test]
fn test_extract_ground_truth_copies_frames_and_timestamps() {
    let dataset = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();

    let clip = dataset.path().join("scene_a").join(FRAME_CLIP_DIR);
    fs::create_dir_all(&clip).unwrap();
    // Written out of order; extraction sorts by file name
    write_frame(&clip, "t2000000000-0001_gt.png", 20);
    write_frame(&clip, "t1500000000-0000_gt.png", 10);
    fs::write(clip.join("readme.txt"), "not a frame").unwrap();

    let out = output.path().join("scene_a");
    let timestamps = extract_ground_truth(&dataset.path().join("scene_a"), &out).unwrap();

    assert_eq!(timestamps.len(), 2);
    assert_relative_eq!(timestamps[0], 1.5, epsilon = 1e-12);
    assert_relative_eq!(timestamps[1], 2.0, epsilon = 1e-12);

    let first = load_gray(&out.join("gt").join("image_1500000000.png")).unwrap();
    assert_eq!(first.dim(), (3, 5));
    assert!(first.iter().all(|&v| v == 10));
    assert!(out.join("gt").join("image_2000000000.png").is_file());

    let text = fs::read_to_string(out.join("gt").join("timestamps.txt")).unwrap();
    assert_eq!(text, "1.5000000000\n2.0000000000\n");
}

#[test]
fn test_bad_frame_name_is_reported() {
    let dataset = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();

    let clip = dataset.path().join("scene").join(FRAME_CLIP_DIR);
    fs::create_dir_all(&clip).unwrap();
    write_frame(&clip, "frame_0001.png", 0);

    let result = extract_ground_truth(&dataset.path().join("scene"), output.path());
    assert!(matches!(result, Err(DatasetError::BadFileName(_))));
}

#[test]
fn test_failed_scenario_does_not_block_others() {
    let dataset = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();

    fs::create_dir_all(dataset.path().join("a_broken")).unwrap();
    let clip = dataset.path().join("b_good").join(FRAME_CLIP_DIR);
    fs::create_dir_all(&clip).unwrap();
    write_frame(&clip, "t100-0_gt.png", 1);

    let outcomes: Vec<bool> = list_scenarios(dataset.path())
        .unwrap()
        .iter()
        .map(|scenario| {
            let name = scenario.file_name().unwrap();
            extract_ground_truth(scenario, &output.path().join(name)).is_ok()
        })
        .collect();

    assert_eq!(outcomes, vec![false, true]);
    assert!(output.path().join("b_good/gt/image_100.png").is_file());
}
