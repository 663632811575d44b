use common::Buffer2;
use glam::DVec2;

use super::*;
use crate::testing::init_tracing;
use crate::testing::synthetic::volume_from_stacks;
use crate::volume::{CropWindow, SampleType, Stack, VolumeError};

fn calibration() -> VoxelCalibration {
    VoxelCalibration::micrometers(0.2, 0.2, 0.5).unwrap()
}

/// Radial falloff `peak * (1 - k * r^2)` around `(cx, cy)`.
fn vignette(width: usize, height: usize, (cx, cy): (f64, f64), peak: f32, k: f64) -> Buffer2<f32> {
    Buffer2::from_fn(width, height, |x, y| {
        let r2 = (x as f64 - cx).powi(2) + (y as f64 - cy).powi(2);
        (peak as f64 * (1.0 - k * r2)) as f32
    })
}

fn stack_of(planes: &[Buffer2<f32>]) -> Stack {
    let (w, h) = (planes[0].width(), planes[0].height());
    let data = common::Buffer3::from_fn(w, h, planes.len(), |x, y, z| planes[z][(x, y)]);
    Stack::new(data, SampleType::U16, calibration()).unwrap()
}

// ============================================================================
// Landmarks
// ============================================================================

#[test]
fn test_landmark_positions() {
    assert_eq!(Landmark::TopLeft.position(9, 6), (0, 0));
    assert_eq!(Landmark::TopRight.position(9, 6), (8, 0));
    assert_eq!(Landmark::BottomLeft.position(9, 6), (0, 5));
    assert_eq!(Landmark::BottomRight.position(9, 6), (8, 5));
    assert_eq!(Landmark::TopMiddle.position(9, 6), (4, 0));
    assert_eq!(Landmark::BottomMiddle.position(9, 6), (4, 5));
    assert_eq!(Landmark::LeftMiddle.position(9, 6), (0, 3));
    assert_eq!(Landmark::RightMiddle.position(9, 6), (8, 3));
    assert_eq!(Landmark::ALL.iter().filter(|l| l.is_corner()).count(), 4);
}

// ============================================================================
// Single image
// ============================================================================

#[test]
fn test_uniform_field_is_flat() {
    let image = Buffer2::new_filled(20, 20, 500.0f32);
    let report = analyze_illumination(&image, &calibration()).unwrap();
    assert_eq!(report.image_center, DVec2::new(10.0, 10.0));
    assert!((report.intensity_center - DVec2::new(9.5, 9.5)).length() < 1e-9);
    assert_eq!(report.min_corner_relative, 1.0);
    assert!(report.landmarks.iter().all(|l| l.relative == 1.0));
    // Every pixel ties; the last one in scan order wins.
    assert_eq!(report.max_position, (19, 19));
}

#[test]
fn test_centered_vignetting() {
    init_tracing();
    // Corners of a 21x21 image lie 10 * sqrt(2) from the center.
    let image = vignette(21, 21, (10.0, 10.0), 1000.0, 0.0025);
    let report = analyze_illumination(&image, &calibration()).unwrap();

    assert_eq!(report.max_position, (10, 10));
    assert_eq!(report.max_value, 1000.0);
    assert_eq!(report.max_offset_um, 0.0);
    assert!(report.center_offset_um < 1e-9);
    assert!((report.min_corner_relative - 0.5).abs() < 1e-6);

    let top = report.landmark(Landmark::TopMiddle).unwrap();
    assert_eq!((top.x, top.y), (10, 0));
    assert!((top.relative - 0.75).abs() < 1e-6);
    let corner = report.landmark(Landmark::BottomRight).unwrap();
    assert_eq!(corner.intensity, 500.0);
}

#[test]
fn test_off_center_illumination() {
    // Hot spot 5 px right of and 2 px above the image center.
    let image = vignette(31, 21, (20.0, 8.0), 1000.0, 0.0005);
    let report = analyze_illumination(&image, &calibration()).unwrap();

    assert_eq!(report.image_center, DVec2::new(15.0, 10.0));
    assert_eq!(report.max_position, (20, 8));
    let expected_max_offset = (1.0f64 + 0.16).sqrt();
    assert!((report.max_offset_um - expected_max_offset).abs() < 1e-9);

    assert!(report.intensity_center.x > 15.0);
    assert!(report.intensity_center.y < 10.0);
    assert!(report.center_offset_um > 0.0);
    assert!(report.center_offset_um < report.max_offset_um);

    let left = report.landmark(Landmark::TopLeft).unwrap().relative;
    let right = report.landmark(Landmark::TopRight).unwrap().relative;
    assert!(left < right);
    let darkest = report.landmark(Landmark::BottomLeft).unwrap();
    assert_eq!(report.min_corner_relative, darkest.relative);
}

#[test]
fn test_dark_image_has_no_signal() {
    let image = Buffer2::new_filled(8, 8, 0.0f32);
    assert!(matches!(
        analyze_illumination(&image, &calibration()),
        Err(IlluminationError::NoSignal)
    ));
}

// ============================================================================
// Volume
// ============================================================================

#[test]
fn test_field_reports_every_channel() {
    let flat = Buffer2::new_filled(21, 21, 800.0f32);
    let dim = vignette(21, 21, (10.0, 10.0), 1000.0, 0.0025);
    let volume = volume_from_stacks(&[
        stack_of(&[dim.clone(), flat.clone()]),
        stack_of(&[flat, dim]),
    ]);

    let reports = analyze_illumination_field(&volume, &IlluminationConfig::default()).unwrap();
    assert_eq!(reports.len(), 2);
    assert!((reports[0].min_corner_relative - 0.5).abs() < 1e-6);
    assert_eq!(reports[1].min_corner_relative, 1.0);

    let second_plane = IlluminationConfig {
        plane: 1,
        ..Default::default()
    };
    let reports = analyze_illumination_field(&volume, &second_plane).unwrap();
    assert_eq!(reports[0].min_corner_relative, 1.0);
    assert!((reports[1].min_corner_relative - 0.5).abs() < 1e-6);
}

#[test]
fn test_field_crops_central_window() {
    let image = vignette(41, 41, (20.0, 20.0), 1000.0, 0.0025);
    let volume = volume_from_stacks(&[stack_of(&[image])]);
    let config = IlluminationConfig {
        fov_size: Some(21),
        ..Default::default()
    };
    assert_eq!(fov_window(41, 41, 21), CropWindow::new(10, 10, 21, 21));

    let reports = analyze_illumination_field(&volume, &config).unwrap();
    assert_eq!(reports[0].max_position, (10, 10));
    assert!((reports[0].min_corner_relative - 0.5).abs() < 1e-6);
}

#[test]
fn test_field_plane_out_of_range() {
    let volume = volume_from_stacks(&[stack_of(&[Buffer2::new_filled(4, 4, 1.0f32)])]);
    let config = IlluminationConfig {
        plane: 1,
        ..Default::default()
    };
    assert!(matches!(
        analyze_illumination_field(&volume, &config),
        Err(IlluminationError::PlaneOutOfRange { plane: 1, depth: 1 })
    ));

    let config = IlluminationConfig {
        frame: 2,
        ..Default::default()
    };
    assert!(matches!(
        analyze_illumination_field(&volume, &config),
        Err(IlluminationError::Volume(VolumeError::FrameOutOfRange { frame: 2, frames: 1 }))
    ));
}
