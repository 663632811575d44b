use common::{Buffer2, Buffer3};
use glam::{DVec2, DVec3};

use super::*;
use crate::segmentation::SegmentationError;
use crate::testing::init_tracing;
use crate::testing::synthetic::{GaussianBead, bead_stack, disk, ellipsoid_stack};
use crate::volume::VoxelCalibration;

fn stack_from(data: Buffer3<f32>) -> Stack {
    Stack::new(data, SampleType::U16, VoxelCalibration::default()).unwrap()
}

// ============================================================================
// Max voxel
// ============================================================================

#[test]
fn test_max_voxel_single_plane_first_tie() {
    let mut data = Buffer3::new_filled(6, 5, 1, 10.0f32);
    data[(4, 1, 0)] = 50.0;
    data[(2, 3, 0)] = 50.0;
    let found = max_voxel(&stack_from(data));
    assert_eq!((found.x, found.y, found.z), (4, 1, 0));
    assert_eq!(found.value, 50.0);
}

#[test]
fn test_max_voxel_depth_from_column() {
    let mut data = Buffer3::new_filled(8, 8, 6, 0.0f32);
    data[(3, 5, 1)] = 20.0;
    data[(3, 5, 4)] = 90.0;
    data[(3, 5, 5)] = 90.0;
    data[(6, 2, 2)] = 40.0;
    let found = max_voxel(&stack_from(data));
    assert_eq!((found.x, found.y, found.z), (3, 5, 4));
    assert_eq!(found.value, 90.0);
}

#[test]
fn test_max_voxel_gaussian_bead() {
    let bead = GaussianBead::new(DVec3::new(12.0, 9.0, 7.0), DVec3::new(2.0, 2.0, 3.0), 800.0);
    let stack = bead_stack((24, 20, 15), &[bead], 100.0, None, VoxelCalibration::default());
    let found = max_voxel(&stack);
    assert_eq!((found.x, found.y, found.z), (12, 9, 7));
    assert_eq!(found.value, 900.0);
}

// ============================================================================
// Image localization
// ============================================================================

#[test]
fn test_locate_disk_center() {
    init_tracing();
    let image = disk(40, 40, (10.5, 20.5), 3.0, 1000.0, 100.0);
    let located = locate_in_image(&image, &LocalizationConfig::default()).unwrap();
    assert!((located.center - DVec2::new(10.5, 20.5)).length() < 1e-9);
    assert_eq!(located.refinements, 1);
    assert!(located.ellipse.minor > 5.0);
}

#[test]
fn test_locate_fills_holes() {
    // Ring with a dark core; the filled region is the whole disk.
    let mut image = disk(30, 30, (15.0, 15.0), 5.0, 1000.0, 100.0);
    for (x, y) in [(15, 15), (14, 15), (16, 15), (15, 14), (15, 16)] {
        image[(x, y)] = 100.0;
    }
    let located = locate_in_image(&image, &LocalizationConfig::default()).unwrap();
    assert!((located.center - DVec2::new(15.0, 15.0)).length() < 1e-9);
    assert_eq!(located.ellipse.area, 81);
}

/// A 1 px high line (minor axis about 1.13 px) to the right of a disk. The
/// initial seed row scan hits the line first.
fn disk_and_line() -> Buffer2<f32> {
    let mut image = disk(40, 40, (10.0, 20.0), 3.0, 1000.0, 100.0);
    for x in 25..40 {
        image[(x, 20)] = 1000.0;
    }
    image
}

#[test]
fn test_speckle_is_skipped() {
    let located = locate_in_image(&disk_and_line(), &LocalizationConfig::default()).unwrap();
    assert_eq!(located.refinements, 2);
    assert!((located.center - DVec2::new(10.0, 20.0)).length() < 1e-9);
    assert_eq!(located.ellipse.area, 29);
}

#[test]
fn test_refinement_budget() {
    let config = LocalizationConfig {
        max_refinements: 1,
        ..Default::default()
    };
    let err = locate_in_image(&disk_and_line(), &config).unwrap_err();
    match err {
        LocalizationError::NotConverged { rounds, minor_axis } => {
            assert_eq!(rounds, 1);
            assert!(minor_axis < 2.0);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_only_speckles_do_not_converge() {
    let mut image = Buffer2::new_filled(30, 30, 100.0f32);
    for x in 5..25 {
        image[(x, 12)] = 1000.0;
    }
    let err = locate_in_image(&image, &LocalizationConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        LocalizationError::NotConverged { rounds: 1, .. }
    ));
}

#[test]
fn test_seed_outside_mask() {
    // Two disks stacked vertically; their common center of mass lies on a
    // background row.
    let mut image = disk(30, 40, (15.0, 8.0), 3.0, 1000.0, 100.0);
    let lower = disk(30, 40, (15.0, 32.0), 3.0, 1000.0, 100.0);
    for (dst, &src) in image.pixels_mut().iter_mut().zip(lower.iter()) {
        *dst = dst.max(src);
    }
    let err = locate_in_image(&image, &LocalizationConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        LocalizationError::SeedOutsideMask { x: 15, y: 20 }
    ));
}

#[test]
fn test_flat_image_is_degenerate() {
    let image = Buffer2::new_filled(16, 16, 300.0f32);
    let err = locate_in_image(&image, &LocalizationConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        LocalizationError::Segmentation(SegmentationError::DegenerateClass { .. })
    ));
}

// ============================================================================
// Stack centroid
// ============================================================================

#[test]
fn test_centroid_3d() {
    let stack = ellipsoid_stack(
        (25, 28, 17),
        DVec3::new(12.0, 14.0, 8.0),
        DVec3::new(4.0, 4.0, 3.0),
        1000.0,
        100.0,
    );
    let centroid = locate_centroid(&stack, &LocalizationConfig::default()).unwrap();
    assert!(centroid.is_3d());
    assert!((centroid.position() - DVec3::new(12.0, 14.0, 8.0)).length() < 1e-9);
}

#[test]
fn test_centroid_single_plane_has_no_depth() {
    let stack = ellipsoid_stack(
        (20, 20, 1),
        DVec3::new(9.5, 10.0, 0.0),
        DVec3::new(4.0, 4.0, 1.0),
        500.0,
        0.0,
    );
    let centroid = locate_centroid(&stack, &LocalizationConfig::default()).unwrap();
    assert!(!centroid.is_3d());
    assert_eq!(centroid.position().z, 0.0);
    assert!((centroid.x - 9.5).abs() < 1e-9);
    assert!((centroid.y - 10.0).abs() < 1e-9);
}

#[test]
fn test_locate_in_yz_plane() {
    let stack = ellipsoid_stack(
        (20, 22, 12),
        DVec3::new(9.0, 11.0, 6.0),
        DVec3::new(3.0, 3.0, 3.0),
        1000.0,
        100.0,
    );
    let located = locate_in_plane(&stack, Plane::YZ, &LocalizationConfig::default()).unwrap();
    assert!((located.center - DVec2::new(11.0, 6.0)).length() < 1e-9);
}

#[test]
fn test_centroid_of_half_voxel_gaussian() {
    // Rendered values mirror about the center, so the mask centroid is exact.
    let bead = GaussianBead::new(DVec3::new(17.5, 17.5, 7.5), DVec3::new(2.0, 2.0, 2.5), 3000.0);
    let stack = bead_stack((36, 36, 16), &[bead], 200.0, None, VoxelCalibration::default());
    let centroid = locate_centroid(&stack, &LocalizationConfig::default()).unwrap();
    assert!((centroid.position() - DVec3::new(17.5, 17.5, 7.5)).length() < 1e-9);
}

#[test]
fn test_centroid_of_noisy_gaussian() {
    init_tracing();
    let truth = DVec3::new(16.8, 17.2, 6.7);
    let bead = GaussianBead::new(truth, DVec3::new(2.0, 2.0, 2.5), 3000.0);
    let stack = bead_stack(
        (34, 34, 14),
        &[bead],
        200.0,
        Some((5, 20.0)),
        VoxelCalibration::default(),
    );
    let centroid = locate_centroid(&stack, &LocalizationConfig::default()).unwrap();
    let error = (centroid.position() - truth).abs();
    assert!(error.max_element() < 0.5, "{:?} vs {truth:?}", centroid.position());
}
