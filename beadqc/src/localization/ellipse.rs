//! Area-preserving ellipse fit from second moments of a pixel region.

use std::f64::consts::PI;

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Ellipse with the same center, second moments and area as a pixel region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ellipse {
    /// Region centroid in pixel coordinates (pixel centers at integer indices).
    pub center: DVec2,
    /// Full length of the major axis, in pixels.
    pub major: f64,
    /// Full length of the minor axis, in pixels.
    pub minor: f64,
    /// Angle of the major axis from +x, radians in `(-pi/2, pi/2]`.
    pub angle: f64,
    /// Number of pixels in the region.
    pub area: usize,
}

/// Fit an ellipse to `pixels`. Returns `None` for an empty region.
///
/// Each pixel is treated as a unit square, which adds `1/12` to both
/// diagonal moments. The semi-axes of a uniform ellipse with variance `l`
/// along an axis are `2·sqrt(l)`; they are then rescaled so that the
/// ellipse area equals the pixel count.
pub fn fit_ellipse(pixels: &[(usize, usize)]) -> Option<Ellipse> {
    if pixels.is_empty() {
        return None;
    }
    let n = pixels.len() as f64;

    let sum = pixels
        .iter()
        .fold(DVec2::ZERO, |acc, &(x, y)| acc + DVec2::new(x as f64, y as f64));
    let center = sum / n;

    let (mut xx, mut yy, mut xy) = (0.0, 0.0, 0.0);
    for &(x, y) in pixels {
        let dx = x as f64 - center.x;
        let dy = y as f64 - center.y;
        xx += dx * dx;
        yy += dy * dy;
        xy += dx * dy;
    }
    let xx = xx / n + 1.0 / 12.0;
    let yy = yy / n + 1.0 / 12.0;
    let xy = xy / n;

    let half_trace = (xx + yy) / 2.0;
    let disc = (((xx - yy) / 2.0).powi(2) + xy * xy).sqrt();
    let l1 = half_trace + disc;
    let l2 = (half_trace - disc).max(0.0);

    let mut a = 2.0 * l1.sqrt();
    let mut b = 2.0 * l2.sqrt();
    if b > 0.0 {
        let scale = (n / (PI * a * b)).sqrt();
        a *= scale;
        b *= scale;
    }

    Some(Ellipse {
        center,
        major: 2.0 * a,
        minor: 2.0 * b,
        angle: 0.5 * (2.0 * xy).atan2(xx - yy),
        area: pixels.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn disc(cx: f64, cy: f64, r: f64) -> Vec<(usize, usize)> {
        let mut pixels = Vec::new();
        for y in 0..64 {
            for x in 0..64 {
                let (dx, dy) = (x as f64 - cx, y as f64 - cy);
                if dx * dx + dy * dy <= r * r {
                    pixels.push((x, y));
                }
            }
        }
        pixels
    }

    #[test]
    fn test_empty_region() {
        assert!(fit_ellipse(&[]).is_none());
    }

    #[test]
    fn test_single_pixel_is_below_two() {
        let e = fit_ellipse(&[(5, 7)]).unwrap();
        assert_eq!(e.center, DVec2::new(5.0, 7.0));
        // Circle of area 1: diameter 2/sqrt(pi).
        assert!((e.minor - 2.0 / PI.sqrt()).abs() < 1e-9);
        assert!(e.minor < 2.0);
    }

    #[test]
    fn test_disc_is_round() {
        let e = fit_ellipse(&disc(30.0, 20.0, 6.0)).unwrap();
        assert!((e.center - DVec2::new(30.0, 20.0)).length() < 1e-9);
        assert!((e.major - e.minor).abs() < 0.1);
        assert!((e.minor - 12.0).abs() < 0.5, "minor {}", e.minor);
    }

    #[test]
    fn test_horizontal_bar_orientation() {
        let pixels: Vec<_> = (0..20).flat_map(|x| (0..4).map(move |y| (x, y))).collect();
        let e = fit_ellipse(&pixels).unwrap();
        assert!(e.angle.abs() < 1e-9);
        assert!(e.major > 3.0 * e.minor);
        let area = PI * e.major * e.minor / 4.0;
        assert!((area - 80.0).abs() < 1e-6);
    }

    #[test]
    fn test_diagonal_orientation() {
        let pixels: Vec<_> = (0..15).map(|i| (i, i)).collect();
        let e = fit_ellipse(&pixels).unwrap();
        assert!((e.angle - PI / 4.0).abs() < 1e-9);
    }
}
