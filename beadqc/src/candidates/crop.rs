//! Crop windows around selected beads.

use crate::volume::CropWindow;

/// Side of the square crop around a bead: three bead diameters in pixels,
/// never below `min_size`.
pub fn crop_size(bead_size_um: f64, pixel_size_um: f64, min_size: usize) -> usize {
    let size = (3.0 * bead_size_um / pixel_size_um).round();
    if size.is_finite() && size > min_size as f64 {
        size as usize
    } else {
        min_size
    }
}

/// Square window of side `size` centred on `center`, shifted to lie inside a
/// `width x height` image. The side shrinks to the image when it is larger.
pub fn crop_window(center: (usize, usize), size: usize, width: usize, height: usize) -> CropWindow {
    let w = size.min(width);
    let h = size.min(height);
    let x = center.0.saturating_sub(w / 2).min(width - w);
    let y = center.1.saturating_sub(h / 2).min(height - h);
    CropWindow::new(x, y, w, h)
}

/// Central `fov x fov` window. Axes not larger than `fov` are kept whole.
pub fn fov_window(width: usize, height: usize, fov: usize) -> CropWindow {
    let (x, w) = if width > fov {
        ((width - fov) / 2, fov)
    } else {
        (0, width)
    };
    let (y, h) = if height > fov {
        ((height - fov) / 2, fov)
    } else {
        (0, height)
    };
    CropWindow::new(x, y, w, h)
}
