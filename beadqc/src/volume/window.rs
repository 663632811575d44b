use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Lateral crop rectangle in pixel coordinates. Crops always keep the full depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropWindow {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl CropWindow {
    pub const fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Window covering a whole `width x height` image.
    pub const fn full(width: usize, height: usize) -> Self {
        Self::new(0, 0, width, height)
    }

    #[inline]
    pub const fn fits(&self, width: usize, height: usize) -> bool {
        self.x + self.width <= width && self.y + self.height <= height
    }

    /// Map a position inside the window to the parent image.
    #[inline]
    pub fn to_parent(&self, pos: DVec2) -> DVec2 {
        pos + DVec2::new(self.x as f64, self.y as f64)
    }
}
