use std::ops::{Index, IndexMut};

use crate::buffer2::Buffer2;

/// Dense 3D buffer stored plane by plane. Voxel `(x, y, z)` lives at
/// `(z * height + y) * width + x`, so each z-plane is a contiguous
/// row-major [`Buffer2`]-shaped slice.
#[derive(Debug, Clone, PartialEq)]
pub struct Buffer3<T> {
    voxels: Vec<T>,
    width: usize,
    height: usize,
    depth: usize,
}

impl<T> Buffer3<T> {
    pub fn new(width: usize, height: usize, depth: usize, voxels: Vec<T>) -> Self {
        assert_eq!(
            voxels.len(),
            width * height * depth,
            "voxels length must equal width * height * depth"
        );
        Self {
            voxels,
            width,
            height,
            depth,
        }
    }

    pub fn from_fn(
        width: usize,
        height: usize,
        depth: usize,
        mut f: impl FnMut(usize, usize, usize) -> T,
    ) -> Self {
        let mut voxels = Vec::with_capacity(width * height * depth);
        for z in 0..depth {
            for y in 0..height {
                for x in 0..width {
                    voxels.push(f(x, y, z));
                }
            }
        }
        Self {
            voxels,
            width,
            height,
            depth,
        }
    }

    #[inline]
    pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
        debug_assert!(x < self.width && y < self.height && z < self.depth);
        (z * self.height + y) * self.width + x
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.voxels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.voxels.is_empty()
    }

    #[inline]
    pub fn voxels(&self) -> &[T] {
        &self.voxels
    }

    #[inline]
    pub fn plane(&self, z: usize) -> &[T] {
        let size = self.width * self.height;
        &self.voxels[z * size..(z + 1) * size]
    }
}

impl<T: Copy> Buffer3<T> {
    /// Copy of z-plane `z` as a 2D buffer.
    pub fn plane_buffer(&self, z: usize) -> Buffer2<T> {
        Buffer2::new(self.width, self.height, self.plane(z).to_vec())
    }

    /// Samples along x at fixed `(y, z)`.
    pub fn line_x(&self, y: usize, z: usize) -> Vec<T> {
        let start = self.index(0, y, z);
        self.voxels[start..start + self.width].to_vec()
    }

    /// Samples along y at fixed `(x, z)`.
    pub fn line_y(&self, x: usize, z: usize) -> Vec<T> {
        (0..self.height).map(|y| self[(x, y, z)]).collect()
    }

    /// Samples along z at fixed `(x, y)`.
    pub fn line_z(&self, x: usize, y: usize) -> Vec<T> {
        (0..self.depth).map(|z| self[(x, y, z)]).collect()
    }

    /// Copy of the box starting at `origin` with the given size.
    pub fn crop(&self, origin: (usize, usize, usize), size: (usize, usize, usize)) -> Self {
        let (x0, y0, z0) = origin;
        let (w, h, d) = size;
        assert!(
            x0 + w <= self.width && y0 + h <= self.height && z0 + d <= self.depth,
            "crop box exceeds buffer bounds"
        );
        Self::from_fn(w, h, d, |x, y, z| self[(x0 + x, y0 + y, z0 + z)])
    }
}

impl<T: Clone> Buffer3<T> {
    pub fn new_filled(width: usize, height: usize, depth: usize, value: T) -> Self {
        Self {
            voxels: vec![value; width * height * depth],
            width,
            height,
            depth,
        }
    }
}

impl<T> Index<(usize, usize, usize)> for Buffer3<T> {
    type Output = T;

    #[inline]
    fn index(&self, (x, y, z): (usize, usize, usize)) -> &Self::Output {
        &self.voxels[(z * self.height + y) * self.width + x]
    }
}

impl<T> IndexMut<(usize, usize, usize)> for Buffer3<T> {
    #[inline]
    fn index_mut(&mut self, (x, y, z): (usize, usize, usize)) -> &mut Self::Output {
        &mut self.voxels[(z * self.height + y) * self.width + x]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> Buffer3<u32> {
        Buffer3::from_fn(4, 3, 2, |x, y, z| (100 * z + 10 * y + x) as u32)
    }

    #[test]
    fn test_layout_is_plane_major() {
        let buf = ramp();
        assert_eq!(buf.len(), 24);
        assert_eq!(buf.index(1, 2, 1), 12 + 8 + 1);
        assert_eq!(buf[(1, 2, 1)], 121);
    }

    #[test]
    #[should_panic(expected = "voxels length must equal width * height * depth")]
    fn test_new_panics_on_size_mismatch() {
        Buffer3::new(2, 2, 2, vec![0u8; 7]);
    }

    #[test]
    fn test_plane_buffer() {
        let plane = ramp().plane_buffer(1);
        assert_eq!(plane.width(), 4);
        assert_eq!(plane.height(), 3);
        assert_eq!(plane[(3, 2)], 123);
    }

    #[test]
    fn test_lines() {
        let buf = ramp();
        assert_eq!(buf.line_x(1, 1), vec![110, 111, 112, 113]);
        assert_eq!(buf.line_y(2, 0), vec![2, 12, 22]);
        assert_eq!(buf.line_z(3, 2), vec![23, 123]);
    }

    #[test]
    fn test_crop_copies_box() {
        let cropped = ramp().crop((1, 1, 1), (2, 2, 1));
        assert_eq!(cropped.width(), 2);
        assert_eq!(cropped.depth(), 1);
        assert_eq!(cropped.voxels(), &[111, 112, 121, 122]);
    }

    #[test]
    #[should_panic(expected = "crop box exceeds buffer bounds")]
    fn test_crop_out_of_bounds_panics() {
        ramp().crop((3, 0, 0), (2, 1, 1));
    }
}
