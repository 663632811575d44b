//! Region growing on a binary mask.

use std::collections::VecDeque;

use common::Buffer2;

use super::Connectivity;
use crate::math::Aabb;

/// Connected set of foreground pixels.
#[derive(Debug, Clone)]
pub struct Region {
    pub pixels: Vec<(usize, usize)>,
    pub bbox: Aabb,
}

impl Region {
    #[inline]
    pub fn area(&self) -> usize {
        self.pixels.len()
    }
}

/// Grow the region of `mask` that contains `seed`.
///
/// If the seed pixel is background the row is scanned to the right for the
/// first foreground pixel. Returns `None` when that scan finds nothing.
pub fn grow_region(
    mask: &Buffer2<bool>,
    seed: (usize, usize),
    connectivity: Connectivity,
) -> Option<Region> {
    let (sx, sy) = seed;
    let start_x = (sx..mask.width()).find(|&x| mask[(x, sy)])?;

    let mut visited = Buffer2::new_filled(mask.width(), mask.height(), false);
    let mut queue = VecDeque::new();
    let mut pixels = Vec::new();
    let mut bbox = Aabb::empty();

    visited[(start_x, sy)] = true;
    queue.push_back((start_x, sy));
    while let Some((x, y)) = queue.pop_front() {
        pixels.push((x, y));
        bbox.include(x, y);

        for &(dx, dy) in connectivity.offsets() {
            let nx = x as isize + dx;
            let ny = y as isize + dy;
            if !mask.contains(nx, ny) {
                continue;
            }
            let n = (nx as usize, ny as usize);
            if mask[n] && !visited[n] {
                visited[n] = true;
                queue.push_back(n);
            }
        }
    }

    Some(Region { pixels, bbox })
}

/// Add every background pixel enclosed by `region`.
///
/// Background reachable from outside the bounding box (with the complementary
/// connectivity) stays outside; everything else inside the box is a hole.
pub fn fill_holes(region: &Region, connectivity: Connectivity) -> Region {
    let bbox = region.bbox;
    // One pixel of padding on every side guarantees a connected outside.
    let w = bbox.width() + 2;
    let h = bbox.height() + 2;

    let mut inside = Buffer2::new_filled(w, h, false);
    for &(x, y) in &region.pixels {
        inside[(x - bbox.x_min + 1, y - bbox.y_min + 1)] = true;
    }

    let mut outside = Buffer2::new_filled(w, h, false);
    let mut queue = VecDeque::from([(0usize, 0usize)]);
    outside[(0, 0)] = true;
    let background = connectivity.complement();
    while let Some((x, y)) = queue.pop_front() {
        for &(dx, dy) in background.offsets() {
            let nx = x as isize + dx;
            let ny = y as isize + dy;
            if !inside.contains(nx, ny) {
                continue;
            }
            let n = (nx as usize, ny as usize);
            if !inside[n] && !outside[n] {
                outside[n] = true;
                queue.push_back(n);
            }
        }
    }

    let mut pixels = region.pixels.clone();
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            if !inside[(x, y)] && !outside[(x, y)] {
                pixels.push((x - 1 + bbox.x_min, y - 1 + bbox.y_min));
            }
        }
    }

    Region { pixels, bbox }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask_from(rows: &[&str]) -> Buffer2<bool> {
        let width = rows[0].len();
        let pixels = rows
            .iter()
            .flat_map(|row| row.chars().map(|c| c == '#'))
            .collect();
        Buffer2::new(width, rows.len(), pixels)
    }

    #[test]
    fn test_grow_from_inside_seed() {
        let mask = mask_from(&[
            "......", //
            ".##...",
            ".##..#",
            "......",
        ]);
        let region = grow_region(&mask, (1, 1), Connectivity::Eight).unwrap();
        assert_eq!(region.area(), 4);
        assert_eq!((region.bbox.x_min, region.bbox.x_max), (1, 2));
    }

    #[test]
    fn test_seed_scans_right() {
        let mask = mask_from(&[
            "......", //
            "...##.",
        ]);
        let region = grow_region(&mask, (0, 1), Connectivity::Eight).unwrap();
        assert_eq!(region.area(), 2);
        assert_eq!(region.bbox.x_min, 3);
    }

    #[test]
    fn test_seed_row_without_foreground() {
        let mask = mask_from(&[
            "##....", //
            "......",
        ]);
        assert!(grow_region(&mask, (0, 1), Connectivity::Eight).is_none());
        // Foreground only to the left of the seed is not found either.
        assert!(grow_region(&mask, (3, 0), Connectivity::Eight).is_none());
    }

    #[test]
    fn test_diagonal_connectivity() {
        let mask = mask_from(&[
            "#..", //
            ".#.",
            "..#",
        ]);
        assert_eq!(
            grow_region(&mask, (0, 0), Connectivity::Eight)
                .unwrap()
                .area(),
            3
        );
        assert_eq!(
            grow_region(&mask, (0, 0), Connectivity::Four)
                .unwrap()
                .area(),
            1
        );
    }

    #[test]
    fn test_fill_holes_ring() {
        let mask = mask_from(&[
            ".....", //
            ".###.",
            ".#.#.",
            ".###.",
            ".....",
        ]);
        let region = grow_region(&mask, (1, 1), Connectivity::Eight).unwrap();
        assert_eq!(region.area(), 8);
        let filled = fill_holes(&region, Connectivity::Eight);
        assert_eq!(filled.area(), 9);
        assert!(filled.pixels.contains(&(2, 2)));
    }

    #[test]
    fn test_fill_holes_keeps_open_notch() {
        let mask = mask_from(&[
            "###", //
            "#.#",
            "#.#",
        ]);
        let region = grow_region(&mask, (0, 0), Connectivity::Eight).unwrap();
        let filled = fill_holes(&region, Connectivity::Eight);
        assert_eq!(filled.area(), region.area());
    }
}
