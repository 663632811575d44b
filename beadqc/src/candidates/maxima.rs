//! Local maxima with a noise tolerance on a 2D projection.

use common::Buffer2;
use serde::{Deserialize, Serialize};

use super::MaximaConfig;
use crate::math::Aabb;

const NEIGHBORS: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Bright spot found on a projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub x: usize,
    pub y: usize,
    pub intensity: f32,
}

impl Candidate {
    pub const fn new(x: usize, y: usize, intensity: f32) -> Self {
        Self { x, y, intensity }
    }

    #[inline]
    pub fn distance_squared(&self, other: &Candidate) -> f64 {
        let dx = self.x as f64 - other.x as f64;
        let dy = self.y as f64 - other.y as f64;
        dx * dx + dy * dy
    }
}

fn neighbors(
    image: &Buffer2<f32>,
    x: usize,
    y: usize,
) -> impl Iterator<Item = (usize, usize)> + '_ {
    NEIGHBORS.iter().filter_map(move |&(dx, dy)| {
        let nx = x as isize + dx;
        let ny = y as isize + dy;
        image
            .contains(nx, ny)
            .then_some((nx as usize, ny as usize))
    })
}

/// Find the prominent maxima of `image`, brightest first.
///
/// Every pixel not lower than its 8 neighbors seeds a candidate. Seeds are
/// processed from the brightest; each floods the connected area of pixels
/// above `seed - noise_tolerance`. A seed is rejected when its flood reaches
/// a brighter pixel or an area already claimed by an earlier seed, and its
/// area is claimed either way. Equal pixels in the area form a plateau that
/// is represented by the plateau pixel closest to the plateau centroid.
pub fn find_maxima(image: &Buffer2<f32>, config: &MaximaConfig) -> Vec<Candidate> {
    config.validate();

    let mut seeds: Vec<Candidate> = Vec::new();
    for y in 0..image.height() {
        for x in 0..image.width() {
            let v = image[(x, y)];
            if !v.is_finite() || config.threshold.is_some_and(|t| v <= t) {
                continue;
            }
            if !neighbors(image, x, y).any(|n| image[n] > v) {
                seeds.push(Candidate::new(x, y, v));
            }
        }
    }
    // Stable sort keeps scan order among equal seeds.
    seeds.sort_by(|a, b| b.intensity.total_cmp(&a.intensity));

    let mut claimed = Buffer2::new_filled(image.width(), image.height(), false);
    let mut listed = Buffer2::new_filled(image.width(), image.height(), false);
    let mut area: Vec<(usize, usize)> = Vec::new();
    let mut maxima = Vec::new();

    for seed in seeds {
        if claimed[(seed.x, seed.y)] {
            continue;
        }
        let v0 = seed.intensity;
        let floor = v0 - config.noise_tolerance;

        area.clear();
        area.push((seed.x, seed.y));
        listed[(seed.x, seed.y)] = true;
        let mut accepted = true;
        let mut bounds = Aabb::empty();
        bounds.include(seed.x, seed.y);

        let mut next = 0;
        'flood: while next < area.len() {
            let (x, y) = area[next];
            next += 1;
            for n in neighbors(image, x, y) {
                if listed[n] {
                    continue;
                }
                let v = image[n];
                if claimed[n] || v > v0 {
                    accepted = false;
                    break 'flood;
                }
                if v >= floor && v.is_finite() {
                    listed[n] = true;
                    area.push(n);
                    bounds.include(n.0, n.1);
                }
            }
        }

        let on_edge = bounds.touches_border(image.width(), image.height());
        if accepted && !(config.exclude_edges && on_edge) {
            maxima.push(plateau_representative(image, &area, v0));
        }

        for &p in &area {
            listed[p] = false;
            claimed[p] = true;
        }
    }

    tracing::debug!(
        "Found {} maxima with noise tolerance {}",
        maxima.len(),
        config.noise_tolerance
    );
    maxima
}

fn plateau_representative(image: &Buffer2<f32>, area: &[(usize, usize)], v0: f32) -> Candidate {
    let plateau: Vec<(usize, usize)> = area
        .iter()
        .copied()
        .filter(|&p| image[p] == v0)
        .collect();

    let n = plateau.len() as f64;
    let (sx, sy) = plateau
        .iter()
        .fold((0.0, 0.0), |(sx, sy), &(x, y)| (sx + x as f64, sy + y as f64));
    let (cx, cy) = (sx / n, sy / n);

    let mut best = plateau[0];
    let mut best_d = f64::INFINITY;
    for &(x, y) in &plateau {
        let d = (x as f64 - cx).powi(2) + (y as f64 - cy).powi(2);
        if d < best_d {
            best_d = d;
            best = (x, y);
        }
    }
    Candidate::new(best.0, best.1, v0)
}
