//! Bead candidate detection, ranking and selection on a projection.

mod config;
mod crop;
mod maxima;


pub use config::{MaximaConfig, SelectionConfig};
pub use crop::{crop_size, crop_window, fov_window};
pub use maxima::{Candidate, find_maxima};

use std::cmp::Ordering;

/// Ranking order: intensity descending, then `y`, then `x`.
pub fn rank(a: &Candidate, b: &Candidate) -> Ordering {
    b.intensity
        .total_cmp(&a.intensity)
        .then(a.y.cmp(&b.y))
        .then(a.x.cmp(&b.x))
}

/// Greedily pick up to `config.count` candidates in ranking order, each
/// strictly farther than `config.min_separation` from every earlier pick.
///
/// Returns fewer beads when the candidates run out.
pub fn select_beads(candidates: &[Candidate], config: &SelectionConfig) -> Vec<Candidate> {
    config.validate();

    let mut ranked = candidates.to_vec();
    ranked.sort_by(rank);

    let min_sq = config.min_separation * config.min_separation;
    let mut selected: Vec<Candidate> = Vec::with_capacity(config.count.min(ranked.len()));
    for candidate in ranked {
        if selected.len() == config.count {
            break;
        }
        if selected
            .iter()
            .all(|s| s.distance_squared(&candidate) > min_sq)
        {
            selected.push(candidate);
        }
    }

    if selected.len() < config.count {
        tracing::debug!(
            "Selected {} of {} requested beads from {} candidates",
            selected.len(),
            config.count,
            candidates.len()
        );
    }
    selected
}
