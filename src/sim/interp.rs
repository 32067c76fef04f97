//! Rendering-only motion interpolation
//!
//! Maps raw tick progress into eased per-segment positions. This is a
//! deterministic function of (previous positions, current positions,
//! progress) with no hidden state, and it never affects game logic.

use glam::Vec2;

use super::grid::{Cell, Grid};
use crate::consts::SEGMENT_STAGGER;

/// Cubic ease-in-out
pub fn ease(t: f64) -> f64 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// Eased progress for segment `index`. Each segment lags the one before it
/// by a small constant, producing a trailing wave down the body; a segment
/// whose delayed progress has not started yet sits at zero, i.e. at its
/// previous position.
pub fn segment_progress(progress: f64, index: usize) -> f64 {
    let delayed = (progress - index as f64 * SEGMENT_STAGGER).max(0.0);
    ease(delayed.clamp(0.0, 1.0))
}

/// Interpolated pixel position of every segment. Segments without a
/// previous position (fresh growth this tick) render at their current
/// cell.
pub fn segment_positions(
    grid: Grid,
    previous: &[Cell],
    current: &[Cell],
    progress: f64,
) -> Vec<Vec2> {
    current
        .iter()
        .enumerate()
        .map(|(index, &cell)| {
            let target = grid.to_pixel(cell);
            match previous.get(index) {
                Some(&prev) if prev != cell => {
                    let from = grid.to_pixel(prev);
                    let t = segment_progress(progress, index) as f32;
                    from + (target - from) * t
                }
                _ => target,
            }
        })
        .collect()
}
