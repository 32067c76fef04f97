//! Read-only per-frame render snapshot
//!
//! The renderer consumes this and nothing else; the core consumes nothing
//! from the renderer.

use glam::Vec2;

use super::effects::OrbKind;
use super::interp;
use super::state::{GamePhase, GameState, Particle};

/// A placed orb, projected to pixels
#[derive(Debug, Clone, Copy)]
pub struct OrbView {
    pub pos: Vec2,
    pub kind: OrbKind,
    /// Milliseconds until the orb vanishes, for the pulse warning.
    /// Absent for orbs that persist until collected.
    pub expires_in_ms: Option<f32>,
}

/// Remaining speed effect, for the progress-bar indicator
#[derive(Debug, Clone, Copy)]
pub struct SpeedEffectView {
    /// Fraction of the effect window left, in [0, 1]
    pub remaining: f32,
    /// True for speed-up (modifier below 1), false for slow-down
    pub is_boost: bool,
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone)]
pub struct RenderSnapshot {
    pub phase: GamePhase,
    /// Interpolated segment centers, head first
    pub segments: Vec<Vec2>,
    /// Head facing angle in radians
    pub head_angle: f32,
    pub food: Vec2,
    pub orbs: Vec<OrbView>,
    pub particles: Vec<Particle>,
    pub speed_effect: Option<SpeedEffectView>,
    pub score: i64,
    pub high_score: i64,
    pub crystals: u32,
    pub cell_size: f32,
}

/// Project the game state at tick progress `progress` into pixel space
pub fn snapshot(state: &GameState, progress: f64, now: f64) -> RenderSnapshot {
    let grid = state.config.grid;
    RenderSnapshot {
        phase: state.phase,
        segments: interp::segment_positions(
            grid,
            &state.previous_positions,
            state.snake.body(),
            progress,
        ),
        head_angle: state.snake.direction().angle(),
        food: grid.to_pixel(state.food),
        orbs: state
            .orbs
            .iter()
            .map(|orb| OrbView {
                pos: grid.to_pixel(orb.cell),
                kind: orb.kind,
                expires_in_ms: orb.disappear_at.map(|at| (at - now).max(0.0) as f32),
            })
            .collect(),
        particles: state.particles.clone(),
        speed_effect: state.effects.remaining_fraction(now).map(|remaining| {
            SpeedEffectView {
                remaining,
                is_boost: state.effects.speed_modifier < 1.0,
            }
        }),
        score: state.score,
        high_score: state.high_score,
        crystals: state.crystals,
        cell_size: grid.cell_size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::effects::SpeedEffect;
    use crate::sim::state::GameConfig;

    #[test]
    fn test_snapshot_projects_segments_and_entities() {
        let state = GameState::new(GameConfig::new(20, 400), 7, 50, 3);
        let snap = snapshot(&state, 0.0, 0.0);
        assert_eq!(snap.segments.len(), 3);
        assert_eq!(snap.head_angle, 0.0);
        assert_eq!(snap.food, state.config.grid.to_pixel(state.food));
        assert_eq!(snap.high_score, 50);
        assert_eq!(snap.crystals, 3);
        assert!(snap.speed_effect.is_none());
    }

    #[test]
    fn test_snapshot_reports_speed_effect_fraction() {
        let mut state = GameState::new(GameConfig::new(20, 400), 7, 0, 0);
        state.effects.apply(SpeedEffect {
            modifier: 0.7,
            ends_at: 16_000.0,
        });
        let snap = snapshot(&state, 0.0, 8_500.0);
        let view = snap.speed_effect.expect("effect is active");
        assert!(view.is_boost);
        assert!((view.remaining - 0.5).abs() < 1e-6);
    }
}
