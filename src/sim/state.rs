//! Game state and per-game entities
//!
//! Everything here is created at reset and discarded at restart; crystals
//! and the high score outlive a single game through the storage layer.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::effects::{OrbKind, SpeedEffect};
use super::grid::{Cell, Grid};
use super::snake::SnakeState;
use super::spawn;
use crate::consts::*;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// No game in progress (before start, or after navigating away)
    Idle,
    /// Active gameplay
    Running,
    /// Console or menu overlay is up; ticking suspended
    Paused,
    /// Terminal until an explicit revive or restart
    GameOver,
}

/// Grid-size-derived tuning, fixed for the lifetime of a game
#[derive(Debug, Clone, Copy)]
pub struct GameConfig {
    pub grid: Grid,
    pub start: Cell,
    pub base_interval_ms: f64,
    /// Chebyshev radius around the head kept clear of fresh spawns
    pub safe_distance: i32,
    pub orb_spawn_interval_ms: f64,
    pub max_orbs: usize,
    pub max_particles: usize,
    /// Food stops accelerating the snake at this score
    pub speed_cap_score: i64,
}

impl GameConfig {
    pub fn new(grid_size: u32, canvas_px: u32) -> Self {
        let grid = Grid::new(grid_size, canvas_px);
        let large = grid_size >= LARGE_GRID_THRESHOLD;
        Self {
            grid,
            start: if large {
                let offset = (grid_size / 8) as i32;
                Cell::new(offset, offset)
            } else {
                Cell::new(5, 5)
            },
            base_interval_ms: if large {
                LARGE_GRID_MOVE_INTERVAL_MS
            } else {
                BASE_MOVE_INTERVAL_MS
            },
            safe_distance: if large { 3 } else { 1 },
            orb_spawn_interval_ms: if large { 6_000.0 } else { 4_000.0 },
            max_orbs: if large { 4 } else { 7 },
            max_particles: if large { 15 } else { 30 },
            speed_cap_score: if grid_size == 10 {
                SPEED_CAP_SCORE_SMALL
            } else {
                SPEED_CAP_SCORE
            },
        }
    }
}

/// A placed special orb
#[derive(Debug, Clone, Copy)]
pub struct SpecialOrb {
    pub cell: Cell,
    pub kind: OrbKind,
    pub created_at: f64,
    /// Absent means the orb persists until collected
    pub disappear_at: Option<f64>,
}

/// What spawned a particle; the renderer maps this to color and shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleKind {
    Food,
    Tail,
    Orb(OrbKind),
}

/// A visual particle. Never gameplay-affecting.
#[derive(Debug, Clone, Copy)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub alpha: f32,
    pub kind: ParticleKind,
}

/// At most one speed modifier is active; a new speed orb overwrites the
/// current effect and its expiry rather than stacking.
#[derive(Debug, Clone, Copy)]
pub struct ActiveEffects {
    pub speed_modifier: f64,
    pub speed_effect_end: f64,
}

impl Default for ActiveEffects {
    fn default() -> Self {
        Self {
            speed_modifier: 1.0,
            speed_effect_end: 0.0,
        }
    }
}

impl ActiveEffects {
    pub fn apply(&mut self, effect: SpeedEffect) {
        self.speed_modifier = effect.modifier;
        self.speed_effect_end = effect.ends_at;
    }

    /// Reset the modifier once its end time has passed. Returns whether an
    /// effect expired.
    pub fn expire(&mut self, now: f64) -> bool {
        if self.speed_effect_end > 0.0 && now >= self.speed_effect_end {
            *self = Self::default();
            true
        } else {
            false
        }
    }

    pub fn is_active(&self) -> bool {
        self.speed_effect_end > 0.0
    }

    /// Fraction of the effect window remaining, for the progress-bar
    /// indicator
    pub fn remaining_fraction(&self, now: f64) -> Option<f32> {
        if !self.is_active() {
            return None;
        }
        let left = (self.speed_effect_end - now).max(0.0);
        Some((left / SPEED_EFFECT_DURATION_MS) as f32)
    }
}

/// Complete per-game state
#[derive(Debug, Clone)]
pub struct GameState {
    pub config: GameConfig,
    pub phase: GamePhase,
    pub snake: SnakeState,
    /// Body snapshot from before the latest committed move, read by the
    /// interpolator
    pub previous_positions: Vec<Cell>,
    pub food: Cell,
    pub orbs: Vec<SpecialOrb>,
    pub particles: Vec<Particle>,
    pub effects: ActiveEffects,
    pub score: i64,
    pub high_score: i64,
    pub crystals: u32,
    pub move_interval_ms: f64,
    pub last_orb_spawn: f64,
    pub ad_revivals_used: u32,
    pub rng: Pcg32,
}

impl GameState {
    /// Fresh game. `high_score` and `crystals` come from the storage layer.
    pub fn new(config: GameConfig, seed: u64, high_score: i64, crystals: u32) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let snake = SnakeState::new(config.start);
        let food = spawn::place_food(
            &mut rng,
            config.grid,
            snake.body(),
            &[],
            snake.head(),
            config.safe_distance,
        );
        let previous_positions = snake.body().to_vec();
        Self {
            config,
            phase: GamePhase::Idle,
            snake,
            previous_positions,
            food,
            orbs: Vec::new(),
            particles: Vec::new(),
            effects: ActiveEffects::default(),
            score: 0,
            high_score,
            crystals,
            move_interval_ms: config.base_interval_ms,
            last_orb_spawn: 0.0,
            ad_revivals_used: 0,
            rng,
        }
    }

    /// Wholesale restart: new snake, food and counters. Crystals and the
    /// high score carry over; the RNG stream continues.
    pub fn reset(&mut self, now: f64) {
        self.snake.reset(self.config.start);
        self.previous_positions = self.snake.body().to_vec();
        self.orbs.clear();
        self.particles.clear();
        self.effects = ActiveEffects::default();
        self.score = 0;
        self.move_interval_ms = self.config.base_interval_ms;
        self.last_orb_spawn = now;
        self.ad_revivals_used = 0;
        self.food = spawn::place_food(
            &mut self.rng,
            self.config.grid,
            self.snake.body(),
            &[],
            self.snake.head(),
            self.config.safe_distance,
        );
        self.phase = GamePhase::Running;
    }

    /// Revive out of GameOver: snake back to the canonical start layout,
    /// fresh food, cleared orbs and effects, score preserved. The move
    /// interval resets to base on the crystal path but is kept on the ad
    /// path.
    pub fn revive(&mut self, now: f64, reset_interval: bool) {
        assert_eq!(self.phase, GamePhase::GameOver, "revive outside GameOver");
        self.snake.reset(self.config.start);
        self.previous_positions = self.snake.body().to_vec();
        self.orbs.clear();
        self.particles.clear();
        self.effects = ActiveEffects::default();
        if reset_interval {
            self.move_interval_ms = self.config.base_interval_ms;
        }
        self.last_orb_spawn = now;
        self.food = spawn::place_food(
            &mut self.rng,
            self.config.grid,
            self.snake.body(),
            &[],
            self.snake.head(),
            self.config.safe_distance,
        );
        self.phase = GamePhase::Running;
    }

    /// Spawn a particle burst at a cell, bounded by the pool cap
    pub fn emit_burst(&mut self, cell: Cell, count: usize, kind: ParticleKind) {
        let center = self.config.grid.to_pixel(cell);
        for _ in 0..count {
            if self.particles.len() >= self.config.max_particles {
                break;
            }
            let vel = Vec2::new(
                (self.rng.random::<f32>() - 0.5) * 4.0,
                (self.rng.random::<f32>() - 0.5) * 4.0,
            );
            self.particles.push(Particle {
                pos: center,
                vel,
                alpha: 1.0,
                kind,
            });
        }
    }

    /// Advance and cull particles. Called once per tick.
    pub fn update_particles(&mut self) {
        for particle in &mut self.particles {
            particle.pos += particle.vel;
            particle.alpha *= 0.92;
        }
        self.particles.retain(|p| p.alpha >= 0.1);
    }

    /// Occupied cells an orb spawn must avoid
    pub fn orb_cells(&self) -> Vec<Cell> {
        self.orbs.iter().map(|orb| orb.cell).collect()
    }
}
