//! Neon Snake - a neon grid snake game for the browser
//!
//! Core modules:
//! - `sim`: deterministic game logic (grid, snake, orbs, tick resolution)
//! - `driver`: frame-scheduler seam with the single-callback guard
//! - `storage`: key-value persistence boundary
//! - `cheats`: typed cheat operations behind the developer console

pub mod cheats;
pub mod driver;
pub mod sim;
pub mod storage;

pub use sim::{GamePhase, GameSession, RenderSnapshot};

/// Game tuning constants
pub mod consts {
    /// Milliseconds between discrete moves at game start
    pub const BASE_MOVE_INTERVAL_MS: f64 = 150.0;
    /// Base move interval on large grids, slightly slower for playability
    pub const LARGE_GRID_MOVE_INTERVAL_MS: f64 = 180.0;
    /// Hard floor for the move interval
    pub const MIN_MOVE_INTERVAL_MS: f64 = 50.0;
    /// Interval reduction per food eaten
    pub const SPEEDUP_PER_FOOD_MS: f64 = 5.0;
    /// Score gained per food or positive orb, lost per negative orb
    pub const FOOD_SCORE: i64 = 10;

    /// Grid sizes at or above this use the large-grid tuning
    pub const LARGE_GRID_THRESHOLD: u32 = 40;
    /// Food stops accelerating the snake at this score (10x10 grids)
    pub const SPEED_CAP_SCORE_SMALL: i64 = 80;
    /// Food stops accelerating the snake at this score (larger grids)
    pub const SPEED_CAP_SCORE: i64 = 140;

    /// Starting snake length, also the shrink floor
    pub const START_LENGTH: usize = 3;

    /// Move-interval multiplier while a speed-up orb is active
    pub const SPEED_UP_MODIFIER: f64 = 0.7;
    /// Move-interval multiplier while a slow-down orb is active
    pub const SLOW_DOWN_MODIFIER: f64 = 1.3;
    /// Timed speed effects last this long
    pub const SPEED_EFFECT_DURATION_MS: f64 = 15_000.0;
    /// Crystal orbs vanish sooner than speed orbs
    pub const CRYSTAL_DISAPPEAR_MS: f64 = 12_000.0;

    /// Minimum spacing between accepted direction inputs
    pub const INPUT_DEBOUNCE_MS: f64 = 30.0;
    /// Below this tick progress a turn applies immediately instead of buffering
    pub const IMMEDIATE_TURN_PROGRESS: f64 = 0.3;

    /// Per-segment interpolation delay, producing the trailing-wave look
    pub const SEGMENT_STAGGER: f64 = 0.045;

    /// Crystals spent on a revive
    pub const REVIVE_COST: u32 = 10;
    /// Ad revivals allowed per game
    pub const MAX_AD_REVIVALS: u32 = 3;
    /// Failsafe: the ad gate unblocks after this long even without playback
    pub const AD_GATE_TIMEOUT_MS: f64 = 30_000.0;
}
