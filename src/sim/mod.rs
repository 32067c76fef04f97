//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Timestamps come in through the API, never from the wall clock
//! - Seeded RNG only
//! - No rendering or platform dependencies

pub mod effects;
pub mod grid;
pub mod interp;
pub mod render;
pub mod session;
pub mod snake;
pub mod spawn;
pub mod state;
pub mod tick;

pub use effects::{EffectResult, ORB_CATALOG, OrbKind, SpeedEffect};
pub use grid::{Cell, Grid};
pub use render::{OrbView, RenderSnapshot};
pub use session::{AdGate, GameSession};
pub use snake::{Direction, SnakeState};
pub use state::{
    ActiveEffects, GameConfig, GamePhase, GameState, Particle, ParticleKind, SpecialOrb,
};
pub use tick::{TickOutcome, tick};
