//! Per-tick collision and effect resolution
//!
//! One call advances the game by exactly one discrete move: effect expiry,
//! orb spawn/expiry, the game-over check, then the committed move with
//! food/orb consumption. The net snake-length change of any tick is -1, 0
//! or +1.

use super::effects::{self, OrbKind};
use super::state::{GamePhase, GameState, ParticleKind, SpecialOrb};
use super::spawn;
use crate::consts::{FOOD_SCORE, MIN_MOVE_INTERVAL_MS, SPEEDUP_PER_FOOD_MS};

/// What a tick did, for the session's persistence hooks
#[derive(Debug, Clone, Copy, Default)]
pub struct TickOutcome {
    pub game_over: bool,
    pub ate_food: bool,
    pub orb: Option<OrbKind>,
    pub high_score_beaten: bool,
}

/// Advance the game by one discrete move at timestamp `now`
pub fn tick(state: &mut GameState, now: f64) -> TickOutcome {
    assert!(!state.snake.is_empty(), "snake body must never be empty");

    let mut outcome = TickOutcome::default();
    if state.phase != GamePhase::Running {
        return outcome;
    }

    state.effects.expire(now);
    expire_orbs(state, now);
    maybe_spawn_orb(state, now);

    let direction = state.snake.commit_direction();
    let next = state.snake.peek_next_head(direction);
    let grows = next == state.food;

    // Terminal check. The tail is only a legal destination when this move
    // vacates it, which a growing move does not.
    if !state.config.grid.in_bounds(next) || state.snake.hits_body(next, !grows) {
        state.phase = GamePhase::GameOver;
        outcome.game_over = true;
        if state.score > state.high_score {
            state.high_score = state.score;
            outcome.high_score_beaten = true;
        }
        log::info!("game over at score {}", state.score);
        return outcome;
    }

    state.previous_positions = state.snake.body().to_vec();
    let vacated = state.snake.advance(next, grows);

    if let Some(index) = state.orbs.iter().position(|orb| orb.cell == next) {
        let orb = state.orbs.remove(index);
        consume_orb(state, orb, now);
        outcome.orb = Some(orb.kind);
    } else if grows {
        state.score += FOOD_SCORE;
        if state.score < state.config.speed_cap_score {
            state.move_interval_ms =
                (state.move_interval_ms - SPEEDUP_PER_FOOD_MS).max(MIN_MOVE_INTERVAL_MS);
        }
        let orb_cells = state.orb_cells();
        state.food = spawn::place_food(
            &mut state.rng,
            state.config.grid,
            state.snake.body(),
            &orb_cells,
            state.snake.head(),
            state.config.safe_distance,
        );
        state.emit_burst(next, 8, ParticleKind::Food);
        outcome.ate_food = true;
    } else if let Some(tail) = vacated {
        state.emit_burst(tail, 1, ParticleKind::Tail);
    }

    if state.score > state.high_score {
        state.high_score = state.score;
        outcome.high_score_beaten = true;
    }

    state.update_particles();
    outcome
}

/// Drop timed orbs whose window has closed, with a small expiry burst
fn expire_orbs(state: &mut GameState, now: f64) {
    let mut expired = Vec::new();
    state.orbs.retain(|orb| match orb.disappear_at {
        Some(at) if at <= now => {
            expired.push((orb.cell, orb.kind));
            false
        }
        _ => true,
    });
    for (cell, kind) in expired {
        state.emit_burst(cell, 5, ParticleKind::Orb(kind));
    }
}

/// Spawn a special orb when the spawn interval elapsed and the board has
/// room below the grid-size-dependent cap. A failed placement just skips
/// this window.
fn maybe_spawn_orb(state: &mut GameState, now: f64) {
    if now - state.last_orb_spawn <= state.config.orb_spawn_interval_ms {
        return;
    }
    if state.orbs.len() < state.config.max_orbs {
        let kind = effects::select_kind(&mut state.rng);
        let orb_cells = state.orb_cells();
        let placed = spawn::place_orb(
            &mut state.rng,
            state.config.grid,
            state.snake.body(),
            state.food,
            &orb_cells,
            state.snake.head(),
            state.config.safe_distance,
        );
        if let Some(cell) = placed {
            let disappear_at = effects::spec_for(kind).disappear_ms.map(|ms| now + ms);
            state.orbs.push(SpecialOrb {
                cell,
                kind,
                created_at: now,
                disappear_at,
            });
        }
    }
    state.last_orb_spawn = now;
}

/// Apply a collected orb's effect. The move already popped the tail, so
/// grow/shrink deltas land on a length-neutral base and the net change
/// stays within one segment.
fn consume_orb(state: &mut GameState, orb: SpecialOrb, now: f64) {
    let result = effects::effect(orb.kind, now);
    state.score = (state.score + result.score_delta).max(0);
    match result.length_delta {
        1 => state.snake.grow(),
        -1 => {
            if let Some(removed) = state.snake.shrink() {
                state.emit_burst(removed, 5, ParticleKind::Orb(orb.kind));
            }
        }
        _ => {}
    }
    if let Some(speed) = result.speed {
        state.effects.apply(speed);
    }
    state.crystals += result.crystal_delta;
    let burst = if orb.kind == OrbKind::Crystal { 12 } else { 8 };
    state.emit_burst(orb.cell, burst, ParticleKind::Orb(orb.kind));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::grid::Cell;
    use crate::sim::snake::Direction;
    use crate::sim::state::GameConfig;

    fn running_state() -> GameState {
        let mut state = GameState::new(GameConfig::new(20, 400), 42, 0, 0);
        state.phase = GamePhase::Running;
        state
    }

    #[test]
    fn test_head_advances_by_direction_delta() {
        let mut state = running_state();
        state.food = Cell::new(0, 0);
        let head = state.snake.head();
        tick(&mut state, 1_000.0);
        assert_eq!(state.snake.head(), Cell::new(head.x + 1, head.y));
        assert_eq!(state.snake.len(), 3);
    }

    #[test]
    fn test_eating_food_grows_and_scores() {
        // Grid 20x20, snake [(5,5),(4,5),(3,5)] heading right, food at (6,5):
        // after one tick the snake keeps its tail and scores 10.
        let mut state = running_state();
        state.food = Cell::new(6, 5);
        let outcome = tick(&mut state, 1_000.0);
        assert!(outcome.ate_food);
        assert_eq!(state.score, 10);
        assert_eq!(
            state.snake.body(),
            &[
                Cell::new(6, 5),
                Cell::new(5, 5),
                Cell::new(4, 5),
                Cell::new(3, 5)
            ]
        );
        assert_ne!(state.food, Cell::new(6, 5));
    }

    #[test]
    fn test_food_speeds_up_until_cap() {
        let mut state = running_state();
        state.food = Cell::new(6, 5);
        tick(&mut state, 1_000.0);
        assert_eq!(state.move_interval_ms, 145.0);

        // At the cap the interval stops decreasing
        let mut capped = running_state();
        capped.score = 140;
        capped.food = capped.snake.peek_next_head(Direction::Right);
        tick(&mut capped, 1_000.0);
        assert_eq!(capped.move_interval_ms, 150.0);
    }

    #[test]
    fn test_interval_floor() {
        let mut state = running_state();
        state.move_interval_ms = 52.0;
        state.food = Cell::new(6, 5);
        tick(&mut state, 1_000.0);
        assert_eq!(state.move_interval_ms, 50.0);
    }

    #[test]
    fn test_wall_collision_is_game_over() {
        let mut state = running_state();
        state.food = Cell::new(0, 0);
        state.score = 30;
        // Head starts at x=5 heading right; 14 moves reach x=19
        for _ in 0..14 {
            let outcome = tick(&mut state, 1_000.0);
            assert!(!outcome.game_over);
        }
        let outcome = tick(&mut state, 1_000.0);
        assert!(outcome.game_over);
        assert!(outcome.high_score_beaten);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.high_score, 30);
        // Snake frozen in its last valid position
        assert_eq!(state.snake.head(), Cell::new(19, 5));
    }

    #[test]
    fn test_no_tick_after_game_over() {
        let mut state = running_state();
        state.phase = GamePhase::GameOver;
        let head = state.snake.head();
        let outcome = tick(&mut state, 1_000.0);
        assert!(!outcome.game_over);
        assert_eq!(state.snake.head(), head);
    }

    #[test]
    fn test_vacating_tail_is_not_a_collision() {
        // Snake in a 2x2 loop: head moving onto the tail cell is legal
        // because the tail vacates it this same tick.
        let mut state = running_state();
        state.food = Cell::new(0, 0);
        state.snake = crate::sim::SnakeState::new(Cell::new(5, 5));
        state.snake.grow();
        // Body (5,5),(4,5),(3,5),(3,5): walk a tight loop up/left/down
        state.snake.request_direction(Direction::Up, 0.0);
        tick(&mut state, 1_000.0);
        state.snake.request_direction(Direction::Left, 0.0);
        tick(&mut state, 1_000.0);
        state.snake.request_direction(Direction::Down, 0.0);
        let outcome = tick(&mut state, 1_000.0);
        assert!(!outcome.game_over);
    }

    #[test]
    fn test_self_collision_is_game_over() {
        let mut state = running_state();
        state.food = Cell::new(0, 0);
        // Lengthen so a loop bites the body rather than the vacating tail
        for _ in 0..3 {
            state.snake.grow();
        }
        state.snake.request_direction(Direction::Up, 0.0);
        tick(&mut state, 1_000.0);
        state.snake.request_direction(Direction::Left, 0.0);
        tick(&mut state, 1_000.0);
        state.snake.request_direction(Direction::Down, 0.0);
        let outcome = tick(&mut state, 1_000.0);
        assert!(outcome.game_over);
    }

    #[test]
    fn test_positive_orb_grows_and_scores() {
        let mut state = running_state();
        state.food = Cell::new(0, 0);
        state.orbs.push(SpecialOrb {
            cell: Cell::new(6, 5),
            kind: OrbKind::Positive,
            created_at: 0.0,
            disappear_at: None,
        });
        let outcome = tick(&mut state, 1_000.0);
        assert_eq!(outcome.orb, Some(OrbKind::Positive));
        assert_eq!(state.score, 10);
        assert_eq!(state.snake.len(), 4);
        assert!(state.orbs.is_empty());
    }

    #[test]
    fn test_negative_orb_at_floor_keeps_length_and_clamps_score() {
        let mut state = running_state();
        state.food = Cell::new(0, 0);
        state.score = 5;
        state.orbs.push(SpecialOrb {
            cell: Cell::new(6, 5),
            kind: OrbKind::Negative,
            created_at: 0.0,
            disappear_at: None,
        });
        tick(&mut state, 1_000.0);
        // Floor at starting length, and the score never goes below zero
        assert_eq!(state.snake.len(), 3);
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_negative_orb_shrinks_above_floor() {
        let mut state = running_state();
        state.food = Cell::new(0, 0);
        state.snake.grow();
        state.score = 50;
        state.orbs.push(SpecialOrb {
            cell: Cell::new(6, 5),
            kind: OrbKind::Negative,
            created_at: 0.0,
            disappear_at: None,
        });
        tick(&mut state, 1_000.0);
        assert_eq!(state.snake.len(), 3);
        assert_eq!(state.score, 40);
    }

    #[test]
    fn test_speed_orb_applies_and_expires_before_movement() {
        let mut state = running_state();
        state.food = Cell::new(0, 0);
        state.orbs.push(SpecialOrb {
            cell: Cell::new(6, 5),
            kind: OrbKind::SpeedUp,
            created_at: 0.0,
            disappear_at: None,
        });
        tick(&mut state, 1_000.0);
        assert_eq!(state.effects.speed_modifier, 0.7);
        assert_eq!(state.effects.speed_effect_end, 16_000.0);

        // The next tick at t=16001 resets the modifier before moving
        tick(&mut state, 16_001.0);
        assert_eq!(state.effects.speed_modifier, 1.0);
        assert!(!state.effects.is_active());
    }

    #[test]
    fn test_crystal_orb_increments_currency() {
        let mut state = running_state();
        state.food = Cell::new(0, 0);
        state.crystals = 4;
        state.orbs.push(SpecialOrb {
            cell: Cell::new(6, 5),
            kind: OrbKind::Crystal,
            created_at: 0.0,
            disappear_at: Some(13_000.0),
        });
        let outcome = tick(&mut state, 1_000.0);
        assert_eq!(outcome.orb, Some(OrbKind::Crystal));
        assert_eq!(state.crystals, 5);
        assert_eq!(state.score, 0);
        assert_eq!(state.snake.len(), 3);
    }

    #[test]
    fn test_timed_orb_expires_without_movement_effect() {
        let mut state = running_state();
        state.food = Cell::new(0, 0);
        // Keep the spawn window closed so expiry is the only orb change
        state.last_orb_spawn = 12_000.0;
        state.orbs.push(SpecialOrb {
            cell: Cell::new(10, 10),
            kind: OrbKind::Crystal,
            created_at: 0.0,
            disappear_at: Some(12_000.0),
        });
        tick(&mut state, 12_500.0);
        assert!(state.orbs.is_empty());
        assert_eq!(state.crystals, 0);
    }

    #[test]
    fn test_orb_spawn_respects_interval_and_cap() {
        let mut state = running_state();
        state.food = Cell::new(0, 0);
        state.last_orb_spawn = 0.0;

        // Inside the interval: nothing spawns
        tick(&mut state, 1_000.0);
        assert!(state.orbs.is_empty());

        // Past the interval: one orb appears
        tick(&mut state, 5_000.0);
        assert_eq!(state.orbs.len(), 1);
        // Park it away from the snake's walking row
        state.orbs[0].cell = Cell::new(1, 15);

        // At the cap: the window passes without a spawn
        for i in state.orbs.len()..state.config.max_orbs {
            state.orbs.push(SpecialOrb {
                cell: Cell::new(10 + i as i32, 15),
                kind: OrbKind::Positive,
                created_at: 0.0,
                disappear_at: None,
            });
        }
        tick(&mut state, 10_000.0);
        assert_eq!(state.orbs.len(), state.config.max_orbs);
    }

    #[test]
    fn test_length_change_per_tick_is_bounded() {
        let mut state = running_state();
        state.food = Cell::new(0, 0);
        let mut previous = state.snake.len() as i64;
        for step in 0..12 {
            if step == 4 {
                state.orbs.push(SpecialOrb {
                    cell: state.snake.peek_next_head(state.snake.direction()),
                    kind: OrbKind::Positive,
                    created_at: 0.0,
                    disappear_at: None,
                });
            }
            if step == 8 {
                state.food = state.snake.peek_next_head(state.snake.direction());
            }
            let outcome = tick(&mut state, 1_000.0 + f64::from(step) * 200.0);
            if outcome.game_over {
                break;
            }
            let len = state.snake.len() as i64;
            assert!((len - previous).abs() <= 1);
            previous = len;
        }
    }

    #[test]
    fn test_high_score_is_monotonic() {
        let mut state = running_state();
        state.high_score = 100;
        state.food = Cell::new(6, 5);
        tick(&mut state, 1_000.0);
        assert_eq!(state.score, 10);
        assert_eq!(state.high_score, 100);
        state.score = 150;
        state.food = state.snake.peek_next_head(state.snake.direction());
        let outcome = tick(&mut state, 1_200.0);
        assert!(outcome.high_score_beaten);
        assert_eq!(state.high_score, 160);
    }
}
