//! Snake body, direction handling and the turn buffer

use serde::{Deserialize, Serialize};

use super::grid::Cell;
use crate::consts::{IMMEDIATE_TURN_PROGRESS, START_LENGTH};

/// One of the four cardinal movement directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Facing angle in radians, for the render snapshot
    pub fn angle(self) -> f32 {
        use std::f32::consts::{FRAC_PI_2, PI};
        match self {
            Direction::Right => 0.0,
            Direction::Down => FRAC_PI_2,
            Direction::Left => PI,
            Direction::Up => -FRAC_PI_2,
        }
    }
}

/// The snake's body plus direction state. Head at index 0, tail last.
///
/// Invariant: length >= 1, and no two segments share a cell while the game
/// is in a valid (non-collided) state.
#[derive(Debug, Clone)]
pub struct SnakeState {
    body: Vec<Cell>,
    direction: Direction,
    next_direction: Direction,
    buffered: Option<Direction>,
}

impl SnakeState {
    /// Canonical starting layout: three segments trailing left of `start`,
    /// facing right.
    pub fn new(start: Cell) -> Self {
        let body = (0..START_LENGTH as i32)
            .map(|i| Cell::new(start.x - i, start.y))
            .collect();
        Self {
            body,
            direction: Direction::Right,
            next_direction: Direction::Right,
            buffered: None,
        }
    }

    pub fn head(&self) -> Cell {
        self.body[0]
    }

    pub fn body(&self) -> &[Cell] {
        &self.body
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Head cell plus the direction delta. No bounds clamping, the caller
    /// validates against the grid.
    pub fn peek_next_head(&self, direction: Direction) -> Cell {
        let (dx, dy) = direction.delta();
        let head = self.head();
        Cell::new(head.x + dx, head.y + dy)
    }

    /// Direction-change request from the input layer. Opposites of the
    /// active direction are ignored outright (a reversal would bite the
    /// neck). Early in a tick the turn applies immediately; later it is
    /// buffered so a quick double-turn is not lost. Returns whether the
    /// request was accepted.
    pub fn request_direction(&mut self, dir: Direction, progress: f64) -> bool {
        if dir == self.direction.opposite() {
            return false;
        }
        if progress < IMMEDIATE_TURN_PROGRESS {
            self.next_direction = dir;
            self.buffered = None;
        } else if self.buffered.is_none_or(|b| dir != b.opposite()) {
            self.buffered = Some(dir);
        }
        true
    }

    /// Consume the buffered turn (if any) and commit the direction for
    /// this tick.
    pub fn commit_direction(&mut self) -> Direction {
        if let Some(buffered) = self.buffered.take() {
            if buffered != self.direction.opposite() {
                self.next_direction = buffered;
            }
        }
        self.direction = self.next_direction;
        self.direction
    }

    /// Push the new head; pop the tail unless the move grows. Returns the
    /// vacated tail cell, if any.
    pub fn advance(&mut self, next_head: Cell, grow: bool) -> Option<Cell> {
        self.body.insert(0, next_head);
        if grow { None } else { self.body.pop() }
    }

    /// Append a duplicate of the tail, keeping geometry contiguous at the
    /// moment of growth.
    pub fn grow(&mut self) {
        let tail = *self.body.last().expect("snake is never empty");
        self.body.push(tail);
    }

    /// Remove the tail unless the snake is at the starting-length floor.
    /// Returns the removed segment for particle effects.
    pub fn shrink(&mut self) -> Option<Cell> {
        if self.body.len() > START_LENGTH {
            self.body.pop()
        } else {
            None
        }
    }

    /// Body-collision check for a candidate head cell. `exclude_tail` is
    /// set for non-growing moves, where the tail vacates its cell in the
    /// same tick the head could otherwise "collide" with it.
    pub fn hits_body(&self, cell: Cell, exclude_tail: bool) -> bool {
        let scan = if exclude_tail && self.body.len() > 1 {
            &self.body[..self.body.len() - 1]
        } else {
            &self.body[..]
        };
        scan.contains(&cell)
    }

    /// Reset to the canonical start layout (revive/restart)
    pub fn reset(&mut self, start: Cell) {
        *self = SnakeState::new(start);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_layout() {
        let snake = SnakeState::new(Cell::new(5, 5));
        assert_eq!(
            snake.body(),
            &[Cell::new(5, 5), Cell::new(4, 5), Cell::new(3, 5)]
        );
        assert_eq!(snake.direction(), Direction::Right);
    }

    #[test]
    fn test_advance_pops_tail() {
        let mut snake = SnakeState::new(Cell::new(5, 5));
        let vacated = snake.advance(Cell::new(6, 5), false);
        assert_eq!(vacated, Some(Cell::new(3, 5)));
        assert_eq!(
            snake.body(),
            &[Cell::new(6, 5), Cell::new(5, 5), Cell::new(4, 5)]
        );
    }

    #[test]
    fn test_advance_grow_keeps_tail() {
        let mut snake = SnakeState::new(Cell::new(5, 5));
        assert_eq!(snake.advance(Cell::new(6, 5), true), None);
        assert_eq!(snake.len(), 4);
        assert_eq!(snake.body()[3], Cell::new(3, 5));
    }

    #[test]
    fn test_opposite_request_ignored() {
        let mut snake = SnakeState::new(Cell::new(5, 5));
        assert!(!snake.request_direction(Direction::Left, 0.0));
        snake.commit_direction();
        assert_eq!(snake.direction(), Direction::Right);
    }

    #[test]
    fn test_immediate_turn_applies_without_tick() {
        let mut snake = SnakeState::new(Cell::new(5, 5));
        assert!(snake.request_direction(Direction::Up, 0.1));
        assert_eq!(snake.commit_direction(), Direction::Up);
    }

    #[test]
    fn test_late_turn_is_buffered() {
        let mut snake = SnakeState::new(Cell::new(5, 5));
        assert!(snake.request_direction(Direction::Up, 0.8));
        assert_eq!(snake.commit_direction(), Direction::Up);
    }

    #[test]
    fn test_buffer_rejects_opposite_of_buffered() {
        let mut snake = SnakeState::new(Cell::new(5, 5));
        snake.request_direction(Direction::Up, 0.8);
        // Down is the opposite of the buffered Up and must not overwrite it
        snake.request_direction(Direction::Down, 0.9);
        assert_eq!(snake.commit_direction(), Direction::Up);
    }

    #[test]
    fn test_buffered_turn_overrides_uncommitted_immediate_turn() {
        let mut snake = SnakeState::new(Cell::new(5, 5));
        // Up applies immediately but has not been committed yet, so a later
        // buffered Down (legal against the still-active Right) wins the tick.
        snake.request_direction(Direction::Up, 0.1);
        snake.request_direction(Direction::Down, 0.8);
        assert_eq!(snake.commit_direction(), Direction::Down);
    }

    #[test]
    fn test_shrink_floors_at_start_length() {
        let mut snake = SnakeState::new(Cell::new(5, 5));
        assert_eq!(snake.shrink(), None);
        snake.grow();
        assert_eq!(snake.len(), 4);
        assert_eq!(snake.shrink(), Some(Cell::new(3, 5)));
        assert_eq!(snake.len(), 3);
    }

    #[test]
    fn test_hits_body_tail_exclusion() {
        let snake = SnakeState::new(Cell::new(5, 5));
        let tail = Cell::new(3, 5);
        assert!(snake.hits_body(tail, false));
        // A non-growing move vacates the tail cell
        assert!(!snake.hits_body(tail, true));
        assert!(snake.hits_body(Cell::new(4, 5), true));
    }
}
