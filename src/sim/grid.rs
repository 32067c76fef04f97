//! Grid geometry and coordinate conversion

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An integer grid coordinate. Valid cells satisfy `0 <= x,y < size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chebyshev distance, used for spawn-safety checks around the head
    pub fn chebyshev(self, other: Cell) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }
}

/// Static grid geometry. Validated at construction, pure afterwards.
#[derive(Debug, Clone, Copy)]
pub struct Grid {
    pub size: i32,
    pub cell_size: f32,
}

impl Grid {
    /// A degenerate grid size is a programming error, not a runtime condition.
    pub fn new(size: u32, canvas_px: u32) -> Self {
        assert!(size > 0, "grid size must be positive");
        Self {
            size: size as i32,
            cell_size: (canvas_px / size) as f32,
        }
    }

    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.x < self.size && cell.y >= 0 && cell.y < self.size
    }

    /// Pixel position of the cell center
    pub fn to_pixel(&self, cell: Cell) -> Vec2 {
        Vec2::new(
            cell.x as f32 * self.cell_size + self.cell_size / 2.0,
            cell.y as f32 * self.cell_size + self.cell_size / 2.0,
        )
    }

    /// Canvas edge length that exactly fits the grid
    pub fn pixel_extent(&self) -> f32 {
        self.size as f32 * self.cell_size
    }
}
