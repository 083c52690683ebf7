//! Grid geometry oracle.

use crate::state::Position;

/// Rectangular grid bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridDimensions {
    pub width: u32,
    pub height: u32,
}

impl GridDimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn contains(&self, position: Position) -> bool {
        position.x >= 0
            && position.y >= 0
            && position.x < self.width as i32
            && position.y < self.height as i32
    }
}

/// Static grid oracle exposing geometry and passability.
///
/// Occupancy is dynamic state and lives with the units; the oracle only
/// answers questions about the immutable board.
pub trait GridOracle: Send + Sync {
    fn dimensions(&self) -> GridDimensions;

    /// Whether the tile can host a unit at all (in bounds and not terrain-
    /// blocked).
    fn is_passable(&self, position: Position) -> bool;

    fn contains(&self, position: Position) -> bool {
        self.dimensions().contains(position)
    }

    /// Every in-bounds tile within `radius` Manhattan distance of `center`,
    /// in row-major scan order. Includes the center itself.
    fn positions_within(&self, center: Position, radius: u32) -> Vec<Position> {
        let r = radius as i32;
        let mut out = Vec::new();
        for dy in -r..=r {
            for dx in -r..=r {
                if dx.unsigned_abs() + dy.unsigned_abs() > radius {
                    continue;
                }
                let candidate = center.offset(dx, dy);
                if self.contains(candidate) {
                    out.push(candidate);
                }
            }
        }
        out
    }

    /// In-bounds neighbors of `position` in fixed scan order (N, E, S, W,
    /// then diagonals when enabled).
    fn neighbors(&self, position: Position, diagonals: bool) -> Vec<Position> {
        const CARDINAL: [(i32, i32); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];
        const DIAGONAL: [(i32, i32); 4] = [(1, -1), (1, 1), (-1, 1), (-1, -1)];

        let mut out = Vec::new();
        for (dx, dy) in CARDINAL {
            let candidate = position.offset(dx, dy);
            if self.contains(candidate) {
                out.push(candidate);
            }
        }
        if diagonals {
            for (dx, dy) in DIAGONAL {
                let candidate = position.offset(dx, dy);
                if self.contains(candidate) {
                    out.push(candidate);
                }
            }
        }
        out
    }

    /// Clamps `center` so a footprint of `radius` stays fully in-grid.
    fn clamp_footprint(&self, center: Position, radius: u32) -> Position {
        let dims = self.dimensions();
        let r = radius as i32;
        let max_x = (dims.width as i32 - 1 - r).max(r);
        let max_y = (dims.height as i32 - 1 - r).max(r);
        Position::new(center.x.clamp(r, max_x), center.y.clamp(r, max_y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::OpenGrid;

    #[test]
    fn positions_within_respects_radius_and_bounds() {
        let grid = OpenGrid(GridDimensions::new(3, 3));
        let cells = grid.positions_within(Position::ORIGIN, 1);
        assert_eq!(
            cells,
            vec![Position::new(0, 0), Position::new(1, 0), Position::new(0, 1)]
        );
    }

    #[test]
    fn clamp_footprint_keeps_radius_inside() {
        let grid = OpenGrid(GridDimensions::new(10, 10));
        let clamped = grid.clamp_footprint(Position::new(0, 9), 2);
        assert_eq!(clamped, Position::new(2, 7));
    }
}
