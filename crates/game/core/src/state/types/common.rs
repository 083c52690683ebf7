use std::fmt;

/// Unique identifier for a unit tracked in the state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitId(pub u32);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The two sides of a duel.
///
/// Sun acts first in each casting round; phase tags encode which side is
/// active (see [`crate::phase::TurnPhase::active_team`]).
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Team {
    Sun,
    Moon,
}

impl Team {
    /// The opposing side.
    pub fn opponent(self) -> Team {
        match self {
            Team::Sun => Team::Moon,
            Team::Moon => Team::Sun,
        }
    }
}

/// Discrete grid position expressed in tile coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance to another tile. All range and containment checks
    /// in the rules use this metric.
    pub fn manhattan(self, other: Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Tile offset by the given deltas.
    pub fn offset(self, dx: i32, dy: i32) -> Position {
        Position::new(self.x + dx, self.y + dy)
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::ORIGIN
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Integer resource meter (health, aura) tracked per unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceMeter {
    pub current: u32,
    pub maximum: u32,
}

impl ResourceMeter {
    pub fn new(current: u32, maximum: u32) -> Self {
        Self { current, maximum }
    }

    /// Meter starting at its maximum.
    pub fn full(maximum: u32) -> Self {
        Self {
            current: maximum,
            maximum,
        }
    }

    /// Subtracts without going below zero.
    pub fn spend(&mut self, amount: u32) {
        self.current = self.current.saturating_sub(amount);
    }

    /// Adds without exceeding the maximum.
    pub fn gain(&mut self, amount: u32) {
        self.current = (self.current + amount).min(self.maximum);
    }

    pub fn is_empty(&self) -> bool {
        self.current == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manhattan_distance_is_symmetric() {
        let a = Position::new(1, 2);
        let b = Position::new(4, -1);
        assert_eq!(a.manhattan(b), 6);
        assert_eq!(b.manhattan(a), 6);
    }

    #[test]
    fn meter_clamps_at_bounds() {
        let mut meter = ResourceMeter::new(3, 10);
        meter.spend(5);
        assert_eq!(meter.current, 0);
        meter.gain(25);
        assert_eq!(meter.current, 10);
    }
}
