use crate::phase::TurnPhase;

/// Rules configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CoreConfig {
    /// Wall-clock seconds before the opening phase auto-advances.
    pub opening_seconds: f32,
    /// Wall-clock seconds granted to the shared movement phase.
    pub movement_seconds: f32,
    /// Wall-clock seconds for the buffer phase between movement and casting.
    pub buffer_seconds: f32,
    /// Wall-clock seconds granted to each aura (casting) phase.
    pub aura_seconds: f32,

    /// Moves each team may queue per turn.
    pub moves_per_turn: u32,
    /// Abilities the active team may cast per aura phase.
    pub casts_per_phase: u32,

    /// Aura granted to every living unit at turn start, added to the unit's
    /// own passive regeneration.
    pub base_aura_gain: u32,

    /// Turns a tile stays void (rejecting new zones) after unstable resonance.
    pub void_duration: u32,

    /// Baseline probability that an ability connects before accuracy
    /// modifiers are applied.
    pub base_hit_chance: f32,
    /// Flat offset applied to effective ability range per Nearsighted stack.
    pub nearsight_penalty: i32,

    /// Seed fixed at match start; combined with the command nonce for every
    /// random draw so replays are exact.
    pub game_seed: u64,
}

impl CoreConfig {
    // ===== compile-time constants used as type parameters =====
    /// Maximum concurrent status-effect instances per unit.
    pub const MAX_STATUS_EFFECTS: usize = 12;
    /// Maximum zone instances anchored to a single tile. The next placement
    /// triggers unstable resonance instead of stacking.
    pub const MAX_ZONES_PER_TILE: usize = 4;
    /// Maximum status applications authored on one ability.
    pub const MAX_ABILITY_STATUSES: usize = 4;
    /// Maximum status kinds granted by one zone's steady tick.
    pub const MAX_ZONE_STATUSES: usize = 4;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_MOVES_PER_TURN: u32 = 3;
    pub const DEFAULT_CASTS_PER_PHASE: u32 = 1;
    pub const DEFAULT_VOID_DURATION: u32 = 2;
    pub const DEFAULT_BASE_HIT_CHANCE: f32 = 0.95;

    pub fn new() -> Self {
        Self {
            opening_seconds: 5.0,
            movement_seconds: 30.0,
            buffer_seconds: 3.0,
            aura_seconds: 20.0,
            moves_per_turn: Self::DEFAULT_MOVES_PER_TURN,
            casts_per_phase: Self::DEFAULT_CASTS_PER_PHASE,
            base_aura_gain: 1,
            void_duration: Self::DEFAULT_VOID_DURATION,
            base_hit_chance: Self::DEFAULT_BASE_HIT_CHANCE,
            nearsight_penalty: -2,
            game_seed: 0,
        }
    }

    pub fn with_seed(game_seed: u64) -> Self {
        Self {
            game_seed,
            ..Self::new()
        }
    }

    /// Time limit for a phase, in seconds. `None` for phases that never
    /// advance on a timer (terminal states).
    pub fn phase_time_limit(&self, phase: TurnPhase) -> Option<f32> {
        match phase {
            TurnPhase::Opening => Some(self.opening_seconds),
            TurnPhase::Movement => Some(self.movement_seconds),
            TurnPhase::Buffer => Some(self.buffer_seconds),
            TurnPhase::AuraSun1
            | TurnPhase::AuraMoon1
            | TurnPhase::AuraSun2
            | TurnPhase::AuraMoon2 => Some(self.aura_seconds),
            TurnPhase::GameOver => None,
        }
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self::new()
    }
}
