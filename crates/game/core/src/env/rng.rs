//! RNG oracle for deterministic random draws.
//!
//! Every roll in the rules (accuracy, dodge, critical, scatter, blessing)
//! goes through this trait so the whole match replays exactly from the game
//! seed and the command nonce.

/// Stateless deterministic random source: the same seed always produces the
/// same value.
pub trait RngOracle: Send + Sync {
    /// Generate a random u32 value from a seed.
    fn next_u32(&self, seed: u64) -> u32;

    /// Bernoulli draw with probability `p` (clamped to [0, 1]).
    fn chance(&self, seed: u64, p: f32) -> bool {
        let p = p.clamp(0.0, 1.0) as f64;
        (self.next_u32(seed) as f64) < p * (u32::MAX as f64 + 1.0)
    }

    /// Uniform index in `0..len`. Returns 0 for empty ranges.
    fn pick(&self, seed: u64, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        (self.next_u32(seed) as usize) % len
    }
}

/// PCG random number generator (Permuted Congruential Generator).
///
/// PCG-XSH-RR produces 32-bit output from 64-bit state with a single
/// multiply, xorshift, and rotate. Deterministic, small, and statistically
/// solid, which is all a replay-exact rules core needs.
///
/// Reference: <https://www.pcg-random.org/>
#[derive(Clone, Copy, Debug, Default)]
pub struct PcgRng;

impl PcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    /// LCG step: `state' = state × multiplier + increment (mod 2^64)`.
    #[inline]
    fn pcg_step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    /// XSH-RR output permutation.
    #[inline]
    fn pcg_output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RngOracle for PcgRng {
    fn next_u32(&self, seed: u64) -> u32 {
        let state = Self::pcg_step(seed);
        Self::pcg_output(state)
    }
}

/// Compute a deterministic per-roll seed from match state components.
///
/// # Arguments
///
/// * `game_seed` - Base seed fixed at match start
/// * `nonce` - Command sequence number (increments each executed command)
/// * `unit_id` - Unit the roll concerns
/// * `context` - Distinguishes multiple rolls within one command:
///   `0` hit, `1` dodge, `2` critical, `3+` zone behaviors
pub fn compute_seed(game_seed: u64, nonce: u64, unit_id: u32, context: u32) -> u64 {
    // SplitMix64/FxHash-style mixing constants with a final avalanche.
    let mut hash = game_seed;

    hash ^= nonce.wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= (unit_id as u64).wrapping_mul(0x517cc1b727220a95);
    hash ^= (context as u64).wrapping_mul(0x85ebca6b);

    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;

    hash
}
