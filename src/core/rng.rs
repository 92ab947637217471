//! Seedable Random Number Generator
//!
//! Xorshift128+ style generator injected into every entity constructor.
//! Given the same seed, produces the identical sequence on all platforms,
//! which keeps spawn positions and colours reproducible in tests.

use serde::{Serialize, Deserialize};
use sha2::{Sha256, Digest};

use super::vec2::Vec2;

/// Seedable PRNG.
///
/// # Example
///
/// ```
/// use orb_arena::core::rng::DeterministicRng;
///
/// let mut a = DeterministicRng::new(12345);
/// let mut b = DeterministicRng::new(12345);
/// assert_eq!(a.next_u64(), b.next_u64());
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeterministicRng {
    state: [u64; 2],
}

impl Default for DeterministicRng {
    fn default() -> Self {
        Self::new(0)
    }
}

impl DeterministicRng {
    /// Create a new RNG from a 64-bit seed.
    ///
    /// Uses SplitMix64 to initialize the internal state, ensuring
    /// good distribution even from weak seeds.
    pub fn new(seed: u64) -> Self {
        let mut s = seed;
        let state0 = splitmix64(&mut s);
        let state1 = splitmix64(&mut s);

        // Ensure state is never all zeros
        let state = if state0 == 0 && state1 == 0 {
            [1, 1]
        } else {
            [state0, state1]
        };

        Self { state }
    }

    /// Generate the next 64-bit random value.
    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        let s0 = self.state[0];
        let mut s1 = self.state[1];
        let result = s0.wrapping_add(s1);

        s1 ^= s0;
        self.state[0] = s0.rotate_left(24) ^ s1 ^ (s1 << 16);
        self.state[1] = s1.rotate_left(37);

        result
    }

    /// Generate a float in `[0, 1)` from the top 53 bits.
    #[inline]
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Generate a float in `[min, max)`.
    ///
    /// Returns `min` when the range is empty.
    #[inline]
    pub fn next_f64_range(&mut self, min: f64, max: f64) -> f64 {
        if min >= max {
            return min;
        }
        min + self.next_f64() * (max - min)
    }

    /// Random point with both axes in `[min, max)`.
    #[inline]
    pub fn random_position(&mut self, min: f64, max: f64) -> Vec2 {
        let x = self.next_f64_range(min, max);
        let y = self.next_f64_range(min, max);
        Vec2::new(x, y)
    }

    /// Random hue in degrees, `[0, 360)`.
    #[inline]
    pub fn random_hue(&mut self) -> f64 {
        self.next_f64() * 360.0
    }

    /// Get current state (for checkpointing/debugging).
    pub fn state(&self) -> [u64; 2] {
        self.state
    }

    /// Restore from saved state.
    pub fn set_state(&mut self, state: [u64; 2]) {
        self.state = state;
    }
}

/// SplitMix64 for seed initialization.
/// Produces well-distributed values from sequential seeds.
#[inline]
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

/// Derive a world seed from arbitrary entropy bytes.
///
/// Used at boot when no explicit seed is configured.
pub fn derive_world_seed(entropy: &[u8]) -> u64 {
    let mut hasher = Sha256::new();

    // Domain separator
    hasher.update(b"ORB_ARENA_SEED_V1");
    hasher.update(entropy);

    let hash = hasher.finalize();

    let mut seed = [0u8; 8];
    seed.copy_from_slice(&hash[..8]);
    u64::from_le_bytes(seed)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_positions() {
        let mut a = DeterministicRng::new(12345);
        let mut b = DeterministicRng::new(12345);
        let mut c = DeterministicRng::new(54321);

        let mut diverged = false;
        for _ in 0..500 {
            let pa = a.random_position(0.0, 5000.0);
            assert_eq!(pa, b.random_position(0.0, 5000.0));
            diverged |= pa != c.random_position(0.0, 5000.0);
        }
        assert!(diverged);
    }

    #[test]
    fn test_rng_known_values() {
        // Regression values; seeded tests elsewhere depend on this sequence.
        let mut rng = DeterministicRng::new(42);
        assert_eq!(rng.next_u64(), 16629283624882167704);
        assert_eq!(rng.next_u64(), 1420492921613871959);
        assert_eq!(rng.next_u64(), 9768315062676884790);
    }

    #[test]
    fn test_next_f64_unit_interval() {
        let mut rng = DeterministicRng::new(9999);
        for _ in 0..10_000 {
            let v = rng.next_f64();
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn test_next_f64_range() {
        let mut rng = DeterministicRng::new(5678);
        for _ in 0..1000 {
            let v = rng.next_f64_range(30.0, 4970.0);
            assert!((30.0..4970.0).contains(&v));
        }

        // Empty range collapses to min
        assert_eq!(rng.next_f64_range(5.0, 5.0), 5.0);
        assert_eq!(rng.next_f64_range(7.0, 3.0), 7.0);
    }

    #[test]
    fn test_random_position_and_hue() {
        let mut rng = DeterministicRng::new(7777);
        for _ in 0..100 {
            let pos = rng.random_position(0.0, 5000.0);
            assert!((0.0..5000.0).contains(&pos.x));
            assert!((0.0..5000.0).contains(&pos.y));

            let hue = rng.random_hue();
            assert!((0.0..360.0).contains(&hue));
        }
    }

    #[test]
    fn test_derive_world_seed() {
        let seed1 = derive_world_seed(b"boot-entropy");
        let seed2 = derive_world_seed(b"boot-entropy");
        assert_eq!(seed1, seed2);

        let seed3 = derive_world_seed(b"other-entropy");
        assert_ne!(seed1, seed3);
    }

    #[test]
    fn test_state_restore_replays_spawns() {
        let mut rng = DeterministicRng::new(5555);
        rng.random_hue();

        let saved = rng.state();
        let first: Vec<Vec2> = (0..8).map(|_| rng.random_position(30.0, 4970.0)).collect();

        let mut restored = DeterministicRng::default();
        restored.set_state(saved);
        let replayed: Vec<Vec2> = (0..8).map(|_| restored.random_position(30.0, 4970.0)).collect();

        assert_eq!(first, replayed);
    }
}
