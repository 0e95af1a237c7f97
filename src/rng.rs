//! Seeded xorshift32 stream
//!
//! The single entropy source of the simulation. Identical seed yields an
//! identical draw sequence, which is what makes seeded runs reproducible.
//! Implements the `rand_core` traits so it plugs into anything that accepts
//! a `RngCore`, but gameplay code uses the inherent `next01`/`range` draws
//! whose values are pinned to the reference xorshift32 stream.

use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

/// Substitute seed when a caller passes 0 (xorshift has an absorbing zero
/// state).
const ZERO_SEED_FALLBACK: u32 = 0x075B_CD15; // 123456789

/// 32-bit xorshift generator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Xorshift32 {
    state: u32,
}

impl Xorshift32 {
    pub fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { ZERO_SEED_FALLBACK } else { seed },
        }
    }

    /// Raw current state, for snapshotting
    pub fn state(&self) -> u32 {
        self.state
    }

    #[inline]
    fn step(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Uniform draw in [0, 1)
    #[inline]
    pub fn next01(&mut self) -> f32 {
        (self.step() as f64 / 4_294_967_296.0) as f32
    }

    /// Uniform draw in [a, b)
    #[inline]
    pub fn range(&mut self, a: f32, b: f32) -> f32 {
        a + (b - a) * self.next01()
    }
}

impl RngCore for Xorshift32 {
    #[inline]
    fn next_u32(&mut self) -> u32 {
        self.step()
    }

    #[inline]
    fn next_u64(&mut self) -> u64 {
        rand::rand_core::impls::next_u64_via_u32(self)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        rand::rand_core::impls::fill_bytes_via_next(self, dest)
    }
}

impl SeedableRng for Xorshift32 {
    type Seed = [u8; 4];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::new(u32::from_le_bytes(seed))
    }

    fn seed_from_u64(state: u64) -> Self {
        Self::new(state as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_known_stream() {
        // Reference xorshift32 values for seed 123456789
        let mut rng = Xorshift32::new(123456789);
        let states: Vec<u32> = (0..5).map(|_| rng.next_u32()).collect();
        assert_eq!(
            states,
            vec![
                2714967881, 2238813396, 1250077441, 3820100336, 3177519686
            ]
        );
    }

    #[test]
    fn test_next01_matches_stream() {
        let mut rng = Xorshift32::new(123456789);
        let v = rng.next01();
        assert!((v - (2714967881u32 as f64 / 4_294_967_296.0) as f32).abs() < 1e-9);
        assert!((0.0..1.0).contains(&v));
    }

    #[test]
    fn test_zero_seed_remapped() {
        let mut a = Xorshift32::new(0);
        let mut b = Xorshift32::new(123456789);
        assert_eq!(a.next_u32(), b.next_u32());
    }

    #[test]
    fn test_seedable_roundtrip() {
        let mut a = Xorshift32::seed_from_u64(42);
        let mut b = Xorshift32::from_seed(42u32.to_le_bytes());
        for _ in 0..16 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }

    proptest! {
        #[test]
        fn prop_same_seed_same_stream(seed in any::<u32>(), n in 1usize..256) {
            let mut a = Xorshift32::new(seed);
            let mut b = Xorshift32::new(seed);
            for _ in 0..n {
                prop_assert_eq!(a.next_u32(), b.next_u32());
            }
        }

        #[test]
        fn prop_range_bounds(seed in any::<u32>(), a in -1000.0f32..1000.0, w in 0.001f32..1000.0) {
            let mut rng = Xorshift32::new(seed);
            let v = rng.range(a, a + w);
            prop_assert!(v >= a && v < a + w);
        }
    }
}
