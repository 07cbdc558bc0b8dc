//! Deterministic random number generation.
//!
//! All randomness in the rules crate flows through [`RngOracle`]: given the
//! same seed the oracle must produce the same value, which keeps matches and
//! bracket seedings replayable from a single base seed.

/// RNG oracle for deterministic random number generation.
///
/// Implementations must be pure: the same seed always yields the same value.
pub trait RngOracle: Send + Sync {
    /// Generate a random u32 value from a seed.
    fn next_u32(&self, seed: u64) -> u32;

    /// Roll a die with N sides (1-N inclusive).
    fn roll_die(&self, seed: u64, sides: u32) -> u32 {
        (self.next_u32(seed) % sides) + 1
    }

    /// Generate a random value in range [min, max] inclusive.
    fn range(&self, seed: u64, min: u32, max: u32) -> u32 {
        if min >= max {
            return min;
        }
        let span = max - min + 1;
        min + (self.next_u32(seed) % span)
    }
}

/// Stateless PCG-XSH-RR generator.
///
/// Small state, fast, and statistically solid; the stateless shape lets the
/// same oracle instance serve every match without interior mutability.
#[derive(Clone, Copy, Debug, Default)]
pub struct PcgRng;

impl PcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    #[inline]
    fn step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    /// XSH-RR output permutation: xorshift high bits, then a random rotate.
    #[inline]
    fn output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RngOracle for PcgRng {
    fn next_u32(&self, seed: u64) -> u32 {
        Self::output(Self::step(seed))
    }
}

/// Compute a deterministic seed for a single random event.
///
/// Mixes the base seed with the event sequence number, the acting side, and a
/// context discriminator so that every roll in a match draws from its own
/// stream. Constants are SplitMix64/FxHash multipliers.
pub fn compute_seed(base_seed: u64, nonce: u64, actor: u32, context: u32) -> u64 {
    let mut hash = base_seed;

    hash ^= nonce.wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= (actor as u64).wrapping_mul(0x517cc1b727220a95);
    hash ^= (context as u64).wrapping_mul(0x85ebca6b);

    // Final avalanche step
    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;

    hash
}

/// Fisher-Yates shuffle driven by the oracle.
///
/// Each swap index draws from its own derived seed, so the permutation is
/// fully determined by `seed`.
pub fn shuffle<T>(items: &mut [T], rng: &dyn RngOracle, seed: u64) {
    let len = items.len();
    if len < 2 {
        return;
    }
    for i in (1..len).rev() {
        let event_seed = compute_seed(seed, i as u64, 0, 0);
        let j = rng.range(event_seed, 0, i as u32) as usize;
        items.swap(i, j);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let rng = PcgRng;
        assert_eq!(rng.next_u32(42), rng.next_u32(42));
        assert_eq!(rng.roll_die(7, 6), rng.roll_die(7, 6));
    }

    #[test]
    fn roll_die_stays_in_range() {
        let rng = PcgRng;
        for seed in 0..1000u64 {
            let face = rng.roll_die(seed, 6);
            assert!((1..=6).contains(&face), "face {face} out of range");
        }
    }

    #[test]
    fn compute_seed_varies_by_context() {
        let a = compute_seed(1, 0, 0, 0);
        let b = compute_seed(1, 0, 0, 1);
        let c = compute_seed(1, 1, 0, 0);
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn shuffle_is_a_reproducible_permutation() {
        let rng = PcgRng;
        let mut first: Vec<u32> = (0..32).collect();
        let mut second: Vec<u32> = (0..32).collect();
        shuffle(&mut first, &rng, 99);
        shuffle(&mut second, &rng, 99);
        assert_eq!(first, second);

        let mut sorted = first.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..32).collect::<Vec<u32>>());
    }

    #[test]
    fn different_seeds_permute_differently() {
        let rng = PcgRng;
        let mut a: Vec<u32> = (0..32).collect();
        let mut b: Vec<u32> = (0..32).collect();
        shuffle(&mut a, &rng, 1);
        shuffle(&mut b, &rng, 2);
        assert_ne!(a, b);
    }
}
