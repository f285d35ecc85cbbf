//! Deterministic RNG construction using PCG32.
//!
//! All randomness in the engine flows through an injectable generator so
//! cue draws and playback orderings are reproducible in tests.

use rand::SeedableRng;
use rand_pcg::Pcg32;

/// Creates a PCG32 RNG from a 32-bit seed.
///
/// The 32-bit seed is expanded to 64 bits by duplicating the value in both
/// halves, as required by PCG32's state initialization.
pub fn create_rng(seed: u32) -> Pcg32 {
    // Expand 32-bit seed to 64-bit for PCG32 state
    let seed64 = (seed as u64) | ((seed as u64) << 32);
    Pcg32::seed_from_u64(seed64)
}

/// Creates an entropy-seeded PCG32 RNG for normal (non-test) use.
pub fn entropy_rng() -> Pcg32 {
    Pcg32::from_entropy()
}
