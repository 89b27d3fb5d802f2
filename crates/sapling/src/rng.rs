//! Deterministic random number stream
//!
//! SplitMix64: small state, portable, and reproducible from a seed. Each
//! runtime owns one stream; scripts reseed it through `RandomSeed`.

use crate::error::{Result, RuntimeError};
use crate::value::{Integer, Real};

/// A deterministic pseudo-random number stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RngStream {
    state: u64,
}

impl RngStream {
    /// Create a stream from a seed.
    #[inline]
    pub const fn new(seed: u64) -> Self {
        // SplitMix64 needs a non-zero state
        let state = if seed == 0 { 0x9E3779B97F4A7C15 } else { seed };
        Self { state }
    }

    /// Restart the stream from `seed`.
    pub fn reseed(&mut self, seed: u64) {
        *self = Self::new(seed);
    }

    /// Current internal state.
    #[inline]
    pub const fn state(&self) -> u64 {
        self.state
    }

    /// Generate the next random u64 value.
    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        self.state = splitmix64_next(self.state);
        splitmix64_mix(self.state)
    }

    /// A uniform value in `[0, 1)`.
    #[inline]
    pub fn uniform(&mut self) -> f64 {
        u64_to_f64_01(self.next_u64())
    }

    /// A fair coin.
    pub fn boolean(&mut self) -> bool {
        self.next_u64() >> 63 == 1
    }

    /// A non-negative Integer spanning the full positive range.
    pub fn integer(&mut self) -> Integer {
        (self.next_u64() >> 1) as Integer & Integer::MAX
    }

    /// An Integer in `[0, max)`.
    pub fn integer_below(&mut self, max: Integer) -> Result<Integer> {
        if max <= 0 {
            return Err(RuntimeError::domain(format!(
                "The upper bound, {max}, must be greater than zero."
            )));
        }
        Ok((self.next_u64() % max as u64) as Integer)
    }

    /// An Integer in `[min, max]`.
    pub fn integer_between(&mut self, min: Integer, max: Integer) -> Result<Integer> {
        if min > max {
            return Err(RuntimeError::domain(format!(
                "The range [{min}, {max}] is empty."
            )));
        }
        let span = (max as i128 - min as i128 + 1) as u128;
        let offset = (self.next_u64() as u128 % span) as i128;
        Ok((min as i128 + offset) as Integer)
    }

    /// A Real in `[0, 1)`.
    pub fn real(&mut self) -> Real {
        // Narrowing to f32 can round up to 1.0
        let r = self.uniform() as Real;
        if r < 1.0 {
            r
        } else {
            1.0 - Real::EPSILON / 2.0
        }
    }

    /// A Real in `[min, max)`.
    pub fn real_between(&mut self, min: Real, max: Real) -> Real {
        min + self.real() * (max - min)
    }
}

/// SplitMix64 state advance.
#[inline]
const fn splitmix64_next(state: u64) -> u64 {
    state.wrapping_add(0x9E3779B97F4A7C15)
}

/// SplitMix64 output mixing.
#[inline]
const fn splitmix64_mix(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

/// Upper 53 bits scaled into `[0, 1)`.
#[inline]
fn u64_to_f64_01(x: u64) -> f64 {
    (x >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
}
