// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use rand::Rng;
use rand::rngs::ThreadRng;

/// The smallest factor applied to a scheduled interval.
pub const MIN_JITTER: f64 = 0.9;

/// The largest factor applied to a scheduled interval.
pub const MAX_JITTER: f64 = 1.1;

/// A source of the random factor used to spread out review dates, so that
/// cards learned together don't all come due on the same day.
pub trait Jitter {
    /// Returns a factor in [`MIN_JITTER`, `MAX_JITTER`].
    fn factor(&mut self) -> f64;
}

/// Draws factors uniformly from the jitter range.
pub struct RandomJitter<R: Rng> {
    rng: R,
}

impl<R: Rng> RandomJitter<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandomJitter<ThreadRng> {
    pub fn thread_local() -> Self {
        Self::new(rand::thread_rng())
    }
}

impl<R: Rng> Jitter for RandomJitter<R> {
    fn factor(&mut self) -> f64 {
        self.rng.gen_range(MIN_JITTER..=MAX_JITTER)
    }
}

/// Always returns the same factor. Values outside the jitter range are
/// clamped into it.
#[derive(Clone, Copy, Debug)]
pub struct FixedJitter(pub f64);

impl FixedJitter {
    /// No jitter at all: intervals are scheduled exactly.
    pub fn none() -> Self {
        Self(1.0)
    }
}

impl Jitter for FixedJitter {
    fn factor(&mut self) -> f64 {
        self.0.clamp(MIN_JITTER, MAX_JITTER)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn test_random_jitter_in_range() {
        let mut jitter = RandomJitter::new(StdRng::seed_from_u64(42));
        for _ in 0..10_000 {
            let f = jitter.factor();
            assert!((MIN_JITTER..=MAX_JITTER).contains(&f));
        }
    }

    #[test]
    fn test_random_jitter_is_spread_out() {
        let mut jitter = RandomJitter::new(StdRng::seed_from_u64(7));
        let samples: Vec<f64> = (0..10_000).map(|_| jitter.factor()).collect();
        let below = samples.iter().filter(|f| **f < 1.0).count();
        // Roughly half the draws should fall on either side of the midpoint.
        assert!((4_000..6_000).contains(&below));
    }

    #[test]
    fn test_seeded_jitter_is_reproducible() {
        let mut a = RandomJitter::new(StdRng::seed_from_u64(1));
        let mut b = RandomJitter::new(StdRng::seed_from_u64(1));
        for _ in 0..100 {
            assert_eq!(a.factor(), b.factor());
        }
    }

    #[test]
    fn test_fixed_jitter_is_clamped() {
        assert_eq!(FixedJitter(0.5).factor(), MIN_JITTER);
        assert_eq!(FixedJitter(2.0).factor(), MAX_JITTER);
        assert_eq!(FixedJitter::none().factor(), 1.0);
    }
}
