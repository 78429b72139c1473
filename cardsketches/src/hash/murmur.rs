// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use ordered_float::OrderedFloat;

use crate::hash::HashOracle;

/// MurmurHash3 (x64, 128-bit) truncated to its low 32 bits.
///
/// Sketches hashed with equal seeds can be merged; [`Murmur32::random`]
/// draws a fresh seed, which gives an independent member of the hash family
/// for each call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Murmur32 {
    seed: u32,
}

impl Murmur32 {
    /// Seed used by [`Murmur32::default`].
    pub const DEFAULT_SEED: u32 = 9001;

    /// Creates a hash function keyed by `seed`.
    pub fn with_seed(seed: u32) -> Self {
        Self { seed }
    }

    /// Creates a hash function keyed by a seed drawn from the clock and the
    /// process id.
    pub fn random() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos() as u64;
        Self::with_seed(mix_seed(nanos ^ u64::from(std::process::id())))
    }

    /// Returns the seed.
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Returns the 32-bit hash of `bytes`.
    pub fn hash32(&self, bytes: &[u8]) -> u32 {
        let (h1, _) = mur3::murmurhash3_x64_128(bytes, self.seed);
        h1 as u32
    }
}

/// SplitMix64 finalizer, keeping the high half.
fn mix_seed(mut z: u64) -> u32 {
    z = z.wrapping_add(0x9e3779b97f4a7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
    ((z ^ (z >> 31)) >> 32) as u32
}

impl Default for Murmur32 {
    fn default() -> Self {
        Self::with_seed(Self::DEFAULT_SEED)
    }
}

impl HashOracle for Murmur32 {
    type Output = u64;

    fn hash(&self, bytes: &[u8]) -> u64 {
        self.hash32(bytes) as u64
    }
}

/// Normalizes a 32-bit oracle into a score in `[0, 1]`.
///
/// Inner values wider than 32 bits map above 1.0; the ordering is preserved either way.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnitScore<H = Murmur32> {
    inner: H,
}

impl<H> UnitScore<H> {
    /// Wraps `inner`.
    pub fn new(inner: H) -> Self {
        Self { inner }
    }

    /// Returns the wrapped oracle.
    pub fn inner(&self) -> &H {
        &self.inner
    }
}

impl UnitScore<Murmur32> {
    /// Unit scores over a Murmur32 keyed by `seed`.
    pub fn with_seed(seed: u32) -> Self {
        Self::new(Murmur32::with_seed(seed))
    }
}

impl<H: HashOracle<Output = u64>> HashOracle for UnitScore<H> {
    type Output = OrderedFloat<f64>;

    fn hash(&self, bytes: &[u8]) -> OrderedFloat<f64> {
        OrderedFloat(self.inner.hash(bytes) as f64 / u32::MAX as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remainder() {
        // remainder > 8
        let key = "The quick brown fox jumps over the lazy dog";
        let (h1, h2) = mur3::murmurhash3_x64_128(key.as_bytes(), 0);
        assert_eq!(h1, 0xe34bbc7bbc071b6c);
        assert_eq!(h2, 0x7a433ca9c49a9347);
        assert_eq!(Murmur32::with_seed(0).hash32(key.as_bytes()), 0xbc071b6c);

        // test a remainder = 0
        let key = "The quick brown fox jumps over t";
        let (h1, _) = mur3::murmurhash3_x64_128(key.as_bytes(), 0);
        assert_eq!(h1, 0xdf6af91bb29bdacf);
        assert_eq!(Murmur32::with_seed(0).hash(key.as_bytes()), 0xb29bdacf);
    }

    #[test]
    fn test_output_fits_declared_width() {
        let h = Murmur32::default();
        for i in 0..1000 {
            let v = h.hash(i.to_string().as_bytes());
            assert!(v <= u32::MAX as u64);
        }
    }

    #[test]
    fn test_mix_seed_spreads_nearby_inputs() {
        let seeds: Vec<u32> = (0..64).map(mix_seed).collect();
        for (i, a) in seeds.iter().enumerate() {
            assert!(seeds[i + 1..].iter().all(|b| a != b));
        }
        assert_ne!(mix_seed(0), 0);
    }

    #[test]
    fn test_seeds_differ() {
        let a = Murmur32::with_seed(1);
        let b = Murmur32::with_seed(2);
        assert_ne!(a.hash(b"apple"), b.hash(b"apple"));
        assert_eq!(a.hash(b"apple"), Murmur32::with_seed(1).hash(b"apple"));
    }

    #[test]
    fn test_unit_score_range() {
        let score = UnitScore::with_seed(3);
        for i in 0..1000 {
            let s = score.hash(format!("element_{i}").as_bytes());
            assert!((0.0..=1.0).contains(&s.into_inner()));
        }
        let max = UnitScore::new(|_: &[u8]| u32::MAX as u64);
        assert_eq!(max.hash(b"x"), OrderedFloat(1.0));
    }
}
