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

//! Hash functions feeding the sketches.
//!
//! Both sketches take their hash function as an injected [`HashOracle`]. The
//! register sketch needs 32-bit values (see [`HASH_BITS`]); the sample sketch
//! only relies on the ordering and equality of whatever the oracle returns.
//!
//! Any `Fn(&[u8]) -> O` closure is an oracle:
//!
//! ```rust
//! # use cardsketches::hash::HashOracle;
//! let oracle = |bytes: &[u8]| bytes.len() as u64;
//! assert_eq!(oracle.hash(b"abc"), 3);
//! ```

mod canonical;
mod murmur;

pub use self::canonical::Canonicalize;
pub use self::murmur::Murmur32;
pub use self::murmur::UnitScore;

/// Declared output width, in bits, of oracles feeding the register sketch.
pub const HASH_BITS: u32 = 32;

/// Maps a canonical byte sequence to a uniformly distributed, totally ordered value.
///
/// Implementations must be deterministic for the lifetime of the sketch that owns them.
pub trait HashOracle {
    /// The hash value.
    type Output: Copy + Ord;

    /// Hash `bytes`.
    fn hash(&self, bytes: &[u8]) -> Self::Output;
}

impl<F, O> HashOracle for F
where
    F: Fn(&[u8]) -> O,
    O: Copy + Ord,
{
    type Output = O;

    fn hash(&self, bytes: &[u8]) -> O {
        self(bytes)
    }
}
