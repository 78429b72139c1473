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

//! HyperLogLog sketch implementation for cardinality estimation.
//!
//! The sketch keeps `m = 2^lg_k` one-byte registers. Every 32-bit hash is split
//! into a register index (the low `lg_k` bits) and a tail (the remaining
//! `32 - lg_k` bits); the register keeps the maximum rank seen, where the rank
//! is one more than the number of leading zeros of the tail.
//!
//! # Estimation regimes
//!
//! The raw estimate `E = alpha * m^2 / sum(2^-register)` is corrected in three
//! ranges, see [`Regime`]:
//!
//! - `E <= 2.5 * m`: linear counting over the zero registers
//! - `E <= 2^32 / 30`: no correction
//! - `E < 2^32`: large range correction for 32-bit hash collisions
//! - `E >= 2^32`: the correction is undefined and `E` is returned as is
//!
//! Estimates within 15% of the small range threshold carry extra error; they
//! are flagged on [`Estimate::near_threshold`] and logged at warn level.
//!
//! # Usage
//!
//! ```rust
//! # use cardsketches::hll::HllSketch;
//! let mut sketch = HllSketch::new(12).unwrap();
//! for i in 0..1000 {
//!     sketch.update(&i).unwrap();
//! }
//! let estimate = sketch.estimate();
//! assert!((estimate - 1000.0).abs() < 100.0);
//! ```
//!
//! # Merging
//!
//! Sketches with the same `lg_k` and hash function merge losslessly:
//!
//! ```rust
//! # use cardsketches::hll::{self, HllSketch};
//! let mut a = HllSketch::new(10).unwrap();
//! let mut b = HllSketch::new(10).unwrap();
//! a.update("foo").unwrap();
//! b.update("bar").unwrap();
//!
//! let u = hll::union(&[&a, &b]).unwrap();
//! a.merge(&b).unwrap();
//! assert_eq!(a, u);
//! ```

mod estimator;
mod serialization;
mod sketch;
mod union;

pub use self::estimator::Estimate;
pub use self::estimator::Regime;
pub use self::sketch::HllSketch;
pub use self::sketch::HllSketchBuilder;
pub use self::union::HllUnion;
pub use self::union::union;

use crate::error::Error;
use crate::hash::HASH_BITS;

/// Minimum value of lg_k.
pub const MIN_LG_K: u8 = 4;
/// Maximum value of lg_k.
pub const MAX_LG_K: u8 = 16;
/// Default value of lg_k.
pub const DEFAULT_LG_K: u8 = 8;

fn check_lg_k(lg_k: u8) -> Result<(), Error> {
    if (MIN_LG_K..=MAX_LG_K).contains(&lg_k) {
        Ok(())
    } else {
        Err(Error::precision_out_of_range(lg_k, MIN_LG_K, MAX_LG_K))
    }
}

/// Bias correction constant for `2^lg_k` registers.
fn alpha(lg_k: u8) -> f64 {
    match lg_k {
        4 => 0.673,
        5 => 0.697,
        6 => 0.709,
        _ => 0.7213 / (1.0 + 1.079 / (1u64 << lg_k) as f64),
    }
}

/// Largest number of tail bits a 32-bit hash carries once `lg_k` index bits are used.
fn max_rank(lg_k: u8) -> u8 {
    (HASH_BITS - lg_k as u32) as u8
}

/// Split a hash into register index and rank.
///
/// An all-zero tail ranks `max_rank + 1`. A hash wider than [`HASH_BITS`]
/// leaves a tail longer than `max_rank`, which is rejected.
fn slot_and_rank(hash: u64, lg_k: u8) -> Result<(usize, u8), Error> {
    let max_rank = max_rank(lg_k);
    let slot = (hash & ((1u64 << lg_k) - 1)) as usize;
    let tail = hash >> lg_k;
    let bit_length = u64::BITS - tail.leading_zeros();
    let rank = max_rank as i64 - bit_length as i64 + 1;
    if rank <= 0 {
        return Err(Error::hash_overflow(hash, max_rank));
    }
    Ok((slot, rank as u8))
}
