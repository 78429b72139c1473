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

//! Union of HyperLogLog sketches.
//!
//! The union of sketches sharing `lg_k` and hash function is the sketch whose
//! registers are the elementwise maximum of the inputs. It estimates the
//! number of distinct elements across all the input streams.
//!
//! [`union`] combines a fixed set of sketches at once; [`HllUnion`] keeps an
//! internal "gadget" sketch and accumulates inputs one at a time.
//!
//! # Example
//!
//! ```
//! use cardsketches::hll::{HllSketch, HllUnion};
//!
//! let mut union = HllUnion::new(12).unwrap();
//!
//! let mut sketch1 = HllSketch::new(12).unwrap();
//! sketch1.update("foo").unwrap();
//! sketch1.update("bar").unwrap();
//!
//! let mut sketch2 = HllSketch::new(12).unwrap();
//! sketch2.update("bar").unwrap();
//! sketch2.update("baz").unwrap();
//!
//! union.update(&sketch1).unwrap();
//! union.update(&sketch2).unwrap();
//!
//! let result = union.result();
//! assert!((result.estimate() - 3.0).abs() < 0.5);
//! ```

use crate::error::Error;
use crate::error::ErrorKind;
use crate::hash::Murmur32;
use crate::hll::HllSketch;

/// Returns a new sketch holding the union of `sketches`.
///
/// The result hashes with a clone of the first sketch's hash function.
///
/// # Errors
///
/// If fewer than two sketches are given, or their `lg_k` differ.
pub fn union<H: Clone>(sketches: &[&HllSketch<H>]) -> Result<HllSketch<H>, Error> {
    let [first, rest @ ..] = sketches else {
        return Err(too_few_sketches(0));
    };
    if rest.is_empty() {
        return Err(too_few_sketches(1));
    }

    let mut result = (*first).clone();
    for sketch in rest {
        result.merge(sketch)?;
    }
    tracing::debug!(
        lg_k = result.lg_k(),
        num_sketches = sketches.len(),
        "computed hll union"
    );
    Ok(result)
}

fn too_few_sketches(n: usize) -> Error {
    Error::new(
        ErrorKind::InvalidArgument,
        "union requires at least two sketches",
    )
    .with_context("num_sketches", n)
}

/// Incremental union of HyperLogLog sketches with a fixed `lg_k`.
#[derive(Debug, Clone)]
pub struct HllUnion<H = Murmur32> {
    gadget: HllSketch<H>,
}

impl HllUnion<Murmur32> {
    /// Creates an empty union for sketches built with [`HllSketch::new`].
    ///
    /// # Errors
    ///
    /// If `lg_k` is not in `[4, 16]`.
    pub fn new(lg_k: u8) -> Result<Self, Error> {
        Self::with_hasher(lg_k, Murmur32::default())
    }
}

impl<H> HllUnion<H> {
    /// Creates an empty union for sketches hashing with `hasher`.
    pub fn with_hasher(lg_k: u8, hasher: H) -> Result<Self, Error> {
        Ok(Self {
            gadget: HllSketch::with_hasher(lg_k, hasher)?,
        })
    }

    pub fn lg_k(&self) -> u8 {
        self.gadget.lg_k()
    }

    /// Merges `sketch` into the union.
    ///
    /// # Errors
    ///
    /// If `sketch` has a different `lg_k` than the union.
    pub fn update(&mut self, sketch: &HllSketch<H>) -> Result<(), Error> {
        self.gadget.merge(sketch)
    }

    /// Returns the estimate of the union so far.
    pub fn estimate(&self) -> f64 {
        self.gadget.estimate()
    }

    /// Returns true if no non-empty sketch has been merged.
    pub fn is_empty(&self) -> bool {
        self.gadget.is_empty()
    }

    /// Resets the union to the empty state.
    pub fn reset(&mut self) {
        self.gadget.clear();
    }

    /// Returns the union as a sketch, consuming the union.
    pub fn into_result(self) -> HllSketch<H> {
        self.gadget
    }
}

impl<H: Clone> HllUnion<H> {
    /// Returns a copy of the union as a sketch.
    pub fn result(&self) -> HllSketch<H> {
        self.gadget.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_requires_two_sketches() {
        let a = HllSketch::new(8).unwrap();
        let err = union::<Murmur32>(&[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        let err = union(&[&a]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(union(&[&a, &a]).is_ok());
    }

    #[test]
    fn test_union_precision_mismatch() {
        let a = HllSketch::new(8).unwrap();
        let b = HllSketch::new(8).unwrap();
        let c = HllSketch::new(10).unwrap();
        let err = union(&[&a, &b, &c]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    }

    #[test]
    fn test_union_leaves_inputs_untouched() {
        let mut a = HllSketch::new(8).unwrap();
        let mut b = HllSketch::new(8).unwrap();
        a.update_all(0..50).unwrap();
        b.update_all(50..100).unwrap();
        let a_before = a.clone();
        let u = union(&[&a, &b]).unwrap();
        assert_eq!(a, a_before);
        assert_ne!(u, a);
    }

    #[test]
    fn test_incremental_union() {
        let mut a = HllSketch::new(10).unwrap();
        let mut b = HllSketch::new(10).unwrap();
        a.update_all(0..300).unwrap();
        b.update_all(200..500).unwrap();

        let mut gadget = HllUnion::new(10).unwrap();
        assert!(gadget.is_empty());
        gadget.update(&a).unwrap();
        gadget.update(&b).unwrap();
        assert_eq!(gadget.result(), union(&[&a, &b]).unwrap());

        let wrong = HllSketch::new(11).unwrap();
        assert!(gadget.update(&wrong).is_err());

        gadget.reset();
        assert!(gadget.is_empty());
        assert_eq!(gadget.into_result().lg_k(), 10);
    }
}
