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

use std::fmt;

use crate::error::Error;
use crate::hash::Canonicalize;
use crate::hash::HashOracle;
use crate::hash::Murmur32;
use crate::hll::DEFAULT_LG_K;
use crate::hll::alpha;
use crate::hll::check_lg_k;
use crate::hll::estimator;
use crate::hll::estimator::Estimate;
use crate::hll::max_rank;
use crate::hll::serialization;
use crate::hll::slot_and_rank;

/// HyperLogLog sketch over one-byte registers.
///
/// `H` is the hash function applied to every element. Two sketches can only be
/// merged meaningfully when they hash with the same function, which holds for
/// sketches built with [`HllSketch::new`] or the same builder seed.
#[derive(Clone)]
pub struct HllSketch<H = Murmur32> {
    lg_k: u8,
    registers: Box<[u8]>,
    alpha: f64,
    hasher: H,
}

impl HllSketch<Murmur32> {
    /// Creates an empty sketch with `2^lg_k` registers, hashing with
    /// [`Murmur32::default`].
    ///
    /// # Errors
    ///
    /// If `lg_k` is not in `[4, 16]`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use cardsketches::hll::HllSketch;
    /// let sketch = HllSketch::new(10).unwrap();
    /// assert_eq!(sketch.num_registers(), 1024);
    /// assert!(sketch.is_empty());
    /// ```
    pub fn new(lg_k: u8) -> Result<Self, Error> {
        Self::with_hasher(lg_k, Murmur32::default())
    }

    /// Creates a new builder.
    pub fn builder() -> HllSketchBuilder {
        HllSketchBuilder::default()
    }

    /// Deserializes a sketch hashing with [`Murmur32::default`].
    ///
    /// # Errors
    ///
    /// If the bytes are truncated, `lg_k` is out of range, or a register holds a
    /// rank no 32-bit hash can produce.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        Self::deserialize_with_hasher(bytes, Murmur32::default())
    }
}

impl<H> HllSketch<H> {
    /// Creates an empty sketch with `2^lg_k` registers hashing with `hasher`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use cardsketches::hll::HllSketch;
    /// let identity = |b: &[u8]| u64::from(b[0]);
    /// let mut sketch = HllSketch::with_hasher(4, identity).unwrap();
    /// sketch.update(&[0x13u8]).unwrap();
    /// assert_eq!(sketch.registers()[3], 28);
    /// ```
    pub fn with_hasher(lg_k: u8, hasher: H) -> Result<Self, Error> {
        check_lg_k(lg_k)?;
        Ok(Self {
            lg_k,
            registers: vec![0; 1 << lg_k].into_boxed_slice(),
            alpha: alpha(lg_k),
            hasher,
        })
    }

    /// Restores a sketch from a register array.
    ///
    /// # Errors
    ///
    /// If `lg_k` is out of range, `registers` does not hold exactly `2^lg_k`
    /// values, or a value exceeds `max_rank + 1`.
    pub fn from_registers(
        lg_k: u8,
        registers: impl Into<Box<[u8]>>,
        hasher: H,
    ) -> Result<Self, Error> {
        check_lg_k(lg_k)?;
        let registers = registers.into();
        serialization::check_registers(lg_k, &registers)?;
        Ok(Self {
            lg_k,
            registers,
            alpha: alpha(lg_k),
            hasher,
        })
    }

    /// Deserializes a sketch that hashes with `hasher`.
    ///
    /// The serialized form does not carry the hash function; the caller must
    /// supply the one the sketch was built with.
    pub fn deserialize_with_hasher(bytes: &[u8], hasher: H) -> Result<Self, Error> {
        let (lg_k, registers) = serialization::deserialize(bytes)?;
        Ok(Self {
            lg_k,
            registers,
            alpha: alpha(lg_k),
            hasher,
        })
    }

    /// Returns lg_k, the log2 of the number of registers.
    pub fn lg_k(&self) -> u8 {
        self.lg_k
    }

    pub fn num_registers(&self) -> usize {
        self.registers.len()
    }

    pub fn registers(&self) -> &[u8] {
        &self.registers
    }

    /// Returns the largest rank a non-zero hash tail can produce, `32 - lg_k`.
    ///
    /// An all-zero tail ranks one higher.
    pub fn max_rank(&self) -> u8 {
        max_rank(self.lg_k)
    }

    /// Returns the bias correction constant.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Returns the number of registers still at zero.
    pub fn num_zeros(&self) -> usize {
        self.registers.iter().filter(|&&r| r == 0).count()
    }

    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    /// Returns true if no hash has been recorded.
    pub fn is_empty(&self) -> bool {
        self.registers.iter().all(|&r| r == 0)
    }

    /// Resets every register to zero.
    pub fn clear(&mut self) {
        self.registers.fill(0);
    }

    /// Returns the size of [`serialize`](Self::serialize) output, `1 + 2^lg_k`.
    pub fn serialized_size_bytes(&self) -> usize {
        serialization::PREAMBLE_BYTES + self.registers.len()
    }

    /// Serializes the sketch as `lg_k` followed by the registers.
    ///
    /// # Examples
    ///
    /// ```
    /// # use cardsketches::hll::HllSketch;
    /// let mut sketch = HllSketch::new(8).unwrap();
    /// sketch.update("apple").unwrap();
    /// let bytes = sketch.serialize();
    /// assert_eq!(bytes.len(), sketch.serialized_size_bytes());
    /// assert_eq!(HllSketch::deserialize(&bytes).unwrap(), sketch);
    /// ```
    pub fn serialize(&self) -> Vec<u8> {
        serialization::serialize(self.lg_k, &self.registers)
    }

    /// Returns the cardinality estimate.
    pub fn estimate(&self) -> f64 {
        self.estimate_detail().value()
    }

    /// Returns the cardinality estimate along with the raw estimate, the
    /// correction regime and whether the estimate is near the small range
    /// threshold.
    pub fn estimate_detail(&self) -> Estimate {
        estimator::estimate(self.alpha, &self.registers)
    }

    /// Records a precomputed hash.
    ///
    /// # Errors
    ///
    /// If `hash` does not fit in 32 bits the sketch is left unchanged and an
    /// [`ErrorKind::HashContractViolation`](crate::error::ErrorKind::HashContractViolation)
    /// error is returned.
    pub fn update_hash(&mut self, hash: u64) -> Result<(), Error> {
        let (slot, rank) = slot_and_rank(hash, self.lg_k)?;
        let register = &mut self.registers[slot];
        if rank > *register {
            *register = rank;
        }
        Ok(())
    }

    /// Merges `other` into this sketch, keeping the larger value of every register.
    ///
    /// Both sketches must share `lg_k` and should share the hash function.
    ///
    /// # Errors
    ///
    /// If the sketches have different `lg_k`.
    pub fn merge(&mut self, other: &Self) -> Result<(), Error> {
        if self.lg_k != other.lg_k {
            return Err(Error::precision_mismatch(self.lg_k, other.lg_k));
        }
        for (dst, &src) in self.registers.iter_mut().zip(other.registers.iter()) {
            if src > *dst {
                *dst = src;
            }
        }
        tracing::debug!(lg_k = self.lg_k, "merged hll sketch");
        Ok(())
    }
}

impl<H: HashOracle<Output = u64>> HllSketch<H> {
    /// Hashes the canonical bytes of `value` and records the hash.
    ///
    /// # Examples
    ///
    /// ```
    /// # use cardsketches::hll::HllSketch;
    /// let mut sketch = HllSketch::new(12).unwrap();
    /// sketch.update("apple").unwrap();
    /// sketch.update(&42u64).unwrap();
    /// sketch.update("apple").unwrap();
    /// assert!((sketch.estimate() - 2.0).abs() < 0.1);
    /// ```
    pub fn update<T: Canonicalize + ?Sized>(&mut self, value: &T) -> Result<(), Error> {
        let hash = self.hasher.hash(&value.canonical_bytes());
        self.update_hash(hash)
    }

    /// Records every element of `values`, stopping at the first error.
    pub fn update_all<I>(&mut self, values: I) -> Result<(), Error>
    where
        I: IntoIterator,
        I::Item: Canonicalize,
    {
        for value in values {
            self.update(&value)?;
        }
        Ok(())
    }
}

impl<H> PartialEq for HllSketch<H> {
    fn eq(&self, other: &Self) -> bool {
        self.lg_k == other.lg_k && self.registers == other.registers
    }
}

impl<H> Eq for HllSketch<H> {}

impl<H> fmt::Debug for HllSketch<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // no advisory logging from Debug
        let quiet = estimator::compute(self.alpha, &self.registers);
        f.debug_struct("HllSketch")
            .field("lg_k", &self.lg_k)
            .field("num_zeros", &self.num_zeros())
            .field("estimate", &quiet.value())
            .finish_non_exhaustive()
    }
}

/// Builder for [`HllSketch`].
#[derive(Debug, Clone)]
pub struct HllSketchBuilder<H = Murmur32> {
    lg_k: u8,
    hasher: H,
}

impl Default for HllSketchBuilder {
    fn default() -> Self {
        Self {
            lg_k: DEFAULT_LG_K,
            hasher: Murmur32::default(),
        }
    }
}

impl<H> HllSketchBuilder<H> {
    /// Set lg_k, the log2 of the number of registers. Validated by
    /// [`build`](Self::build).
    ///
    /// # Examples
    ///
    /// ```
    /// # use cardsketches::hll::HllSketch;
    /// let sketch = HllSketch::builder().lg_k(12).build().unwrap();
    /// assert_eq!(sketch.lg_k(), 12);
    /// assert!(HllSketch::builder().lg_k(20).build().is_err());
    /// ```
    pub fn lg_k(mut self, lg_k: u8) -> Self {
        self.lg_k = lg_k;
        self
    }

    /// Set the hash function.
    ///
    /// # Examples
    ///
    /// ```
    /// # use cardsketches::hll::HllSketch;
    /// let sketch = HllSketch::builder()
    ///     .hasher(|b: &[u8]| b.len() as u64)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(sketch.lg_k(), 8);
    /// ```
    pub fn hasher<H2>(self, hasher: H2) -> HllSketchBuilder<H2> {
        HllSketchBuilder {
            lg_k: self.lg_k,
            hasher,
        }
    }

    /// Build the HllSketch.
    ///
    /// # Errors
    ///
    /// If lg_k is not in `[4, 16]`.
    pub fn build(self) -> Result<HllSketch<H>, Error> {
        HllSketch::with_hasher(self.lg_k, self.hasher)
    }
}

impl HllSketchBuilder<Murmur32> {
    /// Set the Murmur32 seed.
    ///
    /// # Examples
    ///
    /// ```
    /// # use cardsketches::hll::HllSketch;
    /// let sketch = HllSketch::builder().seed(7).build().unwrap();
    /// assert_eq!(sketch.hasher().seed(), 7);
    /// ```
    pub fn seed(mut self, seed: u32) -> Self {
        self.hasher = Murmur32::with_seed(seed);
        self
    }
}
