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

use std::collections::BTreeMap;
use std::fmt;

use crate::error::Error;
use crate::error::ErrorKind;
use crate::hash::Canonicalize;
use crate::hash::HashOracle;
use crate::hash::Murmur32;
use crate::hash::UnitScore;

/// A sampled element together with the number of times it was observed
/// while in the sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry<T> {
    value: T,
    count: u64,
}

impl<T> Entry<T> {
    fn new(value: T) -> Self {
        Self { value, count: 1 }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn count(&self) -> u64 {
        self.count
    }
}

/// Outcome of [`RecordinalitySketch::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Admission {
    /// The sample is full and the score does not exceed its minimum.
    Rejected,
    /// The score is already sampled; its occurrence count was incremented.
    Repeated,
    /// The element was added to a sample below capacity.
    Filled,
    /// The element replaced the minimum-scored entry of a full sample.
    Replaced,
}

impl Admission {
    /// Returns true if the sample gained a new key.
    pub fn is_modification(self) -> bool {
        matches!(self, Admission::Filled | Admission::Replaced)
    }
}

/// Recordinality sketch keeping the `k` largest-scored elements of a stream.
pub struct RecordinalitySketch<T, H = UnitScore<Murmur32>>
where
    H: HashOracle,
{
    k: usize,
    sample: BTreeMap<H::Output, Entry<T>>,
    /// Smallest sampled score, `None` while the sample is empty.
    cached_min: Option<H::Output>,
    modifications: u64,
    hasher: H,
}

impl<T> RecordinalitySketch<T, UnitScore<Murmur32>> {
    /// Creates a sketch of capacity `k` scoring elements with a Murmur32
    /// keyed by `seed`.
    ///
    /// # Errors
    ///
    /// If `k` is zero.
    pub fn with_seed(k: usize, seed: u32) -> Result<Self, Error> {
        Self::new(k, UnitScore::with_seed(seed))
    }
}

impl<T, H: HashOracle> RecordinalitySketch<T, H> {
    /// Creates a sketch of capacity `k` scoring elements with `hasher`.
    ///
    /// # Errors
    ///
    /// If `k` is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// # use cardsketches::hash::{Murmur32, UnitScore};
    /// # use cardsketches::recordinality::RecordinalitySketch;
    /// let sketch = RecordinalitySketch::<String>::new(16, UnitScore::new(Murmur32::random())).unwrap();
    /// assert_eq!(sketch.k(), 16);
    /// assert!(RecordinalitySketch::<String>::new(0, UnitScore::default()).is_err());
    /// ```
    pub fn new(k: usize, hasher: H) -> Result<Self, Error> {
        if k == 0 {
            return Err(Error::new(
                ErrorKind::ConfigInvalid,
                "sample capacity k must be positive",
            ));
        }
        Ok(Self {
            k,
            sample: BTreeMap::new(),
            cached_min: None,
            modifications: 0,
            hasher,
        })
    }

    /// Returns the sample capacity.
    pub fn k(&self) -> usize {
        self.k
    }

    /// Returns the number of elements admitted into the sample, counting both
    /// fills and replacements.
    pub fn modifications(&self) -> u64 {
        self.modifications
    }

    /// Returns the number of sampled elements, at most `k`.
    pub fn num_retained(&self) -> usize {
        self.sample.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sample.is_empty()
    }

    /// Returns true once the sample has been filled at least once, from which
    /// point [`estimate`](Self::estimate) is statistically meaningful.
    pub fn is_estimation_mode(&self) -> bool {
        self.modifications >= self.k as u64
    }

    /// Returns the smallest sampled score.
    pub fn min_score(&self) -> Option<H::Output> {
        self.cached_min
    }

    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    /// Iterates over the sample in ascending score order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (H::Output, &Entry<T>)> + '_ {
        self.sample.iter().map(|(score, entry)| (*score, entry))
    }

    /// Returns the cardinality estimate
    /// `floor(k * (1 + 1/k)^(modifications - k + 1) - 1)`.
    ///
    /// The formula is evaluated even before the sample is full; see
    /// [`is_estimation_mode`](Self::is_estimation_mode).
    pub fn estimate(&self) -> u64 {
        let k = self.k as f64;
        let pow = self.modifications as f64 - k + 1.0;
        let estimate = k * (1.0 + 1.0 / k).powf(pow) - 1.0;
        estimate.max(0.0).floor() as u64
    }

    /// Resets the sketch to the empty state.
    pub fn reset(&mut self) {
        self.sample.clear();
        self.cached_min = None;
        self.modifications = 0;
    }
}

impl<T: Canonicalize, H: HashOracle> RecordinalitySketch<T, H> {
    /// Scores `element` and offers it to the sample.
    ///
    /// # Examples
    ///
    /// ```
    /// # use cardsketches::recordinality::{Admission, RecordinalitySketch};
    /// let mut sketch = RecordinalitySketch::with_seed(4, 0).unwrap();
    /// assert_eq!(sketch.update("apple"), Admission::Filled);
    /// assert_eq!(sketch.update("apple"), Admission::Repeated);
    /// assert_eq!(sketch.modifications(), 1);
    /// ```
    pub fn update(&mut self, element: T) -> Admission {
        let score = self.hasher.hash(&element.canonical_bytes());

        let full = self.sample.len() >= self.k;
        if full && self.cached_min.is_some_and(|min| score <= min) {
            return Admission::Rejected;
        }

        if let Some(entry) = self.sample.get_mut(&score) {
            entry.count += 1;
            return Admission::Repeated;
        }

        let admission = if full {
            self.sample.pop_first();
            Admission::Replaced
        } else {
            Admission::Filled
        };
        self.sample.insert(score, Entry::new(element));
        self.cached_min = self.sample.keys().next().copied();
        self.modifications += 1;
        admission
    }

    /// Offers every element of `elements` to the sample.
    pub fn update_all<I>(&mut self, elements: I)
    where
        I: IntoIterator<Item = T>,
    {
        for element in elements {
            self.update(element);
        }
    }
}

impl<T: Canonicalize, H: HashOracle> Extend<T> for RecordinalitySketch<T, H> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.update_all(iter);
    }
}

impl<T: Clone, H: HashOracle + Clone> Clone for RecordinalitySketch<T, H> {
    fn clone(&self) -> Self {
        Self {
            k: self.k,
            sample: self.sample.clone(),
            cached_min: self.cached_min,
            modifications: self.modifications,
            hasher: self.hasher.clone(),
        }
    }
}

impl<T, H: HashOracle> fmt::Debug for RecordinalitySketch<T, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordinalitySketch")
            .field("k", &self.k)
            .field("num_retained", &self.sample.len())
            .field("modifications", &self.modifications)
            .field("estimate", &self.estimate())
            .finish_non_exhaustive()
    }
}
