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

//! Recordinality sketch for cardinality estimation.
//!
//! The sketch keeps the `k` elements with the largest hash scores seen so far.
//! Every time a new element enters that sample, by filling free capacity or by
//! evicting the current minimum, the modification counter grows. For a random
//! hash the number of modifications depends only on the number of distinct
//! elements, which gives the estimate
//!
//! ```text
//! k * (1 + 1/k)^(modifications - k + 1) - 1
//! ```
//!
//! Until the sample has been filled (`modifications < k`) the formula has no
//! statistical grounding; [`RecordinalitySketch::is_estimation_mode`] tells the
//! two regimes apart, and [`RecordinalitySketch::num_retained`] is the exact
//! distinct count before that point.
//!
//! Unlike [`HllSketch`](crate::hll::HllSketch), the sample keeps the elements
//! themselves along with their number of occurrences. Recordinality sketches
//! cannot be merged.
//!
//! # Usage
//!
//! ```rust
//! # use cardsketches::recordinality::RecordinalitySketch;
//! let mut sketch = RecordinalitySketch::with_seed(64, 1).unwrap();
//! sketch.extend((0..10_000).map(|i| format!("user-{}", i % 2_000)));
//! assert!(sketch.is_estimation_mode());
//! let estimate = sketch.estimate() as f64;
//! assert!(estimate > 1000.0 && estimate < 4000.0);
//! ```

mod sketch;

pub use self::sketch::Admission;
pub use self::sketch::Entry;
pub use self::sketch::RecordinalitySketch;
