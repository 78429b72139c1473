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

//! Statistical accuracy of HllSketch over independently seeded hash functions.

use cardsketches::hll::HllSketch;
use googletest::assert_that;
use googletest::prelude::lt;

const RUNS: u32 = 25;

fn average_relative_error(lg_k: u8, n: u64) -> f64 {
    let mut total = 0.0;
    for seed in 0..RUNS {
        let mut sketch = HllSketch::builder().lg_k(lg_k).seed(seed).build().unwrap();
        sketch.update_all(0..n).unwrap();
        total += (sketch.estimate() - n as f64).abs() / n as f64;
    }
    total / RUNS as f64
}

fn standard_error(lg_k: u8) -> f64 {
    1.04 / ((1u64 << lg_k) as f64).sqrt()
}

#[test]
fn test_accuracy_raw_range() {
    let lg_k = 10;
    let error = average_relative_error(lg_k, 50_000);
    assert_that!(error, lt(2.0 * standard_error(lg_k)));
}

#[test]
fn test_accuracy_small_range() {
    let lg_k = 12;
    let error = average_relative_error(lg_k, 1_000);
    assert_that!(error, lt(2.0 * standard_error(lg_k)));
}

#[test]
fn test_accuracy_low_precision() {
    let lg_k = 6;
    let error = average_relative_error(lg_k, 20_000);
    assert_that!(error, lt(2.0 * standard_error(lg_k)));
}
