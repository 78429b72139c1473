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

use cardsketches::error::ErrorKind;
use cardsketches::hll::HllSketch;
use cardsketches::hll::Regime;
use googletest::assert_that;
use googletest::prelude::eq;
use googletest::prelude::lt;
use googletest::prelude::near;

#[test]
fn test_empty() {
    let sketch = HllSketch::new(12).unwrap();
    assert!(sketch.is_empty());
    assert_eq!(sketch.estimate(), 0.0);
    assert_eq!(sketch.estimate_detail().regime(), Regime::LinearCounting);
}

#[test]
fn test_one_value() {
    let mut sketch = HllSketch::new(12).unwrap();
    sketch.update("apple").unwrap();
    assert!(!sketch.is_empty());
    assert_eq!(sketch.num_zeros(), sketch.num_registers() - 1);
    assert_that!(sketch.estimate(), near(1.0, 0.01));
}

#[test]
fn test_many_values() {
    const N: usize = 10000;
    const N_F64: f64 = N as f64;

    let mut sketch = HllSketch::new(12).unwrap();
    for i in 0..N {
        sketch.update(&i).unwrap();
    }
    assert_that!(sketch.estimate(), near(N_F64, 0.1 * N_F64));
}

#[test]
fn test_duplicate_handling() {
    let mut sketch = HllSketch::new(12).unwrap();
    for _ in 0..10 {
        for i in 0..100 {
            sketch.update(&i).unwrap();
        }
    }

    let estimate = sketch.estimate();
    assert!(
        (estimate - 100.0).abs() < 20.0,
        "Duplicates should not inflate estimate, got {}",
        estimate
    );
}

#[test]
fn test_different_types() {
    let mut sketch = HllSketch::new(10).unwrap();
    sketch.update(&42i32).unwrap();
    sketch.update("hello").unwrap();
    sketch.update(&String::from("world")).unwrap();
    sketch.update(&100u64).unwrap();
    sketch.update(&vec![1u8, 2, 3]).unwrap();
    sketch.update(b"bytes").unwrap();

    let estimate = sketch.estimate();
    assert!(
        estimate >= 5.0,
        "Should have about 6 distinct values, got {estimate}"
    );
}

#[test]
fn test_update_all_matches_update() {
    let words = ["the", "quick", "brown", "fox", "jumps", "over", "the", "lazy", "dog"];
    let mut a = HllSketch::new(8).unwrap();
    let mut b = HllSketch::new(8).unwrap();
    a.update_all(words).unwrap();
    for word in &words {
        b.update(word).unwrap();
    }
    assert_eq!(a, b);
}

#[test]
fn test_single_bit_tails_saturate_small_range() {
    // hash (1 << 31) | i lands in register i with rank 1
    let oracle = |bytes: &[u8]| (1u64 << 31) | u64::from(bytes[0]);
    let mut sketch = HllSketch::with_hasher(4, oracle).unwrap();
    for i in 0..16u8 {
        sketch.update(&[i]).unwrap();
    }

    assert!(!sketch.is_empty());
    assert!(sketch.registers().iter().all(|&r| r == 1));
    assert_eq!(sketch.num_zeros(), 0);

    let estimate = sketch.estimate_detail();
    // alpha * m^2 / (m / 2) = 0.673 * 32
    assert_that!(estimate.raw(), near(21.536, 1e-9));
    assert_that!(estimate.raw(), lt(2.5 * 16.0));
    assert_that!(estimate.regime(), eq(Regime::SaturatedSmallRange));
    assert_that!(estimate.value(), eq(estimate.raw()));
}

#[test]
fn test_half_filled_registers_use_linear_counting() {
    let oracle = |bytes: &[u8]| (1u64 << 31) | u64::from(bytes[0]);
    let mut sketch = HllSketch::with_hasher(4, oracle).unwrap();
    for i in 0..8u8 {
        sketch.update(&[i]).unwrap();
    }

    let estimate = sketch.estimate_detail();
    assert_eq!(estimate.regime(), Regime::LinearCounting);
    assert_that!(estimate.value(), near(16.0 * 2f64.ln(), 1e-9));
}

#[test]
fn test_near_threshold_is_reported() {
    // every register at rank 2 gives raw = 0.673 * 256 / 4, within 15% of 2.5 * 16
    let oracle = |bytes: &[u8]| (1u64 << 30) | u64::from(bytes[0]);
    let mut sketch = HllSketch::with_hasher(4, oracle).unwrap();
    for i in 0..16u8 {
        sketch.update(&[i]).unwrap();
    }

    let estimate = sketch.estimate_detail();
    assert!(estimate.near_threshold());
    assert_eq!(estimate.regime(), Regime::Raw);
    assert_that!(sketch.estimate(), near(43.072, 1e-9));
}

#[test]
fn test_hash_wider_than_32_bits() {
    let mut sketch = HllSketch::with_hasher(12, |_: &[u8]| 1u64 << 33).unwrap();
    let err = sketch.update("anything").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::HashContractViolation);
    assert!(sketch.is_empty());

    let mut sketch = HllSketch::new(12).unwrap();
    assert!(sketch.update_hash(u64::from(u32::MAX)).is_ok());
    assert!(sketch.update_hash(u64::from(u32::MAX) + 1).is_err());
}

#[test]
fn test_all_precisions() {
    for lg_k in 4..=16 {
        let mut sketch = HllSketch::new(lg_k).unwrap();
        sketch.update_all(0..2000).unwrap();
        assert_eq!(sketch.num_registers(), 1 << lg_k);
        assert_eq!(sketch.max_rank(), 32 - lg_k);
        let limit = sketch.max_rank() + 1;
        assert!(
            sketch.registers().iter().all(|&r| r <= limit),
            "register out of range at lg_k {lg_k}"
        );
        assert!(sketch.estimate() > 0.0);
    }
}
