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

//! HyperLogLog estimator with small and large range corrections.

/// 2^32, the size of the hash space.
const HASH_SPACE: f64 = 4_294_967_296.0;
/// Raw estimates up to `SMALL_RANGE_FACTOR * m` use linear counting.
const SMALL_RANGE_FACTOR: f64 = 2.5;
/// Relative distance to the small range threshold that is reported as imprecise.
const NEAR_THRESHOLD_TOLERANCE: f64 = 0.15;
/// Raw estimates above this are corrected for hash collisions.
const LARGE_RANGE_THRESHOLD: f64 = HASH_SPACE / 30.0;

/// Which correction produced an [`Estimate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Regime {
    /// Small range, linear counting over the zero registers.
    LinearCounting,
    /// Small range, but no register is zero so linear counting is undefined;
    /// the raw estimate is returned.
    SaturatedSmallRange,
    /// Intermediate range, the raw estimate is returned unmodified.
    Raw,
    /// Large range correction.
    LargeRange,
    /// The raw estimate reached `2^32`, where the large range correction is
    /// undefined; the raw estimate is returned.
    SaturatedHashSpace,
}

/// Cardinality estimate of an [`HllSketch`](crate::hll::HllSketch).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate {
    value: f64,
    raw: f64,
    regime: Regime,
    near_threshold: bool,
}

impl Estimate {
    /// Returns the corrected estimate.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Returns the uncorrected estimate `alpha * m^2 / sum(2^-register)`.
    pub fn raw(&self) -> f64 {
        self.raw
    }

    /// Returns the correction that was applied.
    pub fn regime(&self) -> Regime {
        self.regime
    }

    /// Returns whether the raw estimate is within 15% of the small range threshold,
    /// where the HyperLogLog accuracy guarantee may not hold.
    pub fn near_threshold(&self) -> bool {
        self.near_threshold
    }
}

#[inline]
fn inv_pow2(value: u8) -> f64 {
    1.0 / (1u64 << value) as f64
}

/// `alpha * m^2 / sum(2^-register)`
pub(super) fn raw_estimate(alpha: f64, registers: &[u8]) -> f64 {
    let m = registers.len() as f64;
    let sum: f64 = registers.iter().map(|&r| inv_pow2(r)).sum();
    alpha * m * m / sum
}

/// Computes the estimate without logging.
pub(super) fn compute(alpha: f64, registers: &[u8]) -> Estimate {
    let m = registers.len() as f64;
    let raw = raw_estimate(alpha, registers);

    let small_range_threshold = SMALL_RANGE_FACTOR * m;
    let near_threshold =
        (raw - small_range_threshold).abs() / small_range_threshold < NEAR_THRESHOLD_TOLERANCE;

    let (value, regime) = if raw <= small_range_threshold {
        let num_zeros = registers.iter().filter(|&&r| r == 0).count();
        if num_zeros > 0 {
            (linear_counting(m, num_zeros as f64), Regime::LinearCounting)
        } else {
            (raw, Regime::SaturatedSmallRange)
        }
    } else if raw <= LARGE_RANGE_THRESHOLD {
        (raw, Regime::Raw)
    } else if raw < HASH_SPACE {
        (large_range_correction(raw), Regime::LargeRange)
    } else {
        (raw, Regime::SaturatedHashSpace)
    };

    Estimate {
        value,
        raw,
        regime,
        near_threshold,
    }
}

/// Computes the estimate and logs the advisories it carries.
pub(super) fn estimate(alpha: f64, registers: &[u8]) -> Estimate {
    let estimate = compute(alpha, registers);
    if estimate.near_threshold {
        tracing::warn!(
            raw = estimate.raw,
            threshold = SMALL_RANGE_FACTOR * registers.len() as f64,
            "estimate is close to the small range threshold, accuracy may be degraded"
        );
    }
    match estimate.regime {
        Regime::SaturatedSmallRange => {
            tracing::warn!(
                raw = estimate.raw,
                "no zero register left for linear counting"
            );
        }
        Regime::SaturatedHashSpace => {
            tracing::warn!(
                raw = estimate.raw,
                "raw estimate exceeds the 32-bit hash space"
            );
        }
        _ => {}
    }
    estimate
}

fn linear_counting(m: f64, num_zeros: f64) -> f64 {
    m * (m / num_zeros).ln()
}

fn large_range_correction(raw: f64) -> f64 {
    -HASH_SPACE * (1.0 - raw / HASH_SPACE).ln()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALPHA_16: f64 = 0.673;

    #[test]
    fn test_empty_registers_estimate_zero() {
        let registers = [0u8; 16];
        let estimate = estimate(ALPHA_16, &registers);
        assert_eq!(estimate.regime(), Regime::LinearCounting);
        assert_eq!(estimate.value(), 0.0);
        assert_eq!(estimate.raw(), ALPHA_16 * 16.0);
    }

    #[test]
    fn test_linear_counting() {
        let mut registers = [0u8; 16];
        registers[..8].fill(1);
        let estimate = estimate(ALPHA_16, &registers);
        assert_eq!(estimate.regime(), Regime::LinearCounting);
        assert!((estimate.value() - 16.0 * 2f64.ln()).abs() < 1e-9);
        assert!(!estimate.near_threshold());
    }

    #[test]
    fn test_saturated_small_range_returns_raw() {
        let registers = [1u8; 16];
        let estimate = estimate(ALPHA_16, &registers);
        assert_eq!(estimate.regime(), Regime::SaturatedSmallRange);
        assert_eq!(estimate.value(), estimate.raw());
        assert!((estimate.raw() - ALPHA_16 * 256.0 / 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_near_threshold_is_flagged() {
        // m = 16: threshold 40; registers at 2 give raw = 0.673 * 256 / 4 = 43.07
        let registers = [2u8; 16];
        let estimate = estimate(ALPHA_16, &registers);
        assert!(estimate.near_threshold());
        assert_eq!(estimate.regime(), Regime::Raw);
        assert_eq!(estimate.value(), estimate.raw());
    }

    #[test]
    fn test_large_range_correction() {
        // m = 16 with every register at 28 pushes the raw estimate beyond 2^32 / 30
        let registers = [28u8; 16];
        let estimate = estimate(ALPHA_16, &registers);
        assert_eq!(estimate.regime(), Regime::LargeRange);
        assert!(estimate.value() > estimate.raw());
    }

    #[test]
    fn test_raw_beyond_hash_space_stays_finite() {
        // m = 16 with every register at 29 gives raw = 0.673 * 16 * 2^29 > 2^32
        let registers = [29u8; 16];
        let estimate = estimate(ALPHA_16, &registers);
        assert_eq!(estimate.regime(), Regime::SaturatedHashSpace);
        assert!(estimate.value().is_finite());
        assert_eq!(estimate.value(), estimate.raw());
    }

    #[test]
    fn test_compute_matches_estimate() {
        let registers = [2u8; 16];
        let quiet = compute(ALPHA_16, &registers);
        assert_eq!(quiet, estimate(ALPHA_16, &registers));
    }
}
