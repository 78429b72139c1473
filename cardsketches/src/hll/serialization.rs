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

//! Binary layout of a HyperLogLog sketch.
//!
//! | Byte      | Field     | Description                     |
//! |-----------|-----------|---------------------------------|
//! | 0         | lg_k      | Log2 of the number of registers |
//! | 1 ..= m   | registers | One byte per register, in order |
//!
//! Bytes past the last register are ignored on read.

use crate::codec::SketchBytes;
use crate::codec::SketchSlice;
use crate::error::Error;
use crate::error::ErrorKind;
use crate::hll::MAX_LG_K;
use crate::hll::MIN_LG_K;
use crate::hll::max_rank;

/// Size of the header preceding the registers.
pub(super) const PREAMBLE_BYTES: usize = 1;

pub(super) fn serialize(lg_k: u8, registers: &[u8]) -> Vec<u8> {
    let mut bytes = SketchBytes::with_capacity(PREAMBLE_BYTES + registers.len());
    bytes.write_u8(lg_k);
    bytes.write(registers);
    bytes.into_bytes()
}

/// Reads `lg_k` and the register array, validating both.
pub(super) fn deserialize(bytes: &[u8]) -> Result<(u8, Box<[u8]>), Error> {
    fn make_error(tag: &'static str) -> impl FnOnce(std::io::Error) -> Error {
        move |err| Error::insufficient_data(tag).set_source(err)
    }

    let mut cursor = SketchSlice::new(bytes);
    let lg_k = cursor.read_u8().map_err(make_error("lg_k"))?;
    if !(MIN_LG_K..=MAX_LG_K).contains(&lg_k) {
        return Err(Error::new(
            ErrorKind::InvalidData,
            format!("lg_k {lg_k} is out of range [{MIN_LG_K}, {MAX_LG_K}]"),
        ));
    }

    let num_registers = 1usize << lg_k;
    let mut registers = vec![0u8; num_registers].into_boxed_slice();
    cursor.read_exact(&mut registers).map_err(|err| {
        Error::insufficient_data("registers")
            .with_context("lg_k", lg_k)
            .with_context("expected_bytes", PREAMBLE_BYTES + num_registers)
            .with_context("actual_bytes", bytes.len())
            .set_source(err)
    })?;
    check_registers(lg_k, &registers)?;

    tracing::debug!(lg_k, "deserialized hll sketch");
    Ok((lg_k, registers))
}

/// Every register must be reachable by some 32-bit hash.
pub(super) fn check_registers(lg_k: u8, registers: &[u8]) -> Result<(), Error> {
    let expected = 1usize << lg_k;
    if registers.len() != expected {
        return Err(Error::new(
            ErrorKind::InvalidData,
            format!(
                "expected {expected} registers for lg_k {lg_k}, got {}",
                registers.len()
            ),
        ));
    }

    let limit = max_rank(lg_k) + 1;
    let overflow = registers.iter().position(|&r| r > limit);
    if let Some(slot) = overflow {
        let value = registers[slot];
        return Err(Error::new(
            ErrorKind::InvalidData,
            format!("register {slot} holds {value}, above the largest possible rank {limit}"),
        ));
    }
    Ok(())
}
