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

//! Cardinality sketches for Rust.
//!
//! This crate estimates the number of distinct elements in a stream with
//! bounded memory:
//!
//! - [`hll`]: HyperLogLog over one-byte registers. Mergeable and serializable.
//! - [`recordinality`]: Recordinality, a bounded sample of the largest hash
//!   scores that also keeps the sampled elements.
//!
//! Both sketches hash elements through a [`hash::HashOracle`]. Any
//! `Fn(&[u8]) -> O` closure is an oracle, so tests and callers can supply
//! their own hash function.
//!
//! The crate logs through [`tracing`] and never installs a subscriber.

pub mod error;
pub mod hash;
pub mod hll;
pub mod recordinality;

mod codec;
