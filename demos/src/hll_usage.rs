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

use cardsketches::hll;
use cardsketches::hll::HllSketch;
use clap::Parser;

#[derive(Clone, Debug, PartialEq, Parser)]
#[clap(about, version)]
struct Config {
    /// Number of distinct values to feed.
    #[clap(long, default_value_t = 10_000)]
    count: u64,
    /// Log2 of the number of registers.
    #[clap(long, default_value_t = 12)]
    lg_k: u8,
}

fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    println!("config: {:?}", config);

    let mut sketch = HllSketch::new(config.lg_k)?;
    sketch.update_all(0..config.count)?;

    let estimate = sketch.estimate_detail();
    let actual = config.count as f64;
    let error = ((estimate.value() - actual) / actual * 100.0).abs();

    println!("Actual unique values: {}", config.count);
    println!("Estimated unique values: {:.2}", estimate.value());
    println!("Relative error: {:.2}%", error);
    println!(
        "Regime: {:?}, raw estimate: {:.2}",
        estimate.regime(),
        estimate.raw()
    );
    if estimate.near_threshold() {
        println!("(estimate is near the small range threshold)");
    }

    println!("\nAdding the same values again...");
    sketch.update_all(0..config.count)?;
    println!("Estimate after duplicates: {:.2}", sketch.estimate());

    println!("\nSerializing sketch...");
    let bytes = sketch.serialize();
    println!("Serialized size: {} bytes", bytes.len());
    let restored = HllSketch::deserialize(&bytes)?;
    println!("Estimate after deserialization: {:.2}", restored.estimate());
    println!("\nDebug: {:?}", restored);

    println!("\nCounting four partitions separately...");
    let mut partitions = Vec::new();
    for p in 0..4 {
        let mut partition = HllSketch::new(config.lg_k)?;
        let values = (0..config.count).filter(|i| i % 4 == p);
        partition.update_all(values)?;
        println!("Partition {p}: {:.2}", partition.estimate());
        partitions.push(partition);
    }
    let refs: Vec<&HllSketch> = partitions.iter().collect();
    let union = hll::union(&refs)?;
    println!("Union estimate: {:.2}", union.estimate());
    println!("Union equals single sketch: {}", union == restored);

    Ok(())
}
