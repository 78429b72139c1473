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

use cardsketches::hash::Murmur32;
use cardsketches::hash::UnitScore;
use cardsketches::recordinality::RecordinalitySketch;
use clap::Parser;

#[derive(Clone, Debug, PartialEq, Parser)]
#[clap(about, version)]
struct Config {
    /// Number of distinct values to feed.
    #[clap(long, default_value_t = 10_000)]
    count: u64,
    /// Sample capacity.
    #[clap(long, default_value_t = 256)]
    k: usize,
    /// Hash seed; a random seed is drawn when absent.
    #[clap(long)]
    seed: Option<u32>,
}

fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    println!("config: {:?}", config);

    let hasher = match config.seed {
        Some(seed) => Murmur32::with_seed(seed),
        None => Murmur32::random(),
    };
    println!("hash seed: {}", hasher.seed());
    let mut sketch = RecordinalitySketch::new(config.k, UnitScore::new(hasher))?;

    // every value appears three times, in rotated order
    for round in 0..3 {
        let words = (0..config.count).map(|i| (i + round * 13) % config.count);
        sketch.extend(words.map(|i| format!("word-{i}")));
    }

    let estimate = sketch.estimate();
    let actual = config.count as f64;
    let error = ((estimate as f64 - actual) / actual * 100.0).abs();

    println!("Actual unique values: {}", config.count);
    println!("Estimated unique values: {}", estimate);
    println!("Relative error: {:.2}%", error);
    println!("Modifications: {}", sketch.modifications());
    if !sketch.is_estimation_mode() {
        let exact = sketch.num_retained();
        println!("Sample never filled, exact count: {exact}");
    }

    println!("\nTop of the sample:");
    for (score, entry) in sketch.iter().rev().take(5) {
        println!(
            "{:.6} {} (seen {} times)",
            score.into_inner(),
            entry.value(),
            entry.count()
        );
    }

    println!("\nDebug: {:?}", sketch);
    Ok(())
}
