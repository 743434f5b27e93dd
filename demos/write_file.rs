// demos/write_file.rs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Generate an exact-size file by streaming chunks to disk
// Usage: cargo run --release --example write-file -- [SIZE_BYTES] [txt|json|xml|csv] [curated|random|zero]

use anyhow::{Context, Result};
use fillgen::{
    generate_to_writer, CancellationToken, ContentMode, Corpus, Format, GenerationRequest,
    GeneratorConfig, Phase, ProgressSnapshot,
};
use std::fs::File;
use std::io::BufWriter;
use std::time::Instant;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let size: u64 = match args.next() {
        Some(s) => s.parse().context("SIZE_BYTES must be an integer")?,
        None => 100 * 1024 * 1024, // 100 MB
    };
    let format: Format = match args.next() {
        Some(s) => s.parse().map_err(anyhow::Error::msg)?,
        None => Format::Json,
    };
    let mode: ContentMode = match args.next() {
        Some(s) => s.parse().map_err(anyhow::Error::msg)?,
        None => ContentMode::Curated,
    };

    let request = GenerationRequest::new(size, format, mode)?;
    let path = format!("test_output.{}", format.extension());
    let file = File::create(&path).with_context(|| format!("creating {}", path))?;

    let start = Instant::now();
    let written = generate_to_writer(
        &request,
        &Corpus::builtin(),
        &GeneratorConfig::default(),
        BufWriter::new(file),
        |s: &ProgressSnapshot| {
            if s.phase == Phase::Generating {
                println!(
                    "  {:>6.2}% | {:.2} MB/s | ETA {:.1}s",
                    s.percentage,
                    s.throughput_bytes_per_second / 1e6,
                    s.estimated_seconds_remaining
                );
            }
        },
        &CancellationToken::new(),
    )?;
    let elapsed = start.elapsed().as_secs_f64();

    println!("Wrote {} bytes of {} ({}) to {} in {:.2}s", written, format, mode, path, elapsed);
    println!("Throughput: {:.2} GB/s", (written as f64) / elapsed / 1e9);

    Ok(())
}
