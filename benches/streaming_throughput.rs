// Benchmark for streaming generation throughput
// Tests different chunk ceilings to see how chunking affects throughput

use fillgen::{
    generate_to_writer, CancellationToken, ContentMode, Corpus, Format, GenerationRequest,
    GeneratorConfig, ProgressSnapshot,
};
use std::io;
use std::time::Instant;

const TEST_SIZE: u64 = 2 * 1024 * 1024 * 1024; // 2 GB (request ceiling)
const WARMUP_SIZE: u64 = 256 * 1024 * 1024; // 256 MB
const ITERATIONS: usize = 3;

fn run_once(size: u64, format: Format, mode: ContentMode, chunk_size: usize) -> f64 {
    let request = GenerationRequest::new(size, format, mode).expect("valid benchmark size");
    let config = GeneratorConfig {
        chunk_size: Some(chunk_size),
        ..Default::default()
    };

    let start = Instant::now();
    generate_to_writer(
        &request,
        &Corpus::builtin(),
        &config,
        io::sink(),
        |_: &ProgressSnapshot| {},
        &CancellationToken::new(),
    )
    .expect("generation failed");
    start.elapsed().as_secs_f64()
}

fn benchmark_chunk_size(chunk_size: usize) {
    println!("\n{}", "=".repeat(80));
    println!("Testing chunk_size = {} MB", chunk_size / (1024 * 1024));
    println!("{}", "=".repeat(80));

    println!("Warming up with {} MB...", WARMUP_SIZE / (1024 * 1024));
    run_once(WARMUP_SIZE, Format::Txt, ContentMode::Zero, chunk_size);

    for (format, mode) in [
        (Format::Txt, ContentMode::Zero),
        (Format::Json, ContentMode::Random),
        (Format::Xml, ContentMode::Curated),
    ] {
        let mut run_times = Vec::new();

        for i in 1..=ITERATIONS {
            let duration_secs = run_once(TEST_SIZE, format, mode, chunk_size);
            let throughput = (TEST_SIZE as f64 / 1024.0 / 1024.0 / 1024.0) / duration_secs;
            run_times.push(duration_secs);
            println!(
                "{:>4}/{:<7} run {:02}: {:.4} seconds | {:.2} GB/s",
                format, mode, i, duration_secs, throughput
            );
        }

        let avg_duration = run_times.iter().sum::<f64>() / ITERATIONS as f64;
        let avg_throughput = (TEST_SIZE as f64 / 1024.0 / 1024.0 / 1024.0) / avg_duration;
        println!(
            "{:>4}/{:<7} AVERAGE: {:.4} seconds | {:.2} GB/s",
            format, mode, avg_duration, avg_throughput
        );
    }
}

fn main() {
    println!("RUST STREAMING THROUGHPUT BENCHMARK");
    println!("Test size: {} GB", TEST_SIZE / (1024 * 1024 * 1024));
    println!("Iterations: {}", ITERATIONS);
    println!();

    println!("System Configuration:");
    println!("  Physical cores: {}", num_cpus::get_physical());
    println!("  Logical CPUs: {}", num_cpus::get());
    println!();

    // Smaller chunks = finer cancellation granularity, more loop overhead
    let chunk_sizes = vec![
        8 * 1024 * 1024,  // 8 MB (2 parallel blocks per chunk)
        32 * 1024 * 1024, // 32 MB
        50 * 1024 * 1024, // 50 MB (default ceiling)
    ];

    for chunk_size in chunk_sizes {
        benchmark_chunk_size(chunk_size);
    }

    println!("\n{}", "=".repeat(80));
    println!("BENCHMARK COMPLETE");
    println!("{}", "=".repeat(80));
}
