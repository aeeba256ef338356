//! Active voxel extraction driver: commits an `Impi` geometry and reports
//! what the intersection kernel would receive.
//!
//! Usage: cargo run --release --bin impi-extract -- [OPTIONS]
//!
//! Options:
//!   --config <FILE>   JSON geometry parameters (overrides --source)
//!   --source <NAME>   test_voxel | test_octant | test_amr | test_volume (default: test_octant)
//!   --iso <VALUE>     Iso value (default: the source's own)
//!   --dims <N>        Samples per axis for test_volume (default: 64)

use std::path::PathBuf;
use std::time::Instant;

use impi::geometry::{Impi, ImpiParams, SourceParams, VolumeInput, VoxelCollector};

fn main() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .format_timestamp_millis()
    .init();

    let args: Vec<String> = std::env::args().collect();
    let config = parse_str_arg(&args, "--config").map(PathBuf::from);
    let source_name = parse_str_arg(&args, "--source").unwrap_or_else(|| "test_octant".to_string());
    let iso = parse_f32_arg(&args, "--iso");
    let dims = parse_u32_arg(&args, "--dims").unwrap_or(64);

    let mut params = match &config {
        Some(path) => match ImpiParams::load(path) {
            Ok(params) => params,
            Err(e) => {
                log::error!("Failed to read {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => {
            let source = match source_name.as_str() {
                "test_voxel" => SourceParams::TestVoxel,
                "test_octant" => SourceParams::TestOctant,
                "test_amr" => SourceParams::TestAmr,
                "test_volume" => SourceParams::Structured {
                    volume: VolumeInput::Test { dims: [dims; 3] },
                    bounds: None,
                },
                other => {
                    log::error!(
                        "Unknown source '{}' (expected test_voxel, test_octant, test_amr or test_volume)",
                        other
                    );
                    std::process::exit(2);
                }
            };
            ImpiParams::new(source)
        }
    };
    if let Some(iso) = iso {
        params.iso_value = Some(iso);
    }

    println!("=== Impi Active Voxel Extraction ===");
    match &config {
        Some(path) => println!("Config: {}", path.display()),
        None => println!("Source: {}", params.source.kind_name()),
    }
    println!("Iso:    {}", params.iso_value());
    println!();

    let start = Instant::now();
    let mut impi = Impi::new();
    if let Err(e) = impi.commit(&params) {
        log::error!("Commit failed: {}", e);
        std::process::exit(1);
    }

    let mut kernel = VoxelCollector::default();
    let count = match impi.finalize(&mut kernel) {
        Ok(count) => count,
        Err(e) => {
            log::error!("Finalize failed: {}", e);
            std::process::exit(1);
        }
    };
    let elapsed = start.elapsed();

    if let Some(source) = impi.source() {
        let range = source.value_range();
        println!("Cells:  {}", source.cell_count());
        println!("Range:  [{}, {}]", range.min, range.max);
    }
    println!("Active: {}", count);
    match kernel.bounds {
        Some(bounds) => println!(
            "Bounds: ({:.3}, {:.3}, {:.3}) - ({:.3}, {:.3}, {:.3})",
            bounds.min.x, bounds.min.y, bounds.min.z, bounds.max.x, bounds.max.y, bounds.max.z
        ),
        None => println!("Bounds: none (iso value outside the data range)"),
    }
    println!("Time:   {:.2}s", elapsed.as_secs_f64());
}

fn parse_f32_arg(args: &[String], flag: &str) -> Option<f32> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_u32_arg(args: &[String], flag: &str) -> Option<u32> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_str_arg(args: &[String], flag: &str) -> Option<String> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}
