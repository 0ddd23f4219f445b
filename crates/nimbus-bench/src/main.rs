use std::path::PathBuf;
use std::process;

use nimbus_bench::report;
use nimbus_bench::runner::{BenchmarkRunner, GpuContext, RunConfig, BACKGROUND};
use nimbus_bench::scenes;
use nimbus_classify::defaults::reference_table;
use nimbus_core::constants::DEFAULT_HEIGHT;
use nimbus_render::{Presentation, RayMarchParams};

fn usage() {
    eprintln!("Usage: bench-runner [OPTIONS]");
    eprintln!("  --grid <path>                  Render this JSON grid instead of the synthetic scenes");
    eprintln!("  --transfer <path>              RON transfer table (default: built-in reflectivity)");
    eprintln!("  --steps <n>                    March steps, clamped to 1..=5000 (default: 1000)");
    eprintln!("  --height <h>                   Presentation height, clamped to 1..=10 (default: 1)");
    eprintln!("  --frames <n>                   Frames per scene (default: 10)");
    eprintln!("  --size <WxH>                   Frame size in pixels (default: 320x240)");
    eprintln!("  --gpu                          Also render on the GPU");
    eprintln!("  --snapshot <path>              Write the first frame of the first scene as PNG");
    eprintln!("  --baseline <path>              Load baseline JSON for comparison");
    eprintln!("  --output <path>                Save current results as JSON baseline");
    eprintln!(
        "  --regression-threshold <pct>   Regression threshold percentage (default: 10)"
    );
}

/// Log and exit with status 1.
fn fail(msg: impl std::fmt::Display) -> ! {
    log::error!("{msg}");
    process::exit(1);
}

/// Value following a flag, parsed. Exits on a missing or malformed value.
fn value<T: std::str::FromStr>(args: &[String], i: usize, flag: &str) -> T {
    let Some(raw) = args.get(i) else {
        fail(format!("missing value for {flag}"));
    };
    raw.parse()
        .unwrap_or_else(|_| fail(format!("invalid {flag} value: {raw}")))
}

fn parse_size(raw: &str) -> Option<(u32, u32)> {
    let (w, h) = raw.split_once(['x', 'X'])?;
    Some((w.parse().ok()?, h.parse().ok()?))
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();

    let mut grid_path: Option<PathBuf> = None;
    let mut transfer_path: Option<PathBuf> = None;
    let mut snapshot_path: Option<PathBuf> = None;
    let mut baseline_path: Option<PathBuf> = None;
    let mut output_path: Option<PathBuf> = None;
    let mut regression_threshold = 10.0f64;
    let mut steps = RayMarchParams::default().step_count();
    let mut height = DEFAULT_HEIGHT;
    let mut frames = 10u32;
    let mut size = (320u32, 240u32);
    let mut use_gpu = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--grid" => {
                i += 1;
                grid_path = Some(value::<PathBuf>(&args, i, "--grid"));
            }
            "--transfer" => {
                i += 1;
                transfer_path = Some(value::<PathBuf>(&args, i, "--transfer"));
            }
            "--steps" => {
                i += 1;
                steps = value(&args, i, "--steps");
            }
            "--height" => {
                i += 1;
                height = value(&args, i, "--height");
            }
            "--frames" => {
                i += 1;
                frames = value(&args, i, "--frames");
            }
            "--size" => {
                i += 1;
                let raw: String = value(&args, i, "--size");
                size = parse_size(&raw)
                    .unwrap_or_else(|| fail(format!("invalid --size value: {raw}")));
            }
            "--gpu" => use_gpu = true,
            "--snapshot" => {
                i += 1;
                snapshot_path = Some(value::<PathBuf>(&args, i, "--snapshot"));
            }
            "--baseline" => {
                i += 1;
                baseline_path = Some(value::<PathBuf>(&args, i, "--baseline"));
            }
            "--output" => {
                i += 1;
                output_path = Some(value::<PathBuf>(&args, i, "--output"));
            }
            "--regression-threshold" => {
                i += 1;
                regression_threshold = value(&args, i, "--regression-threshold");
            }
            "--help" | "-h" => {
                usage();
                process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    let transfer = match &transfer_path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .unwrap_or_else(|e| fail(format!("cannot read {}: {e}", path.display())));
            nimbus_classify::load_transfer_from_str(&text).unwrap_or_else(|e| fail(e))
        }
        None => reference_table(),
    };
    log::info!("Transfer table: {} entries", transfer.len());

    let scene_list = match &grid_path {
        Some(path) => {
            let grid = nimbus_volume::load_grid_file(path).unwrap_or_else(|e| fail(e));
            let name = path
                .file_stem()
                .map_or_else(|| "grid".to_string(), |s| s.to_string_lossy().into_owned());
            vec![scenes::user_scene(&name, grid)]
        }
        None => scenes::standard_scenes(),
    };

    let gpu = if use_gpu {
        log::info!("Initializing GPU...");
        Some(GpuContext::new().unwrap_or_else(|e| fail(e)))
    } else {
        None
    };

    let config = RunConfig {
        frames,
        width: size.0,
        height: size.1,
        params: RayMarchParams::default().with_step_count(steps),
        presentation: Presentation::with_height(height),
        transfer,
    };
    let runner = BenchmarkRunner::new(config, gpu);

    let mut results = Vec::new();
    for (idx, scene) in scene_list.iter().enumerate() {
        let (result, image) = runner.run_scene(scene).unwrap_or_else(|e| fail(e));
        if idx == 0 {
            if let Some(ref path) = snapshot_path {
                nimbus_bench::snapshot::save_png(
                    path,
                    &image.pixels,
                    image.width,
                    image.height,
                    BACKGROUND,
                )
                .unwrap_or_else(|e| fail(format!("failed to write snapshot: {e}")));
                log::info!("Saved snapshot to {}", path.display());
            }
        }
        results.push(result);
    }

    // Print markdown summary
    println!("\n## Benchmark Results\n");
    println!("{}", report::format_markdown(&results));

    // Save output baseline
    if let Some(ref path) = output_path {
        let baseline = report::Baseline {
            timestamp: run_timestamp(),
            results: results.clone(),
        };
        report::save_baseline(path, &baseline)
            .unwrap_or_else(|e| fail(format!("failed to save baseline: {e}")));
        log::info!("Saved baseline to {}", path.display());
    }

    // Compare against baseline
    if let Some(ref path) = baseline_path {
        if let Some(baseline) = report::load_baseline(path) {
            let regressions = report::compare(&results, &baseline, regression_threshold);
            println!(
                "{}",
                report::format_comparison(&regressions, regression_threshold)
            );
            if !regressions.is_empty() {
                eprintln!(
                    "ERROR: {} regressions detected, exiting with code 1",
                    regressions.len()
                );
                process::exit(1);
            }
        } else {
            log::warn!("Baseline file not found: {}", path.display());
        }
    }

    log::info!("Benchmark complete.");
}

/// Seconds since the Unix epoch, as a run label.
fn run_timestamp() -> String {
    let secs = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    format!("bench-{secs}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("640x480"), Some((640, 480)));
        assert_eq!(parse_size("8X4"), Some((8, 4)));
        assert_eq!(parse_size("640"), None);
        assert_eq!(parse_size("axb"), None);
    }
}
