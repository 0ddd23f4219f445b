use std::path::Path;

use crate::runner::BenchmarkResult;

/// A complete baseline containing results from all scenes.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Baseline {
    pub timestamp: String,
    pub results: Vec<BenchmarkResult>,
}

/// Load a baseline from a JSON file. Returns None if the file doesn't exist.
pub fn load_baseline(path: &Path) -> Option<Baseline> {
    let contents = std::fs::read_to_string(path).ok()?;
    serde_json::from_str(&contents).ok()
}

/// Save a baseline to a JSON file.
pub fn save_baseline(path: &Path, baseline: &Baseline) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(baseline).map_err(std::io::Error::other)?;
    std::fs::write(path, json)
}

/// Compare current results against a baseline. Returns a list of regressions
/// (label, percent change) where the threshold is exceeded. CPU means are
/// always compared; GPU means only when both runs have them.
pub fn compare(
    current: &[BenchmarkResult],
    baseline: &Baseline,
    threshold_pct: f64,
) -> Vec<(String, f64)> {
    let mut regressions = Vec::new();

    for result in current {
        let Some(base) = baseline
            .results
            .iter()
            .find(|b| b.scene_name == result.scene_name)
        else {
            continue;
        };

        let mut check = |label: String, now: f64, before: f64| {
            if before <= 0.0 {
                return;
            }
            let pct_change = (now - before) / before * 100.0;
            if pct_change > threshold_pct {
                regressions.push((label, pct_change));
            }
        };

        check(
            result.scene_name.clone(),
            result.cpu.mean_ms,
            base.cpu.mean_ms,
        );
        if let (Some(now), Some(before)) = (&result.gpu, &base.gpu) {
            check(
                format!("{} (gpu)", result.scene_name),
                now.mean_ms,
                before.mean_ms,
            );
        }
    }

    regressions
}

/// Format results as a markdown summary table.
pub fn format_markdown(results: &[BenchmarkResult]) -> String {
    let mut out = String::new();
    out.push_str("| Scene | Dims | Present | Frames | Steps | Mean (ms) | Median (ms) | P95 (ms) | P99 (ms) | Min (ms) | Max (ms) | GPU mean (ms) |\n");
    out.push_str("|-------|------|---------|--------|-------|-----------|-------------|----------|----------|----------|----------|---------------|\n");

    for r in results {
        let gpu = r
            .gpu
            .as_ref()
            .map_or_else(|| "-".to_string(), |g| format!("{:.2}", g.mean_ms));
        out.push_str(&format!(
            "| {} | {}x{}x{} | {} | {} | {} | {:.2} | {:.2} | {:.2} | {:.2} | {:.2} | {:.2} | {} |\n",
            r.scene_name,
            r.dims[0],
            r.dims[1],
            r.dims[2],
            r.present_samples,
            r.frame_count,
            r.step_count,
            r.cpu.mean_ms,
            r.cpu.median_ms,
            r.cpu.p95_ms,
            r.cpu.p99_ms,
            r.cpu.min_ms,
            r.cpu.max_ms,
            gpu,
        ));
    }

    out
}

/// Format a comparison report showing regressions.
pub fn format_comparison(regressions: &[(String, f64)], threshold_pct: f64) -> String {
    if regressions.is_empty() {
        return format!(
            "All scenes within {:.0}% threshold. No regressions detected.\n",
            threshold_pct
        );
    }

    let mut out = String::new();
    out.push_str(&format!(
        "REGRESSIONS DETECTED (>{:.0}% threshold):\n",
        threshold_pct
    ));
    for (scene, pct) in regressions {
        out.push_str(&format!("  - {}: +{:.1}%\n", scene, pct));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::compute_timings;

    fn result(name: &str, cpu_ms: f64, gpu_ms: Option<f64>) -> BenchmarkResult {
        BenchmarkResult {
            scene_name: name.to_string(),
            dims: [4, 4, 4],
            present_samples: 64,
            frame_count: 1,
            width: 8,
            height: 8,
            step_count: 1000,
            cpu: compute_timings(&[cpu_ms]),
            gpu: gpu_ms.map(|ms| compute_timings(&[ms])),
        }
    }

    #[test]
    fn test_compare_flags_slowdowns_only() {
        let baseline = Baseline {
            timestamp: "t".into(),
            results: vec![result("a", 10.0, Some(2.0)), result("b", 10.0, None)],
        };
        let current = [result("a", 10.5, Some(3.0)), result("b", 5.0, None), result("new", 99.0, None)];
        let regressions = compare(&current, &baseline, 10.0);
        assert_eq!(regressions.len(), 1);
        assert_eq!(regressions[0].0, "a (gpu)");
        assert!((regressions[0].1 - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_baseline_json_round_trip_without_gpu_field() {
        let baseline = Baseline {
            timestamp: "t".into(),
            results: vec![result("a", 1.0, None)],
        };
        let mut json: serde_json::Value = serde_json::to_value(&baseline).unwrap();
        json["results"][0].as_object_mut().unwrap().remove("gpu");
        let back: Baseline = serde_json::from_value(json).unwrap();
        assert!(back.results[0].gpu.is_none());
    }

    #[test]
    fn test_markdown_has_row_per_result() {
        let md = format_markdown(&[result("a", 1.0, None), result("b", 2.0, Some(0.5))]);
        assert_eq!(md.lines().count(), 4);
        assert!(md.contains("| 0.50 |"));
    }

    #[test]
    fn test_format_comparison() {
        assert!(format_comparison(&[], 10.0).contains("No regressions"));
        let out = format_comparison(&[("a".into(), 12.34)], 10.0);
        assert!(out.contains("a: +12.3%"));
    }
}
