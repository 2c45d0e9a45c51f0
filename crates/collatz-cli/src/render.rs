//! Plain-text rendering for terminal output. `--json` bypasses this module.

use collatz_bench::{BenchmarkReport, ConfigurationReport};
use collatz_engine::NumberResult;
use std::fmt::Write;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

pub(crate) fn bench_report(report: &BenchmarkReport) -> String {
    let mut out = String::new();
    let range = &report.range;
    let _ = writeln!(
        out,
        "Collatz benchmark: {}..={} ({} numbers in {} batches of up to {})",
        range.start, range.end, range.numbers, range.batch_count, report.settings.batch_size
    );
    let _ = writeln!(
        out,
        "cache size {}, {} samples per batch, {} warmup runs",
        report.cache_size, report.settings.sample_size, report.settings.warmup_runs
    );

    configuration(&mut out, "With cache", &report.cached);
    configuration(&mut out, "Without cache", &report.uncached);

    let _ = writeln!(out);
    let _ = writeln!(out, "Improvement");
    match report.improvement.speedup {
        Some(speedup) => {
            let _ = writeln!(out, "  speedup:          {speedup:.2}x");
        }
        None => {
            let _ = writeln!(out, "  speedup:          n/a");
        }
    }
    let _ = writeln!(
        out,
        "  memory reduction: {:.2} MB",
        report.improvement.memory_reduction_bytes / BYTES_PER_MB
    );
    out
}

fn configuration(out: &mut String, title: &str, report: &ConfigurationReport) {
    let _ = writeln!(out);
    let _ = writeln!(out, "{title}");
    let _ = writeln!(out, "  total time:       {:.2} ms", report.total_time_ms);
    let _ = writeln!(out, "  avg batch time:   {:.2} ms", report.average_time_ms);
    let _ = writeln!(
        out,
        "  avg memory:       {:.2} MB",
        report.average_memory_bytes / BYTES_PER_MB
    );
    let _ = writeln!(
        out,
        "  peak memory:      {:.2} MB",
        report.peak_memory_bytes as f64 / BYTES_PER_MB
    );
    let _ = writeln!(out, "  peak pressure:    {}", report.peak_pressure.as_str());
    let _ = writeln!(
        out,
        "  cache hit rate:   {:.2}%",
        report.cache_hit_rate
    );
    let _ = writeln!(out, "  max steps:        {}", report.max_steps);
    if let Some(longest) = report.longest {
        let _ = writeln!(
            out,
            "  longest:          {} ({} steps)",
            longest.number, longest.steps
        );
    }
    let efficiency = &report.memory_efficiency;
    let stability = efficiency
        .stability_score
        .map(|score| format!("{score:.1}%"))
        .unwrap_or_else(|| "n/a".to_string());
    let _ = writeln!(
        out,
        "  memory stability: {stability} (median {:.2} MB, std dev {:.2} MB)",
        efficiency.median / BYTES_PER_MB,
        efficiency.std_dev / BYTES_PER_MB
    );
    let _ = writeln!(
        out,
        "  sample latency:   p50 {}us, p95 {}us, max {}us",
        report.latency.p50_us, report.latency.p95_us, report.latency.max_us
    );
}

pub(crate) fn trajectory(result: &NumberResult) -> String {
    let sequence = result
        .trajectory
        .sequence
        .iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join(" -> ");
    format!(
        "{} reaches 1 in {} steps (peak {})\n{}\n",
        result.number,
        result.trajectory.steps,
        result.trajectory.peak(),
        sequence
    )
}
