//! Console rendering of a finished run.

use std::fmt::Write;
use std::time::Duration;

use colored::Colorize;
use rcmp_core::compare::{ComparisonVerdict, VerdictFailure};
use rcmp_core::results::{FileReport, LatencyDistribution, LoadComparison, RunSummary};

/// Render the whole run the way it is printed to stdout.
pub fn render_summary(summary: &RunSummary, verbose: bool) -> String {
    let mut out = String::new();

    for file in &summary.files {
        render_file(&mut out, file, verbose);
    }

    if !summary.skipped.is_empty() {
        let _ = writeln!(out, "\n{}", "Skipped files:".yellow().bold());
        for skipped in &summary.skipped {
            let _ = writeln!(out, "- {}: {}", skipped.path.display(), skipped.reason);
        }
    }

    if summary.interrupted {
        let _ = writeln!(out, "\n{}", "Run interrupted; remaining files were not tested.".yellow());
    }

    out.push_str("\n\n");
    if summary.all_passed() {
        let _ = writeln!(out, "{}", "== All tests passed ==".green().bold());
    } else {
        let _ = writeln!(out, "== {} tests passed ==", summary.passed_tests());
        let _ = writeln!(
            out,
            "{}",
            format!("== {} tests FAILED ==", summary.failed_tests).red().bold()
        );
    }
    out
}

fn render_file(out: &mut String, file: &FileReport, verbose: bool) {
    let name = file.path.display();
    let _ = writeln!(out, "\n===== Testing {name} =====");

    for verdict in &file.verdicts {
        render_verdict(out, verdict, verbose);
    }

    if verbose && !file.verdicts.is_empty() {
        if file.failed() == 0 {
            let _ = writeln!(out, "- All tests passed in {name}");
        } else {
            let _ = writeln!(out, "- {} tests passed in {name}", file.passed());
            let _ = writeln!(out, "- {} tests FAILED in {name}", file.failed());
        }
    }

    if let Some(load) = &file.load {
        render_load(out, load);
    }
}

fn render_verdict(out: &mut String, verdict: &ComparisonVerdict, verbose: bool) {
    let _ = writeln!(out, "\n----- Comparing {} -----", verdict.name);
    if verbose {
        let _ = writeln!(out, "{}", verdict.reference_url);
    }

    if verdict.equivalent {
        if verbose {
            let _ = writeln!(out, "identical");
        }
        let _ = writeln!(out, "{}", "PASSED".green());
        return;
    }

    let _ = writeln!(out, "{}", "FAILED".red().bold());
    if let Some(failure) = &verdict.failure {
        match failure {
            VerdictFailure::Divergence { .. } => {
                let _ = writeln!(out, "Differences found:");
            }
            _ => {
                let _ = writeln!(out, "{failure}");
            }
        }
    }

    if let Some(report) = &verdict.diff_report {
        for line in report.lines() {
            let _ = writeln!(out, "{}", colorize_diff_line(line));
        }
    }

    if let Some(bodies) = &verdict.bodies {
        let _ = writeln!(out, "Reference response: {}", bodies.reference);
        let _ = writeln!(out, "Candidate response: {}", bodies.candidate);
    }
}

fn colorize_diff_line(line: &str) -> String {
    match line.chars().next() {
        Some('~') => line.yellow().to_string(),
        Some('+') => line.green().to_string(),
        Some('-') => line.red().to_string(),
        _ => line.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Load tables
// ---------------------------------------------------------------------------

fn render_load(out: &mut String, load: &LoadComparison) {
    let _ = writeln!(out, "\n{}", "Load results".bold());
    let _ = writeln!(
        out,
        "{:<10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>9} {:>9}",
        "backend", "mean ms", "p50 ms", "p95 ms", "p99 ms", "max ms", "min ms", "success", "req/s"
    );
    for dist in [&load.reference, &load.candidate] {
        render_distribution_row(out, dist);
    }
    for dist in [&load.reference, &load.candidate] {
        for (description, count) in &dist.error_counts {
            let _ = writeln!(out, "  {} error x{count}: {description}", dist.backend);
        }
    }

    let _ = writeln!(out, "\ncandidate / reference");
    for (label, ratio) in load.ratios.rows() {
        let _ = writeln!(out, "{label:<6} {ratio}");
    }
}

fn render_distribution_row(out: &mut String, dist: &LatencyDistribution) {
    let _ = writeln!(
        out,
        "{:<10} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>8.1}% {:>9.1}",
        dist.backend.to_string(),
        millis(dist.mean),
        millis(dist.p50),
        millis(dist.p95),
        millis(dist.p99),
        millis(dist.max),
        millis(dist.min),
        dist.success_rate * 100.0,
        dist.requests_per_second,
    );
}

fn millis(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}
