//! Per-poll console output

use anyhow::Result;
use cli::OutputFormat;
use gamma_engine::PollReport;
use std::fmt::Write;

pub fn render(report: &PollReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(report)?),
        OutputFormat::Pretty => Ok(render_pretty(report)),
    }
}

fn fmt_opt(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", precision, v),
        None => "-".to_string(),
    }
}

pub fn render_pretty(report: &PollReport) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "[{}] spot={} total={:+.4}bn strikes={} contracts={} skipped={}",
        report.observed_at.format("%Y-%m-%d %H:%M:%S"),
        fmt_opt(report.spot_price, 2),
        report.total_exposure,
        report.exposure.len(),
        report.contracts_used,
        report.skipped.len(),
    );

    if report.top_changes.is_empty() {
        let _ = writeln!(out, "  top movers: none");
    } else {
        let movers: Vec<String> = report
            .top_changes
            .iter()
            .map(|change| format!("{} {:+.4}", change.strike, change.delta))
            .collect();
        let _ = writeln!(out, "  top movers: {}", movers.join(" | "));
    }

    let _ = writeln!(
        out,
        "  rolling: pos mean={} std={} | neg mean={} std={}",
        fmt_opt(report.rolling.mean_pos, 2),
        fmt_opt(report.rolling.std_pos, 2),
        fmt_opt(report.rolling.mean_neg, 2),
        fmt_opt(report.rolling.std_neg, 2),
    );

    for warning in &report.warnings {
        let _ = writeln!(out, "  [warn] {}", warning);
    }

    out.trim_end().to_string()
}
