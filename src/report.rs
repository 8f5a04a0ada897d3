//! Rendering of a finished run's summary.
//!
//! Pure transforms over [`RunSummary`]; nothing here feeds back into the
//! engine.

use chrono::Local;
use comfy_table::{presets::UTF8_FULL, Cell, Color, Table};
use replay_core::RunSummary;
use std::path::PathBuf;
use std::time::Duration;

/// Render the summary as a console report.
pub fn render(summary: &RunSummary) -> String {
    let mut output = String::new();

    output.push_str("MySQL replay report\n");
    output.push_str(&format!(
        "{} -> {} ({})\n\n",
        summary.started_at.format("%Y-%m-%d %H:%M:%S"),
        summary.finished_at.format("%Y-%m-%d %H:%M:%S"),
        format_duration(summary.wall_time)
    ));

    let mut overall = Table::new();
    overall.load_preset(UTF8_FULL);
    overall.set_header(vec!["Metric", "Value"]);
    overall.add_row(vec![
        Cell::new("Workers"),
        Cell::new(summary.worker_count.to_string()),
    ]);
    overall.add_row(vec![
        Cell::new("Statements executed"),
        Cell::new(summary.total_executed.to_string()),
    ]);
    overall.add_row(vec![
        Cell::new("Succeeded"),
        Cell::new(summary.total_success.to_string()).fg(Color::Green),
    ]);
    overall.add_row(vec![
        Cell::new("Failed"),
        Cell::new(summary.total_failure.to_string()).fg(if summary.total_failure > 0 {
            Color::Red
        } else {
            Color::Green
        }),
    ]);
    overall.add_row(vec![
        Cell::new("Success rate"),
        Cell::new(format!("{:.2}%", summary.success_rate * 100.0)),
    ]);
    overall.add_row(vec![
        Cell::new("Throughput"),
        Cell::new(format!("{:.2} statements/sec", summary.queries_per_second)),
    ]);
    overall.add_row(vec![
        Cell::new("Latency min / avg / max"),
        Cell::new(format!(
            "{} / {} / {}",
            format_duration(summary.min_latency),
            format_duration(summary.avg_latency),
            format_duration(summary.max_latency)
        )),
    ]);
    output.push_str(&overall.to_string());
    output.push('\n');

    let mut workers = Table::new();
    workers.load_preset(UTF8_FULL);
    workers.set_header(vec![
        "Worker",
        "Executed",
        "Succeeded",
        "Failed",
        "Success rate",
        "Stmts/sec",
        "Run time",
    ]);
    for worker in &summary.workers {
        let status_color = if worker.failure_count == 0 && worker.errors.is_empty() {
            Color::Green
        } else {
            Color::Red
        };
        workers.add_row(vec![
            Cell::new(worker.worker_id.to_string()),
            Cell::new(worker.queries_executed.to_string()),
            Cell::new(worker.success_count.to_string()),
            Cell::new(worker.failure_count.to_string()).fg(status_color),
            Cell::new(format!("{:.1}%", worker.success_rate() * 100.0)),
            Cell::new(format!("{:.1}", worker.queries_per_second())),
            Cell::new(format_duration(worker.total_run_time)),
        ]);
    }
    output.push_str(&workers.to_string());
    output.push('\n');

    if !summary.error_sample.is_empty() {
        output.push_str(&format!("\nErrors ({} total):\n", summary.total_errors()));
        for (index, error) in summary.error_sample.iter().enumerate() {
            output.push_str(&format!("  {}. {}\n", index + 1, error));
        }
        if summary.errors_truncated > 0 {
            output.push_str(&format!(
                "  ... and {} more\n",
                summary.errors_truncated
            ));
        }
    }

    output
}

/// Serialize the summary for machine consumption.
pub fn to_json(summary: &RunSummary) -> serde_json::Result<String> {
    serde_json::to_string_pretty(summary)
}

/// Write the console report to a timestamped file next to the process cwd.
pub fn write_report_file(summary: &RunSummary) -> std::io::Result<PathBuf> {
    let path = PathBuf::from(format!(
        "stress_report_{}.txt",
        Local::now().format("%Y%m%d_%H%M%S")
    ));
    std::fs::write(&path, render(summary))?;
    Ok(path)
}

fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs_f64();
    if secs >= 1.0 {
        format!("{secs:.2}s")
    } else {
        format!("{:.1}ms", secs * 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use replay_core::{aggregate, WorkerResult};

    fn sample_summary() -> RunSummary {
        let mut results = Vec::new();
        for id in 0..2 {
            let mut worker = WorkerResult::new(id);
            worker.queries_executed = 10;
            worker.success_count = 9;
            worker.failure_count = 1;
            worker.total_run_time = Duration::from_secs(1);
            worker.latencies = vec![Duration::from_millis(10); 10];
            worker.errors = vec![format!("worker {id} saw a deadlock")];
            results.push(worker);
        }
        aggregate(results, Utc::now(), Utc::now(), Duration::from_secs(1))
    }

    #[test]
    fn test_render_includes_totals_and_errors() {
        let rendered = render(&sample_summary());
        assert!(rendered.contains("Statements executed"));
        assert!(rendered.contains("20"));
        assert!(rendered.contains("Errors (2 total)"));
        assert!(rendered.contains("deadlock"));
    }

    #[test]
    fn test_json_round_trips() {
        let summary = sample_summary();
        let json = to_json(&summary).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["total_executed"], 20);
        assert_eq!(value["worker_count"], 2);
    }

    #[test]
    fn test_format_duration_units() {
        assert_eq!(format_duration(Duration::from_millis(5)), "5.0ms");
        assert_eq!(format_duration(Duration::from_secs(2)), "2.00s");
    }

    #[test]
    fn test_zero_summary_renders_without_errors_section() {
        let summary = aggregate(vec![], Utc::now(), Utc::now(), Duration::ZERO);
        let rendered = render(&summary);
        assert!(!rendered.contains("Errors ("));
        assert!(rendered.contains("0.00%"));
    }
}
