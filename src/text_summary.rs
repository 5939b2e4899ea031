//! Text summary builder for the results view.
//!
//! Formats a completed run as human-readable lines for text mode and the TUI.

use crate::metrics;
use crate::model::{RunReport, SimConfig};

/// Pre-formatted lines for text output.
pub(crate) struct TextSummary {
    pub lines: Vec<String>,
}

/// Build a text summary from a completed run.
pub(crate) fn build_text_summary(report: &RunReport, cfg: &SimConfig) -> TextSummary {
    let mut lines = Vec::new();

    lines.push(format!("Started: {}", report.started_at));
    lines.push(format!(
        "Progress: {}% in {} ticks (step {}%)",
        report.final_progress, report.ticks, cfg.step
    ));
    lines.push(format!(
        "Elapsed: {}",
        humantime::format_duration(report.elapsed)
    ));

    let nominal_ms = cfg.tick_interval.as_secs_f64() * 1000.0;
    match metrics::compute_metrics(&report.tick_intervals_ms) {
        Some((mean, median, p25, p75)) => {
            lines.push(format!(
                "Tick cadence: avg {:.1} med {:.1} p25 {:.1} p75 {:.1} ms (nominal {:.0} ms)",
                mean, median, p25, p75, nominal_ms
            ));
        }
        None => lines.push(format!(
            "Tick cadence: not enough ticks (nominal {:.0} ms)",
            nominal_ms
        )),
    }
    if let Some(worst) = metrics::max_deviation(&report.tick_intervals_ms, nominal_ms) {
        lines.push(format!("Worst tick drift: {:.1} ms", worst));
    }

    TextSummary { lines }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn report(intervals: Vec<f64>) -> RunReport {
        RunReport {
            started_at: "2026-01-01T00:00:00Z".into(),
            ticks: intervals.len() as u32,
            final_progress: 100,
            elapsed: Duration::from_millis(10_500),
            tick_intervals_ms: intervals,
        }
    }

    #[test]
    fn summary_lists_progress_and_cadence() {
        let cfg = SimConfig::default();
        let summary = build_text_summary(&report(vec![100.0, 100.0, 104.0, 100.0]), &cfg);

        assert_eq!(summary.lines[0], "Started: 2026-01-01T00:00:00Z");
        assert_eq!(summary.lines[1], "Progress: 100% in 4 ticks (step 1%)");
        assert_eq!(summary.lines[2], "Elapsed: 10s 500ms");
        assert!(summary.lines[3].starts_with("Tick cadence: avg 101.0 med 100.0"));
        assert_eq!(summary.lines[4], "Worst tick drift: 4.0 ms");
    }

    #[test]
    fn single_tick_run_has_no_cadence_metrics() {
        let cfg = SimConfig {
            step: 100,
            ..SimConfig::default()
        };
        let summary = build_text_summary(&report(vec![100.0]), &cfg);
        assert!(summary.lines[3].starts_with("Tick cadence: not enough ticks"));
        assert_eq!(summary.lines.len(), 5);
    }
}
