//! Run-end report formatting.
//!
//! Supports two modes: human-readable tables (default) and JSON (--json).

use tabled::{Table, Tabled};

use super::q_table::QEntry;
use super::trainer::TrainingReport;
use crate::error::Result;

/// Output mode for the training report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Table,
    Json,
}

impl OutputMode {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            OutputMode::Json
        } else {
            OutputMode::Table
        }
    }
}

#[derive(Tabled)]
struct MetricRow {
    #[tabled(rename = "Metric")]
    metric: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

#[derive(Tabled)]
struct QTableRow {
    #[tabled(rename = "State (trend, rsi, momentum, volatility, change)")]
    state: String,
    #[tabled(rename = "Sell")]
    sell: String,
    #[tabled(rename = "Buy")]
    buy: String,
}

impl From<&QEntry> for QTableRow {
    fn from(entry: &QEntry) -> Self {
        Self {
            state: entry.state.to_string(),
            sell: format!("{:.6}", entry.values[0]),
            buy: format!("{:.6}", entry.values[1]),
        }
    }
}

fn metric_rows(report: &TrainingReport) -> Vec<MetricRow> {
    let summary = &report.summary;
    let mut rows = vec![
        MetricRow {
            metric: "Episodes",
            value: summary.num_episodes.to_string(),
        },
        MetricRow {
            metric: "Steps",
            value: report.stats.steps.to_string(),
        },
        MetricRow {
            metric: "States visited",
            value: report.stats.states_visited.to_string(),
        },
        MetricRow {
            metric: "Explore / exploit",
            value: format!("{} / {}", report.stats.explorations, report.stats.exploitations),
        },
        MetricRow {
            metric: "Avg reward",
            value: format!("{:.4}", summary.avg_reward),
        },
        MetricRow {
            metric: "Best reward",
            value: format!("{:.4}", summary.best_reward),
        },
        MetricRow {
            metric: "Avg profit",
            value: format!("{:.4}", summary.avg_profit),
        },
        MetricRow {
            metric: "Final epsilon",
            value: format!("{:.4}", summary.final_epsilon),
        },
        MetricRow {
            metric: "Max possible profit",
            value: format!("{:.6}", report.max_possible_profit),
        },
    ];

    if let Some(last) = &report.final_episode {
        rows.push(MetricRow {
            metric: "Final episode reward",
            value: format!("{:.4}", last.total_reward),
        });
        rows.push(MetricRow {
            metric: "Final episode profit",
            value: format!("{:.6}", last.total_profit),
        });
    }

    let elapsed = report.finished_at - report.started_at;
    rows.push(MetricRow {
        metric: "Duration",
        value: format!("{:.3}s", elapsed.num_milliseconds() as f64 / 1000.0),
    });
    rows
}

/// Format the report in the chosen mode.
pub fn format_report(report: &TrainingReport, mode: OutputMode) -> Result<String> {
    match mode {
        OutputMode::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputMode::Table => {
            let mut out = Table::new(metric_rows(report)).to_string();
            out.push_str("\n\nQ-table\n");
            if report.q_table.is_empty() {
                out.push_str("(no results)");
            } else {
                let rows: Vec<QTableRow> = report.q_table.iter().map(QTableRow::from).collect();
                out.push_str(&Table::new(rows).to_string());
            }
            if let Some(rendering) = &report.rendering {
                out.push_str("\n\n");
                out.push_str(rendering);
            }
            Ok(out)
        }
    }
}

/// Print the report to stdout.
pub fn print_report(report: &TrainingReport, mode: OutputMode) -> Result<()> {
    let text = format_report(report, mode)?;
    println!("{text}");
    Ok(())
}
