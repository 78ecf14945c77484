//! Report Renderer Module
//! Turns the computed tables into an aligned text report and a JSON file.

use crate::report::geo::StateDominance;
use crate::report::metric::{MethodEfficiency, StateEfficiency};
use crate::stats::{MethodStateSummary, MethodSummary, MethodWeekSummary, RevenueStats};
use anyhow::Context;
use serde::Serialize;
use std::fs::File;
use std::path::Path;

/// Everything one pipeline run produces for the reporting layer.
#[derive(Debug, Serialize)]
pub struct Report {
    pub rows_analyzed: usize,
    pub duplicates_removed: usize,
    pub tenure_corrections: usize,
    pub imputed_rows: usize,
    pub method_summary: Vec<MethodSummary>,
    pub weekly_summary: Vec<MethodWeekSummary>,
    pub state_summary: Vec<MethodStateSummary>,
    pub revenue_stats: Vec<RevenueStats>,
    pub method_efficiency: Vec<MethodEfficiency>,
    pub state_efficiency: Vec<StateEfficiency>,
    pub state_dominance: Vec<StateDominance>,
}

pub struct ReportRenderer;

impl ReportRenderer {
    /// Render the report as aligned text tables.
    pub fn render_text(report: &Report) -> String {
        let mut out = String::new();

        out.push_str("Sales interaction analysis\n");
        out.push_str("==========================\n");
        out.push_str(&format!(
            "rows analyzed: {} (duplicates removed: {}, tenure corrections: {}, revenue values imputed: {})\n\n",
            report.rows_analyzed,
            report.duplicates_removed,
            report.tenure_corrections,
            report.imputed_rows,
        ));

        out.push_str("Revenue by sales method\n");
        out.push_str(&format!(
            "{:<16} {:>8} {:>15} {:>13} {:>13}\n",
            "method", "count", "total_revenue", "mean_revenue", "mean_nb_sold"
        ));
        for s in &report.method_summary {
            out.push_str(&format!(
                "{:<16} {:>8} {:>15.2} {:>13.2} {:>13.2}\n",
                s.sales_method, s.count, s.total_revenue, s.mean_revenue, s.mean_nb_sold
            ));
        }
        out.push('\n');

        out.push_str("Revenue spread by sales method\n");
        out.push_str(&format!(
            "{:<16} {:>8} {:>10} {:>10} {:>10} {:>10} {:>10}\n",
            "method", "count", "mean", "median", "std", "p05", "p95"
        ));
        for s in &report.revenue_stats {
            out.push_str(&format!(
                "{:<16} {:>8} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>10.2}\n",
                s.sales_method, s.count, s.mean, s.median, s.std, s.p05, s.p95
            ));
        }
        out.push('\n');

        out.push_str("Weekly revenue by sales method\n");
        out.push_str(&format!(
            "{:<16} {:>5} {:>8} {:>15} {:>13}\n",
            "method", "week", "count", "total_revenue", "mean_revenue"
        ));
        for s in &report.weekly_summary {
            out.push_str(&format!(
                "{:<16} {:>5} {:>8} {:>15.2} {:>13.2}\n",
                s.sales_method, s.week, s.count, s.total_revenue, s.mean_revenue
            ));
        }
        out.push('\n');

        out.push_str("Method efficiency (revenue per minute spent)\n");
        out.push_str(&format!(
            "{:<5} {:<16} {:>8} {:>15} {:>12} {:>10}\n",
            "rank", "method", "count", "total_revenue", "minutes", "trmns"
        ));
        for (rank, e) in report.method_efficiency.iter().enumerate() {
            out.push_str(&format!(
                "{:<5} {:<16} {:>8} {:>15.2} {:>12.1} {:>10.3}\n",
                rank + 1,
                e.sales_method,
                e.count,
                e.total_revenue,
                e.minutes_spent,
                e.trmns
            ));
        }
        out.push('\n');

        out.push_str("Method efficiency by state\n");
        let mut current_state = "";
        for e in &report.state_efficiency {
            if e.state != current_state {
                current_state = &e.state;
                out.push_str(&format!("  {current_state}\n"));
            }
            out.push_str(&format!(
                "    {:<16} {:>8} {:>15.2} {:>10.3}\n",
                e.sales_method, e.count, e.total_revenue, e.trmns
            ));
        }
        out.push('\n');

        out.push_str("Sales method dominance by state\n");
        out.push_str(&format!(
            "{:<16} {:>4} {:>8} {:>7} {:>14} {:<16} {:>10}\n",
            "state", "abbr", "email%", "call%", "email_and_call%", "dominant", "strength%"
        ));
        for d in &report.state_dominance {
            out.push_str(&format!(
                "{:<16} {:>4} {:>8.1} {:>7.1} {:>14.1} {:<16} {:>10.1}\n",
                d.state,
                d.abbreviation,
                d.email_pct,
                d.call_pct,
                d.email_and_call_pct,
                d.dominant_method,
                d.dominance_pct
            ));
        }

        out
    }

    /// Write the report as pretty JSON.
    pub fn write_json(report: &Report, path: &Path) -> anyhow::Result<()> {
        let file = File::create(path)
            .with_context(|| format!("creating report file {}", path.display()))?;
        serde_json::to_writer_pretty(file, report)
            .with_context(|| format!("serializing report to {}", path.display()))?;
        Ok(())
    }
}
