//! Report generation over simulation outcomes: console, JSON, markdown,
//! and CSV.

use std::io::Write;

use anyhow::Result;
use colored::Colorize;
use kraljic_game::{Grade, Quadrant};
use serde::Serialize;

use crate::simulation::ParticipantOutcome;

/// Flattened per-participant row used by every report format.
#[derive(Debug, Clone, Serialize)]
pub struct ReportRow {
    pub participant: String,
    pub strategy: String,
    pub session_id: String,
    pub layer1: f64,
    pub layer2: f64,
    pub final_score: f64,
    pub grade: Grade,
    pub rank_before: Option<usize>,
    pub rank_after: Option<usize>,
    /// Percent-of-optimal per quadrant, in canonical play order.
    pub quadrant_percents: Vec<f64>,
    pub strongest_dimension: String,
    pub weakest_dimension: String,
}

impl ReportRow {
    fn from_outcome(outcome: &ParticipantOutcome) -> Self {
        let dashboard = &outcome.dashboard;
        Self {
            participant: outcome.participant.clone(),
            strategy: outcome.strategy.label().to_string(),
            session_id: outcome.session_id.clone(),
            layer1: dashboard.score.layer1,
            layer2: dashboard.score.layer2,
            final_score: dashboard.score.final_score,
            grade: dashboard.score.grade,
            rank_before: dashboard.rank.map(|r| r.before),
            rank_after: dashboard.rank.map(|r| r.after),
            quadrant_percents: dashboard
                .quadrant_results
                .iter()
                .map(|r| r.percent_of_optimal)
                .collect(),
            strongest_dimension: dashboard.dimension_profile.strongest.to_string(),
            weakest_dimension: dashboard.dimension_profile.weakest.to_string(),
        }
    }
}

/// Build report rows sorted by final score, best first.
#[must_use]
pub fn report_rows(outcomes: &[ParticipantOutcome]) -> Vec<ReportRow> {
    let mut rows: Vec<ReportRow> = outcomes.iter().map(ReportRow::from_outcome).collect();
    rows.sort_by(|a, b| {
        b.final_score
            .partial_cmp(&a.final_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.participant.cmp(&b.participant))
    });
    rows
}

fn grade_colored(grade: Grade) -> colored::ColoredString {
    let label = grade.to_string();
    match grade {
        Grade::Excellent => label.bright_green(),
        Grade::Good => label.cyan(),
        Grade::Fair => label.yellow(),
        Grade::Poor => label.red(),
    }
}

/// Human-readable leaderboard with per-quadrant breakdown.
///
/// # Errors
///
/// Returns an error when the writer fails.
pub fn generate_console_report(writer: &mut dyn Write, rows: &[ReportRow]) -> Result<()> {
    writeln!(writer, "{}", "📊 Leaderboard".bright_yellow().bold())?;
    writeln!(writer, "{}", "-".repeat(72))?;
    writeln!(
        writer,
        "{:>3}  {:16} {:10} {:>7} {:>7} {:>7}  {}",
        "#", "participant", "strategy", "layer1", "layer2", "final", "grade"
    )?;
    for (position, row) in rows.iter().enumerate() {
        writeln!(
            writer,
            "{:>3}  {:16} {:10} {:>7.2} {:>7.2} {:>7.2}  {}",
            position + 1,
            row.participant,
            row.strategy,
            row.layer1,
            row.layer2,
            row.final_score,
            grade_colored(row.grade)
        )?;
    }

    writeln!(writer)?;
    writeln!(writer, "{}", "📐 Percent of optimal by quadrant".bright_yellow())?;
    let header: Vec<String> = Quadrant::ORDER.iter().map(|q| format!("{q:>12}")).collect();
    writeln!(writer, "{:16} {}", "participant", header.join(" "))?;
    for row in rows {
        let cells: Vec<String> = row
            .quadrant_percents
            .iter()
            .map(|p| format!("{p:>11.1}%"))
            .collect();
        writeln!(writer, "{:16} {}", row.participant, cells.join(" "))?;
    }
    Ok(())
}

/// Pretty-printed JSON of the report rows.
///
/// # Errors
///
/// Returns an error when serialization or the writer fails.
pub fn generate_json_report(writer: &mut dyn Write, rows: &[ReportRow]) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, rows)?;
    writeln!(writer)?;
    Ok(())
}

/// Markdown leaderboard table.
///
/// # Errors
///
/// Returns an error when the writer fails.
pub fn generate_markdown_report(writer: &mut dyn Write, rows: &[ReportRow]) -> Result<()> {
    writeln!(writer, "# Kraljic Simulation Results\n")?;
    writeln!(
        writer,
        "| # | Participant | Strategy | Layer 1 | Layer 2 | Final | Grade | Strongest | Weakest |"
    )?;
    writeln!(writer, "|---|---|---|---|---|---|---|---|---|")?;
    for (position, row) in rows.iter().enumerate() {
        writeln!(
            writer,
            "| {} | {} | {} | {:.2} | {:.2} | {:.2} | {} | {} | {} |",
            position + 1,
            row.participant,
            row.strategy,
            row.layer1,
            row.layer2,
            row.final_score,
            row.grade,
            row.strongest_dimension,
            row.weakest_dimension
        )?;
    }
    Ok(())
}

/// CSV rows, one line per participant.
///
/// # Errors
///
/// Returns an error when the writer fails.
pub fn generate_csv_report(writer: &mut dyn Write, rows: &[ReportRow]) -> Result<()> {
    writeln!(
        writer,
        "participant,strategy,session_id,layer1,layer2,final,grade,rank_before,rank_after,bottleneck_pct,leverage_pct,strategic_pct,noncritical_pct"
    )?;
    for row in rows {
        let rank_before = row.rank_before.map_or(String::new(), |r| r.to_string());
        let rank_after = row.rank_after.map_or(String::new(), |r| r.to_string());
        let percents: Vec<String> = row.quadrant_percents.iter().map(|p| format!("{p:.1}")).collect();
        writeln!(
            writer,
            "{},{},{},{:.2},{:.2},{:.2},{},{},{},{}",
            row.participant,
            row.strategy,
            row.session_id,
            row.layer1,
            row.layer2,
            row.final_score,
            row.grade,
            rank_before,
            rank_after,
            percents.join(",")
        )?;
    }
    Ok(())
}
