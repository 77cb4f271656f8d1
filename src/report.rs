use std::collections::HashMap;
use std::fmt::Write;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::config::Thresholds;
use crate::models::{ChangeCounts, SnapshotRow, TagCounts, TagSummary};
use crate::pipeline::{RunOutputs, RunStats};
use crate::tutors::display_tutor;

/// Share of the snapshot held by each distinct tag, largest first.
pub fn summarize_tags(snapshot: &[SnapshotRow]) -> Vec<TagSummary> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for row in snapshot {
        *counts.entry(row.tag.to_string()).or_insert(0) += 1;
    }

    let total = snapshot.len();
    let mut summaries: Vec<TagSummary> = counts
        .into_iter()
        .map(|(tag, count)| TagSummary {
            tag,
            count,
            share: if total == 0 {
                0.0
            } else {
                count as f64 / total as f64
            },
        })
        .collect();

    summaries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.tag.cmp(&b.tag)));
    summaries
}

pub fn build_report(run_id: Uuid, as_of: NaiveDate, outputs: &RunOutputs) -> String {
    let summaries = summarize_tags(&outputs.snapshot);
    let stats = &outputs.stats;

    let mut output = String::new();

    let _ = writeln!(output, "# Engagement Tags Report");
    let _ = writeln!(
        output,
        "Run {} as of {} ({} students, {} active)",
        run_id, as_of, stats.roster, stats.active
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Tag Mix");

    if summaries.is_empty() {
        let _ = writeln!(output, "No students on the roster.");
    } else {
        for summary in &summaries {
            let _ = writeln!(
                output,
                "- {}: {} students ({:.1}%)",
                summary.tag,
                summary.count,
                summary.share * 100.0
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Tags By Tutor");
    if outputs.tag_table.tutors.is_empty() {
        let _ = writeln!(output, "No tutors to report.");
    } else {
        let _ = writeln!(output, "| Tutor | Green | Orange | Red | Black | Purple |");
        let _ = writeln!(output, "|---|---|---|---|---|---|");
        for row in &outputs.tag_table.tutors {
            write_tag_row(&mut output, display_tutor(&row.tutor), &row.counts);
        }
        write_tag_row(&mut output, "Total", &outputs.tag_table.total);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Changes Since Last Period");
    match &outputs.change_table {
        None => {
            let _ = writeln!(output, "No previous snapshot supplied.");
        }
        Some(table) if table.tutors.is_empty() => {
            let _ = writeln!(output, "No students comparable with the previous snapshot.");
        }
        Some(table) => {
            let _ = writeln!(output, "| Tutor | Progressed | Regressed | Maintained |");
            let _ = writeln!(output, "|---|---|---|---|");
            for row in &table.tutors {
                write_change_row(&mut output, display_tutor(&row.tutor), &row.counts);
            }
            write_change_row(&mut output, "Total", &table.total);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Updates For Systems Of Record");
    let _ = writeln!(
        output,
        "- Student database: {} tags to change",
        outputs.roster_changes.len()
    );
    let _ = writeln!(output, "- CRM: {} tags to change", outputs.crm_changes.len());

    let _ = writeln!(output);
    let _ = writeln!(output, "## Data Quality");
    let _ = writeln!(
        output,
        "- {} active students had no submissions and started from Black",
        stats.without_submissions
    );
    let _ = writeln!(
        output,
        "- {} students overridden to Purple",
        stats.purple_overrides
    );
    if stats.unknown_tutors.is_empty() {
        let _ = writeln!(output, "- All tutor ids resolved");
    } else {
        let _ = writeln!(
            output,
            "- Unknown tutor ids: {}",
            stats.unknown_tutors.join(", ")
        );
    }

    output
}

fn write_tag_row(output: &mut String, tutor: &str, counts: &TagCounts) {
    let _ = writeln!(
        output,
        "| {} | {} | {} | {} | {} | {} |",
        tutor, counts.green, counts.orange, counts.red, counts.black, counts.purple
    );
}

fn write_change_row(output: &mut String, tutor: &str, counts: &ChangeCounts) {
    let _ = writeln!(
        output,
        "| {} | {} | {} | {} |",
        tutor, counts.progressed, counts.regressed, counts.maintained
    );
}

/// Machine-readable record of one run, written next to its exports.
#[derive(Debug, Clone, Serialize)]
pub struct RunManifest {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub as_of: NaiveDate,
    pub thresholds: Thresholds,
    pub stats: RunStats,
    pub tag_totals: TagCounts,
    pub change_totals: Option<ChangeCounts>,
    pub files: Vec<String>,
}

impl RunManifest {
    pub fn new(
        run_id: Uuid,
        generated_at: DateTime<Utc>,
        as_of: NaiveDate,
        thresholds: Thresholds,
        outputs: &RunOutputs,
        files: Vec<String>,
    ) -> Self {
        Self {
            run_id,
            generated_at,
            as_of,
            thresholds,
            stats: outputs.stats.clone(),
            tag_totals: outputs.tag_table.total,
            change_totals: outputs.change_table.as_ref().map(|table| table.total),
            files,
        }
    }
}
