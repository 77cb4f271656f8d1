use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

mod carry;
mod changes;
mod config;
mod crm;
mod dates;
mod error;
mod models;
mod pipeline;
mod progress;
mod purple;
mod report;
mod resolve;
mod store;
mod submission;
mod tables;
mod tutors;
mod zone;

use config::{RunConfig, Thresholds};
use store::RunFiles;

#[derive(Parser)]
#[command(name = "engagement-tags")]
#[command(about = "Student engagement tagging and period-over-period change tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Tag every roster student and write this period's exports
    Process {
        /// Student roster with status, tag and start date
        #[arg(long)]
        students: PathBuf,
        /// Last submission date extract
        #[arg(long)]
        submissions: PathBuf,
        /// CRM contact tag extract
        #[arg(long)]
        crm: PathBuf,
        /// Tutor id to name roster
        #[arg(long)]
        tutors: PathBuf,
        /// Snapshot written by the previous period's run
        #[arg(long)]
        previous: Option<PathBuf>,
        #[arg(long, env = "TAGS_OUT_DIR", default_value = ".")]
        out_dir: PathBuf,
        /// Date elapsed days are measured to (YYYY-MM-DD); defaults to today
        #[arg(long, env = "TAGS_AS_OF")]
        as_of: Option<NaiveDate>,
        #[arg(long, default_value_t = Thresholds::default().black_after)]
        black_after: i64,
        #[arg(long, default_value_t = Thresholds::default().red_after)]
        red_after: i64,
        #[arg(long, default_value_t = Thresholds::default().orange_after)]
        orange_after: i64,
    },
    /// Compare two snapshot exports per tutor
    Compare {
        #[arg(long)]
        previous: PathBuf,
        #[arg(long)]
        current: PathBuf,
        /// Also write the change table as CSV
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Process {
            students,
            submissions,
            crm,
            tutors,
            previous,
            out_dir,
            as_of,
            black_after,
            red_after,
            orange_after,
        } => {
            let thresholds = Thresholds {
                black_after,
                red_after,
                orange_after,
            };
            thresholds.validate()?;
            let config = RunConfig {
                as_of: as_of.unwrap_or_else(|| Utc::now().date_naive()),
                thresholds,
                out_dir,
            };

            let inputs = pipeline::Inputs {
                roster: store::load_roster(&students)?,
                submissions: store::load_submissions(&submissions)?,
                crm: store::load_crm(&crm)?,
                tutors: store::load_tutors(&tutors)?,
            };
            let previous = previous
                .as_deref()
                .map(store::load_snapshot)
                .transpose()?;

            process(&config, &inputs, previous.as_deref())?;
        }
        Commands::Compare {
            previous,
            current,
            out,
        } => {
            compare(&previous, &current, out.as_deref())?;
        }
    }

    Ok(())
}

fn process(
    config: &RunConfig,
    inputs: &pipeline::Inputs,
    previous: Option<&[models::SnapshotRow]>,
) -> anyhow::Result<()> {
    let run_id = Uuid::new_v4();
    let generated_at = Utc::now();
    let outputs = pipeline::run(
        inputs,
        previous,
        config.as_of,
        &config.thresholds,
        &progress::LogProgress,
    );

    std::fs::create_dir_all(&config.out_dir)
        .with_context(|| format!("failed to create {}", config.out_dir.display()))?;
    let files = RunFiles::new(
        &config.out_dir,
        generated_at.format("%Y%m%d_%H%M%S").to_string(),
    );

    let mut written = Vec::new();
    store::write_snapshot(&files.snapshot(), &outputs.snapshot)?;
    written.push(files.snapshot());
    store::write_roster_changes(&files.roster_changes(), &outputs.roster_changes)?;
    written.push(files.roster_changes());
    store::write_crm_changes(&files.crm_changes(), &outputs.crm_changes)?;
    written.push(files.crm_changes());
    store::write_tag_counts(&files.tag_counts(), &outputs.tag_table)?;
    written.push(files.tag_counts());
    if let Some(table) = &outputs.change_table {
        store::write_change_counts(&files.tag_changes(), table)?;
        written.push(files.tag_changes());
    }

    let report = report::build_report(run_id, config.as_of, &outputs);
    store::write_text(&files.report(), &report)?;
    written.push(files.report());

    let manifest = report::RunManifest::new(
        run_id,
        generated_at,
        config.as_of,
        config.thresholds,
        &outputs,
        written
            .iter()
            .filter_map(|path| path.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .collect(),
    );
    let manifest = serde_json::to_string_pretty(&manifest).map_err(error::StoreError::from)?;
    store::write_text(&files.manifest(), &manifest)?;

    println!(
        "Tagged {} students ({} active, {} carried forward).",
        outputs.stats.roster, outputs.stats.active, outputs.stats.inactive
    );
    for path in &written {
        println!("Written {}.", path.display());
    }
    println!("Run manifest written to {}.", files.manifest().display());

    Ok(())
}

/// Compares two snapshot exports and prints the per-tutor table. With `out`,
/// the table is also written as CSV, ending in its Total row even when no
/// student could be compared.
fn compare(previous: &Path, current: &Path, out: Option<&Path>) -> anyhow::Result<changes::ChangeTable> {
    let previous = store::load_snapshot(previous)?;
    let current = store::load_snapshot(current)?;
    let table = changes::compare_snapshots(&previous, &current);

    if table.tutors.is_empty() {
        println!("No students comparable between the two snapshots.");
    } else {
        println!("Tag changes by tutor:");
        for row in &table.tutors {
            println!(
                "- {}: {} progressed, {} regressed, {} maintained",
                tutors::display_tutor(&row.tutor),
                row.counts.progressed,
                row.counts.regressed,
                row.counts.maintained
            );
        }
        println!(
            "Total: {} progressed, {} regressed, {} maintained",
            table.total.progressed, table.total.regressed, table.total.maintained
        );
    }

    if let Some(out) = out {
        store::write_change_counts(out, &table)?;
        println!("Change table written to {}.", out.display());
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::{Color, SnapshotRow, Tag};

    fn row(id: &str, tag: Tag) -> SnapshotRow {
        SnapshotRow {
            student_id: id.to_string(),
            enrolment_id: format!("E{id}"),
            student: format!("Student {id}"),
            course: "BSB-40-515".to_string(),
            tutor: "Dana Reyes".to_string(),
            tag,
        }
    }

    #[test]
    fn compare_writes_a_total_row_when_nothing_is_comparable() {
        let dir = tempfile::tempdir().unwrap();
        let previous = dir.path().join("previous.csv");
        let current = dir.path().join("current.csv");
        store::write_snapshot(&previous, &[row("S1", Tag::Purple)]).unwrap();
        store::write_snapshot(&current, &[row("S2", Tag::Color(Color::Green))]).unwrap();

        let out = dir.path().join("changes.csv");
        let table = compare(&previous, &current, Some(&out)).unwrap();
        assert!(table.tutors.is_empty());

        let written = std::fs::read_to_string(&out).unwrap();
        assert_eq!(
            written.lines().collect::<Vec<_>>(),
            vec!["Tutor,Progressed,Regressed,Maintained", "Total,0,0,0"]
        );
    }
}
