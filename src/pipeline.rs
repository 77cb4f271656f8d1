use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::carry;
use crate::changes::{self, ChangeTable};
use crate::config::Thresholds;
use crate::crm;
use crate::models::{
    ChangedTag, CrmTagRecord, SnapshotRow, StudentRecord, SubmissionRecord, Tutor,
};
use crate::progress::{ProgressSink, Stage};
use crate::purple;
use crate::resolve;
use crate::submission;
use crate::tables::{self, TagTable};
use crate::tutors::TutorDirectory;
use crate::zone;

/// Records supplied by the loaders for one run.
#[derive(Debug, Clone, Default)]
pub struct Inputs {
    pub roster: Vec<StudentRecord>,
    pub submissions: Vec<SubmissionRecord>,
    pub crm: Vec<CrmTagRecord>,
    pub tutors: Vec<Tutor>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub roster: usize,
    pub active: usize,
    pub inactive: usize,
    pub without_submissions: usize,
    pub purple_overrides: usize,
    pub unknown_tutors: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct RunOutputs {
    pub snapshot: Vec<SnapshotRow>,
    pub roster_changes: Vec<ChangedTag>,
    pub crm_changes: Vec<ChangedTag>,
    pub tag_table: TagTable,
    pub change_table: Option<ChangeTable>,
    pub stats: RunStats,
}

/// First roster row per student id, in roster order.
fn unique_students(roster: &[StudentRecord]) -> Vec<&StudentRecord> {
    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(roster.len());
    for student in roster {
        if seen.insert(student.student_id.as_str()) {
            unique.push(student);
        } else {
            warn!(
                student_id = %student.student_id,
                "duplicate roster row ignored; the first row for this student is used"
            );
        }
    }
    unique
}

/// Tags every roster student and derives the per-run tables. When
/// `previous` is given, also compares the new snapshot against it.
pub fn run(
    inputs: &Inputs,
    previous: Option<&[SnapshotRow]>,
    as_of: NaiveDate,
    thresholds: &Thresholds,
    progress: &dyn ProgressSink,
) -> RunOutputs {
    let roster = unique_students(&inputs.roster);
    let directory = TutorDirectory::new(&inputs.tutors);
    let unknown_tutors = directory.report_unknown(&inputs.roster);

    let active: Vec<&StudentRecord> = roster
        .iter()
        .copied()
        .filter(|student| student.is_active())
        .collect();
    info!(
        roster = roster.len(),
        active = active.len(),
        %as_of,
        "tagging students"
    );

    let zones = zone::classify_zones(active.iter().copied(), as_of, thresholds);
    progress.finished(Stage::Zones, zones.len());

    let submission_tags = submission::derive_submission_tags(
        &active,
        &inputs.submissions,
        &directory,
        as_of,
        thresholds,
    );
    let without_submissions = submission_tags.iter().filter(|t| t.synthesized).count();
    progress.finished(Stage::Submissions, submission_tags.len());

    let resolved = resolve::resolve_active(&active, &submission_tags, &zones);
    progress.finished(Stage::Resolve, resolved.len());

    let tags = carry::carry_forward(&roster, resolved);
    progress.finished(Stage::CarryForward, tags.len());

    let crm_view = crm::crm_view(&inputs.crm);
    let purple_ids = purple::purple_set(&crm_view);
    let (tags, purple_overrides) = purple::apply_override(tags, &purple_ids);
    progress.finished(Stage::Purple, purple_overrides);

    if let Err(err) = carry::check_complete(roster.iter().map(|s| s.student_id.as_str()), &tags) {
        error!(
            missing = ?err.missing,
            duplicated = ?err.duplicated,
            unexpected = ?err.unexpected,
            "{err}"
        );
    }

    let snapshot = tables::assemble_snapshot(&roster, tags, &directory);
    progress.finished(Stage::Snapshot, snapshot.len());

    let roster_changes = tables::roster_changes(&roster, &snapshot);
    let crm_changes = tables::crm_changes(&crm_view, &snapshot);
    progress.finished(Stage::ChangeLists, roster_changes.len() + crm_changes.len());

    let tag_table = tables::tag_counts(&snapshot);
    progress.finished(Stage::TagCounts, tag_table.tutors.len());

    let change_table = previous.map(|previous| {
        let table = changes::compare_snapshots(previous, &snapshot);
        progress.finished(Stage::Changes, table.compared());
        table
    });

    let stats = RunStats {
        roster: roster.len(),
        active: active.len(),
        inactive: roster.len() - active.len(),
        without_submissions,
        purple_overrides,
        unknown_tutors,
    };

    RunOutputs {
        snapshot,
        roster_changes,
        crm_changes,
        tag_table,
        change_table,
        stats,
    }
}
