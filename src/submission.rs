use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::config::Thresholds;
use crate::dates;
use crate::models::{Color, StudentRecord, SubmissionRecord, SubmissionTag};
use crate::tutors::TutorDirectory;

/// Engagement tags for the active students, in the order given.
///
/// Students with a row in the submission extract are tagged from the days
/// since that submission (first row per id wins; an unreadable date counts
/// as Green). Students without any row get a synthesized Black tag with their
/// details backfilled from the roster. Extract rows for students that are not
/// in `active` are dropped.
pub fn derive_submission_tags(
    active: &[&StudentRecord],
    submissions: &[SubmissionRecord],
    tutors: &TutorDirectory,
    as_of: NaiveDate,
    thresholds: &Thresholds,
) -> Vec<SubmissionTag> {
    let mut by_id: HashMap<&str, &SubmissionRecord> = HashMap::new();
    for record in submissions {
        by_id.entry(record.student_id.as_str()).or_insert(record);
    }

    let mut unreadable = 0usize;
    let mut synthesized = 0usize;
    let mut tags = Vec::with_capacity(active.len());

    for student in active {
        let tag = match by_id.remove(student.student_id.as_str()) {
            Some(record) => {
                let color = match dates::elapsed_days(&record.last_submission, as_of) {
                    Some(days) => thresholds.classify(days),
                    None => {
                        unreadable += 1;
                        Color::Green
                    }
                };
                SubmissionTag {
                    student_id: student.student_id.clone(),
                    student: record.student.clone(),
                    course: record.course.clone(),
                    tutor: record.tutor.clone(),
                    color,
                    synthesized: false,
                }
            }
            None => {
                synthesized += 1;
                let tag = SubmissionTag {
                    student_id: student.student_id.clone(),
                    student: student.full_name(),
                    course: student.course.clone(),
                    tutor: tutors.name_of(&student.tutor_id),
                    color: Color::Black,
                    synthesized: true,
                };
                debug!(
                    student_id = %tag.student_id,
                    student = %tag.student,
                    course = %tag.course,
                    tutor = %tag.tutor,
                    "no submissions on record"
                );
                tag
            }
        };
        tags.push(tag);
    }

    if !by_id.is_empty() {
        debug!(
            dropped = by_id.len(),
            "submission rows without an active roster student were dropped"
        );
    }
    if unreadable > 0 {
        warn!(
            unreadable,
            "last submission dates unreadable; those students default to Green"
        );
    }
    debug!(synthesized, "students with no submissions tagged Black");

    tags
}
