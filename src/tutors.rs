use std::collections::{HashMap, HashSet};

use tracing::error;

use crate::models::{StudentRecord, Tutor};

/// Label used in count tables for students without a resolvable tutor.
pub const UNKNOWN_TUTOR: &str = "Combined or Unknown";

/// Tutor id to display name lookups.
#[derive(Debug, Clone, Default)]
pub struct TutorDirectory {
    names: HashMap<String, String>,
}

impl TutorDirectory {
    pub fn new(tutors: &[Tutor]) -> Self {
        let mut names = HashMap::new();
        for tutor in tutors {
            if tutor.tutor_id.is_empty() {
                continue;
            }
            names
                .entry(tutor.tutor_id.clone())
                .or_insert_with(|| tutor.full_name());
        }
        Self { names }
    }

    pub fn contains(&self, tutor_id: &str) -> bool {
        self.names.contains_key(tutor_id)
    }

    /// Display name for `tutor_id`; empty when the id is blank or unknown.
    pub fn name_of(&self, tutor_id: &str) -> String {
        self.names.get(tutor_id).cloned().unwrap_or_default()
    }

    /// Logs every tutor id referenced by the roster that the directory does
    /// not know, once per id. Returns the unknown ids in first-seen order.
    pub fn report_unknown(&self, roster: &[StudentRecord]) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut unknown = Vec::new();

        for student in roster {
            let tutor_id = student.tutor_id.as_str();
            if tutor_id.is_empty() || self.contains(tutor_id) || !seen.insert(tutor_id) {
                continue;
            }
            error!(
                tutor_id,
                student_id = %student.student_id,
                "tutor id is not in the tutor roster"
            );
            unknown.push(tutor_id.to_string());
        }

        unknown
    }
}

/// Count-table label for a tutor name.
pub fn display_tutor(name: &str) -> &str {
    if name.trim().is_empty() {
        UNKNOWN_TUTOR
    } else {
        name
    }
}
