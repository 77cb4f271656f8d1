use std::collections::{HashMap, HashSet};

use crate::error::CompletenessError;
use crate::models::{Color, StudentRecord, Tag};
use crate::resolve;

/// Reunites the resolved active tags with the carried-forward tags of
/// inactive students, one entry per roster student in roster order.
///
/// Inactive students keep their status text as their tag. Resolved entries
/// for ids outside the roster are dropped; an active student with no resolved
/// entry is tagged Black, as a student with no activity would be.
pub fn carry_forward(roster: &[&StudentRecord], resolved: Vec<(String, Tag)>) -> Vec<(String, Tag)> {
    let mut resolved: HashMap<String, Tag> = resolved.into_iter().rev().collect();

    roster
        .iter()
        .map(|student| {
            let tag = match resolve::reserved_tag(student) {
                Some(tag) => tag,
                None => resolved
                    .remove(&student.student_id)
                    .unwrap_or(Tag::Color(Color::Black)),
            };
            (student.student_id.clone(), tag)
        })
        .collect()
}

/// Checks that `tags` holds every roster id exactly once and nothing else.
pub fn check_complete<'a, I>(roster_ids: I, tags: &[(String, Tag)]) -> Result<(), CompletenessError>
where
    I: IntoIterator<Item = &'a str>,
{
    let expected: HashSet<&str> = roster_ids.into_iter().collect();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut duplicated = Vec::new();
    let mut unexpected = Vec::new();

    for (student_id, _) in tags {
        let id = student_id.as_str();
        if !expected.contains(id) {
            unexpected.push(student_id.clone());
        } else if !seen.insert(id) {
            duplicated.push(student_id.clone());
        }
    }

    let mut missing: Vec<String> = expected
        .difference(&seen)
        .map(|id| id.to_string())
        .collect();
    missing.sort();

    if missing.is_empty() && duplicated.is_empty() && unexpected.is_empty() {
        Ok(())
    } else {
        Err(CompletenessError {
            missing,
            duplicated,
            unexpected,
        })
    }
}
