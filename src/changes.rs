use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use crate::models::{ChangeCounts, Color, SnapshotRow, TutorChanges};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Progressed,
    Regressed,
    Maintained,
}

pub fn classify(previous: Color, current: Color) -> Trend {
    match current.value().cmp(&previous.value()) {
        Ordering::Less => Trend::Regressed,
        Ordering::Greater => Trend::Progressed,
        Ordering::Equal => Trend::Maintained,
    }
}

/// Per-tutor trend counts with their sum.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeTable {
    pub tutors: Vec<TutorChanges>,
    pub total: ChangeCounts,
}

impl ChangeTable {
    #[cfg(test)]
    pub fn counts_for(&self, tutor: &str) -> Option<&ChangeCounts> {
        self.tutors
            .iter()
            .find(|row| row.tutor == tutor)
            .map(|row| &row.counts)
    }

    /// Students that took part in the comparison.
    pub fn compared(&self) -> usize {
        self.total.total()
    }
}

/// Compares the tags of students present in both snapshots.
///
/// Only pairs where both tags are on the color scale count; Purple, status
/// text and "N/A" are skipped. Each student is attributed to their tutor in
/// the current snapshot, and tutors appear in the order they are first met
/// in `current`. The first row per student id wins on both sides.
pub fn compare_snapshots(previous: &[SnapshotRow], current: &[SnapshotRow]) -> ChangeTable {
    let mut previous_tags: HashMap<&str, &SnapshotRow> = HashMap::new();
    for row in previous {
        previous_tags.entry(row.student_id.as_str()).or_insert(row);
    }

    let mut table = ChangeTable::default();
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut counted: HashSet<&str> = HashSet::new();

    for row in current {
        if !counted.insert(row.student_id.as_str()) {
            continue;
        }
        let Some(before) = previous_tags.get(row.student_id.as_str()) else {
            continue;
        };
        let (Some(previous_color), Some(current_color)) = (before.tag.color(), row.tag.color())
        else {
            continue;
        };

        let index = *positions.entry(row.tutor.as_str()).or_insert_with(|| {
            table.tutors.push(TutorChanges {
                tutor: row.tutor.clone(),
                counts: ChangeCounts::default(),
            });
            table.tutors.len() - 1
        });

        let counts = &mut table.tutors[index].counts;
        match classify(previous_color, current_color) {
            Trend::Progressed => {
                counts.progressed += 1;
                table.total.progressed += 1;
            }
            Trend::Regressed => {
                counts.regressed += 1;
                table.total.regressed += 1;
            }
            Trend::Maintained => {
                counts.maintained += 1;
                table.total.maintained += 1;
            }
        }
    }

    table
}
