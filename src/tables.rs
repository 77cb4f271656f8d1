use std::collections::HashMap;

use crate::models::{ChangedTag, SnapshotRow, StudentRecord, Tag, TagCounts, TutorTags};
use crate::tutors::TutorDirectory;

/// Builds snapshot rows from the final tags, describing each student from
/// the roster. Tags for ids outside the roster are dropped. Rows come back
/// sorted by tutor, then student name.
pub fn assemble_snapshot(
    roster: &[&StudentRecord],
    tags: Vec<(String, Tag)>,
    tutors: &TutorDirectory,
) -> Vec<SnapshotRow> {
    let mut students: HashMap<&str, &StudentRecord> = HashMap::new();
    for student in roster {
        students.entry(student.student_id.as_str()).or_insert(*student);
    }

    let mut rows: Vec<SnapshotRow> = tags
        .into_iter()
        .filter_map(|(student_id, tag)| {
            let student = students.get(student_id.as_str())?;
            Some(SnapshotRow {
                enrolment_id: student.enrolment_id.clone(),
                student: student.full_name(),
                course: student.course.clone(),
                tutor: tutors.name_of(&student.tutor_id),
                student_id,
                tag,
            })
        })
        .collect();

    sort_by_tutor(&mut rows);
    rows
}

/// Stable sort on (tutor, student name).
pub fn sort_by_tutor(rows: &mut [SnapshotRow]) {
    rows.sort_by(|a, b| (&a.tutor, &a.student).cmp(&(&b.tutor, &b.student)));
}

/// Students whose new tag differs from the tag the roster holds, sorted by
/// student id.
pub fn roster_changes(roster: &[&StudentRecord], snapshot: &[SnapshotRow]) -> Vec<ChangedTag> {
    let mut held: HashMap<&str, &str> = HashMap::new();
    for student in roster {
        held.entry(student.student_id.as_str())
            .or_insert(student.current_tag.trim());
    }

    let mut changed: Vec<ChangedTag> = snapshot
        .iter()
        .filter(|row| {
            held.get(row.student_id.as_str())
                .is_some_and(|current| *current != row.tag.to_string())
        })
        .map(changed_from)
        .collect();

    changed.sort_by(|a, b| a.student_id.cmp(&b.student_id));
    changed
}

/// Students whose new tag differs from the CRM's extracted tag. Only students
/// known to both sides are listed; sorted by tutor, then student name.
pub fn crm_changes(crm_view: &HashMap<String, Tag>, snapshot: &[SnapshotRow]) -> Vec<ChangedTag> {
    let mut changed: Vec<ChangedTag> = snapshot
        .iter()
        .filter(|row| {
            crm_view
                .get(&row.student_id)
                .is_some_and(|crm_tag| *crm_tag != row.tag)
        })
        .map(changed_from)
        .collect();

    changed.sort_by(|a, b| (&a.tutor, &a.student).cmp(&(&b.tutor, &b.student)));
    changed
}

fn changed_from(row: &SnapshotRow) -> ChangedTag {
    ChangedTag {
        student_id: row.student_id.clone(),
        enrolment_id: row.enrolment_id.clone(),
        student: row.student.clone(),
        tutor: row.tutor.clone(),
        tag: row.tag.clone(),
    }
}

/// Per-tutor color and Purple counts with their sum.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagTable {
    pub tutors: Vec<TutorTags>,
    pub total: TagCounts,
}

/// Counts tags per tutor in snapshot order. Status tags are not counted but
/// their tutor still gets a row.
pub fn tag_counts(snapshot: &[SnapshotRow]) -> TagTable {
    let mut table = TagTable::default();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for row in snapshot {
        let index = *positions.entry(row.tutor.as_str()).or_insert_with(|| {
            table.tutors.push(TutorTags {
                tutor: row.tutor.clone(),
                counts: TagCounts::default(),
            });
            table.tutors.len() - 1
        });
        table.tutors[index].counts.record(&row.tag);
    }

    for tutor in &table.tutors {
        table.total.add(&tutor.counts);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Color, Tutor};

    fn student(id: &str, first: &str, tutor_id: &str, current_tag: &str) -> StudentRecord {
        StudentRecord {
            enrolment_id: format!("E{id}"),
            student_id: id.to_string(),
            first_name: first.to_string(),
            last_name: "Lee".to_string(),
            course: "BSB-40-515".to_string(),
            tutor_id: tutor_id.to_string(),
            status: "Active".to_string(),
            current_tag: current_tag.to_string(),
            start_date: String::new(),
        }
    }

    fn directory() -> TutorDirectory {
        TutorDirectory::new(&[
            Tutor {
                tutor_id: "1".to_string(),
                first_name: "Zoe".to_string(),
                last_name: "Hart".to_string(),
            },
            Tutor {
                tutor_id: "2".to_string(),
                first_name: "Ana".to_string(),
                last_name: "Cruz".to_string(),
            },
        ])
    }

    fn fixture() -> (Vec<StudentRecord>, Vec<SnapshotRow>) {
        let roster = vec![
            student("S3", "Cal", "1", "Green"),
            student("S1", "Bea", "2", "Red"),
            student("S2", "Abe", "1", "Black"),
            student("S4", "Dee", "", "Withdrawn"),
        ];
        let refs: Vec<&StudentRecord> = roster.iter().collect();
        let tags = vec![
            ("S3".to_string(), Tag::Color(Color::Green)),
            ("S1".to_string(), Tag::Color(Color::Orange)),
            ("S2".to_string(), Tag::Purple),
            ("S4".to_string(), Tag::Status("Withdrawn".to_string())),
            ("GHOST".to_string(), Tag::Color(Color::Green)),
        ];
        let snapshot = assemble_snapshot(&refs, tags, &directory());
        (roster, snapshot)
    }

    #[test]
    fn snapshot_is_sorted_by_tutor_then_name() {
        let (_, snapshot) = fixture();
        let order: Vec<(&str, &str)> = snapshot
            .iter()
            .map(|row| (row.tutor.as_str(), row.student.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("", "Dee Lee"),
                ("Ana Cruz", "Bea Lee"),
                ("Zoe Hart", "Abe Lee"),
                ("Zoe Hart", "Cal Lee"),
            ]
        );
        assert_eq!(snapshot[1].enrolment_id, "ES1");
    }

    #[test]
    fn roster_changes_list_differences_by_student_id() {
        let (roster, snapshot) = fixture();
        let refs: Vec<&StudentRecord> = roster.iter().collect();
        let changed = roster_changes(&refs, &snapshot);
        let ids: Vec<&str> = changed.iter().map(|c| c.student_id.as_str()).collect();
        assert_eq!(ids, vec!["S1", "S2"]);
        assert_eq!(changed[0].tag, Tag::Color(Color::Orange));
    }

    #[test]
    fn crm_changes_join_on_known_students_only() {
        let (_, snapshot) = fixture();
        let crm = HashMap::from([
            ("S1".to_string(), Tag::Color(Color::Orange)),
            ("S3".to_string(), Tag::Color(Color::Red)),
            ("S4".to_string(), Tag::Status("N/A".to_string())),
            ("OUTSIDER".to_string(), Tag::Color(Color::Red)),
        ]);
        let changed = crm_changes(&crm, &snapshot);
        let ids: Vec<&str> = changed.iter().map(|c| c.student_id.as_str()).collect();
        assert_eq!(ids, vec!["S4", "S3"]);
    }

    #[test]
    fn tag_counts_sum_into_total() {
        let (_, snapshot) = fixture();
        let table = tag_counts(&snapshot);
        assert_eq!(table.tutors.len(), 3);
        assert_eq!(table.tutors[2].tutor, "Zoe Hart");
        assert_eq!(table.tutors[2].counts.green, 1);
        assert_eq!(table.tutors[2].counts.purple, 1);
        assert_eq!(table.tutors[0].counts, TagCounts::default());
        assert_eq!(table.total.green + table.total.orange + table.total.purple, 3);
    }
}
