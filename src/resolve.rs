use std::collections::HashMap;

use crate::models::{Color, StudentRecord, SubmissionTag, Tag};

/// Merges the submission tag with the tenure zone, keeping the more lenient
/// of the two: Green if either is Green, else Orange, else Red, else Black.
pub fn resolve(submission: Color, zone: Color) -> Color {
    submission.max(zone)
}

/// The status tag of a student whose reserved status bypasses the
/// date-derived tags, kept verbatim apart from surrounding whitespace.
pub fn reserved_tag(student: &StudentRecord) -> Option<Tag> {
    student
        .reserved_status()
        .map(|_| Tag::Status(student.status.trim().to_string()))
}

/// Final pre-override tag of one student.
pub fn resolve_student(student: &StudentRecord, submission: Color, zone: Option<Color>) -> Tag {
    if let Some(tag) = reserved_tag(student) {
        return tag;
    }
    let color = match zone {
        Some(zone) => resolve(submission, zone),
        None => submission,
    };
    Tag::Color(color)
}

/// Resolved tags for the active students, keyed by student id and returned
/// in the order of `submission_tags`.
pub fn resolve_active(
    active: &[&StudentRecord],
    submission_tags: &[SubmissionTag],
    zones: &HashMap<String, Color>,
) -> Vec<(String, Tag)> {
    let students: HashMap<&str, &StudentRecord> = active
        .iter()
        .map(|student| (student.student_id.as_str(), *student))
        .collect();

    submission_tags
        .iter()
        .filter_map(|entry| {
            let student = students.get(entry.student_id.as_str())?;
            let zone = zones.get(&entry.student_id).copied();
            Some((
                entry.student_id.clone(),
                resolve_student(student, entry.color, zone),
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(id: &str, status: &str) -> StudentRecord {
        StudentRecord {
            student_id: id.to_string(),
            status: status.to_string(),
            ..Default::default()
        }
    }

    fn submission_tag(id: &str, color: Color) -> SubmissionTag {
        SubmissionTag {
            student_id: id.to_string(),
            student: String::new(),
            course: String::new(),
            tutor: String::new(),
            color,
            synthesized: false,
        }
    }

    #[test]
    fn favours_the_more_lenient_signal() {
        assert_eq!(resolve(Color::Black, Color::Orange), Color::Orange);
        assert_eq!(resolve(Color::Green, Color::Black), Color::Green);
        assert_eq!(resolve(Color::Red, Color::Red), Color::Red);
        assert_eq!(resolve(Color::Black, Color::Black), Color::Black);
        assert_eq!(resolve(Color::Red, Color::Orange), Color::Orange);
    }

    #[test]
    fn resolution_is_symmetric_over_all_pairs() {
        for a in Color::ALL {
            for b in Color::ALL {
                assert_eq!(resolve(a, b), resolve(b, a));
                assert!(resolve(a, b) >= a && resolve(a, b) >= b);
            }
        }
    }

    #[test]
    fn reserved_status_bypasses_dates() {
        let withdrawn = student("S1", " Withdrawn ");
        assert_eq!(
            resolve_student(&withdrawn, Color::Green, Some(Color::Green)),
            Tag::Status("Withdrawn".to_string())
        );
        let on_hold = student("S2", "on hold");
        assert_eq!(
            resolve_student(&on_hold, Color::Black, None),
            Tag::Status("on hold".to_string())
        );
    }

    #[test]
    fn only_reserved_statuses_yield_a_status_tag() {
        assert_eq!(
            reserved_tag(&student("S1", "Graduated ")),
            Some(Tag::Status("Graduated".to_string()))
        );
        assert_eq!(reserved_tag(&student("S2", "Active")), None);
        assert_eq!(reserved_tag(&student("S3", "")), None);
    }

    #[test]
    fn missing_zone_leaves_submission_tag() {
        let active = student("S1", "Active");
        assert_eq!(
            resolve_student(&active, Color::Red, None),
            Tag::Color(Color::Red)
        );
    }

    #[test]
    fn resolves_active_students_in_order() {
        let roster = vec![student("S1", "Active"), student("S2", "Active")];
        let active: Vec<&StudentRecord> = roster.iter().collect();
        let tags = vec![
            submission_tag("S1", Color::Black),
            submission_tag("S2", Color::Red),
        ];
        let zones = HashMap::from([
            ("S1".to_string(), Color::Orange),
            ("S2".to_string(), Color::Black),
        ]);
        let first = resolve_active(&active, &tags, &zones);
        assert_eq!(
            first,
            vec![
                ("S1".to_string(), Tag::Color(Color::Orange)),
                ("S2".to_string(), Tag::Color(Color::Red)),
            ]
        );
        assert_eq!(resolve_active(&active, &tags, &zones), first);
    }
}
