use std::collections::{HashMap, HashSet};

use crate::models::Tag;

/// Student ids the CRM flags as Purple.
pub fn purple_set(crm_view: &HashMap<String, Tag>) -> HashSet<String> {
    crm_view
        .iter()
        .filter(|(_, tag)| **tag == Tag::Purple)
        .map(|(student_id, _)| student_id.clone())
        .collect()
}

/// Forces Purple onto every flagged student, whatever tag they resolved to,
/// reserved statuses included. Returns the new tags and how many were
/// overwritten.
pub fn apply_override(tags: Vec<(String, Tag)>, purple: &HashSet<String>) -> (Vec<(String, Tag)>, usize) {
    let mut overridden = 0usize;
    let tags = tags
        .into_iter()
        .map(|(student_id, tag)| {
            if purple.contains(&student_id) {
                overridden += 1;
                (student_id, tag.superseded_by(Tag::Purple))
            } else {
                (student_id, tag)
            }
        })
        .collect();
    (tags, overridden)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Color;

    #[test]
    fn only_purple_crm_tags_are_flagged() {
        let view = HashMap::from([
            ("S1".to_string(), Tag::Purple),
            ("S2".to_string(), Tag::Color(Color::Green)),
            ("S3".to_string(), Tag::Status("N/A".to_string())),
        ]);
        let set = purple_set(&view);
        assert_eq!(set.len(), 1);
        assert!(set.contains("S1"));
    }

    #[test]
    fn purple_supersedes_colors_and_statuses() {
        let tags = vec![
            ("S1".to_string(), Tag::Color(Color::Black)),
            ("S2".to_string(), Tag::Status("Withdrawn".to_string())),
            ("S3".to_string(), Tag::Color(Color::Green)),
        ];
        let purple = HashSet::from(["S1".to_string(), "S2".to_string(), "GHOST".to_string()]);
        let (tags, overridden) = apply_override(tags, &purple);
        assert_eq!(overridden, 2);
        assert_eq!(tags[0].1, Tag::Purple);
        assert_eq!(tags[1].1, Tag::Purple);
        assert_eq!(tags[2].1, Tag::Color(Color::Green));
        assert_eq!(tags.len(), 3);
    }
}
