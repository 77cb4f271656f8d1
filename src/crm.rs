use std::collections::HashMap;

use crate::models::{Color, CrmTagRecord, Tag};

const STATUS_MARKERS: [(&str, &str); 7] = [
    ("suspended", "Suspended"),
    ("withdrawn", "Withdrawn"),
    ("graduated", "Graduated"),
    ("expired", "Expired"),
    ("on hold", "On Hold"),
    ("cancelled", "Cancelled"),
    ("transferred", "Transferred"),
];

const COLOR_MARKERS: [(&str, Color); 4] = [
    ("green", Color::Green),
    ("orange", Color::Orange),
    ("red", Color::Red),
    ("black", Color::Black),
];

/// Status tag carried by a CRM contact's tag list.
///
/// Statuses are searched first, then colors, then the purple marker; the
/// first marker found wins. A list with none of them reads as "N/A".
pub fn extract_tag(raw: &str) -> Tag {
    let lowered = raw.to_lowercase();

    if let Some((_, label)) = STATUS_MARKERS
        .iter()
        .find(|(marker, _)| lowered.contains(marker))
    {
        return Tag::Status((*label).to_string());
    }
    if let Some((_, color)) = COLOR_MARKERS
        .iter()
        .find(|(marker, _)| lowered.contains(marker))
    {
        return Tag::Color(*color);
    }
    if lowered.contains("purple") {
        return Tag::Purple;
    }
    Tag::Status("N/A".to_string())
}

/// The CRM's current tag per student id. First row per id wins.
pub fn crm_view(records: &[CrmTagRecord]) -> HashMap<String, Tag> {
    let mut view = HashMap::new();
    for record in records {
        view.entry(record.student_id.clone())
            .or_insert_with(|| extract_tag(&record.tags));
    }
    view
}
