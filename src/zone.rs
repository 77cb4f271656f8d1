use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::warn;

use crate::config::Thresholds;
use crate::dates;
use crate::models::{Color, StudentRecord};

/// Tenure zone for one enrollment date. A missing or unreadable date is
/// Green, the most lenient zone.
pub fn zone_for(start_date: &str, as_of: NaiveDate, thresholds: &Thresholds) -> Color {
    match dates::elapsed_days(start_date, as_of) {
        Some(days) => thresholds.classify(days),
        None => Color::Green,
    }
}

/// Zones keyed by student id for the given active students.
pub fn classify_zones<'a, I>(
    active: I,
    as_of: NaiveDate,
    thresholds: &Thresholds,
) -> HashMap<String, Color>
where
    I: IntoIterator<Item = &'a StudentRecord>,
{
    let mut zones = HashMap::new();
    let mut defaulted = 0usize;

    for student in active {
        if dates::parse_date(&student.start_date).is_none() {
            defaulted += 1;
        }
        zones
            .entry(student.student_id.clone())
            .or_insert_with(|| zone_for(&student.start_date, as_of, thresholds));
    }

    if defaulted > 0 {
        warn!(
            defaulted,
            "start dates missing or unreadable; those students default to the Green zone"
        );
    }

    zones
}
