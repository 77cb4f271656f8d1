use std::fmt;

use serde::{Deserialize, Serialize};

/// Position on the engagement scale. Only these four tags are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Color {
    Black = 1,
    Red = 2,
    Orange = 3,
    Green = 4,
}

impl Color {
    #[cfg(test)]
    pub const ALL: [Color; 4] = [Color::Green, Color::Orange, Color::Red, Color::Black];

    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Color::Black => "Black",
            Color::Red => "Red",
            Color::Orange => "Orange",
            Color::Green => "Green",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Administrative statuses that take a student out of the active population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReservedStatus {
    Withdrawn,
    Graduated,
    Expired,
    Suspended,
    OnHold,
    Cancelled,
    Transferred,
}

impl ReservedStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "withdrawn" => Some(Self::Withdrawn),
            "graduated" => Some(Self::Graduated),
            "expired" => Some(Self::Expired),
            "suspended" => Some(Self::Suspended),
            "on hold" => Some(Self::OnHold),
            "cancelled" => Some(Self::Cancelled),
            "transferred" => Some(Self::Transferred),
            _ => None,
        }
    }
}

/// Final tag of a student for one run.
///
/// Precedence when several sources apply is `Purple > Status > Color`; see
/// [`Tag::precedence`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Tag {
    Color(Color),
    /// Verbatim status text, or any other off-scale value read back from a
    /// previous export (e.g. "N/A").
    Status(String),
    Purple,
}

impl Tag {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "black" => Tag::Color(Color::Black),
            "red" => Tag::Color(Color::Red),
            "orange" => Tag::Color(Color::Orange),
            "green" => Tag::Color(Color::Green),
            "purple" => Tag::Purple,
            _ => Tag::Status(trimmed.to_string()),
        }
    }

    /// The on-scale color, if any. Purple and status tags have none.
    pub fn color(&self) -> Option<Color> {
        match self {
            Tag::Color(color) => Some(*color),
            _ => None,
        }
    }

    pub fn precedence(&self) -> u8 {
        match self {
            Tag::Color(_) => 0,
            Tag::Status(_) => 1,
            Tag::Purple => 2,
        }
    }

    /// Keeps whichever tag has the higher precedence; `self` wins ties.
    pub fn superseded_by(self, other: Tag) -> Tag {
        if other.precedence() > self.precedence() {
            other
        } else {
            self
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::Color(color) => f.write_str(color.name()),
            Tag::Status(text) => f.write_str(text),
            Tag::Purple => f.write_str("Purple"),
        }
    }
}

impl From<Color> for Tag {
    fn from(color: Color) -> Self {
        Tag::Color(color)
    }
}

/// One row of the authoritative student roster.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StudentRecord {
    #[serde(rename = "EnrolmentID")]
    pub enrolment_id: String,
    #[serde(rename = "StudentID")]
    pub student_id: String,
    #[serde(rename = "First Name")]
    pub first_name: String,
    #[serde(rename = "Last Name")]
    pub last_name: String,
    #[serde(rename = "Course ID")]
    pub course: String,
    #[serde(rename = "Tutor ID")]
    pub tutor_id: String,
    #[serde(rename = "Status")]
    pub status: String,
    /// Tag currently held by the roster, compared against the new tag.
    #[serde(rename = "Tag")]
    pub current_tag: String,
    #[serde(rename = "Start Date")]
    pub start_date: String,
}

impl StudentRecord {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn reserved_status(&self) -> Option<ReservedStatus> {
        ReservedStatus::parse(&self.status)
    }

    pub fn is_active(&self) -> bool {
        self.reserved_status().is_none()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SubmissionRecord {
    #[serde(rename = "StudentID")]
    pub student_id: String,
    #[serde(rename = "Student")]
    pub student: String,
    #[serde(rename = "Course")]
    pub course: String,
    #[serde(rename = "Tutor")]
    pub tutor: String,
    #[serde(rename = "Last submission date")]
    pub last_submission: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CrmTagRecord {
    #[serde(rename = "StudentID")]
    pub student_id: String,
    #[serde(rename = "Tags")]
    pub tags: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Tutor {
    #[serde(rename = "Tutor ID")]
    pub tutor_id: String,
    #[serde(rename = "First Name")]
    pub first_name: String,
    #[serde(rename = "Last Name")]
    pub last_name: String,
}

impl Tutor {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// One student's line in a persisted snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotRow {
    pub student_id: String,
    pub enrolment_id: String,
    pub student: String,
    pub course: String,
    pub tutor: String,
    pub tag: Tag,
}

/// Per-student engagement tag before resolution, with the details used to
/// describe the student.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionTag {
    pub student_id: String,
    pub student: String,
    pub course: String,
    pub tutor: String,
    pub color: Color,
    pub synthesized: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChangeCounts {
    pub progressed: usize,
    pub regressed: usize,
    pub maintained: usize,
}

impl ChangeCounts {
    pub fn total(&self) -> usize {
        self.progressed + self.regressed + self.maintained
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TutorChanges {
    pub tutor: String,
    pub counts: ChangeCounts,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TagCounts {
    pub green: usize,
    pub orange: usize,
    pub red: usize,
    pub black: usize,
    pub purple: usize,
}

impl TagCounts {
    pub fn record(&mut self, tag: &Tag) {
        match tag {
            Tag::Color(Color::Green) => self.green += 1,
            Tag::Color(Color::Orange) => self.orange += 1,
            Tag::Color(Color::Red) => self.red += 1,
            Tag::Color(Color::Black) => self.black += 1,
            Tag::Purple => self.purple += 1,
            Tag::Status(_) => {}
        }
    }

    pub fn add(&mut self, other: &TagCounts) {
        self.green += other.green;
        self.orange += other.orange;
        self.red += other.red;
        self.black += other.black;
        self.purple += other.purple;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TutorTags {
    pub tutor: String,
    pub counts: TagCounts,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TagSummary {
    pub tag: String,
    pub count: usize,
    pub share: f64,
}

/// Student whose new tag differs from a system of record's view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedTag {
    pub student_id: String,
    pub enrolment_id: String,
    pub student: String,
    pub tutor: String,
    pub tag: Tag,
}
