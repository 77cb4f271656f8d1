use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{info, warn};

use crate::changes::ChangeTable;
use crate::error::StoreError;
use crate::models::{ChangedTag, CrmTagRecord, SnapshotRow, StudentRecord, SubmissionRecord, Tag, Tutor};
use crate::tables::TagTable;
use crate::tutors::display_tutor;

const ROSTER_COLUMNS: [&str; 9] = [
    "EnrolmentID",
    "StudentID",
    "First Name",
    "Last Name",
    "Course ID",
    "Tutor ID",
    "Status",
    "Tag",
    "Start Date",
];
const SUBMISSION_COLUMNS: [&str; 5] = ["StudentID", "Student", "Course", "Tutor", "Last submission date"];
const CRM_COLUMNS: [&str; 4] = ["StudentID", "First Name", "Last Name", "Tags"];
const TUTOR_COLUMNS: [&str; 3] = ["Tutor ID", "First Name", "Last Name"];
const SNAPSHOT_COLUMNS: [&str; 6] = ["StudentID", "EnrolmentID", "Student", "Course", "Tutor", "Updated_Tags"];

/// Reads every well-formed row of `path`. Only an unreadable file or header
/// fails the load; malformed rows are skipped with a warning.
fn read_records<T: DeserializeOwned>(
    path: &Path,
    source: &str,
    columns: &[&str],
) -> Result<Vec<T>, StoreError> {
    let read_err = |source: csv::Error| StoreError::Read {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)
        .map_err(read_err)?;

    let headers = reader.headers().map_err(read_err)?.clone();
    for column in columns {
        if !headers.iter().any(|header| header == *column) {
            return Err(StoreError::MissingColumn {
                path: path.to_path_buf(),
                column: column.to_string(),
            });
        }
    }

    let mut records = Vec::new();
    let mut skipped = 0usize;
    for result in reader.deserialize::<T>() {
        match result {
            Ok(record) => records.push(record),
            Err(err) if err.is_io_error() => return Err(read_err(err)),
            Err(err) => {
                skipped += 1;
                let line = err.position().map(|position| position.line());
                warn!(source, line, error = %err, "malformed row skipped");
            }
        }
    }
    if skipped > 0 {
        warn!(source, skipped, "malformed rows were skipped");
    }
    Ok(records)
}

/// Drops rows that cannot be keyed by student id.
fn keyed<T>(records: Vec<T>, source: &str, student_id: impl Fn(&T) -> &str) -> Vec<T> {
    let before = records.len();
    let kept: Vec<T> = records
        .into_iter()
        .filter(|record| !student_id(record).is_empty())
        .collect();
    if kept.len() < before {
        warn!(
            source,
            skipped = before - kept.len(),
            "rows without a StudentID were skipped"
        );
    }
    kept
}

pub fn load_roster(path: &Path) -> Result<Vec<StudentRecord>, StoreError> {
    let roster = keyed(read_records(path, "roster", &ROSTER_COLUMNS)?, "roster", |s: &StudentRecord| {
        s.student_id.as_str()
    });

    for student in &roster {
        let id = student.student_id.as_str();
        if student.first_name.is_empty() || student.last_name.is_empty() {
            warn!(student_id = id, "roster name is incomplete");
        }
        if student.course.is_empty() {
            warn!(student_id = id, "roster course is missing");
        }
        if student.status.is_empty() {
            warn!(student_id = id, "roster status is missing; treated as active");
        }
        if student.current_tag.is_empty() {
            warn!(student_id = id, "roster tag is missing");
        }
        if student.start_date.is_empty() {
            warn!(student_id = id, "roster start date is missing");
        }
    }

    info!(path = %path.display(), rows = roster.len(), "loaded roster");
    Ok(roster)
}

pub fn load_submissions(path: &Path) -> Result<Vec<SubmissionRecord>, StoreError> {
    let rows = keyed(
        read_records(path, "submissions", &SUBMISSION_COLUMNS)?,
        "submissions",
        |s: &SubmissionRecord| s.student_id.as_str(),
    );
    info!(path = %path.display(), rows = rows.len(), "loaded submission extract");
    Ok(rows)
}

pub fn load_crm(path: &Path) -> Result<Vec<CrmTagRecord>, StoreError> {
    let rows = keyed(read_records(path, "crm", &CRM_COLUMNS)?, "crm", |c: &CrmTagRecord| {
        c.student_id.as_str()
    });
    info!(path = %path.display(), rows = rows.len(), "loaded CRM tags");
    Ok(rows)
}

pub fn load_tutors(path: &Path) -> Result<Vec<Tutor>, StoreError> {
    let tutors: Vec<Tutor> = read_records(path, "tutors", &TUTOR_COLUMNS)?;
    for (position, tutor) in tutors.iter().enumerate() {
        if tutor.tutor_id.is_empty() {
            warn!(position, "tutor row without a Tutor ID");
        } else if tutor.first_name.is_empty() || tutor.last_name.is_empty() {
            warn!(tutor_id = %tutor.tutor_id, "tutor name is incomplete");
        }
    }
    info!(path = %path.display(), rows = tutors.len(), "loaded tutor roster");
    Ok(tutors)
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct SnapshotCsvRow {
    #[serde(rename = "StudentID")]
    student_id: String,
    #[serde(rename = "EnrolmentID")]
    enrolment_id: String,
    #[serde(rename = "Student")]
    student: String,
    #[serde(rename = "Course")]
    course: String,
    #[serde(rename = "Tutor")]
    tutor: String,
    #[serde(rename = "Updated_Tags")]
    tag: String,
}

/// Reads a snapshot exported by an earlier run.
pub fn load_snapshot(path: &Path) -> Result<Vec<SnapshotRow>, StoreError> {
    let rows = keyed(
        read_records(path, "snapshot", &SNAPSHOT_COLUMNS)?,
        "snapshot",
        |r: &SnapshotCsvRow| r.student_id.as_str(),
    );

    let snapshot: Vec<SnapshotRow> = rows
        .into_iter()
        .map(|row| {
            if row.tag.is_empty() {
                warn!(student_id = %row.student_id, "snapshot tag is missing");
            }
            SnapshotRow {
                tag: Tag::parse(&row.tag),
                student_id: row.student_id,
                enrolment_id: row.enrolment_id,
                student: row.student,
                course: row.course,
                tutor: row.tutor,
            }
        })
        .collect();

    info!(path = %path.display(), rows = snapshot.len(), "loaded snapshot");
    Ok(snapshot)
}

/// Output file names for one run, all sharing the run's timestamp.
#[derive(Debug, Clone)]
pub struct RunFiles {
    pub dir: PathBuf,
    pub stamp: String,
}

impl RunFiles {
    pub fn new(dir: impl Into<PathBuf>, stamp: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            stamp: stamp.into(),
        }
    }

    pub fn path(&self, prefix: &str, extension: &str) -> PathBuf {
        self.dir.join(format!("{prefix}_{}.{extension}", self.stamp))
    }

    pub fn snapshot(&self) -> PathBuf {
        self.path("Updated_Tags", "csv")
    }

    pub fn roster_changes(&self) -> PathBuf {
        self.path("Changed_Tags_Student_Database", "csv")
    }

    pub fn crm_changes(&self) -> PathBuf {
        self.path("Changed_Tags_CRM", "csv")
    }

    pub fn tag_counts(&self) -> PathBuf {
        self.path("Tags_Count", "csv")
    }

    pub fn tag_changes(&self) -> PathBuf {
        self.path("Tags_Changes", "csv")
    }

    pub fn report(&self) -> PathBuf {
        self.path("report", "md")
    }

    pub fn manifest(&self) -> PathBuf {
        self.path("run", "json")
    }
}

/// Opens `path` for writing, never replacing an existing file.
fn create_new(path: &Path) -> Result<File, StoreError> {
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|err| {
            if err.kind() == ErrorKind::AlreadyExists {
                StoreError::AlreadyExists(path.to_path_buf())
            } else {
                StoreError::Write {
                    path: path.to_path_buf(),
                    source: err.into(),
                }
            }
        })
}

fn write_rows<I>(path: &Path, header: &[&str], rows: I) -> Result<(), StoreError>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let write_err = |source: csv::Error| StoreError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = csv::Writer::from_writer(create_new(path)?);
    writer.write_record(header).map_err(write_err)?;
    for row in rows {
        writer.write_record(&row).map_err(write_err)?;
    }
    writer.flush().map_err(|err| write_err(err.into()))?;
    Ok(())
}

/// Persists this run's snapshot. Fails if the file already exists.
pub fn write_snapshot(path: &Path, snapshot: &[SnapshotRow]) -> Result<(), StoreError> {
    write_rows(
        path,
        &SNAPSHOT_COLUMNS,
        snapshot.iter().map(|row| {
            vec![
                row.student_id.clone(),
                row.enrolment_id.clone(),
                row.student.clone(),
                row.course.clone(),
                row.tutor.clone(),
                row.tag.to_string(),
            ]
        }),
    )
}

pub fn write_roster_changes(path: &Path, changed: &[ChangedTag]) -> Result<(), StoreError> {
    write_rows(
        path,
        &["StudentID", "EnrolmentID", "Student", "Tag"],
        changed.iter().map(|c| {
            vec![
                c.student_id.clone(),
                c.enrolment_id.clone(),
                c.student.clone(),
                c.tag.to_string(),
            ]
        }),
    )
}

pub fn write_crm_changes(path: &Path, changed: &[ChangedTag]) -> Result<(), StoreError> {
    write_rows(
        path,
        &["StudentID", "Student", "Tutor", "Tag"],
        changed.iter().map(|c| {
            vec![
                c.student_id.clone(),
                c.student.clone(),
                c.tutor.clone(),
                c.tag.to_string(),
            ]
        }),
    )
}

pub fn write_tag_counts(path: &Path, table: &TagTable) -> Result<(), StoreError> {
    let rows = table
        .tutors
        .iter()
        .map(|row| (display_tutor(&row.tutor), &row.counts))
        .chain(std::iter::once(("Total", &table.total)))
        .map(|(tutor, counts)| {
            vec![
                tutor.to_string(),
                counts.green.to_string(),
                counts.orange.to_string(),
                counts.red.to_string(),
                counts.black.to_string(),
                counts.purple.to_string(),
            ]
        });
    write_rows(
        path,
        &["Tutor", "Green", "Orange", "Red", "Black", "Purple"],
        rows,
    )
}

pub fn write_change_counts(path: &Path, table: &ChangeTable) -> Result<(), StoreError> {
    let rows = table
        .tutors
        .iter()
        .map(|row| (display_tutor(&row.tutor), &row.counts))
        .chain(std::iter::once(("Total", &table.total)))
        .map(|(tutor, counts)| {
            vec![
                tutor.to_string(),
                counts.progressed.to_string(),
                counts.regressed.to_string(),
                counts.maintained.to_string(),
            ]
        });
    write_rows(
        path,
        &["Tutor", "Progressed", "Regressed", "Maintained"],
        rows,
    )
}

pub fn write_text(path: &Path, contents: &str) -> Result<(), StoreError> {
    use std::io::Write;

    let mut file = create_new(path)?;
    file.write_all(contents.as_bytes())
        .map_err(|err| StoreError::Write {
            path: path.to_path_buf(),
            source: err.into(),
        })
}
