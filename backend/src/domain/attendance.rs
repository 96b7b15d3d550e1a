//! Attendance ledger entities.
//!
//! The ledger keeps at most one [`AttendanceRecord`] per
//! (student, class, [`AttendanceDay`]). Re-marking the same day overwrites
//! the existing record instead of adding a second one.

use std::cmp::Reverse;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{ClassId, User, UserId};

/// Maximum length of an attendance note, in characters.
pub const ATTENDANCE_NOTE_MAX: usize = 500;

/// Validation errors raised by ledger value objects.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttendanceValidationError {
    #[error("status must be one of present, absent, or late")]
    UnknownStatus,
    #[error("notes must be at most {max} characters")]
    NoteTooLong { max: usize },
    #[error("start date {start} is after end date {end}")]
    InvertedRange {
        start: AttendanceDay,
        end: AttendanceDay,
    },
}

/// Stable attendance record identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttendanceId(Uuid);

impl AttendanceId {
    /// Generate a new random [`AttendanceId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for AttendanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Attendance outcome for one student on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
}

impl AttendanceStatus {
    /// Lowercase wire and storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Absent => "absent",
            Self::Late => "late",
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttendanceStatus {
    type Err = AttendanceValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "present" => Ok(Self::Present),
            "absent" => Ok(Self::Absent),
            "late" => Ok(Self::Late),
            _ => Err(AttendanceValidationError::UnknownStatus),
        }
    }
}

/// Calendar day an attendance record applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttendanceDay(NaiveDate);

impl AttendanceDay {
    /// Wrap a calendar date.
    pub const fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Truncate an instant to its UTC calendar day.
    ///
    /// # Examples
    /// ```
    /// use chrono::{DateTime, NaiveDate, Utc};
    /// use rollcall::domain::AttendanceDay;
    ///
    /// let instant: DateTime<Utc> = "2024-03-01T23:59:59Z".parse().unwrap();
    /// let day = AttendanceDay::from_instant(instant);
    /// assert_eq!(day.as_date(), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    /// ```
    pub fn from_instant(instant: DateTime<Utc>) -> Self {
        Self(instant.date_naive())
    }

    pub fn as_date(&self) -> NaiveDate {
        self.0
    }
}

impl fmt::Display for AttendanceDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// Optional free-text note attached to a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceNote(String);

impl AttendanceNote {
    /// Validate a note. Blank input yields `None`.
    pub fn parse(note: impl Into<String>) -> Result<Option<Self>, AttendanceValidationError> {
        let note = note.into();
        let trimmed = note.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        if trimmed.chars().count() > ATTENDANCE_NOTE_MAX {
            return Err(AttendanceValidationError::NoteTooLong {
                max: ATTENDANCE_NOTE_MAX,
            });
        }
        Ok(Some(Self(trimmed.to_owned())))
    }
}

impl AsRef<str> for AttendanceNote {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Effect of an amendment on the stored note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteChange {
    Keep,
    Clear,
    Replace(AttendanceNote),
}

impl NoteChange {
    /// Absent input keeps the note, blank input clears it, anything else
    /// replaces it.
    pub fn parse(raw: Option<String>) -> Result<Self, AttendanceValidationError> {
        match raw {
            None => Ok(Self::Keep),
            Some(raw) => Ok(AttendanceNote::parse(raw)?.map_or(Self::Clear, Self::Replace)),
        }
    }
}

/// Inputs for a first mark of (student, class, day).
#[derive(Debug, Clone)]
pub struct AttendanceMark {
    pub student_id: UserId,
    pub class_id: ClassId,
    pub day: AttendanceDay,
    pub status: AttendanceStatus,
    pub marked_by: UserId,
    pub note: Option<AttendanceNote>,
}

/// Raw parts used to rehydrate an [`AttendanceRecord`] from storage.
#[derive(Debug, Clone)]
pub struct AttendanceRecordDraft {
    pub id: AttendanceId,
    pub student_id: UserId,
    pub class_id: ClassId,
    pub day: AttendanceDay,
    pub status: AttendanceStatus,
    pub marked_by: UserId,
    pub note: Option<AttendanceNote>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Attendance status of one student in one class on one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceRecord {
    id: AttendanceId,
    student_id: UserId,
    class_id: ClassId,
    day: AttendanceDay,
    status: AttendanceStatus,
    marked_by: UserId,
    note: Option<AttendanceNote>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AttendanceRecord {
    /// Create the record for a first mark.
    pub fn create(id: AttendanceId, mark: AttendanceMark, now: DateTime<Utc>) -> Self {
        Self {
            id,
            student_id: mark.student_id,
            class_id: mark.class_id,
            day: mark.day,
            status: mark.status,
            marked_by: mark.marked_by,
            note: mark.note,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn from_draft(draft: AttendanceRecordDraft) -> Self {
        Self {
            id: draft.id,
            student_id: draft.student_id,
            class_id: draft.class_id,
            day: draft.day,
            status: draft.status,
            marked_by: draft.marked_by,
            note: draft.note,
            created_at: draft.created_at,
            updated_at: draft.updated_at,
        }
    }

    pub fn id(&self) -> AttendanceId {
        self.id
    }

    pub fn student_id(&self) -> UserId {
        self.student_id
    }

    pub fn class_id(&self) -> ClassId {
        self.class_id
    }

    pub fn day(&self) -> AttendanceDay {
        self.day
    }

    pub fn status(&self) -> AttendanceStatus {
        self.status
    }

    pub fn marked_by(&self) -> UserId {
        self.marked_by
    }

    pub fn note(&self) -> Option<&AttendanceNote> {
        self.note.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Apply a repeat mark for the same day.
    ///
    /// Status and marker are replaced; the note is replaced only when a new
    /// one is supplied.
    pub fn overwrite(
        &mut self,
        status: AttendanceStatus,
        marked_by: UserId,
        note: Option<AttendanceNote>,
        now: DateTime<Utc>,
    ) {
        self.marked_by = marked_by;
        self.amend(status, note.map_or(NoteChange::Keep, NoteChange::Replace), now);
    }

    /// Amend status and note, leaving the marker unchanged.
    pub fn amend(&mut self, status: AttendanceStatus, note: NoteChange, now: DateTime<Utc>) {
        self.status = status;
        match note {
            NoteChange::Keep => {}
            NoteChange::Clear => self.note = None,
            NoteChange::Replace(note) => self.note = Some(note),
        }
        self.updated_at = now;
    }
}

/// Sort newest day first, most recently updated first within a day.
pub fn sort_newest_first(records: &mut [AttendanceRecord]) {
    records.sort_by_key(|record| (Reverse(record.day), Reverse(record.updated_at)));
}

/// Criteria for listing attendance. Every bound is optional and inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttendanceFilter {
    start: Option<AttendanceDay>,
    end: Option<AttendanceDay>,
    class_id: Option<ClassId>,
    student_id: Option<UserId>,
}

impl AttendanceFilter {
    /// Build a filter, rejecting a start day after the end day.
    pub fn new(
        start: Option<AttendanceDay>,
        end: Option<AttendanceDay>,
        class_id: Option<ClassId>,
        student_id: Option<UserId>,
    ) -> Result<Self, AttendanceValidationError> {
        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                return Err(AttendanceValidationError::InvertedRange { start, end });
            }
        }
        Ok(Self {
            start,
            end,
            class_id,
            student_id,
        })
    }

    pub fn start(&self) -> Option<AttendanceDay> {
        self.start
    }

    pub fn end(&self) -> Option<AttendanceDay> {
        self.end
    }

    pub fn class_id(&self) -> Option<ClassId> {
        self.class_id
    }

    pub fn student_id(&self) -> Option<UserId> {
        self.student_id
    }

    /// Replace the student criterion, discarding whatever was requested.
    #[must_use]
    pub fn restricted_to(mut self, student: UserId) -> Self {
        self.student_id = Some(student);
        self
    }

    /// Whether `record` satisfies every criterion.
    pub fn matches(&self, record: &AttendanceRecord) -> bool {
        self.start.is_none_or(|start| record.day >= start)
            && self.end.is_none_or(|end| record.day <= end)
            && self.class_id.is_none_or(|id| record.class_id == id)
            && self.student_id.is_none_or(|id| record.student_id == id)
    }
}

/// Attendance record with display data for the student and marker.
///
/// Users missing from the directory are reported as `None` rather than
/// failing the read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceEntry {
    pub record: AttendanceRecord,
    pub student: Option<User>,
    pub marked_by: Option<User>,
}
