//! Driving port for attendance ledger writes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Actor, AttendanceEntry, AttendanceId, AttendanceStatus, ClassId, Error, UserId};

/// Request to mark a student's attendance for a day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkAttendanceRequest {
    pub actor: Actor,
    pub student_id: UserId,
    pub class_id: ClassId,
    pub status: AttendanceStatus,
    /// Instant whose UTC calendar day is marked. Defaults to now.
    pub at: Option<DateTime<Utc>>,
    pub note: Option<String>,
}

/// Request to amend an existing record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateAttendanceRequest {
    pub actor: Actor,
    pub record_id: AttendanceId,
    pub status: AttendanceStatus,
    /// `None` keeps the stored note, blank text clears it.
    pub note: Option<String>,
}

/// Driving port for ledger writes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AttendanceCommand: Send + Sync {
    /// Create or overwrite the record for (student, class, day).
    ///
    /// Marking the same day again replaces status and marker on the existing
    /// record; it never creates a second one.
    async fn mark_attendance(&self, request: MarkAttendanceRequest)
    -> Result<AttendanceEntry, Error>;

    async fn update_attendance(
        &self,
        request: UpdateAttendanceRequest,
    ) -> Result<AttendanceEntry, Error>;
}
