//! Port for attendance ledger persistence.

use async_trait::async_trait;

use crate::domain::{
    AttendanceDay, AttendanceFilter, AttendanceId, AttendanceRecord, ClassId, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by attendance repository adapters.
    pub enum AttendanceRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "attendance repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "attendance repository query failed: {message}",
        /// A record for the same student, class, and day already exists.
        DuplicateDay => "attendance for this student, class, and day already exists",
    }
}

/// Port for the attendance ledger.
///
/// Adapters enforce uniqueness of (student, class, day) and report a
/// violation on insert as [`AttendanceRepositoryError::DuplicateDay`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AttendanceRepository: Send + Sync {
    /// Record for (student, class, day), if one exists.
    async fn find_for_day(
        &self,
        student: &UserId,
        class: &ClassId,
        day: AttendanceDay,
    ) -> Result<Option<AttendanceRecord>, AttendanceRepositoryError>;

    async fn insert(&self, record: &AttendanceRecord) -> Result<(), AttendanceRepositoryError>;

    /// Overwrite status, marker, note, and update time of an existing record.
    async fn update(&self, record: &AttendanceRecord) -> Result<(), AttendanceRepositoryError>;

    async fn find_by_id(
        &self,
        id: &AttendanceId,
    ) -> Result<Option<AttendanceRecord>, AttendanceRepositoryError>;

    /// Records matching `filter`, newest day first.
    async fn list(
        &self,
        filter: &AttendanceFilter,
    ) -> Result<Vec<AttendanceRecord>, AttendanceRepositoryError>;
}
