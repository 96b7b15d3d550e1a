//! Driving port for attendance ledger reads.

use async_trait::async_trait;

use crate::domain::{Actor, AttendanceEntry, AttendanceFilter, Error};

/// Request to list attendance visible to an actor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListAttendanceRequest {
    pub actor: Actor,
    pub filter: AttendanceFilter,
}

/// Driving port for ledger reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AttendanceQuery: Send + Sync {
    /// Records matching the filter, newest day first.
    ///
    /// For students the student criterion is replaced with their own id.
    async fn list_attendance(
        &self,
        request: ListAttendanceRequest,
    ) -> Result<Vec<AttendanceEntry>, Error>;
}
