//! Port for class roster persistence.

use async_trait::async_trait;

use crate::domain::{Class, ClassId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by class repository adapters.
    pub enum ClassRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "class repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "class repository query failed: {message}",
    }
}

/// Port for storing classes and their enrolment sets.
///
/// Listing methods return classes newest first by creation time.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClassRepository: Send + Sync {
    async fn insert(&self, class: &Class) -> Result<(), ClassRepositoryError>;

    /// Persist name, description, and enrolment changes as one unit.
    async fn save(&self, class: &Class) -> Result<(), ClassRepositoryError>;

    async fn find_by_id(&self, id: &ClassId) -> Result<Option<Class>, ClassRepositoryError>;

    async fn list_all(&self) -> Result<Vec<Class>, ClassRepositoryError>;

    /// Classes owned by `teacher`.
    async fn list_taught_by(&self, teacher: &UserId) -> Result<Vec<Class>, ClassRepositoryError>;

    /// Classes in which `student` is enrolled.
    async fn list_enrolling(&self, student: &UserId) -> Result<Vec<Class>, ClassRepositoryError>;

    /// Delete the class and every attendance record referencing it.
    ///
    /// Both deletions succeed or neither does. Returns the number of
    /// attendance records removed.
    async fn delete_with_attendance(&self, id: &ClassId) -> Result<u64, ClassRepositoryError>;
}
