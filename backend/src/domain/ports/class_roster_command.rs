//! Driving port for class roster mutations.

use async_trait::async_trait;

use crate::domain::{Actor, Class, ClassId, Error, UserId};

/// Request to create a class owned by the acting teacher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateClassRequest {
    pub actor: Actor,
    pub name: String,
    pub description: Option<String>,
}

/// Request to rename a class or change its description.
///
/// A blank `description` clears the stored one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateClassRequest {
    pub actor: Actor,
    pub class_id: ClassId,
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Request to enrol a batch of students.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddStudentsRequest {
    pub actor: Actor,
    pub class_id: ClassId,
    pub student_ids: Vec<UserId>,
}

/// Request to withdraw one student.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveStudentRequest {
    pub actor: Actor,
    pub class_id: ClassId,
    pub student_id: UserId,
}

/// Request to delete a class together with its attendance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteClassRequest {
    pub actor: Actor,
    pub class_id: ClassId,
}

/// Outcome of a class deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteClassResponse {
    pub class_id: ClassId,
    pub attendance_removed: u64,
}

/// Driving port for roster writes.
///
/// Every operation is checked against the access policy before any state
/// changes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClassRosterCommand: Send + Sync {
    async fn create_class(&self, request: CreateClassRequest) -> Result<Class, Error>;

    async fn update_class(&self, request: UpdateClassRequest) -> Result<Class, Error>;

    /// Enrol students, silently skipping ids that are already enrolled.
    ///
    /// Fails with `invalid_request` when nothing is left to add.
    async fn add_students(&self, request: AddStudentsRequest) -> Result<Class, Error>;

    /// Withdraw a student. Withdrawing a non-enrolled student is a no-op.
    async fn remove_student(&self, request: RemoveStudentRequest) -> Result<Class, Error>;

    async fn delete_class(&self, request: DeleteClassRequest) -> Result<DeleteClassResponse, Error>;
}
