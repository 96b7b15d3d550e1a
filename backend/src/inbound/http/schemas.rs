//! Response bodies shared by the HTTP handlers.
//!
//! Domain types stay free of wire concerns; these DTOs fix the JSON shape
//! (camelCase, RFC 3339 timestamps, `YYYY-MM-DD` days) and carry the
//! `utoipa` schema used in the OpenAPI document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{AttendanceEntry, AttendanceStatus, Class, Role, User};

/// A provisioned user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    #[schema(example = "Ada Lovelace")]
    pub name: String,
    #[schema(example = "ada@school.test")]
    pub email: String,
    pub role: Role,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id().to_string(),
            name: user.name().as_ref().to_owned(),
            email: user.email().as_ref().to_owned(),
            role: user.role(),
        }
    }
}

/// A class and its enrolment set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClassResponse {
    pub id: String,
    #[schema(example = "Math101")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Identifier of the owning teacher.
    pub teacher: String,
    /// Enrolled student identifiers in enrolment order.
    pub students: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Class> for ClassResponse {
    fn from(class: Class) -> Self {
        Self {
            id: class.id().to_string(),
            name: class.name().as_ref().to_owned(),
            description: class.description().map(|d| d.as_ref().to_owned()),
            teacher: class.teacher_id().to_string(),
            students: class
                .student_ids()
                .iter()
                .map(ToString::to_string)
                .collect(),
            created_at: class.created_at(),
            updated_at: class.updated_at(),
        }
    }
}

/// Student shown on an attendance record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentSummary {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// Teacher or admin who last marked an attendance record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkerSummary {
    pub id: String,
    pub name: String,
}

/// An attendance record with display data.
///
/// `student` and `markedBy` are `null` when the referenced user is no longer
/// provisioned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceResponse {
    pub id: String,
    pub student_id: String,
    pub student: Option<StudentSummary>,
    /// Class identifier.
    pub class: String,
    /// Calendar day in UTC.
    #[schema(example = "2024-03-04")]
    pub date: String,
    pub status: AttendanceStatus,
    pub marked_by_id: String,
    pub marked_by: Option<MarkerSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<AttendanceEntry> for AttendanceResponse {
    fn from(entry: AttendanceEntry) -> Self {
        let AttendanceEntry {
            record,
            student,
            marked_by,
        } = entry;
        Self {
            id: record.id().to_string(),
            student_id: record.student_id().to_string(),
            student: student.map(|user| StudentSummary {
                id: user.id().to_string(),
                name: user.name().as_ref().to_owned(),
                email: user.email().as_ref().to_owned(),
            }),
            class: record.class_id().to_string(),
            date: record.day().to_string(),
            status: record.status(),
            marked_by_id: record.marked_by().to_string(),
            marked_by: marked_by.map(|user| MarkerSummary {
                id: user.id().to_string(),
                name: user.name().as_ref().to_owned(),
            }),
            notes: record.note().map(|note| note.as_ref().to_owned()),
            created_at: record.created_at(),
            updated_at: record.updated_at(),
        }
    }
}

/// Plain confirmation message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "Class deleted successfully")]
    pub message: String,
}
