//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and never
//! reach the domain.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{attendance_records, class_students, classes, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
}

/// Insertable struct for provisioning users.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub email: &'a str,
    pub role: &'a str,
}

// ---------------------------------------------------------------------------
// Class models
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = classes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ClassRow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub teacher_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = classes)]
pub(crate) struct NewClassRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub teacher_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Changeset for roster saves. `description` is written even when `None`.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = classes)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct ClassUpdate<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = class_students)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct EnrolmentRow {
    pub class_id: Uuid,
    pub student_id: Uuid,
    pub position: i32,
}

// ---------------------------------------------------------------------------
// Attendance models
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = attendance_records)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AttendanceRow {
    pub id: Uuid,
    pub student_id: Uuid,
    pub class_id: Uuid,
    pub attended_on: NaiveDate,
    pub status: String,
    pub marked_by: Uuid,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = attendance_records)]
pub(crate) struct NewAttendanceRow<'a> {
    pub id: Uuid,
    pub student_id: Uuid,
    pub class_id: Uuid,
    pub attended_on: NaiveDate,
    pub status: &'a str,
    pub marked_by: Uuid,
    pub notes: Option<&'a str>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Changeset for overwrites and amendments. A `None` note clears the column,
/// so callers always pass the record's current note.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = attendance_records)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct AttendanceUpdate<'a> {
    pub status: &'a str,
    pub marked_by: Uuid,
    pub notes: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}
