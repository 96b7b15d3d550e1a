//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Provisioned users. `role` is one of `admin`, `teacher`, `student`.
    users (id) {
        id -> Uuid,
        name -> Varchar,
        email -> Varchar,
        role -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    classes (id) {
        id -> Uuid,
        name -> Varchar,
        description -> Nullable<Text>,
        teacher_id -> Uuid,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Enrolment set. `position` preserves the order students were added.
    class_students (class_id, student_id) {
        class_id -> Uuid,
        student_id -> Uuid,
        position -> Int4,
    }
}

diesel::table! {
    /// Attendance ledger, unique on (student_id, class_id, attended_on).
    attendance_records (id) {
        id -> Uuid,
        student_id -> Uuid,
        class_id -> Uuid,
        attended_on -> Date,
        status -> Varchar,
        marked_by -> Uuid,
        notes -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(classes -> users (teacher_id));
diesel::joinable!(class_students -> classes (class_id));
diesel::joinable!(attendance_records -> classes (class_id));

diesel::allow_tables_to_appear_in_same_query!(users, classes, class_students, attendance_records);
