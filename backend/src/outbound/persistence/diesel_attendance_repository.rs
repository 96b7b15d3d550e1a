//! PostgreSQL-backed `AttendanceRepository` implementation using Diesel ORM.
//!
//! The `attendance_records_one_per_day` unique constraint guards the
//! (student, class, day) key; violations surface as
//! [`AttendanceRepositoryError::DuplicateDay`] so the service can retry as an
//! overwrite.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{AttendanceRepository, AttendanceRepositoryError};
use crate::domain::{
    AttendanceDay, AttendanceFilter, AttendanceId, AttendanceNote, AttendanceRecord,
    AttendanceRecordDraft, AttendanceStatus, ClassId, UserId,
};

use super::diesel_error_mapping::{is_unique_violation, map_diesel_error, map_pool_error};
use super::models::{AttendanceRow, AttendanceUpdate, NewAttendanceRow};
use super::pool::{DbPool, PoolError};
use super::schema::attendance_records;

/// Diesel-backed implementation of the attendance repository port.
#[derive(Clone)]
pub struct DieselAttendanceRepository {
    pool: DbPool,
}

impl DieselAttendanceRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool(error: PoolError) -> AttendanceRepositoryError {
    map_pool_error(error, AttendanceRepositoryError::connection)
}

fn map_diesel(error: diesel::result::Error) -> AttendanceRepositoryError {
    map_diesel_error(
        error,
        AttendanceRepositoryError::query,
        AttendanceRepositoryError::connection,
    )
}

fn row_to_record(row: AttendanceRow) -> Result<AttendanceRecord, AttendanceRepositoryError> {
    let status: AttendanceStatus = row.status.parse().map_err(|err| {
        AttendanceRepositoryError::query(format!("stored attendance {} is invalid: {err}", row.id))
    })?;
    let note = match row.notes.as_deref() {
        Some(raw) => AttendanceNote::parse(raw).map_err(|err| {
            AttendanceRepositoryError::query(format!(
                "stored attendance {} is invalid: {err}",
                row.id
            ))
        })?,
        None => None,
    };
    Ok(AttendanceRecord::from_draft(AttendanceRecordDraft {
        id: AttendanceId::from_uuid(row.id),
        student_id: UserId::from_uuid(row.student_id),
        class_id: ClassId::from_uuid(row.class_id),
        day: AttendanceDay::new(row.attended_on),
        status,
        marked_by: UserId::from_uuid(row.marked_by),
        note,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}

fn rows_to_records(
    rows: Vec<AttendanceRow>,
) -> Result<Vec<AttendanceRecord>, AttendanceRepositoryError> {
    rows.into_iter().map(row_to_record).collect()
}

#[async_trait]
impl AttendanceRepository for DieselAttendanceRepository {
    async fn find_for_day(
        &self,
        student: &UserId,
        class: &ClassId,
        day: AttendanceDay,
    ) -> Result<Option<AttendanceRecord>, AttendanceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let row = attendance_records::table
            .filter(attendance_records::student_id.eq(*student.as_uuid()))
            .filter(attendance_records::class_id.eq(*class.as_uuid()))
            .filter(attendance_records::attended_on.eq(day.as_date()))
            .select(AttendanceRow::as_select())
            .first::<AttendanceRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;
        row.map(row_to_record).transpose()
    }

    async fn insert(&self, record: &AttendanceRecord) -> Result<(), AttendanceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let row = NewAttendanceRow {
            id: *record.id().as_uuid(),
            student_id: *record.student_id().as_uuid(),
            class_id: *record.class_id().as_uuid(),
            attended_on: record.day().as_date(),
            status: record.status().as_str(),
            marked_by: *record.marked_by().as_uuid(),
            notes: record.note().map(AsRef::as_ref),
            created_at: record.created_at(),
            updated_at: record.updated_at(),
        };

        diesel::insert_into(attendance_records::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| {
                if is_unique_violation(&err) {
                    AttendanceRepositoryError::duplicate_day()
                } else {
                    map_diesel(err)
                }
            })
    }

    async fn update(&self, record: &AttendanceRecord) -> Result<(), AttendanceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let changes = AttendanceUpdate {
            status: record.status().as_str(),
            marked_by: *record.marked_by().as_uuid(),
            notes: record.note().map(AsRef::as_ref),
            updated_at: record.updated_at(),
        };

        let updated = diesel::update(
            attendance_records::table.filter(attendance_records::id.eq(*record.id().as_uuid())),
        )
        .set(&changes)
        .execute(&mut conn)
        .await
        .map_err(map_diesel)?;

        if updated == 0 {
            return Err(AttendanceRepositoryError::query(format!(
                "attendance {} no longer exists",
                record.id()
            )));
        }
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &AttendanceId,
    ) -> Result<Option<AttendanceRecord>, AttendanceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let row = attendance_records::table
            .filter(attendance_records::id.eq(*id.as_uuid()))
            .select(AttendanceRow::as_select())
            .first::<AttendanceRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;
        row.map(row_to_record).transpose()
    }

    async fn list(
        &self,
        filter: &AttendanceFilter,
    ) -> Result<Vec<AttendanceRecord>, AttendanceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let mut query = attendance_records::table
            .select(AttendanceRow::as_select())
            .into_boxed();

        if let Some(start) = filter.start() {
            query = query.filter(attendance_records::attended_on.ge(start.as_date()));
        }
        if let Some(end) = filter.end() {
            query = query.filter(attendance_records::attended_on.le(end.as_date()));
        }
        if let Some(class_id) = filter.class_id() {
            query = query.filter(attendance_records::class_id.eq(*class_id.as_uuid()));
        }
        if let Some(student_id) = filter.student_id() {
            query = query.filter(attendance_records::student_id.eq(*student_id.as_uuid()));
        }

        let rows: Vec<AttendanceRow> = query
            .order((
                attendance_records::attended_on.desc(),
                attendance_records::updated_at.desc(),
            ))
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;
        rows_to_records(rows)
    }
}
