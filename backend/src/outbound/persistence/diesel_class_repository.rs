//! PostgreSQL-backed `ClassRepository` implementation using Diesel ORM.
//!
//! A class is stored as one `classes` row plus its `class_students` rows.
//! Saves rewrite the enrolment rows inside the same transaction as the class
//! update, and deletion removes attendance and the class atomically.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{ClassRepository, ClassRepositoryError};
use crate::domain::{Class, ClassDescription, ClassDraft, ClassId, ClassName, UserId};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{ClassRow, ClassUpdate, EnrolmentRow, NewClassRow};
use super::pool::{DbPool, PoolError};
use super::schema::{attendance_records, class_students, classes};

/// Diesel-backed implementation of the class repository port.
#[derive(Clone)]
pub struct DieselClassRepository {
    pool: DbPool,
}

impl DieselClassRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool(error: PoolError) -> ClassRepositoryError {
    map_pool_error(error, ClassRepositoryError::connection)
}

fn map_diesel(error: diesel::result::Error) -> ClassRepositoryError {
    map_diesel_error(
        error,
        ClassRepositoryError::query,
        ClassRepositoryError::connection,
    )
}

fn enrolment_rows(class: &Class) -> Result<Vec<EnrolmentRow>, ClassRepositoryError> {
    class
        .student_ids()
        .iter()
        .enumerate()
        .map(|(index, student)| {
            let position = i32::try_from(index)
                .map_err(|_| ClassRepositoryError::query("enrolment exceeds supported size"))?;
            Ok(EnrolmentRow {
                class_id: *class.id().as_uuid(),
                student_id: *student.as_uuid(),
                position,
            })
        })
        .collect()
}

fn row_to_class(row: ClassRow, student_ids: Vec<UserId>) -> Result<Class, ClassRepositoryError> {
    let invalid = |err: crate::domain::ClassValidationError| {
        ClassRepositoryError::query(format!("stored class {} is invalid: {err}", row.id))
    };
    let name = ClassName::new(row.name.as_str()).map_err(invalid)?;
    let description = match row.description.as_deref() {
        Some(raw) => ClassDescription::parse(raw).map_err(invalid)?,
        None => None,
    };
    Ok(Class::from_draft(ClassDraft {
        id: ClassId::from_uuid(row.id),
        name,
        description,
        teacher_id: UserId::from_uuid(row.teacher_id),
        student_ids,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}

/// Load enrolments for `rows` and assemble classes, preserving row order.
async fn hydrate(
    conn: &mut AsyncPgConnection,
    rows: Vec<ClassRow>,
) -> Result<Vec<Class>, ClassRepositoryError> {
    let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
    let enrolments: Vec<EnrolmentRow> = class_students::table
        .filter(class_students::class_id.eq_any(ids))
        .order((class_students::class_id, class_students::position))
        .select(EnrolmentRow::as_select())
        .load(conn)
        .await
        .map_err(map_diesel)?;

    let mut by_class: HashMap<Uuid, Vec<UserId>> = HashMap::new();
    for enrolment in enrolments {
        by_class
            .entry(enrolment.class_id)
            .or_default()
            .push(UserId::from_uuid(enrolment.student_id));
    }

    rows.into_iter()
        .map(|row| {
            let students = by_class.remove(&row.id).unwrap_or_default();
            row_to_class(row, students)
        })
        .collect()
}

#[async_trait]
impl ClassRepository for DieselClassRepository {
    async fn insert(&self, class: &Class) -> Result<(), ClassRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let row = NewClassRow {
            id: *class.id().as_uuid(),
            name: class.name().as_ref(),
            description: class.description().map(AsRef::as_ref),
            teacher_id: *class.teacher_id().as_uuid(),
            created_at: class.created_at(),
            updated_at: class.updated_at(),
        };
        let enrolments = enrolment_rows(class)?;

        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            async move {
                diesel::insert_into(classes::table)
                    .values(&row)
                    .execute(conn)
                    .await?;
                if !enrolments.is_empty() {
                    diesel::insert_into(class_students::table)
                        .values(&enrolments)
                        .execute(conn)
                        .await?;
                }
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel)
    }

    async fn save(&self, class: &Class) -> Result<(), ClassRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let class_id = *class.id().as_uuid();
        let changes = ClassUpdate {
            name: class.name().as_ref(),
            description: class.description().map(AsRef::as_ref),
            updated_at: class.updated_at(),
        };
        let enrolments = enrolment_rows(class)?;

        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            async move {
                diesel::update(classes::table.filter(classes::id.eq(class_id)))
                    .set(&changes)
                    .execute(conn)
                    .await?;
                diesel::delete(class_students::table.filter(class_students::class_id.eq(class_id)))
                    .execute(conn)
                    .await?;
                if !enrolments.is_empty() {
                    diesel::insert_into(class_students::table)
                        .values(&enrolments)
                        .execute(conn)
                        .await?;
                }
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel)
    }

    async fn find_by_id(&self, id: &ClassId) -> Result<Option<Class>, ClassRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let row = classes::table
            .filter(classes::id.eq(*id.as_uuid()))
            .select(ClassRow::as_select())
            .first::<ClassRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;
        let Some(row) = row else {
            return Ok(None);
        };
        let mut hydrated = hydrate(&mut conn, vec![row]).await?;
        Ok(hydrated.pop())
    }

    async fn list_all(&self) -> Result<Vec<Class>, ClassRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let rows: Vec<ClassRow> = classes::table
            .order((classes::created_at.desc(), classes::id.desc()))
            .select(ClassRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;
        hydrate(&mut conn, rows).await
    }

    async fn list_taught_by(&self, teacher: &UserId) -> Result<Vec<Class>, ClassRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let rows: Vec<ClassRow> = classes::table
            .filter(classes::teacher_id.eq(*teacher.as_uuid()))
            .order((classes::created_at.desc(), classes::id.desc()))
            .select(ClassRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;
        hydrate(&mut conn, rows).await
    }

    async fn list_enrolling(&self, student: &UserId) -> Result<Vec<Class>, ClassRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let enrolled = class_students::table
            .filter(class_students::student_id.eq(*student.as_uuid()))
            .select(class_students::class_id);
        let rows: Vec<ClassRow> = classes::table
            .filter(classes::id.eq_any(enrolled))
            .order((classes::created_at.desc(), classes::id.desc()))
            .select(ClassRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;
        hydrate(&mut conn, rows).await
    }

    async fn delete_with_attendance(&self, id: &ClassId) -> Result<u64, ClassRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let class_id = *id.as_uuid();

        let removed = conn
            .transaction::<_, diesel::result::Error, _>(|conn| {
                async move {
                    let removed = diesel::delete(
                        attendance_records::table
                            .filter(attendance_records::class_id.eq(class_id)),
                    )
                    .execute(conn)
                    .await?;
                    diesel::delete(classes::table.filter(classes::id.eq(class_id)))
                        .execute(conn)
                        .await?;
                    Ok(removed)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel)?;

        u64::try_from(removed)
            .map_err(|_| ClassRepositoryError::query("deleted row count overflows u64"))
    }
}
