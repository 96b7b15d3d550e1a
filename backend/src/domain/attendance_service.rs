//! Attendance ledger domain service.
//!
//! Marking is an upsert keyed by (student, class, calendar day): the first
//! mark of a day creates a record, later marks overwrite it. Storage enforces
//! the same key, so a concurrent first mark that loses the insert race is
//! replayed as an overwrite. Last write wins; no conflict reaches callers.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;
use tracing::{info, warn};

use crate::domain::ports::{
    AttendanceCommand, AttendanceQuery, AttendanceRepository, AttendanceRepositoryError,
    ClassRepository, ClassRepositoryError, ListAttendanceRequest, MarkAttendanceRequest,
    UpdateAttendanceRequest, UserRepository, UserRepositoryError,
};
use crate::domain::{
    Action, AttendanceDay, AttendanceEntry, AttendanceId, AttendanceMark, AttendanceNote,
    AttendanceRecord, AttendanceValidationError, Error, NoteChange, Resource, Role, User, UserId,
};

fn map_attendance_repository_error(error: AttendanceRepositoryError) -> Error {
    match error {
        AttendanceRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("attendance repository unavailable: {message}"))
        }
        other => Error::internal(format!("attendance repository error: {other}")),
    }
}

fn map_class_repository_error(error: ClassRepositoryError) -> Error {
    match error {
        ClassRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("class repository unavailable: {message}"))
        }
        ClassRepositoryError::Query { message } => {
            Error::internal(format!("class repository error: {message}"))
        }
    }
}

fn map_user_repository_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        other => Error::internal(format!("user repository error: {other}")),
    }
}

fn note_error(err: AttendanceValidationError) -> Error {
    Error::invalid_field("notes", "note_too_long", err.to_string())
}

fn parse_note(raw: Option<String>) -> Result<Option<AttendanceNote>, Error> {
    raw.map(AttendanceNote::parse)
        .transpose()
        .map(Option::flatten)
        .map_err(note_error)
}

/// Ledger service implementing [`AttendanceCommand`] and [`AttendanceQuery`].
#[derive(Clone)]
pub struct AttendanceService<A, C, U> {
    attendance: Arc<A>,
    classes: Arc<C>,
    users: Arc<U>,
    clock: Arc<dyn Clock>,
}

impl<A, C, U> AttendanceService<A, C, U> {
    /// Create a ledger service. The class repository is consulted only to
    /// check enrolment; the user repository supplies display data.
    pub fn new(attendance: Arc<A>, classes: Arc<C>, users: Arc<U>, clock: Arc<dyn Clock>) -> Self {
        Self {
            attendance,
            classes,
            users,
            clock,
        }
    }
}

impl<A, C, U> AttendanceService<A, C, U>
where
    A: AttendanceRepository,
    C: ClassRepository,
    U: UserRepository,
{
    async fn find_for_day(&self, mark: &AttendanceMark) -> Result<Option<AttendanceRecord>, Error> {
        self.attendance
            .find_for_day(&mark.student_id, &mark.class_id, mark.day)
            .await
            .map_err(map_attendance_repository_error)
    }

    async fn overwrite(
        &self,
        mut record: AttendanceRecord,
        mark: AttendanceMark,
        now: DateTime<Utc>,
    ) -> Result<AttendanceRecord, Error> {
        let previous = record.status();
        record.overwrite(mark.status, mark.marked_by, mark.note, now);
        self.attendance
            .update(&record)
            .await
            .map_err(map_attendance_repository_error)?;
        info!(
            record_id = %record.id(),
            day = %record.day(),
            from = %previous,
            to = %record.status(),
            "attendance overwritten"
        );
        Ok(record)
    }

    async fn create(
        &self,
        mark: AttendanceMark,
        now: DateTime<Utc>,
    ) -> Result<AttendanceRecord, Error> {
        let record = AttendanceRecord::create(AttendanceId::random(), mark.clone(), now);
        match self.attendance.insert(&record).await {
            Ok(()) => {
                info!(record_id = %record.id(), day = %record.day(), "attendance recorded");
                Ok(record)
            }
            Err(AttendanceRepositoryError::DuplicateDay) => {
                warn!(
                    student_id = %mark.student_id,
                    class_id = %mark.class_id,
                    day = %mark.day,
                    "attendance created concurrently; overwriting"
                );
                let existing = self.find_for_day(&mark).await?.ok_or_else(|| {
                    Error::internal("attendance record missing after duplicate insert")
                })?;
                self.overwrite(existing, mark, now).await
            }
            Err(other) => Err(map_attendance_repository_error(other)),
        }
    }

    async fn users_by_id(&self, ids: &[UserId]) -> Result<HashMap<UserId, User>, Error> {
        let users = self
            .users
            .find_by_ids(ids)
            .await
            .map_err(map_user_repository_error)?;
        Ok(users.into_iter().map(|user| (user.id(), user)).collect())
    }

    async fn entries(&self, records: Vec<AttendanceRecord>) -> Result<Vec<AttendanceEntry>, Error> {
        let mut ids: Vec<UserId> = records
            .iter()
            .flat_map(|record| [record.student_id(), record.marked_by()])
            .collect();
        ids.sort_unstable();
        ids.dedup();
        let users = if ids.is_empty() {
            HashMap::new()
        } else {
            self.users_by_id(&ids).await?
        };

        Ok(records
            .into_iter()
            .map(|record| AttendanceEntry {
                student: users.get(&record.student_id()).cloned(),
                marked_by: users.get(&record.marked_by()).cloned(),
                record,
            })
            .collect())
    }

    async fn entry(&self, record: AttendanceRecord) -> Result<AttendanceEntry, Error> {
        let mut entries = self.entries(vec![record]).await?;
        entries
            .pop()
            .ok_or_else(|| Error::internal("attendance entry missing after enrichment"))
    }
}

#[async_trait]
impl<A, C, U> AttendanceCommand for AttendanceService<A, C, U>
where
    A: AttendanceRepository,
    C: ClassRepository,
    U: UserRepository,
{
    async fn mark_attendance(
        &self,
        request: MarkAttendanceRequest,
    ) -> Result<AttendanceEntry, Error> {
        let MarkAttendanceRequest {
            actor,
            student_id,
            class_id,
            status,
            at,
            note,
        } = request;
        actor.authorize(Action::MarkAttendance, Resource::None)?;
        let note = parse_note(note)?;

        let class = self
            .classes
            .find_by_id(&class_id)
            .await
            .map_err(map_class_repository_error)?
            .ok_or_else(|| Error::not_found(format!("class {class_id} not found")))?;
        if !class.is_enrolled(&student_id) {
            return Err(Error::invalid_field(
                "student",
                "student_not_enrolled",
                format!("student {student_id} is not enrolled in class {class_id}"),
            )
            .with_detail("value", student_id.to_string()));
        }

        let now = self.clock.utc();
        let mark = AttendanceMark {
            student_id,
            class_id,
            day: AttendanceDay::from_instant(at.unwrap_or(now)),
            status,
            marked_by: actor.id,
            note,
        };
        let record = match self.find_for_day(&mark).await? {
            Some(existing) => self.overwrite(existing, mark, now).await?,
            None => self.create(mark, now).await?,
        };
        self.entry(record).await
    }

    async fn update_attendance(
        &self,
        request: UpdateAttendanceRequest,
    ) -> Result<AttendanceEntry, Error> {
        let UpdateAttendanceRequest {
            actor,
            record_id,
            status,
            note,
        } = request;
        actor.authorize(Action::AmendAttendance, Resource::None)?;
        let note = NoteChange::parse(note).map_err(note_error)?;

        let mut record = self
            .attendance
            .find_by_id(&record_id)
            .await
            .map_err(map_attendance_repository_error)?
            .ok_or_else(|| Error::not_found(format!("attendance record {record_id} not found")))?;
        record.amend(status, note, self.clock.utc());
        self.attendance
            .update(&record)
            .await
            .map_err(map_attendance_repository_error)?;
        info!(record_id = %record_id, status = %status, "attendance amended");
        self.entry(record).await
    }
}

#[async_trait]
impl<A, C, U> AttendanceQuery for AttendanceService<A, C, U>
where
    A: AttendanceRepository,
    C: ClassRepository,
    U: UserRepository,
{
    async fn list_attendance(
        &self,
        request: ListAttendanceRequest,
    ) -> Result<Vec<AttendanceEntry>, Error> {
        let ListAttendanceRequest { actor, filter } = request;
        let filter = match actor.role {
            Role::Student => filter.restricted_to(actor.id),
            Role::Admin | Role::Teacher => filter,
        };
        let student = filter.student_id();
        let resource = student
            .as_ref()
            .map_or(Resource::None, Resource::AttendanceOf);
        actor.authorize(Action::ViewAttendance, resource)?;

        let records = self
            .attendance
            .list(&filter)
            .await
            .map_err(map_attendance_repository_error)?;
        self.entries(records).await
    }
}

#[cfg(test)]
#[path = "attendance_service_tests.rs"]
mod tests;
