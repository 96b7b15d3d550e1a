//! Mutex-guarded maps implementing the user, class, and attendance ports.
//!
//! Uniqueness rules mirror the PostgreSQL schema: one user per email, one
//! attendance record per (student, class, day). Deleting a class removes its
//! attendance under the same lock acquisition.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::domain::ports::{
    AttendanceRepository, AttendanceRepositoryError, ClassRepository, ClassRepositoryError,
    UserRepository, UserRepositoryError,
};
use crate::domain::{
    AttendanceDay, AttendanceFilter, AttendanceId, AttendanceRecord, Class, ClassId, Role, User,
    UserId, sort_newest_first,
};

type DayKey = (UserId, ClassId, AttendanceDay);

#[derive(Debug, Default)]
struct State {
    users: HashMap<UserId, User>,
    classes: HashMap<ClassId, Class>,
    attendance: HashMap<AttendanceId, AttendanceRecord>,
    day_index: HashMap<DayKey, AttendanceId>,
}

/// Shared in-process store for every repository port.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with `users`. Later duplicates of an
    /// email are skipped.
    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        let store = Self::new();
        {
            let mut state = store.lock();
            for user in users {
                if !state.email_taken(user.email().as_ref()) {
                    state.users.insert(user.id(), user);
                }
            }
        }
        store
    }

    /// Number of stored attendance records.
    pub fn attendance_count(&self) -> usize {
        self.lock().attendance.len()
    }

    // Mutations never span a panic point, so a poisoned guard is still usable.
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl State {
    fn email_taken(&self, email: &str) -> bool {
        self.users
            .values()
            .any(|user| user.email().as_ref() == email)
    }

    fn classes_newest_first(&self, keep: impl Fn(&Class) -> bool) -> Vec<Class> {
        let mut classes: Vec<Class> = self
            .classes
            .values()
            .filter(|class| keep(class))
            .cloned()
            .collect();
        classes.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| b.id().as_uuid().cmp(a.id().as_uuid()))
        });
        classes
    }
}

fn day_key(record: &AttendanceRecord) -> DayKey {
    (record.student_id(), record.class_id(), record.day())
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn insert(&self, user: &User) -> Result<(), UserRepositoryError> {
        let mut state = self.lock();
        if state.email_taken(user.email().as_ref()) {
            return Err(UserRepositoryError::duplicate_email(user.email().as_ref()));
        }
        state.users.insert(user.id(), user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        Ok(self.lock().users.get(id).cloned())
    }

    async fn find_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, UserRepositoryError> {
        let state = self.lock();
        Ok(ids
            .iter()
            .filter_map(|id| state.users.get(id).cloned())
            .collect())
    }

    async fn list_by_role(&self, role: Role) -> Result<Vec<User>, UserRepositoryError> {
        let mut users: Vec<User> = self
            .lock()
            .users
            .values()
            .filter(|user| user.role() == role)
            .cloned()
            .collect();
        users.sort_by(|a, b| {
            a.name()
                .as_ref()
                .cmp(b.name().as_ref())
                .then_with(|| a.id().cmp(&b.id()))
        });
        Ok(users)
    }
}

#[async_trait]
impl ClassRepository for InMemoryStore {
    async fn insert(&self, class: &Class) -> Result<(), ClassRepositoryError> {
        let mut state = self.lock();
        if state.classes.contains_key(&class.id()) {
            return Err(ClassRepositoryError::query(format!(
                "class {} already exists",
                class.id()
            )));
        }
        state.classes.insert(class.id(), class.clone());
        Ok(())
    }

    async fn save(&self, class: &Class) -> Result<(), ClassRepositoryError> {
        let mut state = self.lock();
        match state.classes.get_mut(&class.id()) {
            Some(stored) => {
                *stored = class.clone();
                Ok(())
            }
            None => Err(ClassRepositoryError::query(format!(
                "class {} no longer exists",
                class.id()
            ))),
        }
    }

    async fn find_by_id(&self, id: &ClassId) -> Result<Option<Class>, ClassRepositoryError> {
        Ok(self.lock().classes.get(id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Class>, ClassRepositoryError> {
        Ok(self.lock().classes_newest_first(|_| true))
    }

    async fn list_taught_by(&self, teacher: &UserId) -> Result<Vec<Class>, ClassRepositoryError> {
        Ok(self
            .lock()
            .classes_newest_first(|class| class.is_owned_by(teacher)))
    }

    async fn list_enrolling(&self, student: &UserId) -> Result<Vec<Class>, ClassRepositoryError> {
        Ok(self
            .lock()
            .classes_newest_first(|class| class.is_enrolled(student)))
    }

    async fn delete_with_attendance(&self, id: &ClassId) -> Result<u64, ClassRepositoryError> {
        let mut state = self.lock();
        let doomed: Vec<AttendanceId> = state
            .attendance
            .values()
            .filter(|record| record.class_id() == *id)
            .map(AttendanceRecord::id)
            .collect();
        for record_id in &doomed {
            if let Some(record) = state.attendance.remove(record_id) {
                state.day_index.remove(&day_key(&record));
            }
        }
        state.classes.remove(id);
        Ok(doomed.len() as u64)
    }
}

#[async_trait]
impl AttendanceRepository for InMemoryStore {
    async fn find_for_day(
        &self,
        student: &UserId,
        class: &ClassId,
        day: AttendanceDay,
    ) -> Result<Option<AttendanceRecord>, AttendanceRepositoryError> {
        let state = self.lock();
        Ok(state
            .day_index
            .get(&(*student, *class, day))
            .and_then(|id| state.attendance.get(id))
            .cloned())
    }

    async fn insert(&self, record: &AttendanceRecord) -> Result<(), AttendanceRepositoryError> {
        let mut state = self.lock();
        let key = day_key(record);
        if state.day_index.contains_key(&key) {
            return Err(AttendanceRepositoryError::duplicate_day());
        }
        state.day_index.insert(key, record.id());
        state.attendance.insert(record.id(), record.clone());
        Ok(())
    }

    async fn update(&self, record: &AttendanceRecord) -> Result<(), AttendanceRepositoryError> {
        let mut state = self.lock();
        match state.attendance.get_mut(&record.id()) {
            Some(stored) => {
                *stored = record.clone();
                Ok(())
            }
            None => Err(AttendanceRepositoryError::query(format!(
                "attendance {} no longer exists",
                record.id()
            ))),
        }
    }

    async fn find_by_id(
        &self,
        id: &AttendanceId,
    ) -> Result<Option<AttendanceRecord>, AttendanceRepositoryError> {
        Ok(self.lock().attendance.get(id).cloned())
    }

    async fn list(
        &self,
        filter: &AttendanceFilter,
    ) -> Result<Vec<AttendanceRecord>, AttendanceRepositoryError> {
        let mut records: Vec<AttendanceRecord> = self
            .lock()
            .attendance
            .values()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect();
        sort_newest_first(&mut records);
        Ok(records)
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
