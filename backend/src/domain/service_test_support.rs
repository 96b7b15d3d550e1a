//! Shared fixtures for domain service tests.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use crate::domain::{Actor, Class, ClassId, ClassName, EmailAddress, Role, User, UserId, UserName};

pub(crate) fn fixture_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 15, 0)
        .single()
        .expect("valid fixture timestamp")
}

pub(crate) struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

pub(crate) fn fixture_clock() -> Arc<dyn Clock> {
    Arc::new(FixtureClock {
        utc_now: fixture_now(),
    })
}

pub(crate) fn actor(role: Role) -> Actor {
    Actor::new(UserId::random(), role)
}

pub(crate) fn user(id: UserId, name: &str, role: Role) -> User {
    let email = format!("{}@school.test", name.to_lowercase().replace(' ', "."));
    User::new(
        id,
        UserName::new(name).expect("valid name"),
        EmailAddress::new(email).expect("valid email"),
        role,
    )
}

pub(crate) fn class_owned_by(teacher: UserId, students: &[UserId]) -> Class {
    let mut class = Class::create(
        ClassId::random(),
        ClassName::new("Math101").expect("valid name"),
        None,
        teacher,
        fixture_now(),
    );
    if !students.is_empty() {
        class
            .enroll(students, fixture_now())
            .expect("enrol fixture students");
    }
    class
}
