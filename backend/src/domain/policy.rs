//! Access policy for roster and ledger operations.
//!
//! Every service consults [`can_perform`] before reading or mutating a class
//! or attendance record. Anything not explicitly allowed is denied.

use super::{Class, Error, Role, UserId};

/// Authenticated caller resolved once per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: UserId,
    pub role: Role,
}

impl Actor {
    pub const fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }

    /// Fail with [`Error::forbidden`] unless the policy allows `action`.
    pub fn authorize(&self, action: Action, resource: Resource<'_>) -> Result<(), Error> {
        match can_perform(self, action, resource) {
            Decision::Allow => Ok(()),
            Decision::Deny => Err(Error::forbidden(format!(
                "{} may not {}",
                self.role,
                action.describe()
            ))),
        }
    }
}

/// Operations gated by the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ListClasses,
    CreateClass,
    ViewClass,
    ModifyClass,
    DeleteClass,
    MarkAttendance,
    AmendAttendance,
    ViewAttendance,
    ViewStudentDirectory,
}

impl Action {
    fn describe(self) -> &'static str {
        match self {
            Self::ListClasses => "list classes",
            Self::CreateClass => "create classes",
            Self::ViewClass => "view this class",
            Self::ModifyClass => "modify this class",
            Self::DeleteClass => "delete this class",
            Self::MarkAttendance => "mark attendance",
            Self::AmendAttendance => "amend attendance",
            Self::ViewAttendance => "view this attendance",
            Self::ViewStudentDirectory => "view the student directory",
        }
    }
}

/// Resource an action applies to.
#[derive(Debug, Clone, Copy)]
pub enum Resource<'a> {
    /// Actions that are not scoped to a specific resource.
    None,
    Class(&'a Class),
    /// Attendance records belonging to the given student.
    AttendanceOf(&'a UserId),
}

/// Outcome of a policy evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

impl From<bool> for Decision {
    fn from(allowed: bool) -> Self {
        if allowed { Self::Allow } else { Self::Deny }
    }
}

/// Decide whether `actor` may perform `action` on `resource`.
///
/// # Examples
/// ```
/// use rollcall::domain::{Action, Actor, Decision, Resource, Role, UserId, can_perform};
///
/// let student = Actor::new(UserId::random(), Role::Student);
/// assert_eq!(
///     can_perform(&student, Action::CreateClass, Resource::None),
///     Decision::Deny
/// );
/// ```
pub fn can_perform(actor: &Actor, action: Action, resource: Resource<'_>) -> Decision {
    match actor.role {
        Role::Admin => Decision::Allow,
        Role::Teacher => teacher_may(actor, action, resource).into(),
        Role::Student => student_may(actor, action, resource).into(),
    }
}

fn teacher_may(actor: &Actor, action: Action, resource: Resource<'_>) -> bool {
    match (action, resource) {
        (
            Action::ListClasses
            | Action::CreateClass
            | Action::MarkAttendance
            | Action::AmendAttendance
            | Action::ViewStudentDirectory,
            _,
        ) => true,
        (Action::ViewClass | Action::ModifyClass | Action::DeleteClass, Resource::Class(class)) => {
            class.is_owned_by(&actor.id)
        }
        (Action::ViewAttendance, Resource::AttendanceOf(_) | Resource::None) => true,
        _ => false,
    }
}

fn student_may(actor: &Actor, action: Action, resource: Resource<'_>) -> bool {
    match (action, resource) {
        (Action::ListClasses, _) => true,
        (Action::ViewClass, Resource::Class(class)) => class.is_enrolled(&actor.id),
        (Action::ViewAttendance, Resource::AttendanceOf(student)) => *student == actor.id,
        _ => false,
    }
}
