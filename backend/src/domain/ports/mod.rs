//! Domain ports for the hexagonal boundary.
//!
//! Driving ports (`*Command`, `*Query`) are implemented by domain services
//! and consumed by inbound adapters. Driven ports (`*Repository`,
//! [`TokenVerifier`]) are implemented by outbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod attendance_command;
mod attendance_query;
mod attendance_repository;
mod class_repository;
mod class_roster_command;
mod class_roster_query;
mod token_verifier;
mod user_repository;
mod users_query;

#[cfg(test)]
pub use attendance_command::MockAttendanceCommand;
pub use attendance_command::{AttendanceCommand, MarkAttendanceRequest, UpdateAttendanceRequest};
#[cfg(test)]
pub use attendance_query::MockAttendanceQuery;
pub use attendance_query::{AttendanceQuery, ListAttendanceRequest};
#[cfg(test)]
pub use attendance_repository::MockAttendanceRepository;
pub use attendance_repository::{AttendanceRepository, AttendanceRepositoryError};
#[cfg(test)]
pub use class_repository::MockClassRepository;
pub use class_repository::{ClassRepository, ClassRepositoryError};
#[cfg(test)]
pub use class_roster_command::MockClassRosterCommand;
pub use class_roster_command::{
    AddStudentsRequest, ClassRosterCommand, CreateClassRequest, DeleteClassRequest,
    DeleteClassResponse, RemoveStudentRequest, UpdateClassRequest,
};
#[cfg(test)]
pub use class_roster_query::MockClassRosterQuery;
pub use class_roster_query::{ClassRosterQuery, GetClassRequest, ListClassesRequest};
#[cfg(test)]
pub use token_verifier::MockTokenVerifier;
pub use token_verifier::{TokenVerificationError, TokenVerifier};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserRepository, UserRepositoryError};
#[cfg(test)]
pub use users_query::MockUsersQuery;
pub use users_query::UsersQuery;
