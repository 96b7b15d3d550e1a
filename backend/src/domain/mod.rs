//! Domain entities, policy, ports, and services.
//!
//! Purpose: hold the roster and attendance rules independently of HTTP and
//! storage. Inbound adapters call the driving ports in [`ports`]; outbound
//! adapters implement the driven ones.
//!
//! Public surface:
//! - Identity: [`User`], [`UserId`], [`Role`].
//! - Roster: [`Class`] and its value objects.
//! - Ledger: [`AttendanceRecord`], [`AttendanceDay`], [`AttendanceFilter`].
//! - Policy: [`can_perform`], [`Actor`], [`Action`], [`Resource`].
//! - Errors: [`Error`], [`ErrorCode`].

pub mod attendance;
mod attendance_service;
pub mod class;
mod class_roster_service;
pub mod error;
pub mod policy;
pub mod ports;
#[cfg(test)]
pub(crate) mod service_test_support;
pub mod trace_id;
pub mod user;
mod user_directory_service;

pub use self::attendance::{
    ATTENDANCE_NOTE_MAX, AttendanceDay, AttendanceEntry, AttendanceFilter, AttendanceId,
    AttendanceMark, AttendanceNote, AttendanceRecord, AttendanceRecordDraft, AttendanceStatus,
    AttendanceValidationError, NoteChange, sort_newest_first,
};
pub use self::attendance_service::AttendanceService;
pub use self::class::{
    CLASS_DESCRIPTION_MAX, CLASS_NAME_MAX, Class, ClassDescription, ClassDraft, ClassId,
    ClassName, ClassValidationError,
};
pub use self::class_roster_service::ClassRosterService;
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::policy::{Action, Actor, Decision, Resource, can_perform};
pub use self::trace_id::TraceId;
pub use self::user::{
    EMAIL_MAX, EmailAddress, Role, USER_NAME_MAX, User, UserId, UserName, UserValidationError,
};
pub use self::user_directory_service::UserDirectoryService;
