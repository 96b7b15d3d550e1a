//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the domain repository ports backed by
//! PostgreSQL via `diesel-async` and a `bb8` connection pool.
//!
//! Row structs (`models.rs`) and table definitions (`schema.rs`) stay
//! private to this module; adapters translate rows into validated domain
//! types and map database failures onto each port's error enum.
//!
//! # Example
//!
//! ```ignore
//! use rollcall::outbound::persistence::{DbPool, DieselClassRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/rollcall")).await?;
//! let classes = DieselClassRepository::new(pool);
//! ```

mod diesel_attendance_repository;
mod diesel_class_repository;
mod diesel_error_mapping;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_attendance_repository::DieselAttendanceRepository;
pub use diesel_class_repository::DieselClassRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
