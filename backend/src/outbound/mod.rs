//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//! - **memory**: process-local store implementing the same repository ports
//! - **auth**: HS256 bearer-token verifier
//!
//! Adapters are thin translators between domain types and infrastructure
//! representations. They contain no business logic.

pub mod auth;
pub mod memory;
pub mod persistence;
