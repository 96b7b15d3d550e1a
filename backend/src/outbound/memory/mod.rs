//! Process-local storage adapter.
//!
//! [`InMemoryStore`] implements every repository port against shared maps
//! guarded by one mutex. It backs the server when no database is configured
//! and gives handler and workflow tests a real store to exercise.

mod store;

pub use store::InMemoryStore;
