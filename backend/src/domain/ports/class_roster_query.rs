//! Driving port for class roster reads.

use async_trait::async_trait;

use crate::domain::{Actor, Class, ClassId, Error};

/// Request to list the classes visible to an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListClassesRequest {
    pub actor: Actor,
}

/// Request to read a single class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetClassRequest {
    pub actor: Actor,
    pub class_id: ClassId,
}

/// Driving port for roster reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClassRosterQuery: Send + Sync {
    /// Admins see every class, teachers the classes they own, and students
    /// the classes they are enrolled in. Newest first.
    async fn list_classes(&self, request: ListClassesRequest) -> Result<Vec<Class>, Error>;

    async fn get_class(&self, request: GetClassRequest) -> Result<Class, Error>;
}
