//! Driving port for user directory reads.

use async_trait::async_trait;

use crate::domain::{Actor, Error, User};

/// Driving port for reading users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersQuery: Send + Sync {
    /// The user record behind the authenticated actor.
    async fn current_user(&self, actor: Actor) -> Result<User, Error>;

    /// All students, ordered by name.
    async fn list_students(&self, actor: Actor) -> Result<Vec<User>, Error>;
}
