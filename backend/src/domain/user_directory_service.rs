//! User directory service backing the `users` endpoints.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::ports::{UserRepository, UserRepositoryError, UsersQuery};
use crate::domain::{Action, Actor, Error, Resource, Role, User};

fn map_repository_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        other => Error::internal(format!("user repository error: {other}")),
    }
}

/// Read-only view over provisioned users.
#[derive(Clone)]
pub struct UserDirectoryService<U> {
    users: Arc<U>,
}

impl<U> UserDirectoryService<U> {
    pub fn new(users: Arc<U>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl<U> UsersQuery for UserDirectoryService<U>
where
    U: UserRepository,
{
    async fn current_user(&self, actor: Actor) -> Result<User, Error> {
        self.users
            .find_by_id(&actor.id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found(format!("user {} not found", actor.id)))
    }

    async fn list_students(&self, actor: Actor) -> Result<Vec<User>, Error> {
        actor.authorize(Action::ViewStudentDirectory, Resource::None)?;
        self.users
            .list_by_role(Role::Student)
            .await
            .map_err(map_repository_error)
    }
}
