//! Class roster domain service.
//!
//! Implements the roster driving ports: class lifecycle, enrolment, and the
//! per-role class listings. Every entry point consults the access policy
//! before touching storage.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{
    AddStudentsRequest, ClassRepository, ClassRepositoryError, ClassRosterCommand,
    ClassRosterQuery, CreateClassRequest, DeleteClassRequest, DeleteClassResponse,
    GetClassRequest, ListClassesRequest, RemoveStudentRequest, UpdateClassRequest,
    UserRepository, UserRepositoryError,
};
use crate::domain::{
    Action, Class, ClassDescription, ClassId, ClassName, ClassValidationError, Error, Resource,
    Role, UserId,
};

fn map_class_repository_error(error: ClassRepositoryError) -> Error {
    match error {
        ClassRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("class repository unavailable: {message}"))
        }
        ClassRepositoryError::Query { message } => {
            Error::internal(format!("class repository error: {message}"))
        }
    }
}

fn map_user_repository_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        other => Error::internal(format!("user repository error: {other}")),
    }
}

fn invalid_class_field(field: &str, error: ClassValidationError) -> Error {
    let code = match error {
        ClassValidationError::EmptyName => "empty_name",
        ClassValidationError::NameTooLong { .. } => "name_too_long",
        ClassValidationError::DescriptionTooLong { .. } => "description_too_long",
        ClassValidationError::NothingToEnrol => "already_enrolled",
    };
    Error::invalid_field(field, code, error.to_string())
}

fn parse_description(raw: Option<String>) -> Result<Option<ClassDescription>, Error> {
    raw.map(ClassDescription::parse)
        .transpose()
        .map(Option::flatten)
        .map_err(|err| invalid_class_field("description", err))
}

/// Roster service implementing [`ClassRosterCommand`] and
/// [`ClassRosterQuery`].
#[derive(Clone)]
pub struct ClassRosterService<C, U> {
    classes: Arc<C>,
    users: Arc<U>,
    clock: Arc<dyn Clock>,
}

impl<C, U> ClassRosterService<C, U> {
    /// Create a roster service over class and user repositories.
    pub fn new(classes: Arc<C>, users: Arc<U>, clock: Arc<dyn Clock>) -> Self {
        Self {
            classes,
            users,
            clock,
        }
    }
}

impl<C, U> ClassRosterService<C, U>
where
    C: ClassRepository,
    U: UserRepository,
{
    async fn load_class(&self, class_id: &ClassId) -> Result<Class, Error> {
        self.classes
            .find_by_id(class_id)
            .await
            .map_err(map_class_repository_error)?
            .ok_or_else(|| Error::not_found(format!("class {class_id} not found")))
    }

    /// Reject ids that do not belong to provisioned students.
    async fn ensure_students(&self, ids: &[UserId]) -> Result<(), Error> {
        let known: HashSet<UserId> = self
            .users
            .find_by_ids(ids)
            .await
            .map_err(map_user_repository_error)?
            .into_iter()
            .filter(|user| user.role() == Role::Student)
            .map(|user| user.id())
            .collect();
        let unknown: Vec<String> = ids
            .iter()
            .filter(|id| !known.contains(id))
            .map(ToString::to_string)
            .collect();
        if unknown.is_empty() {
            return Ok(());
        }
        Err(Error::invalid_field(
            "studentIds",
            "unknown_student",
            "studentIds must reference existing students",
        )
        .with_detail("value", unknown))
    }

    async fn save(&self, class: &Class) -> Result<(), Error> {
        self.classes
            .save(class)
            .await
            .map_err(map_class_repository_error)
    }
}

#[async_trait]
impl<C, U> ClassRosterCommand for ClassRosterService<C, U>
where
    C: ClassRepository,
    U: UserRepository,
{
    async fn create_class(&self, request: CreateClassRequest) -> Result<Class, Error> {
        let CreateClassRequest {
            actor,
            name,
            description,
        } = request;
        actor.authorize(Action::CreateClass, Resource::None)?;

        let name = ClassName::new(name).map_err(|err| invalid_class_field("name", err))?;
        let description = parse_description(description)?;
        let class = Class::create(
            ClassId::random(),
            name,
            description,
            actor.id,
            self.clock.utc(),
        );

        self.classes
            .insert(&class)
            .await
            .map_err(map_class_repository_error)?;
        info!(class_id = %class.id(), teacher_id = %actor.id, "class created");
        Ok(class)
    }

    async fn update_class(&self, request: UpdateClassRequest) -> Result<Class, Error> {
        let UpdateClassRequest {
            actor,
            class_id,
            name,
            description,
        } = request;
        let mut class = self.load_class(&class_id).await?;
        actor.authorize(Action::ModifyClass, Resource::Class(&class))?;

        if name.is_none() && description.is_none() {
            return Err(Error::invalid_request(
                "provide at least one of name or description",
            ));
        }
        let now = self.clock.utc();
        if let Some(raw) = name {
            let name = ClassName::new(raw).map_err(|err| invalid_class_field("name", err))?;
            class.rename(name, now);
        }
        if description.is_some() {
            class.set_description(parse_description(description)?, now);
        }

        self.save(&class).await?;
        Ok(class)
    }

    async fn add_students(&self, request: AddStudentsRequest) -> Result<Class, Error> {
        let AddStudentsRequest {
            actor,
            class_id,
            student_ids,
        } = request;
        let mut class = self.load_class(&class_id).await?;
        actor.authorize(Action::ModifyClass, Resource::Class(&class))?;

        let pending = class.pending_enrolments(&student_ids);
        if pending.is_empty() {
            return Err(invalid_class_field(
                "studentIds",
                ClassValidationError::NothingToEnrol,
            ));
        }
        self.ensure_students(&pending).await?;
        let added = class
            .enroll(&pending, self.clock.utc())
            .map_err(|err| invalid_class_field("studentIds", err))?;

        self.save(&class).await?;
        info!(class_id = %class_id, added = added.len(), "students enrolled");
        Ok(class)
    }

    async fn remove_student(&self, request: RemoveStudentRequest) -> Result<Class, Error> {
        let RemoveStudentRequest {
            actor,
            class_id,
            student_id,
        } = request;
        let mut class = self.load_class(&class_id).await?;
        actor.authorize(Action::ModifyClass, Resource::Class(&class))?;

        if class.withdraw(&student_id, self.clock.utc()) {
            self.save(&class).await?;
            info!(class_id = %class_id, student_id = %student_id, "student withdrawn");
        }
        Ok(class)
    }

    async fn delete_class(
        &self,
        request: DeleteClassRequest,
    ) -> Result<DeleteClassResponse, Error> {
        let DeleteClassRequest { actor, class_id } = request;
        let class = self.load_class(&class_id).await?;
        actor.authorize(Action::DeleteClass, Resource::Class(&class))?;

        let attendance_removed = self
            .classes
            .delete_with_attendance(&class_id)
            .await
            .map_err(map_class_repository_error)?;
        info!(class_id = %class_id, attendance_removed, "class deleted");
        Ok(DeleteClassResponse {
            class_id,
            attendance_removed,
        })
    }
}

#[async_trait]
impl<C, U> ClassRosterQuery for ClassRosterService<C, U>
where
    C: ClassRepository,
    U: UserRepository,
{
    async fn list_classes(&self, request: ListClassesRequest) -> Result<Vec<Class>, Error> {
        let actor = request.actor;
        actor.authorize(Action::ListClasses, Resource::None)?;

        let classes = match actor.role {
            Role::Admin => self.classes.list_all().await,
            Role::Teacher => self.classes.list_taught_by(&actor.id).await,
            Role::Student => self.classes.list_enrolling(&actor.id).await,
        };
        classes.map_err(map_class_repository_error)
    }

    async fn get_class(&self, request: GetClassRequest) -> Result<Class, Error> {
        let class = self.load_class(&request.class_id).await?;
        request
            .actor
            .authorize(Action::ViewClass, Resource::Class(&class))?;
        Ok(class)
    }
}

#[cfg(test)]
#[path = "class_roster_service_tests.rs"]
mod tests;
