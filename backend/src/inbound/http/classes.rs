//! Class roster API handlers.
//!
//! ```text
//! POST   /api/v1/classes                              Create a class
//! GET    /api/v1/classes                              List classes visible to the caller
//! GET    /api/v1/classes/{class_id}                   Read one class
//! PUT    /api/v1/classes/{class_id}                   Rename or re-describe a class
//! POST   /api/v1/classes/{class_id}/students          Enrol students
//! DELETE /api/v1/classes/{class_id}/students/{id}     Withdraw a student
//! DELETE /api/v1/classes/{class_id}                   Delete a class and its attendance
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{
    AddStudentsRequest, CreateClassRequest, DeleteClassRequest, GetClassRequest,
    ListClassesRequest, RemoveStudentRequest, UpdateClassRequest,
};
use crate::domain::{ClassId, Error, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::schemas::{ClassResponse, MessageResponse};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_uuid, parse_uuid_list, require};

const CLASS_ID: FieldName = FieldName::new("classId");
const STUDENT_ID: FieldName = FieldName::new("studentId");
const STUDENT_IDS: FieldName = FieldName::new("studentIds");

/// Request body for `POST /api/v1/classes`.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateClassBody {
    #[schema(example = "Math101")]
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Request body for `PUT /api/v1/classes/{class_id}`.
///
/// At least one field is required; a blank description clears it.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClassBody {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Request body for `POST /api/v1/classes/{class_id}/students`.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddStudentsBody {
    pub student_ids: Option<Vec<String>>,
}

fn class_id(raw: &str) -> Result<ClassId, Error> {
    parse_uuid(raw, CLASS_ID).map(ClassId::from_uuid)
}

/// Create a class owned by the caller.
#[utoipa::path(
    post,
    path = "/api/v1/classes",
    request_body = CreateClassBody,
    responses(
        (status = 201, description = "Class created", body = ClassResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 503, description = "Service unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["classes"],
    operation_id = "createClass"
)]
#[post("/classes")]
pub async fn create_class(
    state: web::Data<HttpState>,
    caller: Authenticated,
    payload: web::Json<CreateClassBody>,
) -> ApiResult<HttpResponse> {
    let CreateClassBody { name, description } = payload.into_inner();
    let request = CreateClassRequest {
        actor: caller.actor(),
        name: require(name, FieldName::new("name"))?,
        description,
    };
    let class = state.classes.create_class(request).await?;
    Ok(HttpResponse::Created().json(ClassResponse::from(class)))
}

/// List the classes visible to the caller, newest first.
///
/// Admins see every class, teachers the classes they own, and students the
/// classes they are enrolled in.
#[utoipa::path(
    get,
    path = "/api/v1/classes",
    responses(
        (status = 200, description = "Classes", body = [ClassResponse]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 503, description = "Service unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["classes"],
    operation_id = "listClasses"
)]
#[get("/classes")]
pub async fn list_classes(
    state: web::Data<HttpState>,
    caller: Authenticated,
) -> ApiResult<web::Json<Vec<ClassResponse>>> {
    let classes = state
        .classes_query
        .list_classes(ListClassesRequest {
            actor: caller.actor(),
        })
        .await?;
    Ok(web::Json(classes.into_iter().map(ClassResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/classes/{class_id}",
    params(("class_id" = String, Path, description = "Class identifier")),
    responses(
        (status = 200, description = "Class", body = ClassResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["classes"],
    operation_id = "getClass"
)]
#[get("/classes/{class_id}")]
pub async fn get_class(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
) -> ApiResult<web::Json<ClassResponse>> {
    let request = GetClassRequest {
        actor: caller.actor(),
        class_id: class_id(&path)?,
    };
    let class = state.classes_query.get_class(request).await?;
    Ok(web::Json(ClassResponse::from(class)))
}

#[utoipa::path(
    put,
    path = "/api/v1/classes/{class_id}",
    params(("class_id" = String, Path, description = "Class identifier")),
    request_body = UpdateClassBody,
    responses(
        (status = 200, description = "Updated class", body = ClassResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["classes"],
    operation_id = "updateClass"
)]
#[put("/classes/{class_id}")]
pub async fn update_class(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
    payload: web::Json<UpdateClassBody>,
) -> ApiResult<web::Json<ClassResponse>> {
    let UpdateClassBody { name, description } = payload.into_inner();
    let request = UpdateClassRequest {
        actor: caller.actor(),
        class_id: class_id(&path)?,
        name,
        description,
    };
    let class = state.classes.update_class(request).await?;
    Ok(web::Json(ClassResponse::from(class)))
}

/// Enrol students, skipping those already enrolled.
///
/// Fails when every listed student is already enrolled or when an id does
/// not name a provisioned student.
#[utoipa::path(
    post,
    path = "/api/v1/classes/{class_id}/students",
    params(("class_id" = String, Path, description = "Class identifier")),
    request_body = AddStudentsBody,
    responses(
        (status = 200, description = "Updated class", body = ClassResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["classes"],
    operation_id = "addStudents"
)]
#[post("/classes/{class_id}/students")]
pub async fn add_students(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
    payload: web::Json<AddStudentsBody>,
) -> ApiResult<web::Json<ClassResponse>> {
    let raw_ids = require(payload.into_inner().student_ids, STUDENT_IDS)?;
    let student_ids = parse_uuid_list(&raw_ids, STUDENT_IDS)?
        .into_iter()
        .map(UserId::from_uuid)
        .collect();
    let request = AddStudentsRequest {
        actor: caller.actor(),
        class_id: class_id(&path)?,
        student_ids,
    };
    let class = state.classes.add_students(request).await?;
    Ok(web::Json(ClassResponse::from(class)))
}

/// Withdraw one student. Withdrawing a student who is not enrolled is a
/// no-op that still returns the class.
#[utoipa::path(
    delete,
    path = "/api/v1/classes/{class_id}/students/{student_id}",
    params(
        ("class_id" = String, Path, description = "Class identifier"),
        ("student_id" = String, Path, description = "Student identifier")
    ),
    responses(
        (status = 200, description = "Updated class", body = ClassResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["classes"],
    operation_id = "removeStudent"
)]
#[delete("/classes/{class_id}/students/{student_id}")]
pub async fn remove_student(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<(String, String)>,
) -> ApiResult<web::Json<ClassResponse>> {
    let (raw_class, raw_student) = path.into_inner();
    let request = RemoveStudentRequest {
        actor: caller.actor(),
        class_id: class_id(&raw_class)?,
        student_id: parse_uuid(&raw_student, STUDENT_ID).map(UserId::from_uuid)?,
    };
    let class = state.classes.remove_student(request).await?;
    Ok(web::Json(ClassResponse::from(class)))
}

/// Delete a class together with all of its attendance records.
#[utoipa::path(
    delete,
    path = "/api/v1/classes/{class_id}",
    params(("class_id" = String, Path, description = "Class identifier")),
    responses(
        (status = 200, description = "Class deleted", body = MessageResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 503, description = "Service unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["classes"],
    operation_id = "deleteClass"
)]
#[delete("/classes/{class_id}")]
pub async fn delete_class(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
) -> ApiResult<web::Json<MessageResponse>> {
    let request = DeleteClassRequest {
        actor: caller.actor(),
        class_id: class_id(&path)?,
    };
    state.classes.delete_class(request).await?;
    Ok(web::Json(MessageResponse {
        message: "Class deleted successfully".to_owned(),
    }))
}

#[cfg(test)]
#[path = "classes_tests.rs"]
mod tests;
