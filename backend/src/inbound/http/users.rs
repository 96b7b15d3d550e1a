//! Users API handlers.
//!
//! ```text
//! GET /api/v1/users/me        The authenticated caller's profile
//! GET /api/v1/users/students  Student directory for staff
//! ```

use actix_web::{get, web};

use crate::domain::Error;
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::schemas::UserResponse;
use crate::inbound::http::state::HttpState;

/// Return the user behind the presented token.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "User not provisioned", body = Error),
        (status = 503, description = "Service unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/users/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    caller: Authenticated,
) -> ApiResult<web::Json<UserResponse>> {
    let user = state.users.current_user(caller.actor()).await?;
    Ok(web::Json(UserResponse::from(user)))
}

/// List every student, ordered by name. Teachers pick enrolments from here.
#[utoipa::path(
    get,
    path = "/api/v1/users/students",
    responses(
        (status = 200, description = "Students", body = [UserResponse]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 503, description = "Service unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "listStudents"
)]
#[get("/users/students")]
pub async fn list_students(
    state: web::Data<HttpState>,
    caller: Authenticated,
) -> ApiResult<web::Json<Vec<UserResponse>>> {
    let students = state.users.list_students(caller.actor()).await?;
    Ok(web::Json(
        students.into_iter().map(UserResponse::from).collect(),
    ))
}
