//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every REST endpoint under `/api/v1`, the health
//! probes, the response schemas, and the bearer token security scheme. The
//! document backs Swagger UI in debug builds and is exported by
//! `cargo run --bin openapi-dump` for external tooling.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{AttendanceStatus, Error, ErrorCode, Role};
use crate::inbound::http::attendance::{MarkAttendanceBody, UpdateAttendanceBody};
use crate::inbound::http::classes::{AddStudentsBody, CreateClassBody, UpdateClassBody};
use crate::inbound::http::schemas::{
    AttendanceResponse, ClassResponse, MarkerSummary, MessageResponse, StudentSummary,
    UserResponse,
};

/// Name of the security scheme attached to every API operation.
pub const BEARER_SCHEME: &str = "BearerToken";

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            BEARER_SCHEME,
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some(
                        "HS256 token carrying `userId`, `role`, and `exp` claims.",
                    ))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Rollcall API",
        description = "Class rosters and daily attendance for admins, teachers, and students."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerToken" = [])),
    paths(
        crate::inbound::http::users::current_user,
        crate::inbound::http::users::list_students,
        crate::inbound::http::classes::create_class,
        crate::inbound::http::classes::list_classes,
        crate::inbound::http::classes::get_class,
        crate::inbound::http::classes::update_class,
        crate::inbound::http::classes::add_students,
        crate::inbound::http::classes::remove_student,
        crate::inbound::http::classes::delete_class,
        crate::inbound::http::attendance::mark_attendance,
        crate::inbound::http::attendance::list_attendance,
        crate::inbound::http::attendance::update_attendance,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        Role,
        AttendanceStatus,
        UserResponse,
        ClassResponse,
        StudentSummary,
        MarkerSummary,
        AttendanceResponse,
        MessageResponse,
        CreateClassBody,
        UpdateClassBody,
        AddStudentsBody,
        MarkAttendanceBody,
        UpdateAttendanceBody,
    )),
    tags(
        (name = "users", description = "The caller and the student directory"),
        (name = "classes", description = "Class roster management"),
        (name = "attendance", description = "Daily attendance ledger"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
