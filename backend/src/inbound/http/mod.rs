//! HTTP inbound adapter exposing REST endpoints.

pub mod attendance;
pub mod auth;
pub mod classes;
pub mod error;
pub mod health;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

use actix_web::web;

pub use error::ApiResult;

/// Register every `/api/v1` endpoint on `cfg`.
///
/// Malformed JSON bodies are reported through the shared error envelope
/// rather than actix's plain-text default.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        actix_web::Error::from(validation::invalid_body_error(err))
    }))
    .service(users::current_user)
    .service(users::list_students)
    .service(classes::create_class)
    .service(classes::list_classes)
    .service(classes::get_class)
    .service(classes::update_class)
    .service(classes::add_students)
    .service(classes::remove_student)
    .service(classes::delete_class)
    .service(attendance::mark_attendance)
    .service(attendance::list_attendance)
    .service(attendance::update_attendance);
}
