//! Attendance ledger API handlers.
//!
//! ```text
//! POST /api/v1/attendance                 Mark a student for a day (upsert)
//! GET  /api/v1/attendance?startDate=&endDate=&class=&student=
//! PUT  /api/v1/attendance/{record_id}     Amend status and notes
//! ```

use actix_web::{HttpResponse, get, post, put, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::{ListAttendanceRequest, MarkAttendanceRequest, UpdateAttendanceRequest};
use crate::domain::{
    AttendanceFilter, AttendanceId, AttendanceValidationError, ClassId, Error, UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::schemas::AttendanceResponse;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_optional_day, parse_optional_instant, parse_status, parse_uuid, require,
};

const STUDENT: FieldName = FieldName::new("student");
const CLASS: FieldName = FieldName::new("class");
const STATUS: FieldName = FieldName::new("status");
const DATE: FieldName = FieldName::new("date");
const START_DATE: FieldName = FieldName::new("startDate");
const END_DATE: FieldName = FieldName::new("endDate");
const RECORD_ID: FieldName = FieldName::new("recordId");

/// Request body for `POST /api/v1/attendance`.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkAttendanceBody {
    /// Student identifier.
    pub student: Option<String>,
    /// Class identifier.
    pub class: Option<String>,
    #[schema(example = "present")]
    pub status: Option<String>,
    /// `YYYY-MM-DD` or RFC 3339; defaults to now. Truncated to the UTC day.
    pub date: Option<String>,
    pub notes: Option<String>,
}

/// Request body for `PUT /api/v1/attendance/{record_id}`.
///
/// Omitting `notes` leaves the stored note unchanged. A blank value clears it.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAttendanceBody {
    pub status: Option<String>,
    pub notes: Option<String>,
}

/// Query parameters for `GET /api/v1/attendance`. All bounds are inclusive.
#[derive(Debug, Clone, Default, Deserialize, Serialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AttendanceListQuery {
    /// First day to include, `YYYY-MM-DD` or RFC 3339.
    pub start_date: Option<String>,
    /// Last day to include, `YYYY-MM-DD` or RFC 3339.
    pub end_date: Option<String>,
    /// Class identifier.
    pub class: Option<String>,
    /// Student identifier. Ignored for student callers.
    pub student: Option<String>,
}

impl AttendanceListQuery {
    fn into_filter(self) -> Result<AttendanceFilter, Error> {
        let start = parse_optional_day(self.start_date.as_deref(), START_DATE)?;
        let end = parse_optional_day(self.end_date.as_deref(), END_DATE)?;
        let class_id = self
            .class
            .as_deref()
            .map(|raw| parse_uuid(raw, CLASS).map(ClassId::from_uuid))
            .transpose()?;
        let student_id = self
            .student
            .as_deref()
            .map(|raw| parse_uuid(raw, STUDENT).map(UserId::from_uuid))
            .transpose()?;
        AttendanceFilter::new(start, end, class_id, student_id).map_err(map_filter_error)
    }
}

fn map_filter_error(err: AttendanceValidationError) -> Error {
    let message = err.to_string();
    match err {
        AttendanceValidationError::InvertedRange { start, end } => {
            Error::invalid_field("startDate", "inverted_range", message).with_detail(
                "value",
                json!({ "startDate": start.to_string(), "endDate": end.to_string() }),
            )
        }
        _ => Error::invalid_request(message),
    }
}

/// Mark attendance for a student in a class.
///
/// The first mark of a (student, class, day) creates the record; later marks
/// of the same day overwrite its status, marker, and note.
#[utoipa::path(
    post,
    path = "/api/v1/attendance",
    request_body = MarkAttendanceBody,
    responses(
        (status = 201, description = "Attendance recorded", body = AttendanceResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Class not found", body = Error),
        (status = 503, description = "Service unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["attendance"],
    operation_id = "markAttendance"
)]
#[post("/attendance")]
pub async fn mark_attendance(
    state: web::Data<HttpState>,
    caller: Authenticated,
    payload: web::Json<MarkAttendanceBody>,
) -> ApiResult<HttpResponse> {
    let MarkAttendanceBody {
        student,
        class,
        status,
        date,
        notes,
    } = payload.into_inner();
    let request = MarkAttendanceRequest {
        actor: caller.actor(),
        student_id: parse_uuid(&require(student, STUDENT)?, STUDENT).map(UserId::from_uuid)?,
        class_id: parse_uuid(&require(class, CLASS)?, CLASS).map(ClassId::from_uuid)?,
        status: parse_status(&require(status, STATUS)?, STATUS)?,
        at: parse_optional_instant(date.as_deref(), DATE)?,
        note: notes,
    };
    let entry = state.attendance.mark_attendance(request).await?;
    Ok(HttpResponse::Created().json(AttendanceResponse::from(entry)))
}

/// List attendance records, newest day first.
///
/// Students only ever see their own records, whatever `student` says.
#[utoipa::path(
    get,
    path = "/api/v1/attendance",
    params(AttendanceListQuery),
    responses(
        (status = 200, description = "Attendance records", body = [AttendanceResponse]),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 503, description = "Service unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["attendance"],
    operation_id = "listAttendance"
)]
#[get("/attendance")]
pub async fn list_attendance(
    state: web::Data<HttpState>,
    caller: Authenticated,
    query: web::Query<AttendanceListQuery>,
) -> ApiResult<web::Json<Vec<AttendanceResponse>>> {
    let request = ListAttendanceRequest {
        actor: caller.actor(),
        filter: query.into_inner().into_filter()?,
    };
    let entries = state.attendance_query.list_attendance(request).await?;
    Ok(web::Json(
        entries.into_iter().map(AttendanceResponse::from).collect(),
    ))
}

/// Amend an attendance record. Any teacher or admin may amend any record.
#[utoipa::path(
    put,
    path = "/api/v1/attendance/{record_id}",
    params(("record_id" = String, Path, description = "Attendance record identifier")),
    request_body = UpdateAttendanceBody,
    responses(
        (status = 200, description = "Updated record", body = AttendanceResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["attendance"],
    operation_id = "updateAttendance"
)]
#[put("/attendance/{record_id}")]
pub async fn update_attendance(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
    payload: web::Json<UpdateAttendanceBody>,
) -> ApiResult<web::Json<AttendanceResponse>> {
    let UpdateAttendanceBody { status, notes } = payload.into_inner();
    let request = UpdateAttendanceRequest {
        actor: caller.actor(),
        record_id: parse_uuid(&path, RECORD_ID).map(AttendanceId::from_uuid)?,
        status: parse_status(&require(status, STATUS)?, STATUS)?,
        note: notes,
    };
    let entry = state.attendance.update_attendance(request).await?;
    Ok(web::Json(AttendanceResponse::from(entry)))
}

#[cfg(test)]
#[path = "attendance_tests.rs"]
mod tests;
