//! Handler tests for the attendance endpoints.

use actix_web::http::StatusCode;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{App, test, web};
use rstest::{fixture, rstest};
use serde_json::{Value, json};

use crate::domain::service_test_support::user;
use crate::domain::{Role, User, UserId};
use crate::inbound::http::configure;
use crate::inbound::http::test_utils::{TestApp, bearer_for};

struct School {
    harness: TestApp,
    teacher: User,
    other_teacher: User,
    alice: User,
    bob: User,
}

#[fixture]
fn school() -> School {
    let teacher = user(UserId::random(), "Tess Teacher", Role::Teacher);
    let other_teacher = user(UserId::random(), "Otto Teacher", Role::Teacher);
    let alice = user(UserId::random(), "Alice", Role::Student);
    let bob = user(UserId::random(), "Bob", Role::Student);
    let harness = TestApp::with_users([
        teacher.clone(),
        other_teacher.clone(),
        alice.clone(),
        bob.clone(),
    ]);
    School {
        harness,
        teacher,
        other_teacher,
        alice,
        bob,
    }
}

macro_rules! app {
    ($school:expr) => {
        test::init_service(
            App::new()
                .app_data($school.harness.state())
                .service(web::scope("/api/v1").configure(configure)),
        )
        .await
    };
}

async fn send(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
    req: test::TestRequest,
    caller: &User,
) -> (StatusCode, Value) {
    let res = test::call_service(
        app,
        req.insert_header((AUTHORIZATION, bearer_for(caller)))
            .to_request(),
    )
    .await;
    let status = res.status();
    let body = test::read_body(res).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("json body")
    };
    (status, value)
}

/// Create a class owned by `school.teacher` with Alice and Bob enrolled.
async fn seeded_class(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
    school: &School,
) -> String {
    let (_, class) = send(
        app,
        test::TestRequest::post()
            .uri("/api/v1/classes")
            .set_json(json!({"name": "Math101"})),
        &school.teacher,
    )
    .await;
    let class_id = class["id"].as_str().expect("class id").to_owned();
    send(
        app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/classes/{class_id}/students"))
            .set_json(json!({"studentIds": [
                school.alice.id().to_string(),
                school.bob.id().to_string(),
            ]})),
        &school.teacher,
    )
    .await;
    class_id
}

fn mark(student: &User, class_id: &str, status: &str, date: Option<&str>) -> test::TestRequest {
    let mut body = json!({
        "student": student.id().to_string(),
        "class": class_id,
        "status": status,
    });
    if let Some(date) = date {
        body["date"] = json!(date);
    }
    test::TestRequest::post()
        .uri("/api/v1/attendance")
        .set_json(body)
}

#[rstest]
#[actix_web::test]
async fn marking_twice_on_one_day_overwrites(school: School) {
    let app = app!(school);
    let class_id = seeded_class(&app, &school).await;

    let (first_status, first) = send(
        &app,
        mark(&school.alice, &class_id, "present", Some("2024-03-04")),
        &school.teacher,
    )
    .await;
    let (second_status, second) = send(
        &app,
        mark(&school.alice, &class_id, "late", Some("2024-03-04T15:45:00Z")),
        &school.other_teacher,
    )
    .await;

    assert_eq!(first_status, StatusCode::CREATED);
    assert_eq!(second_status, StatusCode::CREATED);
    assert_eq!(first["id"], second["id"]);
    assert_eq!(second["status"], "late");
    assert_eq!(second["date"], "2024-03-04");
    assert_eq!(
        second["markedBy"],
        json!({"id": school.other_teacher.id().to_string(), "name": "Otto Teacher"})
    );
    assert_eq!(school.harness.store().attendance_count(), 1);
}

#[rstest]
#[actix_web::test]
async fn marking_without_a_date_uses_today(school: School) {
    let app = app!(school);
    let class_id = seeded_class(&app, &school).await;

    let (status, body) = send(
        &app,
        mark(&school.bob, &class_id, "absent", None),
        &school.teacher,
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["date"], "2024-03-01");
    assert_eq!(
        body["student"],
        json!({"id": school.bob.id().to_string(), "name": "Bob", "email": "bob@school.test"})
    );
}

#[rstest]
#[actix_web::test]
async fn marking_requires_an_enrolled_student_and_existing_class(school: School) {
    let app = app!(school);
    let class_id = seeded_class(&app, &school).await;
    let stranger = user(UserId::random(), "Stranger", Role::Student);

    let (not_enrolled, body) = send(
        &app,
        mark(&stranger, &class_id, "present", None),
        &school.teacher,
    )
    .await;
    let (missing, _) = send(
        &app,
        mark(&school.alice, &UserId::random().to_string(), "present", None),
        &school.teacher,
    )
    .await;

    assert_eq!(not_enrolled, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["code"], "student_not_enrolled");
    assert_eq!(missing, StatusCode::NOT_FOUND);
}

#[rstest]
#[case(json!({"class": "x", "status": "present"}), "student", "missing_field")]
#[case(json!({"student": "x", "class": "x", "status": "present"}), "student", "invalid_uuid")]
#[case(
    json!({
        "student": "3fa85f64-5717-4562-b3fc-2c963f66afa6",
        "class": "3fa85f64-5717-4562-b3fc-2c963f66afa6",
        "status": "excused",
    }),
    "status",
    "invalid_status"
)]
#[case(
    json!({
        "student": "3fa85f64-5717-4562-b3fc-2c963f66afa6",
        "class": "3fa85f64-5717-4562-b3fc-2c963f66afa6",
        "status": "present",
        "date": "yesterday",
    }),
    "date",
    "invalid_date"
)]
#[actix_web::test]
async fn malformed_marks_are_rejected(
    school: School,
    #[case] payload: Value,
    #[case] field: &str,
    #[case] code: &str,
) {
    let app = app!(school);

    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/attendance")
            .set_json(payload),
        &school.teacher,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], field);
    assert_eq!(body["details"]["code"], code);
}

#[rstest]
#[actix_web::test]
async fn students_cannot_mark(school: School) {
    let app = app!(school);
    let class_id = seeded_class(&app, &school).await;

    let (status, _) = send(
        &app,
        mark(&school.alice, &class_id, "present", None),
        &school.alice,
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(school.harness.store().attendance_count(), 0);
}

#[rstest]
#[actix_web::test]
async fn students_only_see_their_own_records(school: School) {
    let app = app!(school);
    let class_id = seeded_class(&app, &school).await;
    for (student, date) in [
        (&school.alice, "2024-03-04"),
        (&school.bob, "2024-03-04"),
        (&school.alice, "2024-03-05"),
    ] {
        send(
            &app,
            mark(student, &class_id, "present", Some(date)),
            &school.teacher,
        )
        .await;
    }
    let bob_filter = format!("/api/v1/attendance?student={}", school.bob.id());

    let (status, as_alice) =
        send(&app, test::TestRequest::get().uri(&bob_filter), &school.alice).await;
    let (_, as_teacher) =
        send(&app, test::TestRequest::get().uri(&bob_filter), &school.teacher).await;

    assert_eq!(status, StatusCode::OK);
    let alice_id = json!(school.alice.id().to_string());
    let rows = as_alice.as_array().expect("array");
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|row| row["studentId"] == alice_id));
    assert_eq!(rows[0]["date"], "2024-03-05");
    assert_eq!(rows[1]["date"], "2024-03-04");
    assert_eq!(as_teacher.as_array().map(Vec::len), Some(1));
}

#[rstest]
#[actix_web::test]
async fn date_filters_are_inclusive(school: School) {
    let app = app!(school);
    let class_id = seeded_class(&app, &school).await;
    for date in ["2024-03-03", "2024-03-04", "2024-03-05", "2024-03-06"] {
        send(
            &app,
            mark(&school.alice, &class_id, "present", Some(date)),
            &school.teacher,
        )
        .await;
    }

    let (_, body) = send(
        &app,
        test::TestRequest::get().uri(&format!(
            "/api/v1/attendance?startDate=2024-03-04&endDate=2024-03-05&class={class_id}"
        )),
        &school.teacher,
    )
    .await;
    let (inverted, err) = send(
        &app,
        test::TestRequest::get().uri("/api/v1/attendance?startDate=2024-03-06&endDate=2024-03-01"),
        &school.teacher,
    )
    .await;

    let dates: Vec<&str> = body
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|row| row["date"].as_str())
        .collect();
    assert_eq!(dates, vec!["2024-03-05", "2024-03-04"]);
    assert_eq!(inverted, StatusCode::BAD_REQUEST);
    assert_eq!(err["details"]["code"], "inverted_range");
}

#[rstest]
#[actix_web::test]
async fn amending_keeps_the_marker_and_note_when_omitted(school: School) {
    let app = app!(school);
    let class_id = seeded_class(&app, &school).await;
    let (_, created) = send(
        &app,
        test::TestRequest::post().uri("/api/v1/attendance").set_json(json!({
            "student": school.alice.id().to_string(),
            "class": class_id,
            "status": "absent",
            "notes": "dentist",
        })),
        &school.teacher,
    )
    .await;
    let uri = format!(
        "/api/v1/attendance/{}",
        created["id"].as_str().expect("record id")
    );

    let (status, amended) = send(
        &app,
        test::TestRequest::put()
            .uri(&uri)
            .set_json(json!({"status": "late"})),
        &school.other_teacher,
    )
    .await;
    let (missing, _) = send(
        &app,
        test::TestRequest::put()
            .uri(&format!("/api/v1/attendance/{}", UserId::random()))
            .set_json(json!({"status": "late"})),
        &school.teacher,
    )
    .await;
    let (denied, _) = send(
        &app,
        test::TestRequest::put()
            .uri(&uri)
            .set_json(json!({"status": "present"})),
        &school.alice,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(amended["status"], "late");
    assert_eq!(amended["notes"], "dentist");
    assert_eq!(amended["markedById"], json!(school.teacher.id().to_string()));
    assert_eq!(missing, StatusCode::NOT_FOUND);
    assert_eq!(denied, StatusCode::FORBIDDEN);
}

#[rstest]
#[actix_web::test]
async fn amending_with_blank_notes_clears_the_note(school: School) {
    let app = app!(school);
    let class_id = seeded_class(&app, &school).await;
    let (_, created) = send(
        &app,
        test::TestRequest::post().uri("/api/v1/attendance").set_json(json!({
            "student": school.alice.id().to_string(),
            "class": class_id,
            "status": "late",
            "notes": "bus delay",
        })),
        &school.teacher,
    )
    .await;
    let uri = format!(
        "/api/v1/attendance/{}",
        created["id"].as_str().expect("record id")
    );

    let (status, amended) = send(
        &app,
        test::TestRequest::put()
            .uri(&uri)
            .set_json(json!({"status": "present", "notes": ""})),
        &school.teacher,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(amended["status"], "present");
    assert!(amended.get("notes").is_none());
}

#[rstest]
#[actix_web::test]
async fn deleting_a_class_removes_its_attendance(school: School) {
    let app = app!(school);
    let class_id = seeded_class(&app, &school).await;
    send(
        &app,
        mark(&school.alice, &class_id, "present", None),
        &school.teacher,
    )
    .await;

    let (deleted, _) = send(
        &app,
        test::TestRequest::delete().uri(&format!("/api/v1/classes/{class_id}")),
        &school.teacher,
    )
    .await;
    let (_, remaining) = send(
        &app,
        test::TestRequest::get().uri(&format!("/api/v1/attendance?class={class_id}")),
        &school.teacher,
    )
    .await;

    assert_eq!(deleted, StatusCode::OK);
    assert_eq!(remaining, json!([]));
    assert_eq!(school.harness.store().attendance_count(), 0);
}
