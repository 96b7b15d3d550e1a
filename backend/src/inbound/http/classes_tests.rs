//! Handler tests for the class roster endpoints.

use actix_web::http::StatusCode;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{App, test, web};
use rstest::{fixture, rstest};
use serde_json::{Value, json};

use super::*;
use crate::domain::service_test_support::user;
use crate::domain::{Role, User};
use crate::inbound::http::configure;
use crate::inbound::http::test_utils::{TestApp, bearer_for};

struct School {
    harness: TestApp,
    admin: User,
    teacher: User,
    other_teacher: User,
    alice: User,
    bob: User,
}

#[fixture]
fn school() -> School {
    let admin = user(UserId::random(), "Ada Admin", Role::Admin);
    let teacher = user(UserId::random(), "Tess Teacher", Role::Teacher);
    let other_teacher = user(UserId::random(), "Otto Teacher", Role::Teacher);
    let alice = user(UserId::random(), "Alice", Role::Student);
    let bob = user(UserId::random(), "Bob", Role::Student);
    let harness = TestApp::with_users([
        admin.clone(),
        teacher.clone(),
        other_teacher.clone(),
        alice.clone(),
        bob.clone(),
    ]);
    School {
        harness,
        admin,
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

fn id_of(body: &Value) -> String {
    body["id"].as_str().expect("id field").to_owned()
}

#[rstest]
#[actix_web::test]
async fn teacher_creates_a_class(school: School) {
    let app = app!(school);

    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/classes")
            .set_json(json!({"name": "  Math101 ", "description": "Algebra"})),
        &school.teacher,
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "Math101");
    assert_eq!(body["description"], "Algebra");
    assert_eq!(body["teacher"], json!(school.teacher.id().to_string()));
    assert_eq!(body["students"], json!([]));
}

#[rstest]
#[case(json!({}), "missing required field: name")]
#[case(json!({"name": "   "}), "class name must not be empty")]
#[actix_web::test]
async fn invalid_class_bodies_are_rejected(
    school: School,
    #[case] payload: Value,
    #[case] message: &str,
) {
    let app = app!(school);

    let (status, body) = send(
        &app,
        test::TestRequest::post().uri("/api/v1/classes").set_json(payload),
        &school.teacher,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_request");
    assert_eq!(body["message"], message);
}

#[rstest]
#[actix_web::test]
async fn students_cannot_create_classes(school: School) {
    let app = app!(school);

    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/classes")
            .set_json(json!({"name": "Math101"})),
        &school.alice,
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "forbidden");
}

#[rstest]
#[actix_web::test]
async fn listings_differ_per_role(school: School) {
    let app = app!(school);
    let (_, mine) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/classes")
            .set_json(json!({"name": "Math101"})),
        &school.teacher,
    )
    .await;
    let (_, theirs) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/classes")
            .set_json(json!({"name": "History"})),
        &school.other_teacher,
    )
    .await;
    let mine_id = id_of(&mine);
    send(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/classes/{mine_id}/students"))
            .set_json(json!({"studentIds": [school.alice.id().to_string()]})),
        &school.teacher,
    )
    .await;

    let (_, as_admin) =
        send(&app, test::TestRequest::get().uri("/api/v1/classes"), &school.admin).await;
    let (_, as_teacher) =
        send(&app, test::TestRequest::get().uri("/api/v1/classes"), &school.teacher).await;
    let (_, as_alice) =
        send(&app, test::TestRequest::get().uri("/api/v1/classes"), &school.alice).await;
    let (_, as_bob) =
        send(&app, test::TestRequest::get().uri("/api/v1/classes"), &school.bob).await;

    assert_eq!(as_admin.as_array().map(Vec::len), Some(2));
    assert_eq!(as_teacher.as_array().map(Vec::len), Some(1));
    assert_eq!(as_teacher[0]["id"], json!(mine_id));
    assert_eq!(as_alice[0]["id"], json!(mine_id));
    assert_eq!(as_alice.as_array().map(Vec::len), Some(1));
    assert_eq!(as_bob, json!([]));
    assert_ne!(id_of(&theirs), mine_id);
}

#[rstest]
#[actix_web::test]
async fn only_the_owner_may_modify_a_class(school: School) {
    let app = app!(school);
    let (_, class) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/classes")
            .set_json(json!({"name": "Math101"})),
        &school.teacher,
    )
    .await;
    let uri = format!("/api/v1/classes/{}", id_of(&class));

    let (denied, _) = send(
        &app,
        test::TestRequest::put()
            .uri(&uri)
            .set_json(json!({"name": "Stolen"})),
        &school.other_teacher,
    )
    .await;
    let (allowed, body) = send(
        &app,
        test::TestRequest::put()
            .uri(&uri)
            .set_json(json!({"name": "Math102", "description": "Geometry"})),
        &school.teacher,
    )
    .await;

    assert_eq!(denied, StatusCode::FORBIDDEN);
    assert_eq!(allowed, StatusCode::OK);
    assert_eq!(body["name"], "Math102");
    assert_eq!(body["description"], "Geometry");
}

#[rstest]
#[actix_web::test]
async fn enrolment_skips_existing_students_and_rejects_repeats(school: School) {
    let app = app!(school);
    let (_, class) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/classes")
            .set_json(json!({"name": "Math101"})),
        &school.teacher,
    )
    .await;
    let uri = format!("/api/v1/classes/{}/students", id_of(&class));
    let alice = school.alice.id().to_string();
    let bob = school.bob.id().to_string();

    let (first, body) = send(
        &app,
        test::TestRequest::post()
            .uri(&uri)
            .set_json(json!({"studentIds": [alice]})),
        &school.teacher,
    )
    .await;
    let (second, body2) = send(
        &app,
        test::TestRequest::post()
            .uri(&uri)
            .set_json(json!({"studentIds": [alice, bob]})),
        &school.teacher,
    )
    .await;
    let (repeat, err) = send(
        &app,
        test::TestRequest::post()
            .uri(&uri)
            .set_json(json!({"studentIds": [bob]})),
        &school.teacher,
    )
    .await;

    assert_eq!(first, StatusCode::OK);
    assert_eq!(body["students"], json!([alice]));
    assert_eq!(second, StatusCode::OK);
    assert_eq!(body2["students"], json!([alice, bob]));
    assert_eq!(repeat, StatusCode::BAD_REQUEST);
    assert_eq!(
        err["message"],
        "all selected students are already assigned to this class"
    );
}

#[rstest]
#[actix_web::test]
async fn enrolling_non_students_is_rejected(school: School) {
    let app = app!(school);
    let (_, class) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/classes")
            .set_json(json!({"name": "Math101"})),
        &school.teacher,
    )
    .await;
    let uri = format!("/api/v1/classes/{}/students", id_of(&class));

    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri(&uri)
            .set_json(json!({"studentIds": [school.other_teacher.id().to_string()]})),
        &school.teacher,
    )
    .await;
    let (malformed, bad) = send(
        &app,
        test::TestRequest::post()
            .uri(&uri)
            .set_json(json!({"studentIds": ["not-a-uuid"]})),
        &school.teacher,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["code"], "unknown_student");
    assert_eq!(malformed, StatusCode::BAD_REQUEST);
    assert_eq!(bad["details"]["code"], "invalid_uuid");
    assert_eq!(bad["details"]["index"], 0);
}

#[rstest]
#[actix_web::test]
async fn withdrawing_and_deleting(school: School) {
    let app = app!(school);
    let (_, class) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/classes")
            .set_json(json!({"name": "Math101"})),
        &school.teacher,
    )
    .await;
    let class_uri = format!("/api/v1/classes/{}", id_of(&class));
    let alice = school.alice.id().to_string();
    send(
        &app,
        test::TestRequest::post()
            .uri(&format!("{class_uri}/students"))
            .set_json(json!({"studentIds": [alice]})),
        &school.teacher,
    )
    .await;

    let (withdrawn, body) = send(
        &app,
        test::TestRequest::delete().uri(&format!("{class_uri}/students/{alice}")),
        &school.teacher,
    )
    .await;
    let (deleted, message) =
        send(&app, test::TestRequest::delete().uri(&class_uri), &school.teacher).await;
    let (gone, _) = send(&app, test::TestRequest::get().uri(&class_uri), &school.teacher).await;

    assert_eq!(withdrawn, StatusCode::OK);
    assert_eq!(body["students"], json!([]));
    assert_eq!(deleted, StatusCode::OK);
    assert_eq!(message, json!({"message": "Class deleted successfully"}));
    assert_eq!(gone, StatusCode::NOT_FOUND);
}

#[rstest]
#[actix_web::test]
async fn malformed_class_ids_are_rejected(school: School) {
    let app = app!(school);

    let (status, body) = send(
        &app,
        test::TestRequest::get().uri("/api/v1/classes/not-a-uuid"),
        &school.admin,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "classId");
}

#[rstest]
#[actix_web::test]
async fn missing_token_is_unauthorized(school: School) {
    let app = app!(school);

    let res = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/v1/classes").to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}
