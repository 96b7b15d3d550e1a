//! Tests for the class roster service.

use std::sync::Arc;

use rstest::rstest;
use serde_json::json;

use super::*;
use crate::domain::ErrorCode;
use crate::domain::ports::{MockClassRepository, MockUserRepository};
use crate::domain::service_test_support::{actor, class_owned_by, fixture_clock, user};

fn service(
    classes: MockClassRepository,
    users: MockUserRepository,
) -> ClassRosterService<MockClassRepository, MockUserRepository> {
    ClassRosterService::new(Arc::new(classes), Arc::new(users), fixture_clock())
}

fn returning(class: &Class) -> MockClassRepository {
    let mut classes = MockClassRepository::new();
    let stored = class.clone();
    classes
        .expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(stored)));
    classes
}

#[tokio::test]
async fn create_class_is_owned_by_the_acting_teacher() {
    let teacher = actor(Role::Teacher);
    let mut classes = MockClassRepository::new();
    classes.expect_insert().times(1).return_once(|_| Ok(()));

    let class = service(classes, MockUserRepository::new())
        .create_class(CreateClassRequest {
            actor: teacher,
            name: "  Math101 ".to_owned(),
            description: Some("   ".to_owned()),
        })
        .await
        .expect("class created");

    assert_eq!(class.teacher_id(), teacher.id);
    assert_eq!(class.name().as_ref(), "Math101");
    assert!(class.description().is_none());
    assert!(class.student_ids().is_empty());
}

#[tokio::test]
async fn create_class_rejects_blank_name() {
    let mut classes = MockClassRepository::new();
    classes.expect_insert().times(0);

    let err = service(classes, MockUserRepository::new())
        .create_class(CreateClassRequest {
            actor: actor(Role::Teacher),
            name: " ".to_owned(),
            description: None,
        })
        .await
        .expect_err("blank name");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.details().and_then(|d| d.get("field")), Some(&json!("name")));
}

#[tokio::test]
async fn create_class_is_forbidden_for_students() {
    let mut classes = MockClassRepository::new();
    classes.expect_insert().times(0);

    let err = service(classes, MockUserRepository::new())
        .create_class(CreateClassRequest {
            actor: actor(Role::Student),
            name: "Math101".to_owned(),
            description: None,
        })
        .await
        .expect_err("students cannot create");

    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn update_class_unknown_id_is_not_found() {
    let mut classes = MockClassRepository::new();
    classes.expect_find_by_id().times(1).return_once(|_| Ok(None));

    let err = service(classes, MockUserRepository::new())
        .update_class(UpdateClassRequest {
            actor: actor(Role::Admin),
            class_id: ClassId::random(),
            name: Some("Physics".to_owned()),
            description: None,
        })
        .await
        .expect_err("missing class");

    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[case(Role::Teacher, ErrorCode::Forbidden)]
#[case(Role::Student, ErrorCode::Forbidden)]
#[tokio::test]
async fn update_class_by_non_owner_is_forbidden(#[case] role: Role, #[case] expected: ErrorCode) {
    let class = class_owned_by(UserId::random(), &[]);
    let mut classes = returning(&class);
    classes.expect_save().times(0);

    let err = service(classes, MockUserRepository::new())
        .update_class(UpdateClassRequest {
            actor: actor(role),
            class_id: class.id(),
            name: Some("Physics".to_owned()),
            description: None,
        })
        .await
        .expect_err("not owner");

    assert_eq!(err.code(), expected);
}

#[tokio::test]
async fn update_class_by_admin_renames_and_clears_description() {
    let class = class_owned_by(UserId::random(), &[]);
    let mut classes = returning(&class);
    classes.expect_save().times(1).return_once(|_| Ok(()));

    let updated = service(classes, MockUserRepository::new())
        .update_class(UpdateClassRequest {
            actor: actor(Role::Admin),
            class_id: class.id(),
            name: Some("Physics".to_owned()),
            description: Some(String::new()),
        })
        .await
        .expect("admin may update");

    assert_eq!(updated.name().as_ref(), "Physics");
    assert!(updated.description().is_none());
    assert_eq!(updated.teacher_id(), class.teacher_id());
}

#[tokio::test]
async fn add_students_dedups_and_validates_only_new_ids() {
    let teacher = actor(Role::Teacher);
    let (s1, s2) = (UserId::random(), UserId::random());
    let class = class_owned_by(teacher.id, &[s1]);
    let mut classes = returning(&class);
    classes.expect_save().times(1).return_once(|_| Ok(()));
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_ids()
        .withf(move |ids| ids.to_vec() == vec![s2])
        .times(1)
        .return_once(move |_| Ok(vec![user(s2, "Sam", Role::Student)]));

    let updated = service(classes, users)
        .add_students(AddStudentsRequest {
            actor: teacher,
            class_id: class.id(),
            student_ids: vec![s1, s1, s2],
        })
        .await
        .expect("students added");

    assert_eq!(updated.student_ids(), &[s1, s2]);
}

#[tokio::test]
async fn add_students_rejects_batch_of_existing_students() {
    let teacher = actor(Role::Teacher);
    let s1 = UserId::random();
    let class = class_owned_by(teacher.id, &[s1]);
    let mut classes = returning(&class);
    classes.expect_save().times(0);
    let mut users = MockUserRepository::new();
    users.expect_find_by_ids().times(0);

    let err = service(classes, users)
        .add_students(AddStudentsRequest {
            actor: teacher,
            class_id: class.id(),
            student_ids: vec![s1, s1],
        })
        .await
        .expect_err("nothing to add");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(
        err.message(),
        "all selected students are already assigned to this class"
    );
}

#[tokio::test]
async fn add_students_rejects_ids_that_are_not_students() {
    let teacher = actor(Role::Teacher);
    let (colleague, ghost) = (UserId::random(), UserId::random());
    let class = class_owned_by(teacher.id, &[]);
    let mut classes = returning(&class);
    classes.expect_save().times(0);
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_ids()
        .times(1)
        .return_once(move |_| Ok(vec![user(colleague, "Colleague", Role::Teacher)]));

    let err = service(classes, users)
        .add_students(AddStudentsRequest {
            actor: teacher,
            class_id: class.id(),
            student_ids: vec![colleague, ghost],
        })
        .await
        .expect_err("unknown students");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    let rejected = err
        .details()
        .and_then(|d| d.get("value"))
        .and_then(|v| v.as_array())
        .map(Vec::len);
    assert_eq!(rejected, Some(2));
}

#[tokio::test]
async fn remove_student_not_enrolled_is_a_no_op() {
    let teacher = actor(Role::Teacher);
    let class = class_owned_by(teacher.id, &[UserId::random()]);
    let mut classes = returning(&class);
    classes.expect_save().times(0);

    let unchanged = service(classes, MockUserRepository::new())
        .remove_student(RemoveStudentRequest {
            actor: teacher,
            class_id: class.id(),
            student_id: UserId::random(),
        })
        .await
        .expect("idempotent removal");

    assert_eq!(unchanged, class);
}

#[tokio::test]
async fn remove_student_persists_withdrawal() {
    let teacher = actor(Role::Teacher);
    let s1 = UserId::random();
    let class = class_owned_by(teacher.id, &[s1]);
    let mut classes = returning(&class);
    classes
        .expect_save()
        .withf(move |saved| !saved.is_enrolled(&s1))
        .times(1)
        .return_once(|_| Ok(()));

    let updated = service(classes, MockUserRepository::new())
        .remove_student(RemoveStudentRequest {
            actor: teacher,
            class_id: class.id(),
            student_id: s1,
        })
        .await
        .expect("student removed");

    assert!(updated.student_ids().is_empty());
}

#[tokio::test]
async fn delete_class_reports_cascade_count() {
    let teacher = actor(Role::Teacher);
    let class = class_owned_by(teacher.id, &[]);
    let mut classes = returning(&class);
    classes
        .expect_delete_with_attendance()
        .times(1)
        .return_once(|_| Ok(3));

    let response = service(classes, MockUserRepository::new())
        .delete_class(DeleteClassRequest {
            actor: teacher,
            class_id: class.id(),
        })
        .await
        .expect("class deleted");

    assert_eq!(response.attendance_removed, 3);
    assert_eq!(response.class_id, class.id());
}

#[tokio::test]
async fn delete_class_by_other_teacher_is_forbidden() {
    let class = class_owned_by(UserId::random(), &[]);
    let mut classes = returning(&class);
    classes.expect_delete_with_attendance().times(0);

    let err = service(classes, MockUserRepository::new())
        .delete_class(DeleteClassRequest {
            actor: actor(Role::Teacher),
            class_id: class.id(),
        })
        .await
        .expect_err("not owner");

    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn delete_class_maps_connection_error_to_service_unavailable() {
    let admin = actor(Role::Admin);
    let class = class_owned_by(UserId::random(), &[]);
    let mut classes = returning(&class);
    classes
        .expect_delete_with_attendance()
        .times(1)
        .return_once(|_| Err(ClassRepositoryError::connection("pool exhausted")));

    let err = service(classes, MockUserRepository::new())
        .delete_class(DeleteClassRequest {
            actor: admin,
            class_id: class.id(),
        })
        .await
        .expect_err("unavailable");

    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
}

#[tokio::test]
async fn list_classes_uses_admin_query() {
    let mut classes = MockClassRepository::new();
    classes.expect_list_all().times(1).return_once(|| Ok(Vec::new()));
    classes.expect_list_taught_by().times(0);
    classes.expect_list_enrolling().times(0);

    let listed = service(classes, MockUserRepository::new())
        .list_classes(ListClassesRequest {
            actor: actor(Role::Admin),
        })
        .await
        .expect("listing succeeds");

    assert!(listed.is_empty());
}

#[tokio::test]
async fn list_classes_uses_teacher_query() {
    let teacher = actor(Role::Teacher);
    let owned = class_owned_by(teacher.id, &[]);
    let returned = vec![owned.clone()];
    let mut classes = MockClassRepository::new();
    classes.expect_list_all().times(0);
    classes
        .expect_list_taught_by()
        .withf(move |id| *id == teacher.id)
        .times(1)
        .return_once(move |_| Ok(returned));

    let listed = service(classes, MockUserRepository::new())
        .list_classes(ListClassesRequest { actor: teacher })
        .await
        .expect("listing succeeds");

    assert_eq!(listed, vec![owned]);
}

#[tokio::test]
async fn list_classes_uses_student_query() {
    let student = actor(Role::Student);
    let mut classes = MockClassRepository::new();
    classes.expect_list_all().times(0);
    classes
        .expect_list_enrolling()
        .withf(move |id| *id == student.id)
        .times(1)
        .return_once(|_| Ok(Vec::new()));

    service(classes, MockUserRepository::new())
        .list_classes(ListClassesRequest { actor: student })
        .await
        .expect("listing succeeds");
}

#[tokio::test]
async fn get_class_hides_classes_from_unenrolled_students() {
    let class = class_owned_by(UserId::random(), &[UserId::random()]);
    let classes = returning(&class);

    let err = service(classes, MockUserRepository::new())
        .get_class(GetClassRequest {
            actor: actor(Role::Student),
            class_id: class.id(),
        })
        .await
        .expect_err("not enrolled");

    assert_eq!(err.code(), ErrorCode::Forbidden);
}
