use schoolhub_admin::page::PageState;
use schoolhub_admin::{build_with, Admin};
use schoolhub_core::{ErrorKind, HubError, Role, TenantContext};
use serde_json::{json, Value};

async fn create_school(admin: &Admin, name: &str) -> String {
    let school = admin
        .gateway
        .write("schools", json!({"name": name}), &TenantContext::all_tenants())
        .await
        .unwrap();
    school["id"].as_str().unwrap().to_string()
}

fn exam(student: &str, score: f64) -> Value {
    json!({
        "studentId": "stu-1",
        "studentName": student,
        "subject": "Mathematics",
        "term": "Term 1",
        "year": 2024,
        "score": score,
    })
}

#[tokio::test]
async fn refresh_loads_only_the_session_school() {
    let admin = build_with(&[]).unwrap();
    let a = create_school(&admin, "School A").await;
    let b = create_school(&admin, "School B").await;

    for (school, student) in [(&a, "Ama Mensah"), (&b, "Kofi Boateng")] {
        let teacher = TenantContext::new(Role::Teacher, school.as_str());
        admin.gateway.write("exam-results", exam(student, 70.0), &teacher).await.unwrap();
    }

    let mut page = admin.page("exam-results");
    page.set_session(Some(Role::Teacher), Some(&a));
    assert!(page.refresh(&admin.gateway).await);

    assert_eq!(page.state(), &PageState::Loaded);
    assert_eq!(page.records().len(), 1);
    assert_eq!(page.records()[0]["schoolId"], a.as_str());
    assert_eq!(page.records()[0]["studentName"], "Ama Mensah");
}

#[tokio::test]
async fn submit_creates_then_updates_and_refetches() {
    let admin = build_with(&[]).unwrap();
    let a = create_school(&admin, "School A").await;

    let mut page = admin.page("exam-results");
    page.set_session(Some(Role::Teacher), Some(&a));
    page.refresh(&admin.gateway).await;
    assert!(page.records().is_empty());

    page.submit(&admin.gateway, exam("Esi Owusu", 40.0)).await.unwrap();
    assert_eq!(page.state(), &PageState::Loaded);
    assert_eq!(page.records().len(), 1);
    let created = page.records()[0].clone();
    assert_eq!(created["score"], 40.0);

    let mut edited = exam("Esi Owusu", 65.0);
    edited["id"] = created["id"].clone();
    page.submit(&admin.gateway, edited).await.unwrap();

    assert_eq!(page.state(), &PageState::Loaded);
    assert_eq!(page.records().len(), 1);
    let updated = &page.records()[0];
    assert_eq!(updated["id"], created["id"]);
    assert_eq!(updated["score"], 65.0);
    assert_eq!(updated["schoolId"], a.as_str());
    assert_eq!(updated["createdAt"], created["createdAt"]);
}

#[tokio::test]
async fn invalid_submit_shows_field_errors() {
    let admin = build_with(&[]).unwrap();
    let a = create_school(&admin, "School A").await;

    let mut page = admin.page("exam-results");
    page.set_session(Some(Role::Teacher), Some(&a));
    page.refresh(&admin.gateway).await;

    page.submit(&admin.gateway, exam("Esi Owusu", 140.0)).await.unwrap();

    assert_eq!(page.state(), &PageState::Loaded);
    assert!(page.field_errors().unwrap().get("score").is_some());
    assert!(page.records().is_empty());
}

#[tokio::test]
async fn delete_removes_and_refetches() {
    let admin = build_with(&[]).unwrap();
    let a = create_school(&admin, "School A").await;

    let mut page = admin.page("exam-results");
    page.set_session(Some(Role::Teacher), Some(&a));
    page.refresh(&admin.gateway).await;
    page.submit(&admin.gateway, exam("Yaw Asante", 81.0)).await.unwrap();
    let id = page.records()[0]["id"].as_str().unwrap().to_string();

    page.delete(&admin.gateway, &id).await.unwrap();

    assert_eq!(page.state(), &PageState::Loaded);
    assert!(page.records().is_empty());
}

#[tokio::test]
async fn teacher_cannot_delete_a_school_from_its_page() {
    let admin = build_with(&[]).unwrap();
    let a = create_school(&admin, "School A").await;

    let mut page = admin.page("schools");
    page.set_session(Some(Role::Teacher), Some(&a));
    page.refresh(&admin.gateway).await;
    assert_eq!(page.records().len(), 1);

    let err = page.delete(&admin.gateway, &a).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::PermissionDenied);

    let teacher = TenantContext::new(Role::Teacher, a.as_str());
    let err = admin.gateway.remove("schools", &a, &teacher).await.unwrap_err();
    assert_eq!(HubError::kind_of(&err), ErrorKind::PermissionDenied);

    let schools = admin.gateway.list("schools", &TenantContext::all_tenants()).await.unwrap();
    assert_eq!(schools.len(), 1);
}
