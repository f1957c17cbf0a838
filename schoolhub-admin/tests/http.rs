use axum::body::Body;
use axum::http::Request;
use axum::Router;
use http_body_util::BodyExt;
use schoolhub_admin::build_with;
use serde_json::{json, Value};
use tower::ServiceExt;

async fn json_body(res: axum::response::Response) -> Value {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn text_body(res: axum::response::Response) -> String {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn request(
    method: &str,
    uri: &str,
    role: &str,
    tenant: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut b = Request::builder().method(method).uri(uri).header("x-role", role);
    if let Some(t) = tenant {
        b = b.header("x-tenant-id", t);
    }
    match body {
        Some(v) => b
            .header("content-type", "application/json")
            .body(Body::from(v.to_string()))
            .unwrap(),
        None => b.body(Body::empty()).unwrap(),
    }
}

async fn call(router: &Router, req: Request<Body>) -> axum::response::Response {
    router.clone().oneshot(req).await.unwrap()
}

async fn create_school(router: &Router, name: &str) -> String {
    let res = call(
        router,
        request("POST", "/schools", "system-admin", None, Some(json!({"name": name}))),
    )
    .await;
    assert_eq!(res.status().as_u16(), 200);
    json_body(res).await["id"].as_str().unwrap().to_string()
}

fn exam(score: f64) -> Value {
    json!({
        "studentId": "stu-9",
        "studentName": "Akua Darko",
        "subject": "Science",
        "term": "Term 2",
        "year": 2024,
        "score": score,
    })
}

#[tokio::test]
async fn health_ok() {
    let router = build_with(&[]).unwrap().router();

    let res = call(&router, Request::builder().uri("/health").body(Body::empty()).unwrap()).await;

    assert_eq!(res.status().as_u16(), 200);
    assert_eq!(text_body(res).await, "ok");
}

#[tokio::test]
async fn missing_role_is_401() {
    let router = build_with(&[]).unwrap().router();

    let res = call(
        &router,
        Request::builder().uri("/exam-results").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(res.status().as_u16(), 401);
    assert_eq!(json_body(res).await["name"], "NotAuthenticated");
}

#[tokio::test]
async fn schools_never_see_each_others_records() {
    let router = build_with(&[]).unwrap().router();
    let a = create_school(&router, "School A").await;
    let b = create_school(&router, "School B").await;

    let res = call(
        &router,
        request("POST", "/exam-results", "teacher", Some(&a), Some(exam(77.0))),
    )
    .await;
    assert_eq!(res.status().as_u16(), 200);
    let created = json_body(res).await;
    assert_eq!(created["schoolId"], a.as_str());
    assert!(created["id"].as_str().unwrap().starts_with("exam_"));
    assert!(created["createdAt"].is_string());

    let res = call(&router, request("GET", "/exam-results", "teacher", Some(&b), None)).await;
    assert_eq!(res.status().as_u16(), 200);
    assert_eq!(json_body(res).await, json!([]));

    let id = created["id"].as_str().unwrap();
    let res = call(
        &router,
        request("GET", &format!("/exam-results/{id}"), "teacher", Some(&b), None),
    )
    .await;
    assert_eq!(res.status().as_u16(), 404);

    let res = call(&router, request("GET", "/exam-results", "system-admin", None, None)).await;
    assert_eq!(json_body(res).await.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn claiming_another_school_is_tenant_mismatch() {
    let router = build_with(&[]).unwrap().router();
    let a = create_school(&router, "School A").await;
    let b = create_school(&router, "School B").await;

    let mut payload = exam(60.0);
    payload["schoolId"] = json!(a);
    let res = call(
        &router,
        request("POST", "/exam-results", "teacher", Some(&b), Some(payload)),
    )
    .await;

    assert_eq!(res.status().as_u16(), 403);
    assert_eq!(json_body(res).await["name"], "TenantMismatch");

    let res = call(&router, request("GET", "/exam-results", "system-admin", None, None)).await;
    assert_eq!(json_body(res).await, json!([]));
}

#[tokio::test]
async fn teacher_cannot_delete_a_school() {
    let router = build_with(&[]).unwrap().router();
    let a = create_school(&router, "School A").await;

    let res = call(
        &router,
        request("DELETE", &format!("/schools/{a}"), "teacher", Some(&a), None),
    )
    .await;
    assert_eq!(res.status().as_u16(), 403);
    assert_eq!(json_body(res).await["name"], "PermissionDenied");

    let res = call(&router, request("GET", "/schools", "system-admin", None, None)).await;
    assert_eq!(json_body(res).await.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn out_of_range_score_is_422_with_field_error() {
    let router = build_with(&[]).unwrap().router();
    let a = create_school(&router, "School A").await;

    let res = call(
        &router,
        request("POST", "/exam-results", "teacher", Some(&a), Some(exam(140.0))),
    )
    .await;

    assert_eq!(res.status().as_u16(), 422);
    let body = json_body(res).await;
    assert_eq!(body["name"], "ValidationError");
    assert!(body["errors"].get("score").is_some());
}

#[tokio::test]
async fn patch_keeps_school_and_created_at() {
    let router = build_with(&[]).unwrap().router();
    let a = create_school(&router, "School A").await;

    let res = call(
        &router,
        request("POST", "/exam-results", "teacher", Some(&a), Some(exam(40.0))),
    )
    .await;
    let created = json_body(res).await;
    let id = created["id"].as_str().unwrap();

    let res = call(
        &router,
        request(
            "PATCH",
            &format!("/exam-results/{id}"),
            "teacher",
            Some(&a),
            Some(json!({"score": 55})),
        ),
    )
    .await;
    assert_eq!(res.status().as_u16(), 200);
    let patched = json_body(res).await;
    assert_eq!(patched["score"], 55.0);
    assert_eq!(patched["schoolId"], a.as_str());
    assert_eq!(patched["createdAt"], created["createdAt"]);
    assert_eq!(patched["studentName"], "Akua Darko");
}

#[tokio::test]
async fn csv_export_is_an_attachment() {
    let router = build_with(&[]).unwrap().router();
    let a = create_school(&router, "School A").await;
    call(&router, request("POST", "/exam-results", "teacher", Some(&a), Some(exam(81.0)))).await;

    let res = call(
        &router,
        request("GET", "/exports/exam-results", "teacher", Some(&a), None),
    )
    .await;

    assert_eq!(res.status().as_u16(), 200);
    let content_type = res.headers()["content-type"].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/csv"));
    let disposition = res.headers()["content-disposition"].to_str().unwrap().to_string();
    assert!(disposition.starts_with("attachment"));
    assert!(disposition.contains("exam-results_"));
    assert!(disposition.contains(".csv"));

    let csv = text_body(res).await;
    let mut lines = csv.lines();
    assert!(lines.next().unwrap().starts_with("\"Student ID\",\"Student Name\""));
    assert!(lines.next().unwrap().contains("\"Akua Darko\""));
}

#[tokio::test]
async fn print_view_and_unknown_format() {
    let router = build_with(&[]).unwrap().router();
    let a = create_school(&router, "School A").await;

    let res = call(
        &router,
        request("GET", "/exports/inventory?format=print", "librarian", Some(&a), None),
    )
    .await;
    assert_eq!(res.status().as_u16(), 200);
    let html = text_body(res).await;
    assert!(html.contains("data-print=\"visible\""));
    assert!(html.contains("Inventory"));

    let res = call(
        &router,
        request("GET", "/exports/inventory?format=pdf", "librarian", Some(&a), None),
    )
    .await;
    assert_eq!(res.status().as_u16(), 400);

    let res = call(&router, request("GET", "/exports/reports", "librarian", Some(&a), None)).await;
    assert_eq!(res.status().as_u16(), 404);
}

#[tokio::test]
async fn seeding_then_reports() {
    let router = build_with(&[]).unwrap().router();

    let seed = Request::builder()
        .method("POST")
        .uri("/admin/seed")
        .body(Body::empty())
        .unwrap();
    let res = call(&router, seed).await;
    assert_eq!(res.status().as_u16(), 200);
    let report = json_body(res).await;
    let schools = report["schoolIds"].as_array().unwrap();
    assert_eq!(schools.len(), 2);
    assert_eq!(report["created"]["exam-results"], 8);
    let riverside = schools[0].as_str().unwrap();

    let res = call(
        &router,
        request("GET", "/reports/exam-summary", "teacher", Some(riverside), None),
    )
    .await;
    assert_eq!(res.status().as_u16(), 200);
    let body = json_body(res).await;
    assert_eq!(body["passMark"], 50.0);
    assert_eq!(body["rows"][0]["year"], 2024);
    assert_eq!(body["rows"][0]["count"], 4);
    assert_eq!(body["rows"][0]["average"], 71.25);
    assert_eq!(body["rows"][0]["averageDisplay"], 71.3);
    assert_eq!(body["rows"][0]["passRate"], 75.0);
    assert_eq!(body["rows"][0]["passRateDisplay"], 75.0);

    let res = call(
        &router,
        request("GET", "/reports/inventory-summary", "librarian", Some(riverside), None),
    )
    .await;
    let inventory = json_body(res).await;
    assert_eq!(inventory["totalAdded"], 240.0);
    assert_eq!(inventory["totalLost"], 15.0);
    assert_eq!(inventory["net"], 225.0);
}

#[tokio::test]
async fn seeding_is_refused_in_production() {
    let router = build_with(&[("app.env", "production")]).unwrap().router();

    let seed = Request::builder()
        .method("POST")
        .uri("/admin/seed")
        .body(Body::empty())
        .unwrap();
    let res = call(&router, seed).await;

    assert_eq!(res.status().as_u16(), 403);
    assert_eq!(json_body(res).await["name"], "PermissionDenied");
}

#[tokio::test]
async fn dashboard_lists_writable_types() {
    let router = build_with(&[]).unwrap().router();
    let a = create_school(&router, "School A").await;

    let res = call(&router, request("GET", "/dashboard", "teacher", Some(&a), None)).await;

    assert_eq!(res.status().as_u16(), 200);
    let body = json_body(res).await;
    assert_eq!(body["role"], "teacher");
    assert_eq!(body["scope"], a.as_str());
    assert_eq!(body["writable"], json!(["disciplinary", "exam-results"]));
    assert_eq!(body["counts"]["schools"], 1);
    assert_eq!(body["simulation"], false);
}

#[tokio::test]
async fn school_with_records_is_restricted_unless_cascading() {
    let router = build_with(&[]).unwrap().router();
    let a = create_school(&router, "School A").await;
    call(&router, request("POST", "/exam-results", "teacher", Some(&a), Some(exam(90.0)))).await;

    let res = call(
        &router,
        request("DELETE", &format!("/schools/{a}"), "system-admin", None, None),
    )
    .await;
    assert_eq!(res.status().as_u16(), 409);
    let body = json_body(res).await;
    assert_eq!(body["name"], "Conflict");
    assert_eq!(body["data"]["records"], 1);

    let res = call(
        &router,
        request("DELETE", &format!("/schools/{a}?onDelete=cascade"), "system-admin", None, None),
    )
    .await;
    assert_eq!(res.status().as_u16(), 200);

    let res = call(&router, request("GET", "/exam-results", "system-admin", None, None)).await;
    assert_eq!(json_body(res).await, json!([]));
}

#[tokio::test]
async fn cascade_can_come_from_config() {
    let router = build_with(&[("schools.onDelete", "cascade")]).unwrap().router();
    let a = create_school(&router, "School A").await;
    call(&router, request("POST", "/exam-results", "teacher", Some(&a), Some(exam(90.0)))).await;

    let res = call(
        &router,
        request("DELETE", &format!("/schools/{a}"), "system-admin", None, None),
    )
    .await;
    assert_eq!(res.status().as_u16(), 200);
}

#[tokio::test]
async fn disabled_store_is_503_but_dashboard_simulates() {
    let router = build_with(&[("store.enabled", "false")]).unwrap().router();

    let res = call(
        &router,
        request("GET", "/exam-results", "teacher", Some("school-a"), None),
    )
    .await;
    assert_eq!(res.status().as_u16(), 503);
    assert_eq!(json_body(res).await["name"], "StoreUnavailable");

    let res = call(&router, request("GET", "/dashboard", "teacher", Some("school-a"), None)).await;
    assert_eq!(res.status().as_u16(), 200);
    let body = json_body(res).await;
    assert_eq!(body["simulation"], true);
    assert_eq!(body["counts"], json!({}));
}
