use std::sync::Arc;

use axum::body::Body;
use axum::http::HeaderValue;
use axum::http::Request;
use http_body_util::BodyExt;
use schoolhub_axum::AxumApp;
use schoolhub_core::errors::HubError;
use schoolhub_core::{HubApp, RecordService, ServiceCapabilities, ServiceMethodKind, TenantContext};
use serde_json::{json, Value};
use tower::ServiceExt;

struct InvalidOnCreate;

#[async_trait::async_trait]
impl RecordService<Value, ()> for InvalidOnCreate {
    fn capabilities(&self) -> ServiceCapabilities {
        ServiceCapabilities::from_methods(vec![ServiceMethodKind::Create])
    }

    async fn create(
        &self,
        _ctx: &TenantContext,
        _data: Value,
        _params: (),
    ) -> anyhow::Result<Value> {
        Err(HubError::validation("Invalid")
            .with_errors(json!({"score": ["must be between 0 and 100"]}))
            .into_anyhow())
    }
}

struct BoomOnCreate;

#[async_trait::async_trait]
impl RecordService<Value, ()> for BoomOnCreate {
    fn capabilities(&self) -> ServiceCapabilities {
        ServiceCapabilities::from_methods(vec![ServiceMethodKind::Create])
    }

    async fn create(
        &self,
        _ctx: &TenantContext,
        _data: Value,
        _params: (),
    ) -> anyhow::Result<Value> {
        Err(anyhow::anyhow!("boom"))
    }
}

/// Echoes the session it was called with.
struct WhoAmI;

#[async_trait::async_trait]
impl RecordService<Value, ()> for WhoAmI {
    fn capabilities(&self) -> ServiceCapabilities {
        ServiceCapabilities::read_only()
    }

    async fn find(&self, ctx: &TenantContext, _params: ()) -> anyhow::Result<Vec<Value>> {
        Ok(vec![json!({
            "role": ctx.role.as_str(),
            "scope": ctx.scope.to_string(),
        })])
    }
}

async fn json_body(res: axum::response::Response) -> Value {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn post(uri: &str, body: &'static str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("x-role", "teacher")
        .header("x-tenant-id", "school-a")
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn malformed_json_returns_bad_request() {
    let app: HubApp<Value, ()> = HubApp::new();
    let router = AxumApp::new(app)
        .use_service("/disciplinary", Arc::new(BoomOnCreate))
        .into_router();

    let res = router.oneshot(post("/disciplinary", "{\"incident\":\"x\"")).await.unwrap();

    assert_eq!(res.status().as_u16(), 400);
    assert!(res.headers().get("x-request-id").is_some());
    let body = json_body(res).await;
    assert_eq!(body["name"], "BadRequest");
    assert_eq!(body["code"], 400);
    assert_eq!(body["className"], "bad-request");
    assert!(body.get("errors").is_some());
}

#[tokio::test]
async fn request_id_is_preserved_when_provided() {
    let app: HubApp<Value, ()> = HubApp::new();
    let router = AxumApp::new(app)
        .use_service("/disciplinary", Arc::new(BoomOnCreate))
        .into_router();

    let provided = HeaderValue::from_static("req-test-123");
    let mut req = post("/disciplinary", "{\"incident\":\"ok\"}");
    req.headers_mut().insert("x-request-id", provided.clone());

    let res = router.oneshot(req).await.unwrap();

    assert_eq!(res.headers().get("x-request-id").unwrap(), &provided);
}

#[tokio::test]
async fn validation_error_preserves_422_and_shape() {
    let app: HubApp<Value, ()> = HubApp::new();
    let router = AxumApp::new(app)
        .use_service("/exam-results", Arc::new(InvalidOnCreate))
        .into_router();

    let res = router.oneshot(post("/exam-results", "{\"score\":140}")).await.unwrap();

    assert_eq!(res.status().as_u16(), 422);
    let body = json_body(res).await;
    assert_eq!(body["name"], "ValidationError");
    assert_eq!(body["code"], 422);
    assert_eq!(body["className"], "validation-error");
    assert_eq!(body["errors"], json!({"score": ["must be between 0 and 100"]}));
}

#[tokio::test]
async fn unstructured_error_maps_to_general_error_shape() {
    let app: HubApp<Value, ()> = HubApp::new();
    let router = AxumApp::new(app)
        .use_service("/disciplinary", Arc::new(BoomOnCreate))
        .into_router();

    let res = router.oneshot(post("/disciplinary", "{\"incident\":\"ok\"}")).await.unwrap();

    assert_eq!(res.status().as_u16(), 500);
    let body = json_body(res).await;
    assert_eq!(body["name"], "GeneralError");
    assert_eq!(body["code"], 500);
    assert_eq!(body["className"], "general-error");
    assert!(body["message"].as_str().unwrap().contains("boom"));
}

#[tokio::test]
async fn missing_role_header_is_not_authenticated() {
    let app: HubApp<Value, ()> = HubApp::new();
    let router = AxumApp::new(app)
        .use_service("/whoami", Arc::new(WhoAmI))
        .into_router();

    let res = router
        .oneshot(Request::builder().uri("/whoami").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 401);
    let body = json_body(res).await;
    assert_eq!(body["name"], "NotAuthenticated");
}

#[tokio::test]
async fn session_headers_reach_the_service() {
    let app: HubApp<Value, ()> = HubApp::new();
    let router = AxumApp::new(app)
        .use_service("/whoami", Arc::new(WhoAmI))
        .into_router();

    let res = router
        .oneshot(
            Request::builder()
                .uri("/whoami")
                .header("x-role", "head-teacher")
                .header("x-tenant-id", "school-b")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 200);
    let body = json_body(res).await;
    assert_eq!(body[0]["role"], "head-teacher");
    assert_eq!(body[0]["scope"], "school-b");
}

#[tokio::test]
async fn unsupported_method_is_405() {
    let app: HubApp<Value, ()> = HubApp::new();
    let router = AxumApp::new(app)
        .use_service("/whoami", Arc::new(WhoAmI))
        .into_router();

    let res = router
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/whoami/abc")
                .header("x-role", "system-admin")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 405);
    let body = json_body(res).await;
    assert_eq!(body["name"], "MethodNotAllowed");
}
