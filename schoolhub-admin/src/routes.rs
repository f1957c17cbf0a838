use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use schoolhub_axum::{HubAxumError, Session};
use schoolhub_core::{HubApp, HubError};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::gateway::MutationGateway;
use crate::kinds::{self, EXAM_RESULTS, INVENTORY};
use crate::services::{AdminParams, AdminState};
use crate::{aggregate, dashboard, export, seed};

pub const DEFAULT_PASS_MARK: f64 = 50.0;

#[derive(Clone)]
pub struct AdminContext {
    pub app: HubApp<Value, AdminParams>,
    pub gateway: MutationGateway,
    pub state: Arc<AdminState>,
}

async fn dashboard_summary(
    State(ctx): State<AdminContext>,
    Session(session): Session,
) -> Result<Json<dashboard::DashboardSummary>, HubAxumError> {
    let summary = dashboard::summary(&ctx.gateway, &session, ctx.state.store.is_enabled()).await?;
    Ok(Json(summary))
}

#[derive(Debug, Deserialize)]
struct ExportQuery {
    format: Option<String>,
}

async fn export_records(
    State(ctx): State<AdminContext>,
    Session(session): Session,
    Path(record_type): Path<String>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, HubAxumError> {
    let kind = kinds::by_name(&record_type)
        .ok_or_else(|| HubError::not_found(format!("Unknown record type: {record_type}")))?;

    let records = ctx.gateway.list(kind.name, &session).await?;
    let headers = kind.headers();
    let rows = export::records_to_rows(kind, &records);

    match query.format.as_deref() {
        None | Some("csv") => {
            let filename = export::export_filename(kind.name, Utc::now().date_naive());
            let csv = export::to_csv(&headers, &rows);
            Ok((
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                    (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{filename}\"")),
                ],
                csv,
            )
                .into_response())
        }
        Some("print") => Ok(Html(export::print_view(kind.title, &headers, &rows)).into_response()),
        Some(other) => Err(HubError::bad_request(format!("Unknown export format: {other}"))
            .with_errors(json!({"format": ["must be one of: csv, print"]}))
            .into()),
    }
}

async fn exam_report(
    State(ctx): State<AdminContext>,
    Session(session): Session,
) -> Result<Json<Value>, HubAxumError> {
    let pass_mark = ctx
        .app
        .config_snapshot()
        .get_f64("exams.passMark")
        .unwrap_or(DEFAULT_PASS_MARK);

    let records = ctx.gateway.list(EXAM_RESULTS.name, &session).await?;
    Ok(Json(json!({
        "passMark": pass_mark,
        "rows": aggregate::exam_summary(&records, pass_mark),
    })))
}

async fn inventory_report(
    State(ctx): State<AdminContext>,
    Session(session): Session,
) -> Result<Json<aggregate::InventorySummary>, HubAxumError> {
    let items = ctx.gateway.list(INVENTORY.name, &session).await?;
    Ok(Json(aggregate::inventory_summary(&items)))
}

async fn seed_demo(
    State(ctx): State<AdminContext>,
) -> Result<Json<seed::SeedReport>, HubAxumError> {
    let env = ctx.app.get("app.env").unwrap_or_default();
    if seed::is_production(&env) {
        let msg = format!("seeding is disabled when app.env is '{env}'");
        return Err(HubError::permission_denied(msg).into());
    }

    let report = seed::seed_demo(&ctx.gateway)
        .await
        .map_err(|e| HubError::general_error(format!("seeding failed: {e}")).with_source(e))?;
    Ok(Json(report))
}

/// Routes beyond plain record CRUD.
pub fn routes(ctx: AdminContext) -> Router<()> {
    Router::new()
        .route("/dashboard", get(dashboard_summary))
        .route("/exports/{record_type}", get(export_records))
        .route("/reports/exam-summary", get(exam_report))
        .route("/reports/inventory-summary", get(inventory_report))
        .route("/admin/seed", post(seed_demo))
        .with_state(ctx)
}
