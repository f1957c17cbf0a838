use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use schoolhub_core::errors::HubError;

#[derive(Debug)]
pub struct HubAxumError(pub anyhow::Error);

impl From<anyhow::Error> for HubAxumError {
    fn from(e: anyhow::Error) -> Self {
        Self(e)
    }
}

impl From<HubError> for HubAxumError {
    fn from(e: HubError) -> Self {
        Self(e.into_anyhow())
    }
}

fn respond(err: &HubError) -> Response {
    let safe = err.sanitize_for_client();
    let status = StatusCode::from_u16(safe.code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(safe.to_json())).into_response()
}

impl IntoResponse for HubAxumError {
    fn into_response(self) -> Response {
        // Structured errors keep their kind even when wrapped in anyhow context.
        if let Some(hub) = HubError::from_anyhow(&self.0) {
            if hub.code() >= 500 {
                tracing::error!(error = %self.0, "request failed");
            }
            return respond(hub);
        }

        tracing::error!(error = %self.0, "unstructured failure");
        respond(&HubError::general_error(self.0.to_string()))
    }
}
