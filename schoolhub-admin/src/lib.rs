//! SchoolHub admin server.
//!
//! One REST service per record kind behind a shared hook pipeline, plus
//! dashboard, export, report and seeding routes.

pub mod aggregate;
mod app;
pub mod dashboard;
pub mod export;
pub mod gateway;
mod hooks;
pub mod kinds;
pub mod page;
mod routes;
pub mod seed;
pub mod services;

use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use schoolhub_axum::AxumApp;
use serde_json::Value;

pub use app::ENV_PREFIX;
pub use gateway::MutationGateway;
pub use page::RecordPage;
pub use services::{AdminParams, AdminState};

use crate::kinds::ALL_KINDS;
use crate::routes::AdminContext;

pub struct Admin {
    pub ax: AxumApp<Value, AdminParams>,
    pub gateway: MutationGateway,
    pub state: Arc<AdminState>,
}

impl Admin {
    /// Page controller for one record type, sharing this app's policy.
    pub fn page(&self, record_type: &str) -> RecordPage {
        RecordPage::new(
            record_type,
            Arc::clone(self.gateway.policy()),
            self.state.store.is_enabled(),
        )
    }

    pub fn router(&self) -> Router {
        self.ax.clone().into_router()
    }
}

pub fn build() -> Result<Admin> {
    build_with(&[])
}

/// Like [`build`], with config keys overridden after env loading.
pub fn build_with(overrides: &[(&str, &str)]) -> Result<Admin> {
    let app = app::admin_app(overrides);

    let store_enabled = app.config_snapshot().get_bool("store.enabled").unwrap_or(true);
    if !store_enabled {
        tracing::warn!("record store disabled, running in simulation mode");
    }

    let policy = Arc::new(gateway::school_policy());
    let state = Arc::new(AdminState::new(store_enabled));

    hooks::global_hooks(&app, Arc::clone(&policy));
    services::configure(&app, Arc::clone(&state))?;

    let gateway = MutationGateway::new(app.clone(), policy);
    let ctx = AdminContext {
        app: app.clone(),
        gateway: gateway.clone(),
        state: Arc::clone(&state),
    };

    let mut ax = AxumApp::new(app);
    for kind in ALL_KINDS {
        ax = ax.mount_service(&format!("/{}", kind.name));
    }
    let ax = ax
        .merge_router(routes::routes(ctx))
        .use_get("/health", || async { "ok" });

    Ok(Admin { ax, gateway, state })
}
