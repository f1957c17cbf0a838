use std::sync::Arc;

use schoolhub_core::HubApp;
use serde_json::Value;

use crate::kinds::SCHOOLS;
use crate::services::{AdminParams, AdminState};

use super::schools_hooks::EnforceSchoolOnDelete;
use super::schools_schema::{CreateSchool, PatchSchool};

pub fn register_hooks(
    app: &HubApp<Value, AdminParams>,
    state: Arc<AdminState>,
) -> anyhow::Result<()> {
    schoolhub_schema::register::<CreateSchool, PatchSchool, AdminParams>(
        app,
        SCHOOLS.name,
        "School schema validation failed",
    )?;

    app.service(SCHOOLS.name)?.hooks(|h| {
        h.before_remove(Arc::new(EnforceSchoolOnDelete { state }));
    });

    Ok(())
}
