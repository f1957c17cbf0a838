use std::sync::Arc;

use schoolhub_core::{HubApp, RecordService};
use serde_json::Value;

pub mod adapters;
pub mod records;
pub mod schools;
pub mod types;

pub use types::{AdminParams, AdminState};

use crate::kinds::ALL_KINDS;
use adapters::CollectionAdapter;

/// Register one service per record kind, then their hooks.
pub fn configure(app: &HubApp<Value, AdminParams>, state: Arc<AdminState>) -> anyhow::Result<()> {
    for kind in ALL_KINDS {
        let svc: Arc<dyn RecordService<Value, AdminParams>> =
            Arc::new(CollectionAdapter::new(Arc::clone(&state), kind));
        app.register_service(kind.name, svc);
    }

    records::records_shared::register_hooks(app)?;
    schools::schools_shared::register_hooks(app, state)?;

    Ok(())
}
