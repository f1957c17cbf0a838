use std::collections::BTreeMap;

use anyhow::Result;
use schoolhub_core::TenantContext;
use serde::Serialize;

use crate::gateway::MutationGateway;
use crate::kinds::ALL_KINDS;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub role: String,
    pub scope: String,
    /// Record counts per type within the session scope.
    pub counts: BTreeMap<String, usize>,
    /// Record types this role may create, edit or delete.
    pub writable: Vec<String>,
    pub simulation: bool,
}

/// Role-based landing summary. In simulation mode the store is never called.
pub async fn summary(
    gateway: &MutationGateway,
    session: &TenantContext,
    store_available: bool,
) -> Result<DashboardSummary> {
    let mut counts = BTreeMap::new();
    if store_available {
        for kind in ALL_KINDS {
            let records = gateway.list(kind.name, session).await?;
            counts.insert(kind.name.to_string(), records.len());
        }
    }

    Ok(DashboardSummary {
        role: session.role.to_string(),
        scope: session.scope.to_string(),
        counts,
        writable: gateway.policy().writable_by(session.role),
        simulation: !store_available,
    })
}
