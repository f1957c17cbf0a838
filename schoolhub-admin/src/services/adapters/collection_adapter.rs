use std::sync::Arc;

use anyhow::Result;
use schoolhub_core::tenant::TenantContext;
use schoolhub_core::ServiceCapabilities;
use serde_json::Value;

use crate::kinds::RecordKind;
use crate::services::{AdminParams, AdminState};

/// Exposes one record kind of the shared [`RecordStore`](super::RecordStore)
/// as a service. The session scope is applied to every call.
pub struct CollectionAdapter {
    pub state: Arc<AdminState>,
    pub kind: &'static RecordKind,
    pub capabilities: ServiceCapabilities,
}

impl CollectionAdapter {
    pub fn new(state: Arc<AdminState>, kind: &'static RecordKind) -> Self {
        Self {
            state,
            kind,
            capabilities: ServiceCapabilities::standard_crud(),
        }
    }

    pub async fn list_in(&self, ctx: &TenantContext) -> Result<Vec<Value>> {
        self.state.store.list(self.kind, &ctx.scope).await
    }

    pub async fn fetch(&self, ctx: &TenantContext, id: &str) -> Result<Value> {
        self.state.store.get(self.kind, &ctx.scope, id).await
    }

    /// The gate has already stamped `schoolId`, so no scope is needed here.
    pub async fn insert(&self, _ctx: &TenantContext, data: Value) -> Result<Value> {
        self.state.store.insert(self.kind, data).await
    }

    pub async fn replace(&self, ctx: &TenantContext, id: &str, data: Value) -> Result<Value> {
        self.state.store.replace(self.kind, &ctx.scope, id, data).await
    }

    pub async fn merge(&self, ctx: &TenantContext, id: &str, patch: Value) -> Result<Value> {
        self.state.store.merge(self.kind, &ctx.scope, id, patch).await
    }

    pub async fn delete(&self, ctx: &TenantContext, id: &str) -> Result<Value> {
        self.state.store.delete(self.kind, &ctx.scope, id).await
    }
}

schoolhub_core::hub_adapter!(CollectionAdapter => Value, AdminParams);

#[cfg(test)]
mod tests {
    use schoolhub_core::{ErrorKind, HubError, RecordService, Role};
    use serde_json::json;

    use super::*;
    use crate::kinds::EXAM_RESULTS;

    #[tokio::test]
    async fn patch_and_remove_need_an_id() {
        let svc = CollectionAdapter::new(Arc::new(AdminState::new(true)), &EXAM_RESULTS);
        let ctx = TenantContext::new(Role::Teacher, "sch_a");

        let err = svc
            .patch(&ctx, None, json!({"score": 10}), AdminParams::internal())
            .await
            .unwrap_err();
        assert_eq!(HubError::kind_of(&err), ErrorKind::BadRequest);

        let err = svc.remove(&ctx, None, AdminParams::internal()).await.unwrap_err();
        assert_eq!(HubError::kind_of(&err), ErrorKind::BadRequest);
    }

    #[tokio::test]
    async fn reads_follow_the_session_scope() {
        let svc = CollectionAdapter::new(Arc::new(AdminState::new(true)), &EXAM_RESULTS);
        let created = svc
            .create(
                &TenantContext::new(Role::Teacher, "sch_a"),
                json!({"schoolId": "sch_a", "studentName": "Ama Mensah"}),
                AdminParams::internal(),
            )
            .await
            .unwrap();
        let id = created["id"].as_str().unwrap();

        let other = TenantContext::new(Role::Teacher, "sch_b");
        assert!(svc.find(&other, AdminParams::internal()).await.unwrap().is_empty());
        let err = svc.get(&other, id, AdminParams::internal()).await.unwrap_err();
        assert_eq!(HubError::kind_of(&err), ErrorKind::NotFound);
    }
}
