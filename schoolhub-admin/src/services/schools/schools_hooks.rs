use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use schoolhub_core::errors::HubError;
use schoolhub_core::hooks::{BeforeHook, HookContext};
use serde_json::{json, Value};

use crate::kinds::SCHOOLS;
use crate::services::{AdminParams, AdminState};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OnDeletePolicy {
    Restrict,
    Cascade,
}

pub fn parse_on_delete(s: &str) -> Option<OnDeletePolicy> {
    match s.trim().to_lowercase().as_str() {
        "restrict" => Some(OnDeletePolicy::Restrict),
        "cascade" => Some(OnDeletePolicy::Cascade),
        _ => None,
    }
}

/// `?onDelete=` wins over the `schools.onDelete` config; restrict otherwise.
fn resolve_policy(ctx: &HookContext<Value, AdminParams>) -> Result<OnDeletePolicy> {
    if let Some(v) = ctx.params.query_value("onDelete") {
        return parse_on_delete(v).ok_or_else(|| {
            HubError::bad_request("Invalid onDelete policy")
                .with_errors(json!({"onDelete": ["must be one of: restrict, cascade"]}))
                .into_anyhow()
        });
    }

    if let Some(p) = ctx.config.get("schools.onDelete").and_then(parse_on_delete) {
        return Ok(p);
    }

    Ok(OnDeletePolicy::Restrict)
}

/// Applies the school deletion policy to the school's tenant records.
pub struct EnforceSchoolOnDelete {
    pub state: Arc<AdminState>,
}

#[async_trait]
impl BeforeHook<Value, AdminParams> for EnforceSchoolOnDelete {
    async fn run(&self, ctx: &mut HookContext<Value, AdminParams>) -> Result<()> {
        let Some(school_id) = ctx.id.clone() else {
            return Ok(());
        };

        let policy = resolve_policy(ctx)?;
        let store = &self.state.store;

        // Nothing is swept for a school the session cannot see.
        store.get(&SCHOOLS, &ctx.tenant.scope, &school_id).await?;

        let owned = store.count_by_school(&school_id).await?;
        if owned == 0 {
            return Ok(());
        }

        match policy {
            OnDeletePolicy::Restrict => {
                Err(HubError::conflict("Cannot delete a school that still has records")
                    .with_data(json!({"schoolId": school_id, "records": owned}))
                    .into_anyhow())
            }
            OnDeletePolicy::Cascade => {
                let removed = store.delete_by_school(&school_id).await?;
                tracing::info!(school = %school_id, removed, "cascaded school deletion");
                Ok(())
            }
        }
    }
}
