use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use async_trait::async_trait;
use schoolhub_core::hooks::{AroundHook, ErrorHook, HookContext, Next};
use schoolhub_core::{AccessPolicy, GateMutations, HubApp, HubError};
use serde_json::Value;

use crate::services::AdminParams;

pub struct TraceCalls;

#[async_trait]
impl AroundHook<Value, AdminParams> for TraceCalls {
    async fn run(
        &self,
        ctx: &mut HookContext<Value, AdminParams>,
        next: Next<Value, AdminParams>,
    ) -> Result<()> {
        let started = Instant::now();
        tracing::debug!(
            service = %ctx.service,
            method = ctx.method.as_str(),
            role = %ctx.tenant.role,
            scope = %ctx.tenant.scope,
            provider = %ctx.params.provider,
            "service call"
        );

        let res = next.run(ctx).await;

        tracing::debug!(
            service = %ctx.service,
            method = ctx.method.as_str(),
            ok = res.is_ok(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "service call finished"
        );
        res
    }
}

pub struct LogFailures;

#[async_trait]
impl ErrorHook<Value, AdminParams> for LogFailures {
    async fn run(&self, ctx: &mut HookContext<Value, AdminParams>) -> Result<()> {
        if let Some(err) = &ctx.error {
            let kind = HubError::kind_of(err);
            if kind.status_code() >= 500 {
                tracing::error!(
                    service = %ctx.service,
                    method = ctx.method.as_str(),
                    error = %err,
                    "service call failed"
                );
            } else {
                tracing::warn!(
                    service = %ctx.service,
                    method = ctx.method.as_str(),
                    role = %ctx.tenant.role,
                    kind = kind.name(),
                    error = %err,
                    "service call rejected"
                );
            }
        }
        Ok(())
    }
}

pub fn global_hooks(app: &HubApp<Value, AdminParams>, policy: Arc<AccessPolicy>) {
    app.hooks(|h| {
        h.around_all(Arc::new(TraceCalls));
        h.before_all(Arc::new(GateMutations::new(policy)));
        h.error_all(Arc::new(LogFailures));
    });
}
