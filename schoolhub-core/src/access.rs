//! Role-gated mutation access.
//!
//! [`AccessPolicy`] is a declarative table from record type to the roles
//! allowed to create, update, patch or remove it. [`GateMutations`] enforces
//! the table (and tenant ownership of payloads) as a before-hook, so a
//! rejected write never reaches the store.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::errors::HubError;
use crate::hooks::{BeforeHook, HookContext};
use crate::tenant::{Role, TenantContext, TenantScope, TenantScoped};
use crate::ServiceMethodKind;

/// Write rule for one record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordRule {
    pub writers: Vec<Role>,
    /// Tenant-scoped records carry a `schoolId` that must match the session.
    pub tenant_scoped: bool,
}

#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    rules: BTreeMap<String, RecordRule>,
}

impl AccessPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// A tenant-scoped record type writable by `writers`.
    pub fn allow(mut self, record_type: impl Into<String>, writers: &[Role]) -> Self {
        self.rules.insert(
            record_type.into(),
            RecordRule {
                writers: writers.to_vec(),
                tenant_scoped: true,
            },
        );
        self
    }

    /// A platform-level record type (not owned by any school).
    pub fn platform(mut self, record_type: impl Into<String>, writers: &[Role]) -> Self {
        self.rules.insert(
            record_type.into(),
            RecordRule {
                writers: writers.to_vec(),
                tenant_scoped: false,
            },
        );
        self
    }

    pub fn rule(&self, record_type: &str) -> Option<&RecordRule> {
        self.rules.get(record_type)
    }

    pub fn record_types(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    /// Unknown record types deny every role.
    pub fn can_mutate(&self, role: Role, record_type: &str) -> bool {
        self.rule(record_type)
            .map(|r| r.writers.contains(&role))
            .unwrap_or(false)
    }

    /// Record types the role may write, in name order.
    pub fn writable_by(&self, role: Role) -> Vec<String> {
        self.rules
            .iter()
            .filter(|(_, r)| r.writers.contains(&role))
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn ensure_can_mutate(
        &self,
        tenant: &TenantContext,
        record_type: &str,
    ) -> Result<&RecordRule> {
        match self.rule(record_type) {
            Some(rule) if rule.writers.contains(&tenant.role) => Ok(rule),
            _ => Err(HubError::permission_denied(format!(
                "role '{}' may not modify {record_type}",
                tenant.role
            ))
            .into_anyhow()),
        }
    }

    /// Check (and complete) the tenant ownership of a write payload.
    ///
    /// A payload without `schoolId` is stamped with the session's school on
    /// create/update; an unscoped super-admin must name one on create.
    pub fn claim_payload<R: TenantScoped>(
        &self,
        tenant: &TenantContext,
        record_type: &str,
        method: &ServiceMethodKind,
        payload: &mut R,
    ) -> Result<()> {
        let Some(rule) = self.rule(record_type) else {
            return Ok(());
        };
        if !rule.tenant_scoped {
            return Ok(());
        }

        match (payload.school_id(), &tenant.scope) {
            (Some(claimed), TenantScope::School(own))
                if claimed != own.as_str() && !tenant.role.is_super_admin() =>
            {
                Err(HubError::tenant_mismatch(format!(
                    "{record_type} record belongs to school '{claimed}', \
                     session is scoped to '{own}'"
                ))
                .into_anyhow())
            }
            (Some(_), _) => Ok(()),
            (None, TenantScope::School(own)) => {
                if matches!(method, ServiceMethodKind::Create | ServiceMethodKind::Update) {
                    payload.assign_school_id(own.as_str());
                }
                Ok(())
            }
            (None, TenantScope::All) => {
                if matches!(method, ServiceMethodKind::Create) {
                    return Err(missing_school_id(record_type));
                }
                Ok(())
            }
        }
    }
}

#[cfg(feature = "serde")]
fn missing_school_id(record_type: &str) -> anyhow::Error {
    HubError::validation(format!("{record_type} schema validation failed"))
        .with_errors(serde_json::json!({"schoolId": ["is required when acting across schools"]}))
        .into_anyhow()
}

#[cfg(not(feature = "serde"))]
fn missing_school_id(record_type: &str) -> anyhow::Error {
    HubError::validation(format!(
        "{record_type}: schoolId is required when acting across schools"
    ))
    .into_anyhow()
}

/// Before-hook enforcing an [`AccessPolicy`] on every write method.
pub struct GateMutations {
    policy: Arc<AccessPolicy>,
}

impl GateMutations {
    pub fn new(policy: Arc<AccessPolicy>) -> Self {
        Self { policy }
    }
}

#[async_trait]
impl<R, P> BeforeHook<R, P> for GateMutations
where
    R: TenantScoped + Send + 'static,
    P: Send + Clone + 'static,
{
    async fn run(&self, ctx: &mut HookContext<R, P>) -> Result<()> {
        if !ctx.method.is_write() {
            return Ok(());
        }

        self.policy.ensure_can_mutate(&ctx.tenant, &ctx.service)?;

        if let Some(data) = ctx.data.as_mut() {
            self.policy
                .claim_payload(&ctx.tenant, &ctx.service, &ctx.method, data)?;
        }

        Ok(())
    }
}
