//! Role-gated writes for in-process callers (pages, seeding).
//!
//! The role checks themselves live in the [`AccessPolicy`] and are enforced
//! by the global `GateMutations` hook; the gateway only routes a payload to
//! the right service method so every caller goes through the same pipeline.

use std::sync::Arc;

use anyhow::Result;
use schoolhub_axum::params::RestParams;
use schoolhub_core::{AccessPolicy, HubApp, Role, TenantContext};
use serde_json::Value;

use crate::kinds::{COUNSELLING, DISCIPLINARY, EXAM_RESULTS, INVENTORY, SCHOOLS, STAFF};
use crate::services::AdminParams;

/// Who may write which record type.
pub fn school_policy() -> AccessPolicy {
    use Role::*;

    AccessPolicy::new()
        .allow(
            DISCIPLINARY.name,
            &[Teacher, HeadTeacher, AssistantHeadTeacher, PrimaryAdmin, SystemAdmin],
        )
        .allow(
            COUNSELLING.name,
            &[Counsellor, HeadTeacher, AssistantHeadTeacher, PrimaryAdmin, SystemAdmin],
        )
        .allow(
            EXAM_RESULTS.name,
            &[Teacher, HeadTeacher, PrimaryAdmin, SystemAdmin, Kindergarten],
        )
        .allow(INVENTORY.name, &[Librarian, HeadTeacher, PrimaryAdmin, SystemAdmin])
        .allow(STAFF.name, &[HeadTeacher, PrimaryAdmin, SystemAdmin])
        .platform(SCHOOLS.name, &[SystemAdmin])
}

#[derive(Clone)]
pub struct MutationGateway {
    app: HubApp<Value, AdminParams>,
    policy: Arc<AccessPolicy>,
}

impl MutationGateway {
    pub fn new(app: HubApp<Value, AdminParams>, policy: Arc<AccessPolicy>) -> Self {
        Self { app, policy }
    }

    pub fn policy(&self) -> &Arc<AccessPolicy> {
        &self.policy
    }

    pub fn can_mutate(&self, role: Role, record_type: &str) -> bool {
        self.policy.can_mutate(role, record_type)
    }

    pub async fn list(&self, record_type: &str, session: &TenantContext) -> Result<Vec<Value>> {
        self.app
            .service(record_type)?
            .find(session.clone(), RestParams::internal())
            .await
    }

    /// Create when the payload has no `id`, otherwise replace that record.
    /// Returns the stored record with its id and timestamps.
    pub async fn write(
        &self,
        record_type: &str,
        mut payload: Value,
        session: &TenantContext,
    ) -> Result<Value> {
        let svc = self.app.service(record_type)?;

        let id = payload
            .as_object_mut()
            .and_then(|obj| obj.remove("id"))
            .and_then(|v| v.as_str().map(str::to_string));

        match id {
            Some(id) => svc.update(session.clone(), &id, payload, RestParams::internal()).await,
            None => svc.create(session.clone(), payload, RestParams::internal()).await,
        }
    }

    pub async fn remove(
        &self,
        record_type: &str,
        id: &str,
        session: &TenantContext,
    ) -> Result<Value> {
        self.app
            .service(record_type)?
            .remove(session.clone(), Some(id), RestParams::internal())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listed(record_type: &str) -> Vec<Role> {
        use Role::*;
        match record_type {
            "disciplinary" => {
                vec![Teacher, HeadTeacher, AssistantHeadTeacher, PrimaryAdmin, SystemAdmin]
            }
            "counselling" => {
                vec![Counsellor, HeadTeacher, AssistantHeadTeacher, PrimaryAdmin, SystemAdmin]
            }
            "exam-results" => vec![Teacher, HeadTeacher, PrimaryAdmin, SystemAdmin, Kindergarten],
            "inventory" => vec![Librarian, HeadTeacher, PrimaryAdmin, SystemAdmin],
            "staff" => vec![HeadTeacher, PrimaryAdmin, SystemAdmin],
            "schools" => vec![SystemAdmin],
            _ => vec![],
        }
    }

    #[test]
    fn allow_lists_match_exactly_for_every_role() {
        let policy = school_policy();
        let types = [
            "disciplinary",
            "counselling",
            "exam-results",
            "inventory",
            "staff",
            "schools",
            "reports",
        ];

        for record_type in types {
            let allowed = listed(record_type);
            for role in Role::ALL {
                assert_eq!(
                    policy.can_mutate(role, record_type),
                    allowed.contains(&role),
                    "{role} on {record_type}"
                );
            }
        }
    }

    #[test]
    fn schools_are_the_only_platform_records() {
        let policy = school_policy();
        for record_type in policy.record_types() {
            let rule = policy.rule(record_type).unwrap();
            assert_eq!(rule.tenant_scoped, record_type != "schools", "{record_type}");
        }
    }
}
