//! Core multi-tenant types for SchoolHub.
//!
//! Every service call carries a [`TenantContext`]: the acting role and the
//! school it is scoped to. The context is built once at the outer boundary
//! (HTTP handler, page controller, seeding job) and passed explicitly from
//! there on; business logic never looks up ambient session state.

use std::fmt;
use std::str::FromStr;

use crate::errors::HubError;

/// Sentinel accepted by [`TenantContext::resolve`] for "no tenant filter".
pub const ALL_TENANTS: &str = "ALL";

/// A school identifier. Every tenant-scoped record carries one as `schoolId`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TenantId(pub String);

impl TenantId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Staff roles known to the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    Teacher,
    HeadTeacher,
    AssistantHeadTeacher,
    PrimaryAdmin,
    SystemAdmin,
    Librarian,
    Kindergarten,
    Counsellor,
}

impl Role {
    pub const ALL: [Role; 8] = [
        Role::Teacher,
        Role::HeadTeacher,
        Role::AssistantHeadTeacher,
        Role::PrimaryAdmin,
        Role::SystemAdmin,
        Role::Librarian,
        Role::Kindergarten,
        Role::Counsellor,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Teacher => "teacher",
            Role::HeadTeacher => "head-teacher",
            Role::AssistantHeadTeacher => "assistant-head-teacher",
            Role::PrimaryAdmin => "primary-admin",
            Role::SystemAdmin => "system-admin",
            Role::Librarian => "librarian",
            Role::Kindergarten => "kindergarten",
            Role::Counsellor => "counsellor",
        }
    }

    /// The super-admin role: may act across every school.
    pub fn is_super_admin(&self) -> bool {
        matches!(self, Role::SystemAdmin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = HubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Role::ALL
            .iter()
            .copied()
            .find(|r| r.as_str() == wanted)
            .ok_or_else(|| HubError::bad_request(format!("unknown role: {s}")))
    }
}

/// Which records an operation may see.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TenantScope {
    School(TenantId),
    /// No tenant filter. Only ever granted to the super-admin role.
    All,
}

impl TenantScope {
    /// True when a record owned by `school_id` is visible in this scope.
    pub fn admits(&self, school_id: Option<&str>) -> bool {
        match self {
            TenantScope::All => true,
            TenantScope::School(t) => school_id == Some(t.as_str()),
        }
    }
}

impl fmt::Display for TenantScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TenantScope::School(t) => write!(f, "{t}"),
            TenantScope::All => f.write_str(ALL_TENANTS),
        }
    }
}

/// Context carried with every SchoolHub operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantContext {
    pub role: Role,
    pub scope: TenantScope,
}

impl TenantContext {
    /// A session scoped to one school.
    pub fn new<S: Into<String>>(role: Role, tenant: S) -> Self {
        Self {
            role,
            scope: TenantScope::School(TenantId(tenant.into())),
        }
    }

    /// The unscoped super-admin session.
    pub fn all_tenants() -> Self {
        Self {
            role: Role::SystemAdmin,
            scope: TenantScope::All,
        }
    }

    /// Build a session from the raw role/tenant pair handed over by the
    /// outer boundary.
    ///
    /// - no tenant (or `ALL`) is unscoped for the super-admin role
    /// - no tenant is `NotAuthenticated` for every other role
    /// - `ALL` is `PermissionDenied` for every other role
    pub fn resolve(role: Role, tenant: Option<&str>) -> Result<Self, HubError> {
        let tenant = tenant.map(str::trim).filter(|t| !t.is_empty());

        match tenant {
            None | Some(ALL_TENANTS) if role.is_super_admin() => Ok(Self::all_tenants()),
            None => Err(HubError::not_authenticated(format!(
                "no school is associated with this {role} session"
            ))),
            Some(ALL_TENANTS) => Err(HubError::permission_denied(format!(
                "role '{role}' may not read across schools"
            ))),
            Some(t) => Ok(Self::new(role, t)),
        }
    }

    pub fn tenant_id(&self) -> Option<&TenantId> {
        match &self.scope {
            TenantScope::School(t) => Some(t),
            TenantScope::All => None,
        }
    }
}

/// Records that belong to one school through a `schoolId` field.
pub trait TenantScoped {
    fn school_id(&self) -> Option<&str>;
    fn assign_school_id(&mut self, school_id: &str);
}

#[cfg(feature = "serde")]
impl TenantScoped for serde_json::Value {
    fn school_id(&self) -> Option<&str> {
        self.get("schoolId").and_then(|v| v.as_str())
    }

    fn assign_school_id(&mut self, school_id: &str) {
        if let Some(obj) = self.as_object_mut() {
            obj.insert(
                "schoolId".to_string(),
                serde_json::Value::String(school_id.to_string()),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    #[test]
    fn roles_parse_from_their_wire_names() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert_eq!(" Head-Teacher ".parse::<Role>().unwrap(), Role::HeadTeacher);
        assert!("janitor".parse::<Role>().is_err());
    }

    #[test]
    fn super_admin_without_tenant_is_unscoped() {
        let ctx = TenantContext::resolve(Role::SystemAdmin, None).unwrap();
        assert_eq!(ctx.scope, TenantScope::All);

        let ctx = TenantContext::resolve(Role::SystemAdmin, Some("ALL")).unwrap();
        assert_eq!(ctx.scope, TenantScope::All);
    }

    #[test]
    fn missing_tenant_blocks_every_other_role() {
        for role in Role::ALL.into_iter().filter(|r| !r.is_super_admin()) {
            let err = TenantContext::resolve(role, Some("  ")).unwrap_err();
            assert_eq!(err.kind, ErrorKind::NotAuthenticated);

            let err = TenantContext::resolve(role, Some(ALL_TENANTS)).unwrap_err();
            assert_eq!(err.kind, ErrorKind::PermissionDenied);
        }
    }

    #[test]
    fn school_scope_only_admits_its_own_records() {
        let scope = TenantContext::new(Role::Teacher, "A").scope;
        assert!(scope.admits(Some("A")));
        assert!(!scope.admits(Some("B")));
        assert!(!scope.admits(None));
        assert!(TenantScope::All.admits(None));
    }
}
