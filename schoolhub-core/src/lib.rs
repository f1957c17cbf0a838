//! schoolhub-core: transport-agnostic core for SchoolHub.
//!
//! Record services run behind a hook pipeline that always knows which
//! tenant and role it is acting for. Role and tenant rules live in one
//! declarative [`AccessPolicy`] enforced by the [`GateMutations`] hook.

pub mod access;
pub mod app;
pub mod config;
pub mod errors;
pub mod hooks;
pub mod registry;
pub mod schema;
pub mod service;
pub mod tenant;

#[cfg(feature = "adapters")]
mod adapters;

pub use access::{AccessPolicy, GateMutations, RecordRule};
pub use app::{HubApp, ServiceHandle};
pub use config::{HubConfig, HubConfigSnapshot};
pub use errors::{ErrorKind, HubError, HubResult};
pub use hooks::{
    AfterHook, AroundHook, BeforeHook, ErrorHook, HookContext, HookFut, HookResult, Next,
    ServiceHooks,
};
pub use registry::ServiceRegistry;
pub use schema::{ResolveData, SchemaHooksExt, WriteMethods};
pub use service::{RecordService, ServiceCapabilities, ServiceMethodKind};
pub use tenant::{Role, TenantContext, TenantId, TenantScope, TenantScoped, ALL_TENANTS};
