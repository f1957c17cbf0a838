use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::Result;

use crate::hooks::{collect_method_hooks, HookChain};
use crate::{
    HookContext, HookResult, HubConfig, HubError, Next, RecordService, ServiceHooks,
    ServiceMethodKind, ServiceRegistry, TenantContext,
};

struct HubAppInner<R, P>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    registry: RwLock<ServiceRegistry<R, P>>,
    global_hooks: RwLock<ServiceHooks<R, P>>,
    service_hooks: RwLock<HashMap<String, ServiceHooks<R, P>>>,
    config: RwLock<HubConfig>,
}

/// HubApp is the central application container.
///
/// Transport-agnostic. Holds:
/// - service registry (one service per record type)
/// - app hooks
/// - per-service hooks
/// - config
pub struct HubApp<R, P = ()>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    inner: Arc<HubAppInner<R, P>>,
}

// A panic while holding one of these locks leaves plain data behind, so a
// poisoned guard is still safe to use.
fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|e| e.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|e| e.into_inner())
}

type HooksForMethod<R, P> = (
    Vec<Arc<dyn crate::AroundHook<R, P>>>,
    Vec<Arc<dyn crate::BeforeHook<R, P>>>,
    Vec<Arc<dyn crate::AfterHook<R, P>>>,
    Vec<Arc<dyn crate::ErrorHook<R, P>>>,
);

impl<R, P> Default for HubApp<R, P>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<R, P> Clone for HubApp<R, P>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R, P> HubApp<R, P>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    pub fn new() -> Self {
        Self {
            inner: Arc::new(HubAppInner {
                registry: RwLock::new(ServiceRegistry::new()),
                global_hooks: RwLock::new(ServiceHooks::new()),
                service_hooks: RwLock::new(HashMap::new()),
                config: RwLock::new(HubConfig::new()),
            }),
        }
    }

    pub fn register_service<S>(&self, name: S, service: Arc<dyn RecordService<R, P>>)
    where
        S: Into<String>,
    {
        write(&self.inner.registry).register(name.into(), service);
    }

    /// App-wide hooks, run before any service's own hooks.
    pub fn hooks<F>(&self, f: F)
    where
        F: FnOnce(&mut ServiceHooks<R, P>),
    {
        let mut g = write(&self.inner.global_hooks);
        f(&mut g);
    }

    pub(crate) fn configure_service_hooks<F>(&self, service_name: &str, f: F)
    where
        F: FnOnce(&mut ServiceHooks<R, P>),
    {
        let mut map = write(&self.inner.service_hooks);
        let hooks = map.entry(service_name.to_string()).or_default();
        f(hooks);
    }

    /// Handle to a registered service; calls through it run the hook pipeline.
    pub fn service(&self, name: &str) -> Result<ServiceHandle<R, P>> {
        let svc = read(&self.inner.registry)
            .get(name)
            .cloned()
            .ok_or_else(|| {
                HubError::not_found(format!("Unknown record type: {name}")).into_anyhow()
            })?;

        Ok(ServiceHandle {
            app: self.clone(),
            name: name.to_string(),
            service: svc,
        })
    }

    pub fn set<K, V>(&self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        write(&self.inner.config).set(key, value);
    }

    pub fn get(&self, key: &str) -> Option<String> {
        read(&self.inner.config).get(key).map(|v| v.to_string())
    }

    /// Overlay prefixed environment variables onto the config.
    pub fn load_env(&self, prefix: &str) -> usize {
        write(&self.inner.config).apply_env(prefix, std::env::vars())
    }

    pub fn config_snapshot(&self) -> crate::HubConfigSnapshot {
        read(&self.inner.config).snapshot()
    }
}

pub struct ServiceHandle<R, P>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    app: HubApp<R, P>,
    name: String,
    service: Arc<dyn RecordService<R, P>>,
}

impl<R, P> ServiceHandle<R, P>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    pub fn hooks<F>(self, f: F) -> Self
    where
        F: FnOnce(&mut ServiceHooks<R, P>),
    {
        self.app.configure_service_hooks(&self.name, f);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Global hooks first, then the service's.
    fn collect_hooks_for_method(&self, method: &ServiceMethodKind) -> HooksForMethod<R, P> {
        let g = read(&self.app.inner.global_hooks);
        let map = read(&self.app.inner.service_hooks);
        let s = map.get(&self.name);

        let mut around = collect_method_hooks(&g.around_all, &g.around_by_method, method);
        let mut before = collect_method_hooks(&g.before_all, &g.before_by_method, method);
        let mut after = collect_method_hooks(&g.after_all, &g.after_by_method, method);
        let mut error = collect_method_hooks(&g.error_all, &g.error_by_method, method);

        if let Some(h) = s {
            around.extend(collect_method_hooks(&h.around_all, &h.around_by_method, method));
            before.extend(collect_method_hooks(&h.before_all, &h.before_by_method, method));
            after.extend(collect_method_hooks(&h.after_all, &h.after_by_method, method));
            error.extend(collect_method_hooks(&h.error_all, &h.error_by_method, method));
        }

        (around, before, after, error)
    }

    fn context(
        &self,
        tenant: TenantContext,
        method: ServiceMethodKind,
        params: P,
    ) -> HookContext<R, P> {
        HookContext::new(tenant, self.name.clone(), method, params, self.app.config_snapshot())
    }

    /// around → before → service → after, then error hooks on failure.
    async fn run_pipeline(&self, mut ctx: HookContext<R, P>) -> Result<HookContext<R, P>> {
        if !self.service.capabilities().allows(&ctx.method) {
            return Err(HubError::method_not_allowed(format!(
                "{} does not support {}",
                self.name,
                ctx.method.as_str()
            ))
            .into_anyhow());
        }

        let (around, before, after, error) = self.collect_hooks_for_method(&ctx.method);

        let chain = Arc::new(HookChain {
            around,
            before,
            after,
            service: Arc::clone(&self.service),
        });

        if let Err(e) = Next::start(chain).run(&mut ctx).await {
            ctx.error = Some(e);

            for h in &error {
                if let Err(hook_err) = h.run(&mut ctx).await {
                    ctx.error = Some(hook_err);
                }
            }

            if let Some(err) = ctx.error.take() {
                return Err(err);
            }
        }

        Ok(ctx)
    }

    async fn call_one(&self, ctx: HookContext<R, P>) -> Result<R> {
        let method = ctx.method.as_str();
        match self.run_pipeline(ctx).await?.result {
            Some(HookResult::One(v)) => Ok(v),
            Some(HookResult::Many(_)) => Err(anyhow::anyhow!("{method}() produced many results")),
            None => Err(anyhow::anyhow!("{method}() produced no result")),
        }
    }

    pub async fn find(&self, tenant: TenantContext, params: P) -> Result<Vec<R>> {
        let ctx = self.context(tenant, ServiceMethodKind::Find, params);

        match self.run_pipeline(ctx).await?.result {
            Some(HookResult::Many(v)) => Ok(v),
            Some(HookResult::One(_)) => Err(anyhow::anyhow!("find() produced a single result")),
            None => Ok(vec![]),
        }
    }

    pub async fn get(&self, tenant: TenantContext, id: &str, params: P) -> Result<R> {
        let mut ctx = self.context(tenant, ServiceMethodKind::Get, params);
        ctx.id = Some(id.to_string());
        self.call_one(ctx).await
    }

    pub async fn create(&self, tenant: TenantContext, data: R, params: P) -> Result<R> {
        let mut ctx = self.context(tenant, ServiceMethodKind::Create, params);
        ctx.data = Some(data);
        self.call_one(ctx).await
    }

    pub async fn update(&self, tenant: TenantContext, id: &str, data: R, params: P) -> Result<R> {
        let mut ctx = self.context(tenant, ServiceMethodKind::Update, params);
        ctx.id = Some(id.to_string());
        ctx.data = Some(data);
        self.call_one(ctx).await
    }

    pub async fn patch(
        &self,
        tenant: TenantContext,
        id: Option<&str>,
        data: R,
        params: P,
    ) -> Result<R> {
        let mut ctx = self.context(tenant, ServiceMethodKind::Patch, params);
        ctx.id = id.map(str::to_string);
        ctx.data = Some(data);
        self.call_one(ctx).await
    }

    pub async fn remove(&self, tenant: TenantContext, id: Option<&str>, params: P) -> Result<R> {
        let mut ctx = self.context(tenant, ServiceMethodKind::Remove, params);
        ctx.id = id.map(str::to_string);
        self.call_one(ctx).await
    }
}
