//! Hook pipeline types.
//!
//! A service call runs `around → before → service → after`, and error hooks
//! run when anything in that chain fails. Hooks registered on the app run
//! before hooks registered on a single service.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::{HubConfigSnapshot, RecordService, ServiceMethodKind, TenantContext};

pub type HookFut<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

/// Output of a service call.
#[derive(Debug, Clone)]
pub enum HookResult<R> {
    One(R),
    Many(Vec<R>),
}

/// Everything a hook can see or change about one service call.
pub struct HookContext<R, P>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    pub tenant: TenantContext,
    /// Registered service name, which is also the record type.
    pub service: String,
    pub method: ServiceMethodKind,
    pub params: P,
    pub id: Option<String>,
    /// Input payload for create/update/patch.
    pub data: Option<R>,
    pub result: Option<HookResult<R>>,
    pub error: Option<anyhow::Error>,
    pub config: HubConfigSnapshot,
}

impl<R, P> HookContext<R, P>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    pub fn new(
        tenant: TenantContext,
        service: impl Into<String>,
        method: ServiceMethodKind,
        params: P,
        config: HubConfigSnapshot,
    ) -> Self {
        Self {
            tenant,
            service: service.into(),
            method,
            params,
            id: None,
            data: None,
            result: None,
            error: None,
            config,
        }
    }
}

#[async_trait]
pub trait BeforeHook<R, P>: Send + Sync
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    async fn run(&self, ctx: &mut HookContext<R, P>) -> Result<()>;
}

#[async_trait]
pub trait AfterHook<R, P>: Send + Sync
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    async fn run(&self, ctx: &mut HookContext<R, P>) -> Result<()>;
}

/// Error hooks may inspect `ctx.error`, replace it, or clear it to recover.
#[async_trait]
pub trait ErrorHook<R, P>: Send + Sync
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    async fn run(&self, ctx: &mut HookContext<R, P>) -> Result<()>;
}

/// Around hooks wrap the rest of the chain and must call `next.run(ctx)`.
#[async_trait]
pub trait AroundHook<R, P>: Send + Sync
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    async fn run(&self, ctx: &mut HookContext<R, P>, next: Next<R, P>) -> Result<()>;
}

pub(crate) struct HookChain<R, P>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    pub(crate) around: Vec<Arc<dyn AroundHook<R, P>>>,
    pub(crate) before: Vec<Arc<dyn BeforeHook<R, P>>>,
    pub(crate) after: Vec<Arc<dyn AfterHook<R, P>>>,
    pub(crate) service: Arc<dyn RecordService<R, P>>,
}

/// The remainder of the pipeline, handed to around hooks.
pub struct Next<R, P>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    chain: Arc<HookChain<R, P>>,
    position: usize,
}

impl<R, P> Next<R, P>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    pub(crate) fn start(chain: Arc<HookChain<R, P>>) -> Self {
        Self { chain, position: 0 }
    }

    pub fn run(self, ctx: &mut HookContext<R, P>) -> HookFut<'_> {
        Box::pin(async move {
            if let Some(hook) = self.chain.around.get(self.position).cloned() {
                let next = Next {
                    chain: Arc::clone(&self.chain),
                    position: self.position + 1,
                };
                return hook.run(ctx, next).await;
            }

            for h in &self.chain.before {
                h.run(ctx).await?;
            }

            dispatch(self.chain.service.as_ref(), ctx).await?;

            for h in &self.chain.after {
                h.run(ctx).await?;
            }

            Ok(())
        })
    }
}

fn missing(what: &str, method: &ServiceMethodKind) -> anyhow::Error {
    crate::HubError::bad_request(format!("{}() requires {what}", method.as_str())).into_anyhow()
}

/// Call the service method named by `ctx.method`, storing its output in
/// `ctx.result`.
async fn dispatch<R, P>(svc: &dyn RecordService<R, P>, ctx: &mut HookContext<R, P>) -> Result<()>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    let method = ctx.method.clone();
    let params = ctx.params.clone();

    let result = match &method {
        ServiceMethodKind::Find => HookResult::Many(svc.find(&ctx.tenant, params).await?),
        ServiceMethodKind::Get => {
            let id = ctx.id.clone().ok_or_else(|| missing("an id", &method))?;
            HookResult::One(svc.get(&ctx.tenant, &id, params).await?)
        }
        ServiceMethodKind::Create => {
            let data = ctx.data.take().ok_or_else(|| missing("data", &method))?;
            HookResult::One(svc.create(&ctx.tenant, data, params).await?)
        }
        ServiceMethodKind::Update => {
            let id = ctx.id.clone().ok_or_else(|| missing("an id", &method))?;
            let data = ctx.data.take().ok_or_else(|| missing("data", &method))?;
            HookResult::One(svc.update(&ctx.tenant, &id, data, params).await?)
        }
        ServiceMethodKind::Patch => {
            let data = ctx.data.take().ok_or_else(|| missing("data", &method))?;
            HookResult::One(
                svc.patch(&ctx.tenant, ctx.id.as_deref(), data, params)
                    .await?,
            )
        }
        ServiceMethodKind::Remove => {
            HookResult::One(svc.remove(&ctx.tenant, ctx.id.as_deref(), params).await?)
        }
        ServiceMethodKind::Custom(name) => {
            return Err(crate::HubError::not_implemented(format!(
                "custom method '{name}' is not routed through the pipeline"
            ))
            .into_anyhow())
        }
    };

    ctx.result = Some(result);
    Ok(())
}

/// Hook registrations for one scope (the app, or one service).
pub struct ServiceHooks<R, P>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    pub(crate) around_all: Vec<Arc<dyn AroundHook<R, P>>>,
    pub(crate) around_by_method: HashMap<ServiceMethodKind, Vec<Arc<dyn AroundHook<R, P>>>>,
    pub(crate) before_all: Vec<Arc<dyn BeforeHook<R, P>>>,
    pub(crate) before_by_method: HashMap<ServiceMethodKind, Vec<Arc<dyn BeforeHook<R, P>>>>,
    pub(crate) after_all: Vec<Arc<dyn AfterHook<R, P>>>,
    pub(crate) after_by_method: HashMap<ServiceMethodKind, Vec<Arc<dyn AfterHook<R, P>>>>,
    pub(crate) error_all: Vec<Arc<dyn ErrorHook<R, P>>>,
    pub(crate) error_by_method: HashMap<ServiceMethodKind, Vec<Arc<dyn ErrorHook<R, P>>>>,
}

impl<R, P> Default for ServiceHooks<R, P>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<R, P> ServiceHooks<R, P>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    pub fn new() -> Self {
        Self {
            around_all: Vec::new(),
            around_by_method: HashMap::new(),
            before_all: Vec::new(),
            before_by_method: HashMap::new(),
            after_all: Vec::new(),
            after_by_method: HashMap::new(),
            error_all: Vec::new(),
            error_by_method: HashMap::new(),
        }
    }

    pub fn around_all(&mut self, hook: Arc<dyn AroundHook<R, P>>) -> &mut Self {
        self.around_all.push(hook);
        self
    }

    pub fn around(
        &mut self,
        method: ServiceMethodKind,
        hook: Arc<dyn AroundHook<R, P>>,
    ) -> &mut Self {
        self.around_by_method.entry(method).or_default().push(hook);
        self
    }

    pub fn before_all(&mut self, hook: Arc<dyn BeforeHook<R, P>>) -> &mut Self {
        self.before_all.push(hook);
        self
    }

    pub fn before(
        &mut self,
        method: ServiceMethodKind,
        hook: Arc<dyn BeforeHook<R, P>>,
    ) -> &mut Self {
        self.before_by_method.entry(method).or_default().push(hook);
        self
    }

    pub fn before_create(&mut self, hook: Arc<dyn BeforeHook<R, P>>) -> &mut Self {
        self.before(ServiceMethodKind::Create, hook)
    }

    pub fn before_update(&mut self, hook: Arc<dyn BeforeHook<R, P>>) -> &mut Self {
        self.before(ServiceMethodKind::Update, hook)
    }

    pub fn before_patch(&mut self, hook: Arc<dyn BeforeHook<R, P>>) -> &mut Self {
        self.before(ServiceMethodKind::Patch, hook)
    }

    pub fn before_remove(&mut self, hook: Arc<dyn BeforeHook<R, P>>) -> &mut Self {
        self.before(ServiceMethodKind::Remove, hook)
    }

    pub fn after_all(&mut self, hook: Arc<dyn AfterHook<R, P>>) -> &mut Self {
        self.after_all.push(hook);
        self
    }

    pub fn after(
        &mut self,
        method: ServiceMethodKind,
        hook: Arc<dyn AfterHook<R, P>>,
    ) -> &mut Self {
        self.after_by_method.entry(method).or_default().push(hook);
        self
    }

    pub fn after_find(&mut self, hook: Arc<dyn AfterHook<R, P>>) -> &mut Self {
        self.after(ServiceMethodKind::Find, hook)
    }

    pub fn error_all(&mut self, hook: Arc<dyn ErrorHook<R, P>>) -> &mut Self {
        self.error_all.push(hook);
        self
    }

    pub fn error(
        &mut self,
        method: ServiceMethodKind,
        hook: Arc<dyn ErrorHook<R, P>>,
    ) -> &mut Self {
        self.error_by_method.entry(method).or_default().push(hook);
        self
    }
}

/// `all` hooks first, then the ones registered for `method`.
pub(crate) fn collect_method_hooks<H: ?Sized>(
    all: &[Arc<H>],
    by_method: &HashMap<ServiceMethodKind, Vec<Arc<H>>>,
    method: &ServiceMethodKind,
) -> Vec<Arc<H>> {
    let mut out: Vec<Arc<H>> = all.to_vec();
    if let Some(specific) = by_method.get(method) {
        out.extend(specific.iter().cloned());
    }
    out
}
