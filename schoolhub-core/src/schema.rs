//! Payload hooks for write methods.
//!
//! A resolver rewrites `ctx.data` in place before the service sees it. The
//! validation boundary in `schoolhub-schema` is built on this: it parses the
//! payload into a schema type and writes back only the declared fields.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::{BeforeHook, HookContext, ServiceHooks, ServiceMethodKind, TenantContext};

/// Which write methods a payload hook applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMethods {
    Create,
    Patch,
    Update,
    AllWrites,
}

impl WriteMethods {
    pub fn matches(&self, method: &ServiceMethodKind) -> bool {
        match self {
            WriteMethods::AllWrites => {
                method.is_write() && !matches!(method, ServiceMethodKind::Remove)
            }
            WriteMethods::Create => matches!(method, ServiceMethodKind::Create),
            WriteMethods::Patch => matches!(method, ServiceMethodKind::Patch),
            WriteMethods::Update => matches!(method, ServiceMethodKind::Update),
        }
    }
}

pub type ResolveFn<R> = Arc<dyn Fn(&mut R, &TenantContext) -> Result<()> + Send + Sync + 'static>;

/// Runs a resolver over the payload of the matching write methods.
pub struct ResolveData<R> {
    methods: WriteMethods,
    resolver: ResolveFn<R>,
}

impl<R> ResolveData<R> {
    pub fn new(
        methods: WriteMethods,
        resolver: impl Fn(&mut R, &TenantContext) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        Self {
            methods,
            resolver: Arc::new(resolver),
        }
    }
}

#[async_trait]
impl<R, P> BeforeHook<R, P> for ResolveData<R>
where
    R: Send + Sync + 'static,
    P: Send + Clone + 'static,
{
    async fn run(&self, ctx: &mut HookContext<R, P>) -> Result<()> {
        if !self.methods.matches(&ctx.method) {
            return Ok(());
        }

        let HookContext { tenant, data, service, .. } = ctx;
        let data = data
            .as_mut()
            .ok_or_else(|| anyhow::anyhow!("{service}: write hook ran without a payload"))?;

        (self.resolver)(data, tenant)
    }
}

/// Fluent builder behind [`SchemaHooksExt::schema`].
pub struct SchemaBuilder<'a, R, P>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    hooks: &'a mut ServiceHooks<R, P>,
    methods: WriteMethods,
}

impl<R, P> SchemaBuilder<'_, R, P>
where
    R: Send + Sync + 'static,
    P: Send + Sync + Clone + 'static,
{
    pub fn on_create(&mut self) -> &mut Self {
        self.methods = WriteMethods::Create;
        self
    }

    pub fn on_patch(&mut self) -> &mut Self {
        self.methods = WriteMethods::Patch;
        self
    }

    pub fn on_update(&mut self) -> &mut Self {
        self.methods = WriteMethods::Update;
        self
    }

    pub fn resolve(
        &mut self,
        f: impl Fn(&mut R, &TenantContext) -> Result<()> + Send + Sync + 'static,
    ) -> &mut Self {
        self.hooks.before_all(Arc::new(ResolveData::new(self.methods, f)));
        self
    }
}

/// `hooks.schema(|s| s.on_create().resolve(...))`
pub trait SchemaHooksExt<R, P>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    fn schema<F>(&mut self, f: F) -> &mut Self
    where
        F: FnOnce(&mut SchemaBuilder<'_, R, P>);
}

impl<R, P> SchemaHooksExt<R, P> for ServiceHooks<R, P>
where
    R: Send + Sync + 'static,
    P: Send + Sync + Clone + 'static,
{
    fn schema<F>(&mut self, f: F) -> &mut Self
    where
        F: FnOnce(&mut SchemaBuilder<'_, R, P>),
    {
        let mut builder = SchemaBuilder {
            hooks: self,
            methods: WriteMethods::AllWrites,
        };
        f(&mut builder);
        self
    }
}
