/// Turn a record collection type into a [`RecordService`](crate::RecordService).
///
/// The type needs a `capabilities: ServiceCapabilities` field and these
/// inherent async methods, all scoped by the caller's [`TenantContext`](crate::TenantContext):
///
/// | service call | inherent method |
/// |---|---|
/// | `find` | `list_in(ctx)` |
/// | `get` | `fetch(ctx, id)` |
/// | `create` | `insert(ctx, data)` |
/// | `update` | `replace(ctx, id, data)` |
/// | `patch` | `merge(ctx, id, data)` |
/// | `remove` | `delete(ctx, id)` |
///
/// Record methods never see the call params. A `patch` or `remove` without
/// an id is rejected with BadRequest before the collection is reached.
///
/// ```ignore
/// schoolhub_core::hub_adapter!(CollectionAdapter => serde_json::Value, AdminParams);
/// ```
#[macro_export]
macro_rules! hub_adapter {
    ($ty:ty => $rec:ty, $params:ty) => {
        #[async_trait::async_trait]
        impl $crate::RecordService<$rec, $params> for $ty {
            fn capabilities(&self) -> $crate::ServiceCapabilities {
                self.capabilities.clone()
            }

            async fn find(
                &self,
                ctx: &$crate::TenantContext,
                _: $params,
            ) -> anyhow::Result<Vec<$rec>> {
                self.list_in(ctx).await
            }

            async fn get(
                &self,
                ctx: &$crate::TenantContext,
                id: &str,
                _: $params,
            ) -> anyhow::Result<$rec> {
                self.fetch(ctx, id).await
            }

            async fn create(
                &self,
                ctx: &$crate::TenantContext,
                data: $rec,
                _: $params,
            ) -> anyhow::Result<$rec> {
                self.insert(ctx, data).await
            }

            async fn update(
                &self,
                ctx: &$crate::TenantContext,
                id: &str,
                data: $rec,
                _: $params,
            ) -> anyhow::Result<$rec> {
                self.replace(ctx, id, data).await
            }

            async fn patch(
                &self,
                ctx: &$crate::TenantContext,
                id: Option<&str>,
                data: $rec,
                _: $params,
            ) -> anyhow::Result<$rec> {
                let id = $crate::hub_adapter!(@id id, "patch")?;
                self.merge(ctx, id, data).await
            }

            async fn remove(
                &self,
                ctx: &$crate::TenantContext,
                id: Option<&str>,
                _: $params,
            ) -> anyhow::Result<$rec> {
                let id = $crate::hub_adapter!(@id id, "remove")?;
                self.delete(ctx, id).await
            }
        }
    };
    (@id $id:expr, $method:literal) => {
        $id.ok_or_else(|| {
            $crate::HubError::bad_request(concat!("Cannot ", $method, " a record without an id"))
                .into_anyhow()
        })
    };
}
