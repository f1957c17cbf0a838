use std::collections::BTreeMap;

use anyhow::Result;
use chrono::{SecondsFormat, Utc};
use schoolhub_core::errors::HubError;
use schoolhub_core::TenantScope;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::kinds::RecordKind;

type Collection = BTreeMap<String, Value>;

fn now_ts() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// In-memory document store: one collection per record kind, keyed by id.
///
/// Every read and write is filtered by a [`TenantScope`]; a record outside
/// the scope behaves as if it did not exist.
pub struct RecordStore {
    enabled: bool,
    collections: RwLock<BTreeMap<&'static str, Collection>>,
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::new(true)
    }
}

impl RecordStore {
    /// A disabled store fails every call with `StoreUnavailable`.
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            collections: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn ensure_available(&self) -> Result<()> {
        if self.enabled {
            Ok(())
        } else {
            Err(HubError::store_unavailable("record store is not configured").into_anyhow())
        }
    }

    fn not_found(kind: &RecordKind, id: &str) -> anyhow::Error {
        HubError::not_found(format!("{} record not found: {id}", kind.name)).into_anyhow()
    }

    fn owner<'a>(kind: &RecordKind, record: &'a Value) -> Option<&'a str> {
        record.get(kind.tenant_field).and_then(Value::as_str)
    }

    fn into_object(data: Value) -> Result<Map<String, Value>> {
        match data {
            Value::Object(obj) => Ok(obj),
            _ => Err(HubError::bad_request("record payload must be a JSON object").into_anyhow()),
        }
    }

    /// Records of `kind` visible in `scope`, in id order.
    pub async fn list(&self, kind: &RecordKind, scope: &TenantScope) -> Result<Vec<Value>> {
        self.ensure_available()?;

        let collections = self.collections.read().await;
        Ok(collections
            .get(kind.name)
            .into_iter()
            .flat_map(|c| c.values())
            .filter(|r| scope.admits(Self::owner(kind, r)))
            .cloned()
            .collect())
    }

    pub async fn get(&self, kind: &RecordKind, scope: &TenantScope, id: &str) -> Result<Value> {
        self.ensure_available()?;

        let collections = self.collections.read().await;
        collections
            .get(kind.name)
            .and_then(|c| c.get(id))
            .filter(|r| scope.admits(Self::owner(kind, r)))
            .cloned()
            .ok_or_else(|| Self::not_found(kind, id))
    }

    /// Insert a new record under a fresh id. Any `id` in the payload is ignored.
    pub async fn insert(&self, kind: &RecordKind, data: Value) -> Result<Value> {
        self.ensure_available()?;

        let mut obj = Self::into_object(data)?;
        let id = format!("{}_{}", kind.id_prefix, Uuid::new_v4());
        let ts = now_ts();

        obj.insert("id".to_string(), Value::String(id.clone()));
        obj.insert("createdAt".to_string(), Value::String(ts.clone()));
        obj.insert("updatedAt".to_string(), Value::String(ts));
        let value = Value::Object(obj);

        let mut collections = self.collections.write().await;
        collections.entry(kind.name).or_default().insert(id, value.clone());
        Ok(value)
    }

    /// Replace the fields of a stored record.
    pub async fn replace(
        &self,
        kind: &RecordKind,
        scope: &TenantScope,
        id: &str,
        data: Value,
    ) -> Result<Value> {
        let obj = Self::into_object(data)?;
        self.write_existing(kind, scope, id, |_| obj).await
    }

    /// Merge the given fields into a stored record.
    pub async fn merge(
        &self,
        kind: &RecordKind,
        scope: &TenantScope,
        id: &str,
        patch: Value,
    ) -> Result<Value> {
        let patch = Self::into_object(patch)?;
        self.write_existing(kind, scope, id, move |mut existing| {
            existing.extend(patch);
            existing
        })
        .await
    }

    async fn write_existing<F>(
        &self,
        kind: &RecordKind,
        scope: &TenantScope,
        id: &str,
        f: F,
    ) -> Result<Value>
    where
        F: FnOnce(Map<String, Value>) -> Map<String, Value>,
    {
        self.ensure_available()?;

        let mut collections = self.collections.write().await;
        let collection = collections.entry(kind.name).or_default();

        let existing = collection
            .get(id)
            .filter(|r| scope.admits(Self::owner(kind, r)))
            .and_then(|r| r.as_object().cloned())
            .ok_or_else(|| Self::not_found(kind, id))?;

        let created_at = existing.get("createdAt").cloned();
        let stored_school = existing.get("schoolId").cloned();

        let mut next = f(existing);

        // schoolId is fixed at creation.
        let claimed = next.get("schoolId").cloned();
        match (claimed, stored_school) {
            (Some(claimed), Some(stored)) if claimed != stored => {
                return Err(HubError::tenant_mismatch(format!(
                    "{} record {id} belongs to school '{}', cannot move it to '{}'",
                    kind.name,
                    stored.as_str().unwrap_or_default(),
                    claimed.as_str().unwrap_or_default(),
                ))
                .into_anyhow());
            }
            (None, Some(stored)) => {
                next.insert("schoolId".to_string(), stored);
            }
            _ => {}
        }

        next.insert("id".to_string(), Value::String(id.to_string()));
        if let Some(created_at) = created_at {
            next.insert("createdAt".to_string(), created_at);
        }
        next.insert("updatedAt".to_string(), Value::String(now_ts()));

        let value = Value::Object(next);
        collection.insert(id.to_string(), value.clone());
        Ok(value)
    }

    pub async fn delete(&self, kind: &RecordKind, scope: &TenantScope, id: &str) -> Result<Value> {
        self.ensure_available()?;

        let mut collections = self.collections.write().await;
        let collection = collections.entry(kind.name).or_default();

        let visible = collection
            .get(id)
            .map(|r| scope.admits(Self::owner(kind, r)))
            .unwrap_or(false);
        if !visible {
            return Err(Self::not_found(kind, id));
        }

        collection.remove(id).ok_or_else(|| Self::not_found(kind, id))
    }

    /// Number of records, across all collections, owned by `school_id`.
    pub async fn count_by_school(&self, school_id: &str) -> Result<usize> {
        self.ensure_available()?;

        let collections = self.collections.read().await;
        Ok(collections
            .values()
            .flat_map(|c| c.values())
            .filter(|r| r.get("schoolId").and_then(Value::as_str) == Some(school_id))
            .count())
    }

    /// Remove every record owned by `school_id` under one write lock.
    pub async fn delete_by_school(&self, school_id: &str) -> Result<usize> {
        self.ensure_available()?;

        let mut collections = self.collections.write().await;
        let mut removed = 0;
        for collection in collections.values_mut() {
            let before = collection.len();
            collection.retain(|_, r| r.get("schoolId").and_then(Value::as_str) != Some(school_id));
            removed += before - collection.len();
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use schoolhub_core::{ErrorKind, TenantId};
    use serde_json::json;

    use super::*;
    use crate::kinds::{EXAM_RESULTS, SCHOOLS};

    fn school(id: &str) -> TenantScope {
        TenantScope::School(TenantId(id.to_string()))
    }

    #[tokio::test]
    async fn list_filters_by_school_and_all_sees_everything() {
        let store = RecordStore::default();
        store.insert(&EXAM_RESULTS, json!({"schoolId": "A", "score": 70})).await.unwrap();
        store.insert(&EXAM_RESULTS, json!({"schoolId": "B", "score": 40})).await.unwrap();

        let b = store.list(&EXAM_RESULTS, &school("B")).await.unwrap();
        assert_eq!(b.len(), 1);
        assert_eq!(b[0]["schoolId"], "B");

        assert_eq!(store.list(&EXAM_RESULTS, &TenantScope::All).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn insert_assigns_fresh_ids_and_timestamps() {
        let store = RecordStore::default();
        let rec = store
            .insert(&EXAM_RESULTS, json!({"id": "mine", "schoolId": "A"}))
            .await
            .unwrap();

        let id = rec["id"].as_str().unwrap();
        assert!(id.starts_with("exam_"));
        assert_ne!(id, "mine");
        assert_eq!(rec["createdAt"], rec["updatedAt"]);
    }

    #[tokio::test]
    async fn records_outside_scope_are_not_found() {
        let store = RecordStore::default();
        let rec = store.insert(&EXAM_RESULTS, json!({"schoolId": "A"})).await.unwrap();
        let id = rec["id"].as_str().unwrap();

        let err = store.get(&EXAM_RESULTS, &school("B"), id).await.unwrap_err();
        assert_eq!(HubError::kind_of(&err), ErrorKind::NotFound);

        let err = store.delete(&EXAM_RESULTS, &school("B"), id).await.unwrap_err();
        assert_eq!(HubError::kind_of(&err), ErrorKind::NotFound);
        assert!(store.get(&EXAM_RESULTS, &school("A"), id).await.is_ok());
    }

    #[tokio::test]
    async fn school_id_is_immutable_and_created_at_preserved() {
        let store = RecordStore::default();
        let rec = store
            .insert(&EXAM_RESULTS, json!({"schoolId": "A", "score": 50}))
            .await
            .unwrap();
        let id = rec["id"].as_str().unwrap();

        let err = store
            .merge(&EXAM_RESULTS, &TenantScope::All, id, json!({"schoolId": "B"}))
            .await
            .unwrap_err();
        assert_eq!(HubError::kind_of(&err), ErrorKind::TenantMismatch);

        let replaced = store
            .replace(&EXAM_RESULTS, &school("A"), id, json!({"score": 64}))
            .await
            .unwrap();
        assert_eq!(replaced["schoolId"], "A");
        assert_eq!(replaced["score"], 64);
        assert_eq!(replaced["createdAt"], rec["createdAt"]);
        assert_eq!(replaced["id"], rec["id"]);
    }

    #[tokio::test]
    async fn schools_are_scoped_by_their_own_id() {
        let store = RecordStore::default();
        let a = store.insert(&SCHOOLS, json!({"name": "Alpha"})).await.unwrap();
        store.insert(&SCHOOLS, json!({"name": "Beta"})).await.unwrap();

        let id = a["id"].as_str().unwrap();
        let visible = store.list(&SCHOOLS, &school(id)).await.unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0]["name"], "Alpha");
    }

    #[tokio::test]
    async fn delete_by_school_sweeps_every_collection() {
        let store = RecordStore::default();
        store.insert(&EXAM_RESULTS, json!({"schoolId": "A"})).await.unwrap();
        store.insert(&crate::kinds::STAFF, json!({"schoolId": "A"})).await.unwrap();
        store.insert(&EXAM_RESULTS, json!({"schoolId": "B"})).await.unwrap();

        assert_eq!(store.count_by_school("A").await.unwrap(), 2);
        assert_eq!(store.delete_by_school("A").await.unwrap(), 2);
        assert_eq!(store.count_by_school("A").await.unwrap(), 0);
        assert_eq!(store.count_by_school("B").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn disabled_store_is_unavailable() {
        let store = RecordStore::new(false);
        let err = store.list(&EXAM_RESULTS, &TenantScope::All).await.unwrap_err();
        assert_eq!(HubError::kind_of(&err), ErrorKind::StoreUnavailable);
    }
}
