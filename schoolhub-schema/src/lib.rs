//! Validation boundary between raw write payloads and the record store.
//!
//! Payloads are parsed into a `validator`-derived schema type, validated,
//! and re-serialized, so only declared fields ever reach a store write.
//! Failures become `ValidationError`s with a per-field message map.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Value};
use validator::Validate;

use schoolhub_core::errors::HubError;
use schoolhub_core::{HubApp, SchemaHooksExt};

#[derive(Default)]
pub struct SchemaErrors {
    map: Map<String, Value>,
}

impl SchemaErrors {
    pub fn push_schema(&mut self, msg: impl Into<String>) {
        Self::push_to(&mut self.map, "_schema", msg);
    }

    pub fn push_field(&mut self, field: &str, msg: impl Into<String>) {
        Self::push_to(&mut self.map, field, msg);
    }

    fn push_to(map: &mut Map<String, Value>, key: &str, msg: impl Into<String>) {
        let msg = Value::String(msg.into());
        match map.get_mut(key) {
            Some(Value::Array(arr)) => arr.push(msg),
            _ => {
                map.insert(key.to_string(), Value::Array(vec![msg]));
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn into_validation_anyhow(self, message: &str) -> anyhow::Error {
        HubError::validation(message)
            .with_errors(Value::Object(self.map))
            .into_anyhow()
    }
}

pub fn validation_failed(message: &str, errors: Value) -> anyhow::Error {
    HubError::validation(message).with_errors(errors).into_anyhow()
}

pub fn schema_error(message: &str, msg: impl Into<String>) -> anyhow::Error {
    validation_failed(message, json!({"_schema": [msg.into()]}))
}

fn friendly_message(code: &str) -> Option<&'static str> {
    match code {
        "required" => Some("is required"),
        "email" => Some("must be a valid email"),
        "length" => Some("has invalid length"),
        "range" => Some("is out of range"),
        _ => None,
    }
}

/// Schemas use `rename_all = "camelCase"`, so error keys follow the wire names.
fn camel_case(field: &str) -> String {
    if field.starts_with('_') {
        return field.to_string();
    }
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

fn join_path(prefix: &str, field: &str) -> String {
    let field = camel_case(field);
    if prefix.is_empty() {
        field
    } else {
        format!("{prefix}.{field}")
    }
}

fn join_index(prefix: &str, idx: usize) -> String {
    format!("{prefix}[{idx}]")
}

fn push_validation_errors(
    out: &mut SchemaErrors,
    prefix: &str,
    errs: &validator::ValidationErrors,
) {
    for (field, kind) in errs.errors() {
        match kind {
            validator::ValidationErrorsKind::Field(field_errors) => {
                let key = join_path(prefix, field);
                for e in field_errors {
                    let msg = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .or_else(|| friendly_message(&e.code).map(|m| m.to_string()))
                        .unwrap_or_else(|| e.code.to_string());
                    out.push_field(&key, msg);
                }
            }
            validator::ValidationErrorsKind::Struct(struct_errs) => {
                let next = join_path(prefix, field);
                push_validation_errors(out, &next, struct_errs.as_ref());
            }
            validator::ValidationErrorsKind::List(list_errs) => {
                let base = join_path(prefix, field);
                for (idx, nested) in list_errs {
                    let next = join_index(&base, *idx);
                    push_validation_errors(out, &next, nested.as_ref());
                }
            }
        }
    }
}

/// Parse and validate a payload into its schema type.
pub fn validate<T>(data: &Value, error_message: &str) -> anyhow::Result<T>
where
    T: DeserializeOwned + Validate,
{
    let parsed: T = serde_json::from_value(data.clone())
        .map_err(|e| validation_failed(error_message, json!({"_schema": [e.to_string()]})))?;

    parsed.validate().map_err(|e| {
        let mut out = SchemaErrors::default();
        push_validation_errors(&mut out, "", &e);
        out.into_validation_anyhow(error_message)
    })?;

    Ok(parsed)
}

/// Validate, then re-serialize so undeclared fields are dropped.
pub fn normalize<T>(data: &Value, error_message: &str) -> anyhow::Result<Value>
where
    T: DeserializeOwned + Validate + Serialize,
{
    let parsed = validate::<T>(data, error_message)?;
    serde_json::to_value(parsed).map_err(|e| schema_error(error_message, e.to_string()))
}

/// Install the validation boundary on a registered service: `C` guards
/// create and update, `U` guards patch.
pub fn register<C, U, P>(
    app: &HubApp<Value, P>,
    service: &str,
    error_message: &'static str,
) -> anyhow::Result<()>
where
    C: DeserializeOwned + Validate + Serialize + 'static,
    U: DeserializeOwned + Validate + Serialize + 'static,
    P: Send + Sync + Clone + 'static,
{
    app.service(service)?.hooks(|h| {
        h.schema(|s| {
            s.on_create().resolve(move |data, _tenant| {
                *data = normalize::<C>(data, error_message)?;
                Ok(())
            });
            s.on_update().resolve(move |data, _tenant| {
                *data = normalize::<C>(data, error_message)?;
                Ok(())
            });
            s.on_patch().resolve(move |data, _tenant| {
                *data = normalize::<U>(data, error_message)?;
                Ok(())
            });
        });
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use schoolhub_core::errors::{ErrorKind, HubError};
    use schoolhub_core::{HubApp, RecordService, Role, TenantContext};
    use serde::{Deserialize, Serialize};
    use serde_json::{json, Value};
    use validator::Validate;

    use super::{normalize, register, validate};

    #[derive(Debug, Deserialize, Serialize, Validate)]
    #[serde(rename_all = "camelCase")]
    struct Guardian {
        #[validate(email(message = "guardian email must be valid"))]
        email: String,
    }

    #[derive(Debug, Deserialize, Serialize, Validate)]
    #[serde(rename_all = "camelCase")]
    struct Enrolment {
        #[validate(length(min = 2, message = "studentName must be at least 2 chars"))]
        student_name: String,

        #[validate(range(min = 0.0, max = 100.0))]
        score: f64,

        #[validate(nested)]
        guardians: Vec<Guardian>,
    }

    #[derive(Debug, Deserialize, Serialize, Validate)]
    #[serde(rename_all = "camelCase")]
    struct EnrolmentPatch {
        #[serde(skip_serializing_if = "Option::is_none")]
        #[validate(range(min = 0.0, max = 100.0))]
        score: Option<f64>,
    }

    #[test]
    fn nested_and_list_errors_are_flattened_with_paths() {
        let data = json!({
            "studentName": "x",
            "score": 120,
            "guardians": [{"email": "not-an-email"}]
        });

        let err = validate::<Enrolment>(&data, "Enrolment schema validation failed").unwrap_err();
        let hub = HubError::from_anyhow(&err).expect("must be HubError");
        assert_eq!(hub.kind, ErrorKind::ValidationError);
        let errors = hub.errors.as_ref().unwrap();

        assert_eq!(errors["studentName"][0], "studentName must be at least 2 chars");
        assert_eq!(errors["score"][0], "is out of range");
        assert_eq!(errors["guardians[0].email"][0], "guardian email must be valid");
    }

    #[test]
    fn error_keys_use_wire_names() {
        assert_eq!(super::camel_case("quantity_added"), "quantityAdded");
        assert_eq!(super::camel_case("score"), "score");
        assert_eq!(super::camel_case("__all__"), "__all__");
    }

    #[test]
    fn type_errors_are_reported_under_schema_key() {
        let err = validate::<Enrolment>(&json!({"studentName": 7}), "bad").unwrap_err();
        let hub = HubError::from_anyhow(&err).unwrap();
        assert!(hub.errors.as_ref().unwrap()["_schema"][0].is_string());
    }

    #[test]
    fn normalize_drops_undeclared_fields() {
        let data = json!({"studentName": "Ama", "score": 71, "guardians": [], "isAdmin": true});
        let clean = normalize::<Enrolment>(&data, "bad").unwrap();
        assert!(clean.get("isAdmin").is_none());
        assert_eq!(clean["studentName"], "Ama");
    }

    struct Echo;

    #[async_trait::async_trait]
    impl RecordService<Value, ()> for Echo {
        async fn create(
            &self,
            _ctx: &TenantContext,
            data: Value,
            _params: (),
        ) -> anyhow::Result<Value> {
            Ok(data)
        }

        async fn patch(
            &self,
            _ctx: &TenantContext,
            _id: Option<&str>,
            data: Value,
            _params: (),
        ) -> anyhow::Result<Value> {
            Ok(data)
        }
    }

    #[tokio::test]
    async fn registered_schema_guards_create_and_patch() {
        let app: HubApp<Value, ()> = HubApp::new();
        app.register_service("enrolments", Arc::new(Echo));
        let msg = "Enrolment schema validation failed";
        register::<Enrolment, EnrolmentPatch, ()>(&app, "enrolments", msg)
            .unwrap();

        let svc = app.service("enrolments").unwrap();
        let ctx = TenantContext::new(Role::Teacher, "A");

        let err = svc.create(ctx.clone(), json!({"studentName": "Ama"}), ()).await.unwrap_err();
        assert_eq!(HubError::kind_of(&err), ErrorKind::ValidationError);

        let patched = svc
            .patch(ctx, Some("e1"), json!({"score": 55, "studentName": "ignored"}), ())
            .await
            .unwrap();
        assert_eq!(patched, json!({"score": 55.0}));
    }
}
