//! Response schema validation
//!
//! Callers may attach a schema to a request. Once the transport returns a
//! successful response, its JSON body is checked in a detached task before the
//! response interceptors run; failures are logged and never change what the
//! caller receives.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::defaults::validation::VALIDATION_TIMEOUT;
use crate::error::{HttpError, Result};

/// Something that can check a JSON value.
#[async_trait]
pub trait ResponseSchema: Send + Sync {
    async fn validate(&self, instance: &Value) -> Result<()>;
}

pub type SharedSchema = Arc<dyn ResponseSchema>;

#[async_trait]
impl<F> ResponseSchema for F
where
    F: Fn(&Value) -> Result<()> + Send + Sync,
{
    async fn validate(&self, instance: &Value) -> Result<()> {
        (self)(instance)
    }
}

/// A compiled JSON Schema document.
pub struct JsonSchema {
    validator: jsonschema::Validator,
}

impl std::fmt::Debug for JsonSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonSchema").finish_non_exhaustive()
    }
}

impl JsonSchema {
    /// Compile `schema`; fails with `SchemaCompilation` when it is not a valid schema.
    pub fn new(schema: &Value) -> Result<Self> {
        let validator = jsonschema::validator_for(schema)
            .map_err(|e| HttpError::SchemaCompilation(format!("Invalid JSON Schema: {e}")))?;
        Ok(Self { validator })
    }

    /// Compile and wrap for attaching to a request.
    pub fn shared(schema: &Value) -> Result<SharedSchema> {
        Ok(Arc::new(Self::new(schema)?))
    }

    pub fn is_valid(&self, instance: &Value) -> bool {
        self.validator.is_valid(instance)
    }

    /// Synchronous check reporting at most three violations.
    pub fn check(&self, instance: &Value) -> Result<()> {
        if self.validator.is_valid(instance) {
            return Ok(());
        }
        let msgs: Vec<String> = self
            .validator
            .iter_errors(instance)
            .take(3)
            .map(|err| format!("{} at {}", err, err.instance_path))
            .collect();
        Err(HttpError::SchemaValidation(msgs.join("; ")))
    }
}

#[async_trait]
impl ResponseSchema for JsonSchema {
    async fn validate(&self, instance: &Value) -> Result<()> {
        self.check(instance)
    }
}

/// Validate `value` against `schema` on a detached task.
///
/// Returns `None` (and logs) when no tokio runtime is available. The handle is
/// only useful to tests; callers normally drop it.
pub fn spawn_validation(schema: SharedSchema, value: Value) -> Option<JoinHandle<()>> {
    let handle = match tokio::runtime::Handle::try_current() {
        Ok(handle) => handle,
        Err(_) => {
            tracing::warn!(target: "switchyard::schema", "no tokio runtime available, skipping schema validation");
            return None;
        }
    };

    let task = async move {
        match tokio::time::timeout(VALIDATION_TIMEOUT, schema.validate(&value)).await {
            Ok(Ok(())) => {
                tracing::trace!(target: "switchyard::schema", "Schema validation passed");
            }
            Ok(Err(e)) => {
                tracing::error!(target: "switchyard::schema", error = %e, "Schema validation failed");
            }
            Err(_) => {
                tracing::warn!(target: "switchyard::schema", timeout = ?VALIDATION_TIMEOUT, "Schema validation timed out");
            }
        }
    };

    Some(handle.spawn(task.in_current_span()))
}

/// Parse `body` as JSON and hand it to [`spawn_validation`].
///
/// A body that is not JSON is logged and skipped.
pub fn spawn_body_validation(schema: SharedSchema, body: &[u8]) -> Option<JoinHandle<()>> {
    match serde_json::from_slice::<Value>(body) {
        Ok(value) => spawn_validation(schema, value),
        Err(e) => {
            tracing::error!(target: "switchyard::schema", error = %e, "Error parsing JSON response, skipping schema validation");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use tracing_test::traced_test;

    fn user_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "id": { "type": "integer" },
                "name": { "type": "string" }
            },
            "required": ["id", "name"]
        })
    }

    #[test]
    fn valid_instance_passes() {
        let schema = JsonSchema::new(&user_schema()).unwrap();
        assert!(schema.check(&json!({"id": 1, "name": "ada"})).is_ok());
        assert!(schema.is_valid(&json!({"id": 1, "name": "ada"})));
    }

    #[test]
    fn invalid_instance_reports_path() {
        let schema = JsonSchema::new(&user_schema()).unwrap();
        let err = schema.check(&json!({"id": "one", "name": "ada"})).unwrap_err();
        match err {
            HttpError::SchemaValidation(msg) => assert!(msg.contains("/id"), "{msg}"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn invalid_schema_fails_to_compile() {
        let err = JsonSchema::new(&json!({"type": 12})).unwrap_err();
        assert!(matches!(err, HttpError::SchemaCompilation(_)));
    }

    #[test]
    fn spawn_without_runtime_is_skipped() {
        let schema = JsonSchema::shared(&user_schema()).unwrap();
        assert!(spawn_validation(schema, json!({})).is_none());
    }

    #[tokio::test]
    #[traced_test]
    async fn failed_validation_is_logged() {
        let schema = JsonSchema::shared(&user_schema()).unwrap();
        let handle = spawn_validation(schema, json!({"id": 1})).unwrap();
        handle.await.unwrap();
        assert!(logs_contain("Schema validation failed"));
    }

    #[tokio::test]
    #[traced_test]
    async fn non_json_body_is_logged_and_skipped() {
        let schema = JsonSchema::shared(&user_schema()).unwrap();
        assert!(spawn_body_validation(schema, b"<html>").is_none());
        assert!(logs_contain("Error parsing JSON response"));
    }

    #[tokio::test]
    #[traced_test]
    async fn closure_schemas_are_supported() {
        let schema: SharedSchema = Arc::new(|value: &Value| {
            if value.is_array() {
                Ok(())
            } else {
                Err(HttpError::SchemaValidation("expected an array".into()))
            }
        });
        spawn_validation(schema, json!([1, 2])).unwrap().await.unwrap();
        assert!(!logs_contain("Schema validation failed"));
    }

    struct NeverFinishes;

    #[async_trait]
    impl ResponseSchema for NeverFinishes {
        async fn validate(&self, _instance: &Value) -> Result<()> {
            std::future::pending::<()>().await;
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    #[traced_test]
    async fn stalled_validation_times_out_in_background() {
        let started = tokio::time::Instant::now();
        let handle = spawn_validation(Arc::new(NeverFinishes), json!({})).unwrap();
        assert_eq!(started.elapsed(), Duration::ZERO);
        assert!(!handle.is_finished());

        handle.await.unwrap();
        assert!(started.elapsed() >= VALIDATION_TIMEOUT);
        assert!(logs_contain("Schema validation timed out"));
    }
}
