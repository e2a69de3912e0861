//! Status patches written to spec resources

use super::Result;
use chrono::Utc;
use kube::api::{Api, Patch, PatchParams};
use kube::Resource;
use netris_api::{STATUS_FAILURE, STATUS_PROVISIONING, STATUS_SUCCESS};
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use std::fmt::Debug;

fn build(status: &str, message: &str, state: Option<&str>, extras: Map<String, Value>) -> Value {
    let mut body = Map::new();
    body.insert("status".into(), json!(status));
    body.insert("message".into(), json!(message));
    if let Some(state) = state {
        body.insert("state".into(), json!(state));
    }
    body.insert("modified".into(), json!(Utc::now().to_rfc3339()));
    body.extend(extras);
    Value::Object(body)
}

pub fn success(message: &str, state: &str, extras: Map<String, Value>) -> Value {
    build(STATUS_SUCCESS, message, Some(state), extras)
}

pub fn provisioning(message: &str) -> Value {
    build(STATUS_PROVISIONING, message, Some(STATUS_PROVISIONING), Map::new())
}

pub fn failure(message: &str) -> Value {
    build(STATUS_FAILURE, message, None, Map::new())
}

/// Merge `status` into the status subresource of `name`
pub async fn patch<K>(api: &Api<K>, name: &str, status: Value) -> Result<()>
where
    K: Resource + Clone + DeserializeOwned + Debug,
{
    let body = json!({ "status": status });
    api.patch_status(name, &PatchParams::default(), &Patch::Merge(&body))
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_carries_state_and_extras() {
        let mut extras = Map::new();
        extras.insert("ip".into(), json!("10.0.0.10"));
        let status = success("Successfully reconciled", "OK", extras);
        assert_eq!(status["status"], "Success");
        assert_eq!(status["state"], "OK");
        assert_eq!(status["ip"], "10.0.0.10");
        assert!(status["modified"].as_str().unwrap().contains('T'));
    }

    #[test]
    fn test_failure_has_no_state() {
        let status = failure("site 'x' not found");
        assert_eq!(status["status"], "Failure");
        assert_eq!(status["message"], "site 'x' not found");
        assert!(status.get("state").is_none());
    }
}
