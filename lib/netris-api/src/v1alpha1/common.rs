//! Annotations, status and meta header shared by every Netris kind

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Annotation switching a resource into import mode
pub const IMPORT_ANNOTATION: &str = "resource.k8s.netris.ai/import";
/// Annotation selecting what happens to the remote object on delete
pub const RECLAIM_ANNOTATION: &str = "resource.k8s.netris.ai/reclaimPolicy";

pub const STATUS_SUCCESS: &str = "Success";
pub const STATUS_FAILURE: &str = "Failure";
pub const STATUS_PROVISIONING: &str = "Provisioning";

/// Finalizer guarding remote cleanup for the given lowercase kind.
pub fn finalizer_name(kind: &str) -> String {
    format!("{}.k8s.netris.ai/delete", kind.to_lowercase())
}

/// Remote lifecycle when the Kubernetes object is deleted
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReclaimPolicy {
    Retain,
    #[default]
    Delete,
}

impl ReclaimPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReclaimPolicy::Retain => "retain",
            ReclaimPolicy::Delete => "delete",
        }
    }
}

impl fmt::Display for ReclaimPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("invalid reclaim policy: {0}")]
pub struct InvalidReclaimPolicy(String);

impl FromStr for ReclaimPolicy {
    type Err = InvalidReclaimPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "retain" => Ok(ReclaimPolicy::Retain),
            "delete" => Ok(ReclaimPolicy::Delete),
            other => Err(InvalidReclaimPolicy(other.to_string())),
        }
    }
}

/// Whether the import annotation is set to "true".
pub fn is_imported(annotations: &BTreeMap<String, String>) -> bool {
    annotations.get(IMPORT_ANNOTATION).map(String::as_str) == Some("true")
}

/// Reclaim policy from annotations, falling back to delete.
pub fn reclaim_policy(annotations: &BTreeMap<String, String>) -> ReclaimPolicy {
    annotations
        .get(RECLAIM_ANNOTATION)
        .and_then(|v| v.parse().ok())
        .unwrap_or_default()
}

/// Returns the annotation set with missing or invalid import / reclaim values
/// replaced by their defaults, or `None` when both are already valid.
pub fn defaulted_annotations(
    annotations: &BTreeMap<String, String>,
) -> Option<BTreeMap<String, String>> {
    let mut updated = annotations.clone();
    let mut changed = false;

    match annotations.get(IMPORT_ANNOTATION).map(String::as_str) {
        Some("true") | Some("false") => {}
        _ => {
            updated.insert(IMPORT_ANNOTATION.to_string(), "false".to_string());
            changed = true;
        }
    }

    if annotations
        .get(RECLAIM_ANNOTATION)
        .map(|v| v.parse::<ReclaimPolicy>().is_err())
        .unwrap_or(true)
    {
        updated.insert(
            RECLAIM_ANNOTATION.to_string(),
            ReclaimPolicy::Delete.to_string(),
        );
        changed = true;
    }

    changed.then_some(updated)
}

/// Status reported on spec resources
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResourceStatus {
    /// Success, Failure or Provisioning
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// Human-readable detail for the last reconcile
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Provisioning state reported by Netris
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    /// Last time the status changed (RFC 3339)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,
}

/// Bookkeeping carried by every meta resource
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MetaHeader {
    /// The remote object was adopted rather than created
    #[serde(default)]
    pub imported: bool,

    /// True when the remote object is retained on delete
    #[serde(default)]
    pub reclaim_policy: bool,

    /// Generation of the spec resource this meta was built from
    #[serde(default)]
    pub cr_generation: i64,

    /// Remote id, 0 until the object exists in Netris
    #[serde(default)]
    pub id: i64,

    /// Name of the owning spec resource
    #[serde(default)]
    pub cr_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn annotations(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_added_when_missing() {
        let updated = defaulted_annotations(&BTreeMap::new()).unwrap();
        assert_eq!(updated[IMPORT_ANNOTATION], "false");
        assert_eq!(updated[RECLAIM_ANNOTATION], "delete");
    }

    #[test]
    fn test_invalid_values_replaced() {
        let current = annotations(&[(IMPORT_ANNOTATION, "yes"), (RECLAIM_ANNOTATION, "retain")]);
        let updated = defaulted_annotations(&current).unwrap();
        assert_eq!(updated[IMPORT_ANNOTATION], "false");
        assert_eq!(updated[RECLAIM_ANNOTATION], "retain");
    }

    #[test]
    fn test_valid_annotations_untouched() {
        let current = annotations(&[
            (IMPORT_ANNOTATION, "true"),
            (RECLAIM_ANNOTATION, "retain"),
            ("team", "net"),
        ]);
        assert!(defaulted_annotations(&current).is_none());
        assert!(is_imported(&current));
        assert_eq!(reclaim_policy(&current), ReclaimPolicy::Retain);
    }

    #[test]
    fn test_finalizer_name() {
        assert_eq!(finalizer_name("VNet"), "vnet.k8s.netris.ai/delete");
    }

    #[test]
    fn test_meta_header_wire_names() {
        let header = MetaHeader {
            imported: true,
            reclaim_policy: false,
            cr_generation: 3,
            id: 42,
            cr_name: "vnet-a".into(),
        };
        let json = serde_json::to_value(&header).unwrap();
        assert_eq!(json["crGeneration"], 3);
        assert_eq!(json["reclaimPolicy"], false);
        assert_eq!(json["crName"], "vnet-a");
    }
}
