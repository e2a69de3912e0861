use super::common::{MetaHeader, ResourceStatus};
use kube::CustomResource;
use schemars::gen::SchemaGenerator;
use schemars::schema::{ArrayValidation, InstanceType, Schema, SchemaObject};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Array of free-form objects the API server keeps as written
fn vnet_templates(_: &mut SchemaGenerator) -> Schema {
    let mut item = SchemaObject {
        instance_type: Some(InstanceType::Object.into()),
        ..Default::default()
    };
    item.extensions
        .insert("x-kubernetes-preserve-unknown-fields".to_string(), Value::Bool(true));

    SchemaObject {
        instance_type: Some(InstanceType::Array.into()),
        array: Some(Box::new(ArrayValidation {
            items: Some(Schema::Object(item).into()),
            ..Default::default()
        })),
        ..Default::default()
    }
    .into()
}

/// ServerClusterTemplate describes the VNets every server of a cluster is
/// attached to
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "k8s.netris.ai",
    version = "v1alpha1",
    kind = "ServerClusterTemplate",
    plural = "serverclustertemplates",
    namespaced,
    derive = "Default",
    status = "ResourceStatus",
    printcolumn = r#"{"name":"Status","type":"string","jsonPath":".status.status"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct ServerClusterTemplateSpec {
    /// VNet templates, passed to Netris unchanged
    #[serde(default)]
    #[schemars(schema_with = "vnet_templates")]
    pub vnets: Vec<Value>,
}

/// ServerClusterTemplateMeta holds the representation sent to Netris
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "k8s.netris.ai",
    version = "v1alpha1",
    kind = "ServerClusterTemplateMeta",
    plural = "serverclustertemplatemeta",
    namespaced,
    derive = "Default"
)]
#[serde(rename_all = "camelCase")]
pub struct ServerClusterTemplateMetaSpec {
    #[serde(flatten)]
    pub header: MetaHeader,

    pub name: String,
    #[serde(default)]
    #[schemars(schema_with = "vnet_templates")]
    pub vnets: Vec<Value>,
}
