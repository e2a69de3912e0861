use super::common::MetaHeader;
use kube::{CustomResource, ResourceExt};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const SERVICE_NAME_ANNOTATION: &str = "resource.k8s.netris.ai/servicename";
pub const SERVICE_NAMESPACE_ANNOTATION: &str = "resource.k8s.netris.ai/servicenamespace";
pub const SERVICE_UID_ANNOTATION: &str = "resource.k8s.netris.ai/serviceuid";
pub const SERVICE_INGRESS_IPS_ANNOTATION: &str = "resource.k8s.netris.ai/serviceingressips";
pub const IP_ROLE_ANNOTATION: &str = "resource.k8s.netris.ai/iprole";

/// L4LB is a layer 4 load balancer served by Netris softgates
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "k8s.netris.ai",
    version = "v1alpha1",
    kind = "L4LB",
    plural = "l4lbs",
    namespaced,
    derive = "Default",
    derive = "PartialEq",
    status = "L4LBStatus",
    printcolumn = r#"{"name":"State","type":"string","jsonPath":".spec.state"}"#,
    printcolumn = r#"{"name":"Frontend","type":"string","jsonPath":".status.ip"}"#,
    printcolumn = r#"{"name":"Port","type":"string","jsonPath":".status.port"}"#,
    printcolumn = r#"{"name":"Site","type":"string","jsonPath":".spec.site"}"#,
    printcolumn = r#"{"name":"Tenant","type":"string","jsonPath":".spec.ownerTenant"}"#,
    printcolumn = r#"{"name":"Status","type":"string","jsonPath":".status.status"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct L4LBSpec {
    /// Owning tenant; derived from the frontend subnet when empty
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub owner_tenant: String,

    /// Site; derived from the frontend subnet when empty
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub site: String,

    /// active or disabled
    #[serde(default = "default_state")]
    pub state: String,

    /// tcp or udp
    #[serde(default = "default_protocol")]
    pub protocol: String,

    pub frontend: L4LBFrontend,

    /// Backends in ip:port form
    pub backend: Vec<String>,

    #[serde(default)]
    pub check: L4LBCheck,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct L4LBFrontend {
    pub port: u16,

    /// Frontend address, allocated automatically when empty
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ip: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct L4LBCheck {
    /// tcp, http or none
    #[serde(rename = "type", default = "default_check_type")]
    pub kind: String,

    /// Milliseconds
    #[serde(default = "default_timeout")]
    pub timeout: u32,

    /// Path requested by http checks
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub request_path: String,
}

impl Default for L4LBCheck {
    fn default() -> Self {
        Self {
            kind: default_check_type(),
            timeout: default_timeout(),
            request_path: String::new(),
        }
    }
}

/// Status of an L4LB
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct L4LBStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,

    /// Frontend address assigned by Netris
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ip: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub port: String,
}

fn default_state() -> String {
    "active".to_string()
}

fn default_protocol() -> String {
    "tcp".to_string()
}

fn default_check_type() -> String {
    "tcp".to_string()
}

fn default_timeout() -> u32 {
    2000
}

/// How an auto-provisioned L4LB obtains its frontend address
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IpRole {
    /// First LB of a service, Netris allocates its address
    Main,
    /// Reuses the address allocated for the service's main LB
    Child,
    /// Address set explicitly on the Service
    Standard,
}

impl IpRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            IpRole::Main => "main",
            IpRole::Child => "child",
            IpRole::Standard => "standard",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "main" => Some(IpRole::Main),
            "child" => Some(IpRole::Child),
            "standard" => Some(IpRole::Standard),
            _ => None,
        }
    }
}

impl L4LB {
    fn annotation(&self, key: &str) -> &str {
        self.metadata
            .annotations
            .as_ref()
            .and_then(|a| a.get(key))
            .map(String::as_str)
            .unwrap_or("")
    }

    fn set_annotation(&mut self, key: &str, value: &str) {
        self.annotations_mut()
            .insert(key.to_string(), value.to_string());
    }

    pub fn service_name(&self) -> &str {
        self.annotation(SERVICE_NAME_ANNOTATION)
    }

    pub fn service_namespace(&self) -> &str {
        self.annotation(SERVICE_NAMESPACE_ANNOTATION)
    }

    pub fn service_uid(&self) -> &str {
        self.annotation(SERVICE_UID_ANNOTATION)
    }

    pub fn service_ingress_ips(&self) -> &str {
        self.annotation(SERVICE_INGRESS_IPS_ANNOTATION)
    }

    pub fn ip_role(&self) -> Option<IpRole> {
        IpRole::parse(self.annotation(IP_ROLE_ANNOTATION))
    }

    pub fn set_service(&mut self, name: &str, namespace: &str, uid: &str) {
        self.set_annotation(SERVICE_NAME_ANNOTATION, name);
        self.set_annotation(SERVICE_NAMESPACE_ANNOTATION, namespace);
        self.set_annotation(SERVICE_UID_ANNOTATION, uid);
    }

    pub fn set_service_ingress_ips(&mut self, ips: &str) {
        self.set_annotation(SERVICE_INGRESS_IPS_ANNOTATION, ips);
    }

    pub fn set_ip_role(&mut self, role: IpRole) {
        self.set_annotation(IP_ROLE_ANNOTATION, role.as_str());
    }

    /// True when the L4LB was generated for a Kubernetes Service
    pub fn is_service_owned(&self) -> bool {
        !self.service_name().is_empty()
            && !self.service_namespace().is_empty()
            && !self.service_uid().is_empty()
    }

    /// Address assigned by Netris, empty until provisioned
    pub fn status_ip(&self) -> &str {
        self.status.as_ref().map(|s| s.ip.as_str()).unwrap_or("")
    }
}

/// L4LBMeta holds the resolved representation of an L4LB
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "k8s.netris.ai",
    version = "v1alpha1",
    kind = "L4LBMeta",
    plural = "l4lbmeta",
    namespaced,
    derive = "Default"
)]
#[serde(rename_all = "camelCase")]
pub struct L4LBMetaSpec {
    #[serde(flatten)]
    pub header: MetaHeader,

    pub name: String,
    pub tenant_id: i64,
    pub site_id: i64,
    pub automatic: bool,
    #[serde(default)]
    pub ip: String,
    pub port: u16,
    /// Uppercase TCP or UDP
    pub protocol: String,
    /// enable or disable
    pub status: String,
    /// TCP, HTTP or None
    pub health_check: String,
    pub timeout: String,
    #[serde(default)]
    pub request_path: String,
    pub backends: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_annotations() {
        let mut lb = L4LB::new("web-default-uid-tcp-80", L4LBSpec::default());
        assert!(!lb.is_service_owned());
        lb.set_service("web", "default", "uid");
        lb.set_ip_role(IpRole::Main);
        assert!(lb.is_service_owned());
        assert_eq!(lb.service_uid(), "uid");
        assert_eq!(lb.ip_role(), Some(IpRole::Main));
        assert_eq!(lb.status_ip(), "");
    }

    #[test]
    fn test_check_defaults() {
        let spec: L4LBSpec = serde_json::from_value(serde_json::json!({
            "frontend": {"port": 80},
            "backend": ["10.0.0.5:30080"]
        }))
        .unwrap();
        assert_eq!(spec.check.kind, "tcp");
        assert_eq!(spec.check.timeout, 2000);
        assert_eq!(spec.protocol, "tcp");
        assert_eq!(spec.state, "active");
    }
}
