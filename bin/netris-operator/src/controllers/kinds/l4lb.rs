use super::enable_state;
use crate::config::OperatorConfig;
use crate::controllers::resolve;
use crate::controllers::resource::{meta_accessors, MetaKind, SpecKind};
use crate::controllers::{Error, Result};
use kube::ResourceExt;
use netris_api::v1alpha1::{L4LBMeta, L4LBMetaSpec, L4LB};
use netris_client::models::{L4lb, L4lbBackend};
use netris_client::Endpoint;
use netris_storage::Snapshot;
use serde_json::{json, Map, Value};
use std::net::IpAddr;

fn backend(value: &str) -> Result<L4lbBackend> {
    L4lbBackend::parse(value)
        .filter(|b| b.port > 0 && b.ip.parse::<IpAddr>().is_ok())
        .ok_or_else(|| Error::translate(format!("invalid backend '{}', expected ip:port", value)))
}

impl SpecKind for L4LB {
    type Meta = L4LBMeta;
    const KIND: &'static str = "l4lb";

    fn translate(&self, snapshot: &Snapshot, config: &OperatorConfig) -> Result<L4LBMetaSpec> {
        let spec = &self.spec;
        let backends = spec
            .backend
            .iter()
            .map(|b| backend(b))
            .collect::<Result<Vec<_>>>()?;

        if !spec.frontend.ip.is_empty() {
            resolve::ip(&spec.frontend.ip)?;
        }

        // Tenant and site default to the subnet holding the frontend, or the
        // first backend for automatic frontends
        let lookup_ip = if spec.frontend.ip.is_empty() {
            backends.first().map(|b| b.ip.as_str())
        } else {
            Some(spec.frontend.ip.as_str())
        };
        let subnet = || {
            lookup_ip
                .and_then(|ip| ip.parse::<IpAddr>().ok())
                .and_then(|ip| snapshot.find_subnet_by_ip(ip))
                .ok_or_else(|| Error::translate("no subnet found for the L4LB frontend"))
        };

        let tenant_id = if !spec.owner_tenant.is_empty() {
            resolve::tenant_id(snapshot, &spec.owner_tenant)?
        } else if !config.l4lb_tenant.is_empty() {
            resolve::tenant_id(snapshot, &config.l4lb_tenant)?
        } else {
            subnet()?.tenant.id
        };

        let site_id = if !spec.site.is_empty() {
            resolve::site_id(snapshot, &spec.site)?
        } else {
            subnet()?
                .sites
                .first()
                .map(|s| s.id)
                .ok_or_else(|| Error::translate("subnet of the L4LB frontend has no site"))?
        };

        let protocol = match spec.protocol.to_lowercase().as_str() {
            "" | "tcp" => "tcp",
            "udp" => "udp",
            other => {
                return Err(Error::translate(format!(
                    "invalid protocol '{}', expected tcp or udp",
                    other
                )))
            }
        };

        let timeout = if spec.check.timeout == 0 { 2000 } else { spec.check.timeout };
        let (health_check, request_path) = match (protocol, spec.check.kind.as_str()) {
            ("tcp", "" | "tcp") => ("TCP", String::new()),
            ("tcp", "http") => ("HTTP", spec.check.request_path.clone()),
            _ => ("None", String::new()),
        };

        Ok(L4LBMetaSpec {
            header: Default::default(),
            name: self.name_any(),
            tenant_id,
            site_id,
            automatic: spec.frontend.ip.is_empty(),
            ip: spec.frontend.ip.clone(),
            port: spec.frontend.port,
            protocol: protocol.to_uppercase(),
            status: enable_state(&spec.state).to_string(),
            health_check: health_check.to_string(),
            timeout: timeout.to_string(),
            request_path,
            backends: backends.iter().map(ToString::to_string).collect(),
        })
    }
}

impl MetaKind for L4LBMeta {
    type Owner = L4LB;
    type Spec = L4LBMetaSpec;
    type Remote = L4lb;

    const KIND: &'static str = "l4lbmeta";
    const ENDPOINT: Endpoint = Endpoint::L4lbs;

    meta_accessors!();

    fn find_by_id(snapshot: &Snapshot, id: i64) -> Option<L4lb> {
        snapshot.find_l4lb_by_id(id).cloned()
    }

    fn find_for_import(snapshot: &Snapshot, spec: &L4LBMetaSpec) -> Option<L4lb> {
        snapshot.find_l4lb_by_name(&spec.name).cloned()
    }

    fn remote_id(remote: &L4lb) -> i64 {
        remote.id
    }

    fn payload(spec: &L4LBMetaSpec) -> Value {
        let backend: Vec<Value> = spec
            .backends
            .iter()
            .filter_map(|b| L4lbBackend::parse(b))
            .map(|b| json!({"ip": b.ip, "port": b.port}))
            .collect();

        json!({
            "name": spec.name,
            "tenant": {"id": spec.tenant_id},
            "site": {"id": spec.site_id},
            "automatic": spec.automatic,
            "ip": if spec.automatic { Value::Null } else { json!(spec.ip) },
            "port": spec.port,
            "protocol": spec.protocol,
            "status": spec.status,
            "healthCheck": spec.health_check,
            "timeout": spec.timeout,
            "requestPath": spec.request_path,
            "backend": backend,
        })
    }

    fn differs(spec: &L4LBMetaSpec, remote: &L4lb) -> bool {
        let remote_backends: Vec<String> = remote.backend.iter().map(ToString::to_string).collect();

        spec.name != remote.name
            || spec.automatic != remote.automatic
            || (!spec.automatic && spec.ip != remote.ip)
            || spec.port != remote.port
            || spec.protocol != remote.protocol
            || spec.site_id != remote.site.id
            || spec.tenant_id != remote.tenant.id
            || spec.status != remote.status
            || spec.health_check != remote.health_check
            || (spec.health_check != "None" && spec.timeout != remote.timeout)
            || (spec.health_check == "HTTP" && spec.request_path != remote.request_path)
            || !resolve::same_set(&spec.backends, &remote_backends)
    }

    fn remote_state(remote: &L4lb) -> String {
        remote.state.clone()
    }

    fn status_extras(remote: &L4lb) -> Map<String, Value> {
        let mut extras = Map::new();
        extras.insert("ip".into(), json!(remote.ip));
        extras.insert("port".into(), json!(remote.port.to_string()));
        extras
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controllers::kinds::fixtures;
    use netris_api::v1alpha1::{L4LBCheck, L4LBFrontend, L4LBSpec};

    fn l4lb(ip: &str, backends: &[&str]) -> L4LB {
        L4LB::new(
            "web-default-abc-tcp-80",
            L4LBSpec {
                state: "active".into(),
                protocol: "tcp".into(),
                frontend: L4LBFrontend {
                    port: 80,
                    ip: ip.into(),
                },
                backend: backends.iter().map(|b| b.to_string()).collect(),
                check: L4LBCheck::default(),
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_tenant_and_site_from_backend_subnet() {
        let lb = l4lb("", &["10.1.0.10:30080", "10.1.0.11:30080"]);
        let meta = lb
            .translate(&fixtures::snapshot(), &OperatorConfig::default())
            .unwrap();
        assert_eq!(meta.tenant_id, 2);
        assert_eq!(meta.site_id, 1);
        assert!(meta.automatic);
        assert_eq!(meta.protocol, "TCP");
        assert_eq!(meta.status, "enable");
        assert_eq!(meta.health_check, "TCP");
        assert_eq!(meta.timeout, "2000");
        assert!(L4LBMeta::payload(&meta)["ip"].is_null());
    }

    #[test]
    fn test_configured_tenant_wins_over_subnet() {
        let config = OperatorConfig {
            l4lb_tenant: "Admin".into(),
            ..Default::default()
        };
        let meta = l4lb("192.168.50.10", &["10.1.0.10:30080"])
            .translate(&fixtures::snapshot(), &config)
            .unwrap();
        assert_eq!(meta.tenant_id, 1);
        assert!(!meta.automatic);
        assert_eq!(meta.ip, "192.168.50.10");
    }

    #[test]
    fn test_udp_has_no_health_check() {
        let mut lb = l4lb("", &["10.1.0.10:30053"]);
        lb.spec.protocol = "udp".into();
        let meta = lb
            .translate(&fixtures::snapshot(), &OperatorConfig::default())
            .unwrap();
        assert_eq!(meta.protocol, "UDP");
        assert_eq!(meta.health_check, "None");
    }

    #[test]
    fn test_rejects_bad_backend() {
        let snapshot = fixtures::snapshot();
        let config = OperatorConfig::default();
        assert!(l4lb("", &["10.1.0.10"]).translate(&snapshot, &config).is_err());
        assert!(l4lb("", &["10.1.0.10:0"]).translate(&snapshot, &config).is_err());
        assert!(l4lb("", &["host:80"]).translate(&snapshot, &config).is_err());
        let err = l4lb("", &["172.31.0.1:80"])
            .translate(&snapshot, &config)
            .unwrap_err();
        assert_eq!(err.to_string(), "no subnet found for the L4LB frontend");
    }

    #[test]
    fn test_differs_ignores_backend_order_and_auto_ip() {
        let meta = l4lb("", &["10.1.0.10:30080", "10.1.0.11:30080"])
            .translate(&fixtures::snapshot(), &OperatorConfig::default())
            .unwrap();
        let remote: L4lb = serde_json::from_value(json!({
            "id": 4,
            "name": "web-default-abc-tcp-80",
            "tenant": {"id": 2},
            "site": {"id": 1},
            "automatic": true,
            "ip": "192.168.50.3",
            "port": 80,
            "protocol": "TCP",
            "status": "enable",
            "healthCheck": "TCP",
            "timeout": "2000",
            "backend": [{"ip": "10.1.0.11", "port": 30080}, {"ip": "10.1.0.10", "port": 30080}],
            "state": "OK"
        }))
        .unwrap();
        assert!(!L4LBMeta::differs(&meta, &remote));

        let extras = L4LBMeta::status_extras(&remote);
        assert_eq!(extras["ip"], "192.168.50.3");
        assert_eq!(extras["port"], "80");

        let mut shrunk = remote.clone();
        shrunk.backend.pop();
        assert!(L4LBMeta::differs(&meta, &shrunk));
    }
}
