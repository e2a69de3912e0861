//! Inventory hardware: switches, servers, softgates and controllers share the
//! Netris inventory collection and differ only in the fields they carry.

use crate::config::OperatorConfig;
use crate::controllers::resolve;
use crate::controllers::resource::{meta_accessors, MetaKind, SpecKind};
use crate::controllers::{Error, Result};
use kube::ResourceExt;
use netris_api::v1alpha1::{
    Controller, ControllerMeta, ControllerMetaSpec, Server, ServerMeta, ServerMetaSpec, Softgate,
    SoftgateMeta, SoftgateMetaSpec, Switch, SwitchMeta, SwitchMetaSpec,
};
use netris_client::models::{Hardware, HardwareType};
use netris_client::Endpoint;
use netris_storage::Snapshot;
use serde_json::{json, Value};

/// Fields every hardware payload carries
fn base_payload(name: &str, tenant_id: i64, description: &str, site_id: i64, main_ip: &str) -> Value {
    json!({
        "name": name,
        "tenant": {"id": tenant_id},
        "description": description,
        "site": {"id": site_id},
        "mainIp": main_ip,
    })
}

fn profile_payload(profile_id: Option<i64>) -> Value {
    profile_id.map_or(Value::Null, |id| json!({ "id": id }))
}

/// "auto" addresses are allocated by Netris and never drift
fn ip_differs(spec: &str, remote: &str) -> bool {
    spec != "auto" && spec != remote
}

fn base_differs(
    name: &str,
    tenant_id: i64,
    description: &str,
    site_id: i64,
    main_ip: &str,
    remote: &Hardware,
) -> bool {
    name != remote.name
        || tenant_id != remote.tenant.id
        || description != remote.description
        || site_id != remote.site.id
        || ip_differs(main_ip, &remote.main_ip)
}

fn profile_differs(profile_id: Option<i64>, remote: &Hardware) -> bool {
    profile_id != remote.profile.as_ref().map(|p| p.id)
}

fn optional_profile(snapshot: &Snapshot, profile: Option<&str>) -> Result<Option<i64>> {
    profile
        .filter(|p| !p.is_empty())
        .map(|p| resolve::profile_id(snapshot, p))
        .transpose()
}

impl SpecKind for Switch {
    type Meta = SwitchMeta;
    const KIND: &'static str = "switch";

    fn translate(&self, snapshot: &Snapshot, _config: &OperatorConfig) -> Result<SwitchMetaSpec> {
        let spec = &self.spec;
        if spec.nos.is_empty() {
            return Err(Error::translate("switch nos is required"));
        }
        Ok(SwitchMetaSpec {
            header: Default::default(),
            name: self.name_any(),
            tenant_id: resolve::tenant_id(snapshot, &spec.tenant)?,
            description: spec.description.clone(),
            nos: spec.nos.clone(),
            site_id: resolve::site_id(snapshot, &spec.site)?,
            asn: spec.asn,
            profile_id: optional_profile(snapshot, spec.profile.as_deref())?,
            main_ip: resolve::ip_or_auto(&spec.main_ip)?,
            mgmt_ip: resolve::ip_or_auto(&spec.mgmt_ip)?,
            ports_count: spec.ports_count,
            mac_address: spec.mac_address.clone(),
        })
    }
}

impl MetaKind for SwitchMeta {
    type Owner = Switch;
    type Spec = SwitchMetaSpec;
    type Remote = Hardware;

    const KIND: &'static str = "switchmeta";
    const ENDPOINT: Endpoint = Endpoint::Switches;

    meta_accessors!();

    fn find_by_id(snapshot: &Snapshot, id: i64) -> Option<Hardware> {
        snapshot.find_hardware_by_id(HardwareType::Switch, id).cloned()
    }

    fn find_for_import(snapshot: &Snapshot, spec: &SwitchMetaSpec) -> Option<Hardware> {
        snapshot
            .find_hardware_by_name(HardwareType::Switch, &spec.name)
            .cloned()
    }

    fn remote_id(remote: &Hardware) -> i64 {
        remote.id
    }

    fn payload(spec: &SwitchMetaSpec) -> Value {
        let mut payload = base_payload(
            &spec.name,
            spec.tenant_id,
            &spec.description,
            spec.site_id,
            &spec.main_ip,
        );
        payload["nos"] = json!(spec.nos);
        payload["asn"] = if spec.asn == 0 { json!("auto") } else { json!(spec.asn) };
        payload["profile"] = profile_payload(spec.profile_id);
        payload["mgmtIp"] = json!(spec.mgmt_ip);
        payload["portsCount"] = json!(spec.ports_count);
        payload["macAddress"] = json!(spec.mac_address);
        payload
    }

    fn differs(spec: &SwitchMetaSpec, remote: &Hardware) -> bool {
        base_differs(
            &spec.name,
            spec.tenant_id,
            &spec.description,
            spec.site_id,
            &spec.main_ip,
            remote,
        ) || spec.nos != remote.nos
            || (spec.asn != 0 && spec.asn != remote.asn)
            || profile_differs(spec.profile_id, remote)
            || ip_differs(&spec.mgmt_ip, &remote.mgmt_ip)
            || spec.ports_count != remote.ports_count
            || (!spec.mac_address.is_empty() && spec.mac_address != remote.mac_address)
    }

    fn remote_state(remote: &Hardware) -> String {
        remote.status.clone()
    }
}

impl SpecKind for Server {
    type Meta = ServerMeta;
    const KIND: &'static str = "server";

    fn translate(&self, snapshot: &Snapshot, _config: &OperatorConfig) -> Result<ServerMetaSpec> {
        let spec = &self.spec;
        Ok(ServerMetaSpec {
            header: Default::default(),
            name: self.name_any(),
            tenant_id: resolve::tenant_id(snapshot, &spec.tenant)?,
            description: spec.description.clone(),
            site_id: resolve::site_id(snapshot, &spec.site)?,
            profile_id: optional_profile(snapshot, spec.profile.as_deref())?,
            main_ip: resolve::ip_or_auto(&spec.main_ip)?,
            mgmt_ip: resolve::ip_or_auto(&spec.mgmt_ip)?,
            uuid: spec.uuid.clone(),
            asn: spec.asn,
            ports_count: spec.ports_count,
            custom_data: spec.custom_data.clone(),
            tags: spec.tags.clone(),
            srv_role: spec.srv_role.clone(),
        })
    }
}

impl MetaKind for ServerMeta {
    type Owner = Server;
    type Spec = ServerMetaSpec;
    type Remote = Hardware;

    const KIND: &'static str = "servermeta";
    const ENDPOINT: Endpoint = Endpoint::Servers;

    meta_accessors!();

    fn find_by_id(snapshot: &Snapshot, id: i64) -> Option<Hardware> {
        snapshot.find_hardware_by_id(HardwareType::Server, id).cloned()
    }

    fn find_for_import(snapshot: &Snapshot, spec: &ServerMetaSpec) -> Option<Hardware> {
        snapshot
            .find_hardware_by_name(HardwareType::Server, &spec.name)
            .cloned()
    }

    fn remote_id(remote: &Hardware) -> i64 {
        remote.id
    }

    fn payload(spec: &ServerMetaSpec) -> Value {
        let mut payload = base_payload(
            &spec.name,
            spec.tenant_id,
            &spec.description,
            spec.site_id,
            &spec.main_ip,
        );
        payload["profile"] = profile_payload(spec.profile_id);
        payload["mgmtIp"] = json!(spec.mgmt_ip);
        payload["uuid"] = json!(spec.uuid);
        payload["asn"] = if spec.asn == 0 { json!("auto") } else { json!(spec.asn) };
        payload["portsCount"] = json!(spec.ports_count);
        payload["customData"] = json!(spec.custom_data);
        payload["tags"] = json!(spec.tags);
        payload["srvRole"] = json!(spec.srv_role);
        payload
    }

    fn differs(spec: &ServerMetaSpec, remote: &Hardware) -> bool {
        base_differs(
            &spec.name,
            spec.tenant_id,
            &spec.description,
            spec.site_id,
            &spec.main_ip,
            remote,
        ) || profile_differs(spec.profile_id, remote)
            || ip_differs(&spec.mgmt_ip, &remote.mgmt_ip)
            || (!spec.uuid.is_empty() && spec.uuid != remote.uuid)
            || (spec.asn != 0 && spec.asn != remote.asn)
            || spec.ports_count != remote.ports_count
            || spec.custom_data != remote.custom_data
            || !resolve::same_set(&spec.tags, &remote.tags)
            || spec.srv_role != remote.srv_role
    }

    fn remote_state(remote: &Hardware) -> String {
        remote.status.clone()
    }
}

impl SpecKind for Softgate {
    type Meta = SoftgateMeta;
    const KIND: &'static str = "softgate";

    fn translate(&self, snapshot: &Snapshot, _config: &OperatorConfig) -> Result<SoftgateMetaSpec> {
        let spec = &self.spec;
        Ok(SoftgateMetaSpec {
            header: Default::default(),
            name: self.name_any(),
            tenant_id: resolve::tenant_id(snapshot, &spec.tenant)?,
            description: spec.description.clone(),
            site_id: resolve::site_id(snapshot, &spec.site)?,
            profile_id: optional_profile(snapshot, spec.profile.as_deref())?,
            main_ip: resolve::ip_or_auto(&spec.main_ip)?,
            mgmt_ip: resolve::ip_or_auto(&spec.mgmt_ip)?,
        })
    }
}

impl MetaKind for SoftgateMeta {
    type Owner = Softgate;
    type Spec = SoftgateMetaSpec;
    type Remote = Hardware;

    const KIND: &'static str = "softgatemeta";
    const ENDPOINT: Endpoint = Endpoint::Softgates;

    meta_accessors!();

    fn find_by_id(snapshot: &Snapshot, id: i64) -> Option<Hardware> {
        snapshot.find_hardware_by_id(HardwareType::Softgate, id).cloned()
    }

    fn find_for_import(snapshot: &Snapshot, spec: &SoftgateMetaSpec) -> Option<Hardware> {
        snapshot
            .find_hardware_by_name(HardwareType::Softgate, &spec.name)
            .cloned()
    }

    fn remote_id(remote: &Hardware) -> i64 {
        remote.id
    }

    fn payload(spec: &SoftgateMetaSpec) -> Value {
        let mut payload = base_payload(
            &spec.name,
            spec.tenant_id,
            &spec.description,
            spec.site_id,
            &spec.main_ip,
        );
        payload["profile"] = profile_payload(spec.profile_id);
        payload["mgmtIp"] = json!(spec.mgmt_ip);
        payload
    }

    fn differs(spec: &SoftgateMetaSpec, remote: &Hardware) -> bool {
        base_differs(
            &spec.name,
            spec.tenant_id,
            &spec.description,
            spec.site_id,
            &spec.main_ip,
            remote,
        ) || profile_differs(spec.profile_id, remote)
            || ip_differs(&spec.mgmt_ip, &remote.mgmt_ip)
    }

    fn remote_state(remote: &Hardware) -> String {
        remote.status.clone()
    }
}

impl SpecKind for Controller {
    type Meta = ControllerMeta;
    const KIND: &'static str = "controller";

    fn translate(&self, snapshot: &Snapshot, _config: &OperatorConfig) -> Result<ControllerMetaSpec> {
        let spec = &self.spec;
        Ok(ControllerMetaSpec {
            header: Default::default(),
            name: self.name_any(),
            tenant_id: resolve::tenant_id(snapshot, &spec.tenant)?,
            description: spec.description.clone(),
            site_id: resolve::site_id(snapshot, &spec.site)?,
            main_ip: resolve::ip_or_auto(&spec.main_ip)?,
        })
    }
}

impl MetaKind for ControllerMeta {
    type Owner = Controller;
    type Spec = ControllerMetaSpec;
    type Remote = Hardware;

    const KIND: &'static str = "controllermeta";
    const ENDPOINT: Endpoint = Endpoint::Controllers;

    meta_accessors!();

    fn find_by_id(snapshot: &Snapshot, id: i64) -> Option<Hardware> {
        snapshot
            .find_hardware_by_id(HardwareType::Controller, id)
            .cloned()
    }

    fn find_for_import(snapshot: &Snapshot, spec: &ControllerMetaSpec) -> Option<Hardware> {
        snapshot
            .find_hardware_by_name(HardwareType::Controller, &spec.name)
            .cloned()
    }

    fn remote_id(remote: &Hardware) -> i64 {
        remote.id
    }

    fn payload(spec: &ControllerMetaSpec) -> Value {
        base_payload(
            &spec.name,
            spec.tenant_id,
            &spec.description,
            spec.site_id,
            &spec.main_ip,
        )
    }

    fn differs(spec: &ControllerMetaSpec, remote: &Hardware) -> bool {
        base_differs(
            &spec.name,
            spec.tenant_id,
            &spec.description,
            spec.site_id,
            &spec.main_ip,
            remote,
        )
    }

    fn remote_state(remote: &Hardware) -> String {
        remote.status.clone()
    }
}
