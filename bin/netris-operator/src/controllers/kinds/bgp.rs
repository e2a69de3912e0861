//! BGP and its legacy twin EBGP share one schema and the same Netris
//! collection.

use crate::config::OperatorConfig;
use crate::controllers::resolve;
use crate::controllers::resource::{meta_accessors, MetaKind, SpecKind};
use crate::controllers::{Error, Result};
use kube::ResourceExt;
use netris_api::v1alpha1::{BGPMeta, BGPMetaFields, BGPMetaSpec, BGPSpec, EBGPMeta, EBGPMetaSpec, BGP, EBGP};
use netris_client::models::{Bgp, HardwareType};
use netris_client::Endpoint;
use netris_storage::Snapshot;
use serde_json::{json, Map, Value};

fn translate(name: String, spec: &BGPSpec, snapshot: &Snapshot) -> Result<BGPMetaFields> {
    let site_id = resolve::site_id(snapshot, &spec.site)?;

    let state = match spec.state.as_str() {
        "" | "enabled" => "enabled",
        "disabled" => "disabled",
        other => {
            return Err(Error::translate(format!(
                "invalid state '{}', expected enabled or disabled",
                other
            )))
        }
    };

    let (mut port_id, mut vnet_id, mut vlan, mut port_switch) = (None, None, None, None);
    match spec.transport.kind.as_str() {
        "" | "port" => {
            let port = resolve::port(snapshot, &spec.transport.name)?;
            port_id = Some(port.id);
            port_switch = Some(port.switch.id);
            vlan = spec.transport.vlan_id.map(resolve::vlan).transpose()?;
        }
        "vnet" => vnet_id = Some(resolve::vnet_id(snapshot, &spec.transport.name)?),
        other => {
            return Err(Error::translate(format!(
                "invalid transport type '{}', expected port or vnet",
                other
            )))
        }
    }

    let mut hw_id = 0;
    let mut term_switch_id = None;
    if spec.terminate_on_switch.enabled {
        term_switch_id = if spec.terminate_on_switch.switch_name.is_empty() {
            port_switch
        } else {
            Some(
                resolve::hardware(snapshot, HardwareType::Switch, &spec.terminate_on_switch.switch_name)?
                    .id,
            )
        };
        if term_switch_id.is_none() {
            return Err(Error::translate(
                "terminateOnSwitch.switchName is required with a vnet transport",
            ));
        }
    } else {
        let softgate = spec.softgate.as_deref().unwrap_or_default();
        if softgate.is_empty() {
            return Err(Error::translate(
                "softgate is required unless terminateOnSwitch is enabled",
            ));
        }
        hw_id = resolve::hardware(snapshot, HardwareType::Softgate, softgate)?.id;
    }

    let local_ip = resolve::host_cidr(&spec.local_ip)?;
    let remote_ip = resolve::host_cidr(&spec.remote_ip)?;
    let multihop = spec.multihop.clone().unwrap_or_default();

    Ok(BGPMetaFields {
        name,
        site_id,
        hw_id,
        neighbor_as: spec.neighbor_as,
        transport: if vnet_id.is_some() { "vnet" } else { "port" }.to_string(),
        port_id,
        vnet_id,
        vlan,
        local_ip: local_ip.to_string(),
        remote_ip: remote_ip.to_string(),
        terminate_on_switch: spec.terminate_on_switch.enabled,
        term_switch_id,
        neighbor_address: multihop.neighbor_address,
        update_source: multihop.update_source,
        multihop: multihop.hops,
        password: spec.bgp_password.clone(),
        allow_as_in: spec.allow_as_in,
        default_originate: spec.default_originate,
        prefix_inbound_max: spec.prefix_inbound_max,
        inbound_route_map: spec.inbound_route_map.clone(),
        outbound_route_map: spec.outbound_route_map.clone(),
        local_preference: if spec.local_preference == 0 { 100 } else { spec.local_preference },
        weight: spec.weight,
        prepend_inbound: spec.prepend_inbound,
        prepend_outbound: spec.prepend_outbound,
        prefix_list_inbound: spec.prefix_list_inbound.join("\n"),
        prefix_list_outbound: spec.prefix_list_outbound.join("\n"),
        community: spec.send_bgp_community.join("\n"),
        description: spec.description.clone(),
        state: state.to_string(),
    })
}

fn payload(bgp: &BGPMetaFields) -> Value {
    json!({
        "name": bgp.name,
        "site": {"id": bgp.site_id},
        "hardware": {"id": bgp.hw_id},
        "neighborAs": bgp.neighbor_as,
        "transport": {
            "type": bgp.transport,
            "id": bgp.port_id.or(bgp.vnet_id).unwrap_or_default(),
            "vlan": bgp.vlan,
        },
        "localIp": bgp.local_ip,
        "remoteIp": bgp.remote_ip,
        "terminateOnSwitch": {
            "enabled": bgp.terminate_on_switch,
            "switchId": bgp.term_switch_id,
        },
        "multihop": {
            "neighborAddress": bgp.neighbor_address,
            "updateSource": bgp.update_source,
            "hops": bgp.multihop,
        },
        "password": bgp.password,
        "allowAsIn": bgp.allow_as_in,
        "defaultOriginate": bgp.default_originate,
        "prefixInboundMax": bgp.prefix_inbound_max,
        "inboundRouteMap": bgp.inbound_route_map,
        "outboundRouteMap": bgp.outbound_route_map,
        "localPreference": bgp.local_preference,
        "weight": bgp.weight,
        "prependInbound": bgp.prepend_inbound,
        "prependOutbound": bgp.prepend_outbound,
        "prefixListInbound": bgp.prefix_list_inbound,
        "prefixListOutbound": bgp.prefix_list_outbound,
        "community": bgp.community,
        "description": bgp.description,
        "state": bgp.state,
    })
}

fn differs(bgp: &BGPMetaFields, remote: &Bgp) -> bool {
    let transport_id = bgp.port_id.or(bgp.vnet_id).unwrap_or_default();

    bgp.name != remote.name
        || bgp.site_id != remote.site.id
        || (!bgp.terminate_on_switch && bgp.hw_id != remote.hardware.id)
        || bgp.neighbor_as != remote.neighbor_as
        || bgp.transport != remote.transport.kind
        || transport_id != remote.transport.id
        || bgp.vlan != remote.transport.vlan
        || bgp.local_ip != remote.local_ip
        || bgp.remote_ip != remote.remote_ip
        || bgp.terminate_on_switch != remote.terminate_on_switch.enabled
        || (bgp.terminate_on_switch && bgp.term_switch_id != remote.terminate_on_switch.switch_id)
        || bgp.neighbor_address != remote.multihop.neighbor_address
        || bgp.update_source != remote.multihop.update_source
        || bgp.multihop != remote.multihop.hops
        || bgp.password != remote.password
        || bgp.allow_as_in != remote.allow_as_in
        || bgp.default_originate != remote.default_originate
        || bgp.prefix_inbound_max != remote.prefix_inbound_max
        || bgp.inbound_route_map != remote.inbound_route_map
        || bgp.outbound_route_map != remote.outbound_route_map
        || bgp.local_preference != remote.local_preference
        || bgp.weight != remote.weight
        || bgp.prepend_inbound != remote.prepend_inbound
        || bgp.prepend_outbound != remote.prepend_outbound
        || bgp.prefix_list_inbound != remote.prefix_list_inbound
        || bgp.prefix_list_outbound != remote.prefix_list_outbound
        || bgp.community != remote.community
        || bgp.description != remote.description
        || bgp.state != remote.state
}

fn status_extras(remote: &Bgp) -> Map<String, Value> {
    let mut extras = Map::new();
    extras.insert("bgpStatus".into(), json!(remote.bgp_state));
    extras.insert("bgpPrefixes".into(), json!(remote.bgp_prefixes));
    extras.insert("bgpUptime".into(), json!(remote.bgp_uptime));
    extras
}

impl SpecKind for BGP {
    type Meta = BGPMeta;
    const KIND: &'static str = "bgp";

    fn translate(&self, snapshot: &Snapshot, _config: &OperatorConfig) -> Result<BGPMetaSpec> {
        Ok(BGPMetaSpec {
            header: Default::default(),
            bgp: translate(self.name_any(), &self.spec, snapshot)?,
        })
    }
}

impl SpecKind for EBGP {
    type Meta = EBGPMeta;
    const KIND: &'static str = "ebgp";

    fn translate(&self, snapshot: &Snapshot, _config: &OperatorConfig) -> Result<EBGPMetaSpec> {
        Ok(EBGPMetaSpec {
            header: Default::default(),
            bgp: translate(self.name_any(), &self.spec.bgp, snapshot)?,
        })
    }
}

macro_rules! bgp_meta_kind {
    ($meta:ty, $owner:ty, $spec:ty, $kind:literal) => {
        impl MetaKind for $meta {
            type Owner = $owner;
            type Spec = $spec;
            type Remote = Bgp;

            const KIND: &'static str = $kind;
            const ENDPOINT: Endpoint = Endpoint::Bgps;

            meta_accessors!();

            fn find_by_id(snapshot: &Snapshot, id: i64) -> Option<Bgp> {
                snapshot.find_bgp_by_id(id).cloned()
            }

            fn find_for_import(snapshot: &Snapshot, spec: &$spec) -> Option<Bgp> {
                snapshot.find_bgp_by_name(&spec.bgp.name).cloned()
            }

            fn remote_id(remote: &Bgp) -> i64 {
                remote.id
            }

            fn payload(spec: &$spec) -> Value {
                payload(&spec.bgp)
            }

            fn differs(spec: &$spec, remote: &Bgp) -> bool {
                differs(&spec.bgp, remote)
            }

            fn remote_state(remote: &Bgp) -> String {
                remote.provisioning.clone()
            }

            fn status_extras(remote: &Bgp) -> Map<String, Value> {
                status_extras(remote)
            }
        }
    };
}

bgp_meta_kind!(BGPMeta, BGP, BGPMetaSpec, "bgpmeta");
bgp_meta_kind!(EBGPMeta, EBGP, EBGPMetaSpec, "ebgpmeta");

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controllers::kinds::fixtures;
    use netris_api::v1alpha1::{BGPTerminateOnSwitch, BGPTransport};

    fn spec() -> BGPSpec {
        BGPSpec {
            site: "santa-clara".into(),
            softgate: Some("softgate1".into()),
            neighbor_as: 23456,
            transport: BGPTransport {
                kind: "port".into(),
                name: "swp5@leaf1".into(),
                vlan_id: Some(1020),
            },
            local_ip: "172.16.0.1/30".into(),
            remote_ip: "172.16.0.2/30".into(),
            local_preference: 100,
            prefix_list_inbound: vec!["permit 0.0.0.0/0 le 24".into(), "deny 10.0.0.0/8".into()],
            send_bgp_community: vec!["65000:1".into()],
            state: "enabled".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_translate_port_transport_on_softgate() {
        let fields = translate("bgp-upstream".into(), &spec(), &fixtures::snapshot()).unwrap();
        assert_eq!(fields.site_id, 1);
        assert_eq!(fields.hw_id, 23);
        assert_eq!(fields.port_id, Some(11));
        assert_eq!(fields.vlan, Some(1020));
        assert_eq!(fields.transport, "port");
        assert!(!fields.terminate_on_switch);
        assert_eq!(fields.prefix_list_inbound, "permit 0.0.0.0/0 le 24\ndeny 10.0.0.0/8");
        assert_eq!(fields.community, "65000:1");
    }

    #[test]
    fn test_translate_vnet_transport_on_switch() {
        let mut spec = spec();
        spec.softgate = None;
        spec.transport = BGPTransport {
            kind: "vnet".into(),
            name: "k8s-vnet".into(),
            vlan_id: None,
        };
        spec.terminate_on_switch = BGPTerminateOnSwitch {
            enabled: true,
            switch_name: "spine1".into(),
        };

        let fields = translate("node-10-1-0-5".into(), &spec, &fixtures::snapshot()).unwrap();
        assert_eq!(fields.vnet_id, Some(31));
        assert_eq!(fields.term_switch_id, Some(22));
        assert_eq!(fields.hw_id, 0);

        let payload = payload(&fields);
        assert_eq!(payload["transport"]["type"], "vnet");
        assert_eq!(payload["transport"]["id"], 31);
        assert_eq!(payload["terminateOnSwitch"]["switchId"], 22);
    }

    #[test]
    fn test_translate_requires_softgate_or_switch() {
        let mut no_softgate = spec();
        no_softgate.softgate = None;
        let err = translate("x".into(), &no_softgate, &fixtures::snapshot()).unwrap_err();
        assert!(matches!(err, Error::Translate(_)));

        let mut bare_ip = spec();
        bare_ip.local_ip = "172.16.0.1".into();
        assert!(translate("x".into(), &bare_ip, &fixtures::snapshot()).is_err());
    }

    #[test]
    fn test_differs_and_status_extras() {
        let fields = translate("bgp-upstream".into(), &spec(), &fixtures::snapshot()).unwrap();
        let mut value = payload(&fields);
        value["id"] = json!(9);
        let remote: Bgp = serde_json::from_value(value).unwrap();
        assert!(!differs(&fields, &remote));

        let mut changed = remote.clone();
        changed.neighbor_as = 65000;
        assert!(differs(&fields, &changed));

        changed.bgp_state = "Established".into();
        changed.bgp_prefixes = 12;
        let extras = status_extras(&changed);
        assert_eq!(extras["bgpStatus"], "Established");
        assert_eq!(extras["bgpPrefixes"], 12);
    }
}
