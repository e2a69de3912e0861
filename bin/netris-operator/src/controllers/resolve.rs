//! Name to id resolution and input validation shared by the translations

use super::{Error, Result};
use ipnetwork::IpNetwork;
use netris_client::models::{Hardware, HardwareType, Port};
use netris_storage::Snapshot;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::net::IpAddr;

static PORT_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(swp\d+@.+|.+@.+)$").expect("port name pattern compiles")
});

pub fn tenant_id(snapshot: &Snapshot, name: &str) -> Result<i64> {
    snapshot
        .find_tenant_by_name(name)
        .map(|t| t.id)
        .ok_or_else(|| Error::translate(format!("tenant '{}' not found", name)))
}

pub fn tenant_ids(snapshot: &Snapshot, names: &[String]) -> Result<Vec<i64>> {
    names.iter().map(|n| tenant_id(snapshot, n)).collect()
}

pub fn site_id(snapshot: &Snapshot, name: &str) -> Result<i64> {
    snapshot
        .find_site_by_name(name)
        .map(|s| s.id)
        .ok_or_else(|| Error::translate(format!("site '{}' not found", name)))
}

pub fn site_ids(snapshot: &Snapshot, names: &[String]) -> Result<Vec<i64>> {
    names.iter().map(|n| site_id(snapshot, n)).collect()
}

pub fn vnet_id(snapshot: &Snapshot, name: &str) -> Result<i64> {
    snapshot
        .find_vnet_by_name(name)
        .map(|v| v.id)
        .ok_or_else(|| Error::translate(format!("vnet '{}' not found", name)))
}

pub fn vpc_id(snapshot: &Snapshot, name: &str) -> Result<i64> {
    snapshot
        .find_vpc_by_name(name)
        .map(|v| v.id)
        .ok_or_else(|| Error::translate(format!("vpc '{}' not found", name)))
}

pub fn profile_id(snapshot: &Snapshot, name: &str) -> Result<i64> {
    snapshot
        .find_inventory_profile_by_name(name)
        .map(|p| p.id)
        .ok_or_else(|| Error::translate(format!("inventory profile '{}' not found", name)))
}

pub fn hardware<'a>(snapshot: &'a Snapshot, kind: HardwareType, name: &str) -> Result<&'a Hardware> {
    snapshot
        .find_hardware_by_name(kind, name)
        .ok_or_else(|| Error::translate(format!("{:?} '{}' not found", kind, name).to_lowercase()))
}

/// Resolve a `swpN@switch` port name
pub fn port<'a>(snapshot: &'a Snapshot, name: &str) -> Result<&'a Port> {
    if !PORT_NAME.is_match(name) {
        return Err(Error::translate(format!(
            "invalid port name '{}', expected swpN@switch",
            name
        )));
    }
    snapshot
        .find_port(name)
        .ok_or_else(|| Error::translate(format!("port '{}' not found", name)))
}

pub fn vlan(vlan: u16) -> Result<u16> {
    if (1..=4094).contains(&vlan) {
        Ok(vlan)
    } else {
        Err(Error::translate(format!("invalid vlan {}, expected 1-4094", vlan)))
    }
}

/// CIDR with a host part, e.g. a gateway `10.0.0.1/24`
pub fn host_cidr(value: &str) -> Result<IpNetwork> {
    value
        .parse::<IpNetwork>()
        .ok()
        .filter(|_| value.contains('/'))
        .ok_or_else(|| Error::translate(format!("invalid address '{}', expected CIDR notation", value)))
}

/// CIDR whose host bits are zero, e.g. `10.0.0.0/24`
pub fn network_cidr(value: &str) -> Result<IpNetwork> {
    let net = host_cidr(value)?;
    if net.network() != net.ip() {
        return Err(Error::translate(format!(
            "invalid prefix '{}', host bits must be zero",
            value
        )));
    }
    Ok(net)
}

pub fn ip(value: &str) -> Result<IpAddr> {
    value
        .parse()
        .map_err(|_| Error::translate(format!("invalid IP address '{}'", value)))
}

/// IP address or the literal `auto`
pub fn ip_or_auto(value: &str) -> Result<String> {
    if value.is_empty() || value == "auto" {
        return Ok("auto".to_string());
    }
    ip(value).map(|ip| ip.to_string())
}

/// Order-insensitive list comparison
pub fn same_set<T: Ord + Clone>(a: &[T], b: &[T]) -> bool {
    a.iter().cloned().collect::<BTreeSet<_>>() == b.iter().cloned().collect::<BTreeSet<_>>()
}
