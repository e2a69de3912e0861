//! Per-kind translation and Netris mapping

mod allocation;
mod bgp;
mod hardware;
mod inventory_profile;
mod l4lb;
mod link;
mod nat;
mod server_cluster;
mod server_cluster_template;
mod site;
mod subnet;
mod vnet;
mod vpc;

#[cfg(test)]
pub(crate) mod fixtures;

/// `active`/`disabled` as the enable/disable verbs some endpoints expect
pub(crate) fn enable_state(state: &str) -> &'static str {
    match state {
        "disabled" | "disable" => "disable",
        _ => "enable",
    }
}
