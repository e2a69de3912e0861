//! Peers Calico nodes with the Netris fabric. While a BGPConfiguration
//! carries the manage annotation every node gets an ASN and a BGP resource
//! towards the site spine, and the node-to-node mesh is switched off once
//! all sessions are up. Without the annotation everything is torn down.

use super::{log_errors, run_periodic, Result, WatcherError};
use crate::controllers::Context;
use ipnetwork::IpNetwork;
use k8s_openapi::api::core::v1::Node;
use kube::api::{Api, DeleteParams, ListParams, Patch, PatchParams, PostParams};
use kube::ResourceExt;
use netris_api::calico::bgp_peer::BGPPeerSpec;
use netris_api::calico::{
    BGPConfiguration, BGPPeer, IPPool, MANAGE_ANNOTATION, NODE_ASN_ANNOTATION, NODE_IPIP_ANNOTATION,
    NODE_IPV4_ANNOTATION,
};
use netris_api::v1alpha1::{BGPSpec, BGPTerminateOnSwitch, BGPTransport, BGP, IMPORT_ANNOTATION};
use netris_storage::Snapshot;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::json;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::net::IpAddr;
use std::sync::Arc;
use tracing::{debug, info, warn};

const NAME: &str = "calicowatcher";

/// Marks BGP resources owned by this watcher
pub const WATCHER_ANNOTATION: &str = "k8s.netris.ai/calicowatcher";

/// Calico peer pointing the nodes at the fabric
pub const PEER_NAME: &str = "netris-controller";

const BGP_NAMESPACE: &str = "default";

static NAME_SANITIZER: Lazy<Regex> = Lazy::new(|| Regex::new("[^a-z0-9.]+").expect("valid regex"));

pub async fn run(ctx: Arc<Context>) {
    info!("Starting {}", NAME);
    run_periodic(NAME, ctx, process).await
}

/// Calico address plan
#[derive(Clone, Debug, PartialEq)]
pub struct IpInfo {
    pub cluster_cidr: String,
    pub block_size: u8,
    pub service_cidrs: Vec<String>,
}

/// A node ready to be peered
#[derive(Clone, Debug, PartialEq)]
pub struct NodeInfo {
    pub name: String,
    /// Node address in CIDR form, as annotated by Calico
    pub ip: String,
    pub ipip: String,
    pub asn: u32,
}

/// Where the nodes attach to the fabric
#[derive(Clone, Debug, PartialEq)]
pub struct Fabric {
    pub site: String,
    pub site_asn: u32,
    pub vnet: String,
    /// VNet gateway in CIDR form
    pub gateway: String,
    pub gateway_ip: String,
    pub spine: String,
}

fn annotation<'a>(node: &'a Node, key: &str) -> Option<&'a str> {
    node.metadata
        .annotations
        .as_ref()
        .and_then(|a| a.get(key))
        .map(String::as_str)
}

fn is_watcher_owned(bgp: &BGP) -> bool {
    bgp.annotations().get(WATCHER_ANNOTATION).map(String::as_str) == Some("true")
}

/// Managed mode is on when any configuration carries the manage annotation
pub fn is_managed(confs: &[BGPConfiguration]) -> bool {
    confs.iter().any(BGPConfiguration::is_managed)
}

pub fn ip_info(pools: &[IPPool], conf: &BGPConfiguration) -> Result<IpInfo> {
    let pool = pools
        .first()
        .ok_or_else(|| WatcherError::Calico("IPPool is missing".to_string()))?;
    Ok(IpInfo {
        cluster_cidr: pool.spec.cidr.clone(),
        block_size: pool.spec.block_size,
        service_cidrs: conf
            .spec
            .service_cluster_ips
            .iter()
            .map(|block| block.cidr.clone())
            .collect(),
    })
}

/// Pick ASNs for nodes without one: the lowest free number in
/// `[first, last)`, in node order
pub fn assign_asns(nodes: &[Node], (first, last): (u32, u32)) -> Vec<(String, u32)> {
    let mut taken: HashSet<u32> = nodes
        .iter()
        .filter_map(|node| annotation(node, NODE_ASN_ANNOTATION))
        .filter_map(|asn| asn.parse().ok())
        .collect();

    let mut assigned = Vec::new();
    for node in nodes.iter().filter(|n| annotation(n, NODE_ASN_ANNOTATION).is_none()) {
        if let Some(asn) = (first..last).find(|asn| !taken.contains(asn)) {
            taken.insert(asn);
            assigned.push((node.name_any(), asn));
        }
    }
    assigned
}

/// Nodes carrying a watcher-assigned ASN within `[first, last]`
pub fn assigned_asn_nodes(nodes: &[Node], (first, last): (u32, u32)) -> Vec<String> {
    nodes
        .iter()
        .filter(|node| {
            annotation(node, NODE_ASN_ANNOTATION)
                .and_then(|asn| asn.parse::<u32>().ok())
                .map(|asn| asn >= first && asn <= last)
                .unwrap_or(false)
        })
        .map(|node| node.name_any())
        .collect()
}

/// Collect peerable nodes and locate the fabric attachment from the first
/// node address that falls inside a known subnet
pub fn process_nodes(nodes: &[Node], snapshot: &Snapshot) -> Result<(Vec<NodeInfo>, Fabric)> {
    let mut infos = Vec::new();
    let mut attachment = None;

    for node in nodes {
        let (Some(ip), Some(ipip)) = (
            annotation(node, NODE_IPV4_ANNOTATION),
            annotation(node, NODE_IPIP_ANNOTATION),
        ) else {
            continue;
        };

        let asn = annotation(node, NODE_ASN_ANNOTATION)
            .and_then(|asn| asn.parse::<u32>().ok())
            .ok_or_else(|| WatcherError::Calico(format!("no AS number for node {}", node.name_any())))?;

        let address = ip.split('/').next().unwrap_or_default();
        let Ok(address) = address.parse::<IpAddr>() else {
            warn!("Invalid IP {} on node {}", ip, node.name_any());
            continue;
        };

        if attachment.is_none() {
            match snapshot.find_subnet_by_ip(address) {
                Some(subnet) => attachment = Some(subnet),
                None => debug!("No subnet for node {} address {}", node.name_any(), address),
            }
        }

        infos.push(NodeInfo {
            name: node.name_any(),
            ip: ip.to_string(),
            ipip: ipip.to_string(),
            asn,
        });
    }

    let subnet = attachment.ok_or_else(|| WatcherError::Inventory("site not found for the cluster nodes".to_string()))?;
    let site = subnet
        .sites
        .first()
        .and_then(|s| snapshot.find_site_by_id(s.id))
        .ok_or_else(|| WatcherError::Inventory("site not found for the cluster nodes".to_string()))?;
    let network: IpNetwork = subnet
        .prefix
        .parse()
        .map_err(|_| WatcherError::Inventory(format!("invalid subnet prefix {}", subnet.prefix)))?;
    let vnet = snapshot
        .find_vnet_by_gateway(&network)
        .ok_or_else(|| WatcherError::Inventory(format!("VNet not found for subnet {}", subnet.prefix)))?;
    let spine = snapshot
        .find_spine_by_site(site.id)
        .ok_or_else(|| WatcherError::Inventory(format!("spine switch not found for site {}", site.name)))?;

    let (gateway, gateway_ip) = vnet
        .gateways
        .iter()
        .filter_map(|gw| gw.prefix.parse::<IpNetwork>().ok().map(|net| (gw, net)))
        .find(|(_, net)| net.prefix() == network.prefix() && net.network() == network.network())
        .map(|(gw, net)| (gw.prefix.clone(), net.ip().to_string()))
        .ok_or_else(|| WatcherError::Inventory(format!("VNet {} has no gateway in {}", vnet.name, subnet.prefix)))?;

    Ok((
        infos,
        Fabric {
            site: site.name.clone(),
            site_asn: site.public_asn,
            vnet: vnet.name.clone(),
            gateway,
            gateway_ip,
            spine: spine.name.clone(),
        },
    ))
}

pub fn bgp_name(node: &str, ip: &str) -> String {
    let address = ip.split('/').next().unwrap_or_default();
    NAME_SANITIZER
        .replace_all(&format!("{}-{}", node, address), "-")
        .into_owned()
}

pub fn generate_bgps(nodes: &[NodeInfo], fabric: &Fabric, ip: &IpInfo) -> Vec<BGP> {
    let mut inbound = vec![format!("permit {} le {}", ip.cluster_cidr, ip.block_size)];
    inbound.extend(ip.service_cidrs.iter().map(|cidr| format!("permit {} le 32", cidr)));

    nodes
        .iter()
        .map(|node| {
            let mut bgp = BGP::new(
                &bgp_name(&node.name, &node.ip),
                BGPSpec {
                    site: fabric.site.clone(),
                    neighbor_as: node.asn,
                    transport: BGPTransport {
                        kind: "vnet".to_string(),
                        name: fabric.vnet.clone(),
                        vlan_id: None,
                    },
                    local_ip: fabric.gateway.clone(),
                    remote_ip: node.ip.clone(),
                    terminate_on_switch: BGPTerminateOnSwitch {
                        enabled: true,
                        switch_name: fabric.spine.clone(),
                    },
                    local_preference: 100,
                    prefix_list_inbound: inbound.clone(),
                    prefix_list_outbound: vec![
                        "permit 0.0.0.0/0".to_string(),
                        format!("deny {}/{}", node.ipip, ip.block_size),
                        format!("permit {} le {}", ip.cluster_cidr, ip.block_size),
                    ],
                    state: "enabled".to_string(),
                    ..Default::default()
                },
            );
            bgp.metadata.namespace = Some(BGP_NAMESPACE.to_string());
            bgp.metadata.annotations = Some(BTreeMap::from([
                (WATCHER_ANNOTATION.to_string(), "true".to_string()),
                (IMPORT_ANNOTATION.to_string(), "true".to_string()),
            ]));
            bgp
        })
        .collect()
}

#[derive(Debug, Default)]
pub struct BgpChanges {
    pub create: Vec<BGP>,
    pub update: Vec<BGP>,
    pub delete: Vec<BGP>,
}

/// Diff generated BGPs against the watcher-owned ones by name. Updates keep
/// the existing object and take the generated spec.
pub fn compare_bgps(generated: &[BGP], existing: &[BGP]) -> BgpChanges {
    let by_name: HashMap<String, &BGP> = existing.iter().map(|b| (b.name_any(), b)).collect();
    let names: HashSet<String> = generated.iter().map(|b| b.name_any()).collect();
    let mut changes = BgpChanges::default();

    for gen in generated {
        match by_name.get(&gen.name_any()) {
            None => changes.create.push(gen.clone()),
            Some(current) if current.spec != gen.spec => {
                let mut bgp = (*current).clone();
                bgp.spec = gen.spec.clone();
                changes.update.push(bgp);
            }
            Some(_) => {}
        }
    }

    changes.delete = existing
        .iter()
        .filter(|b| !names.contains(&b.name_any()))
        .cloned()
        .collect();
    changes
}

/// Node-to-node mesh is only dropped once every watcher BGP is up and
/// receiving prefixes
pub fn mesh_wanted(bgps: &[BGP]) -> bool {
    let established = |bgp: &BGP| {
        bgp.status
            .as_ref()
            .map(|s| matches!(s.bgp_status.as_str(), "Active" | "Established") && s.bgp_prefixes > 0)
            .unwrap_or(false)
    };
    bgps.is_empty() || !bgps.iter().all(established)
}

pub fn peer_spec(fabric: &Fabric) -> BGPPeerSpec {
    BGPPeerSpec {
        peer_ip: fabric.gateway_ip.clone(),
        as_number: fabric.site_asn,
        node: None,
        node_selector: None,
    }
}

async fn set_mesh(ctx: &Context, conf: &BGPConfiguration, enabled: bool) -> Result<()> {
    let confs: Api<BGPConfiguration> = Api::all(ctx.client.clone());
    let body = json!({ "spec": { "nodeToNodeMeshEnabled": enabled } });
    confs
        .patch(&conf.name_any(), &PatchParams::default(), &Patch::Merge(&body))
        .await?;
    info!("Node-to-node mesh {} in BGPConfiguration {}", if enabled { "enabled" } else { "disabled" }, conf.name_any());
    Ok(())
}

async fn set_node_asn(nodes: &Api<Node>, name: &str, asn: Option<u32>) -> Result<()> {
    let body = json!({ "metadata": { "annotations": { NODE_ASN_ANNOTATION: asn.map(|a| a.to_string()) } } });
    nodes.patch(name, &PatchParams::default(), &Patch::Merge(&body)).await?;
    Ok(())
}

async fn watcher_bgps(ctx: &Context) -> Result<Vec<BGP>> {
    let bgps = Api::<BGP>::all(ctx.client.clone())
        .list(&ListParams::default())
        .await?
        .items;
    Ok(bgps.into_iter().filter(is_watcher_owned).collect())
}

async fn apply_bgps(ctx: &Context, changes: BgpChanges) -> Vec<WatcherError> {
    let mut errors = Vec::new();
    let api = |bgp: &BGP| -> Api<BGP> {
        Api::namespaced(ctx.client.clone(), &bgp.namespace().unwrap_or_else(|| BGP_NAMESPACE.to_string()))
    };

    for bgp in &changes.delete {
        match api(bgp).delete(&bgp.name_any(), &DeleteParams::default()).await {
            Ok(_) => info!("Deleted BGP {}", bgp.name_any()),
            Err(e) => errors.push(e.into()),
        }
    }
    for bgp in &changes.update {
        match api(bgp).replace(&bgp.name_any(), &PostParams::default(), bgp).await {
            Ok(_) => info!("Updated BGP {}", bgp.name_any()),
            Err(e) => errors.push(e.into()),
        }
    }
    for bgp in &changes.create {
        match api(bgp).create(&PostParams::default(), bgp).await {
            Ok(_) => info!("Created BGP {}", bgp.name_any()),
            Err(e) => errors.push(e.into()),
        }
    }
    errors
}

async fn process(ctx: Arc<Context>) -> Result<()> {
    let lp = ListParams::default();
    let confs = Api::<BGPConfiguration>::all(ctx.client.clone()).list(&lp).await?.items;
    let conf = confs
        .first()
        .ok_or_else(|| WatcherError::Calico("BGPConfiguration is missing".to_string()))?;
    let range = ctx
        .config
        .asn_range()
        .map_err(|e| WatcherError::Calico(e.to_string()))?;

    if is_managed(&confs) {
        debug!("{} is set, managing Calico peering", MANAGE_ANNOTATION);
        manage(&ctx, conf, range).await
    } else {
        debug!("{} is not set, removing Calico peering", MANAGE_ANNOTATION);
        teardown(&ctx, conf, range).await
    }
}

async fn manage(ctx: &Context, conf: &BGPConfiguration, range: (u32, u32)) -> Result<()> {
    let lp = ListParams::default();
    let pools = Api::<IPPool>::all(ctx.client.clone()).list(&lp).await?.items;
    let ip = ip_info(&pools, conf)?;

    let nodes_api: Api<Node> = Api::all(ctx.client.clone());
    let mut nodes = nodes_api.list(&lp).await?.items;
    if nodes.is_empty() {
        return Err(WatcherError::Calico("Nodes are missing".to_string()));
    }

    for (name, asn) in assign_asns(&nodes, range) {
        set_node_asn(&nodes_api, &name, Some(asn)).await?;
        info!("Assigned AS number {} to node {}", asn, name);
        if let Some(node) = nodes.iter_mut().find(|n| n.name_any() == name) {
            node.annotations_mut()
                .insert(NODE_ASN_ANNOTATION.to_string(), asn.to_string());
        }
    }

    let snapshot = ctx.storage.snapshot().await;
    let (infos, fabric) = process_nodes(&nodes, &snapshot)?;

    let generated = generate_bgps(&infos, &fabric, &ip);
    let existing = watcher_bgps(ctx).await?;
    let changes = compare_bgps(&generated, &existing);
    debug!(
        create = changes.create.len(),
        update = changes.update.len(),
        delete = changes.delete.len(),
        "BGP changes"
    );
    let errors = apply_bgps(ctx, changes).await;
    let applied = log_errors(NAME, &errors);

    let peers: Api<BGPPeer> = Api::all(ctx.client.clone());
    let spec = peer_spec(&fabric);
    match peers.get_opt(PEER_NAME).await? {
        None => {
            peers
                .create(&PostParams::default(), &BGPPeer::new(PEER_NAME, spec))
                .await?;
            info!("Created BGPPeer {}", PEER_NAME);
        }
        Some(mut peer) if peer.spec != spec => {
            peer.spec = spec;
            peers.replace(PEER_NAME, &PostParams::default(), &peer).await?;
            info!("Updated BGPPeer {}", PEER_NAME);
        }
        Some(_) => {}
    }

    let wanted = mesh_wanted(&existing);
    if wanted != conf.mesh_enabled() {
        set_mesh(ctx, conf, wanted).await?;
    }
    applied
}

async fn teardown(ctx: &Context, conf: &BGPConfiguration, range: (u32, u32)) -> Result<()> {
    if !conf.mesh_enabled() {
        set_mesh(ctx, conf, true).await?;
    }

    let nodes_api: Api<Node> = Api::all(ctx.client.clone());
    let nodes = nodes_api.list(&ListParams::default()).await?.items;
    for name in assigned_asn_nodes(&nodes, range) {
        set_node_asn(&nodes_api, &name, None).await?;
        info!("Removed AS number from node {}", name);
    }

    let existing = watcher_bgps(ctx).await?;
    let errors = apply_bgps(ctx, compare_bgps(&[], &existing)).await;
    let applied = log_errors(NAME, &errors);

    let peers: Api<BGPPeer> = Api::all(ctx.client.clone());
    if peers.get_opt(PEER_NAME).await?.is_some() {
        peers.delete(PEER_NAME, &DeleteParams::default()).await?;
        info!("Deleted BGPPeer {}", PEER_NAME);
    }
    applied
}
