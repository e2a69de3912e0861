/// Bindings to Calico CRDs from the projectcalico.org operator
///
/// This module provides type-safe Rust bindings to the cluster-scoped Calico
/// custom resources the calico watcher reads and writes: BGPConfiguration,
/// BGPPeer and IPPool. Only the fields the watcher relies on are modelled;
/// unknown fields are ignored on read.

pub mod bgp_configuration;
pub mod bgp_peer;
pub mod ip_pool;

pub use bgp_configuration::BGPConfiguration;
pub use bgp_peer::BGPPeer;
pub use ip_pool::IPPool;

/// Annotation on a BGPConfiguration enabling Netris management
pub const MANAGE_ANNOTATION: &str = "manage.k8s.netris.ai/calico";
/// Node annotation holding the node's AS number
pub const NODE_ASN_ANNOTATION: &str = "projectcalico.org/ASNumber";
/// Node annotation holding the node's IPv4 address in CIDR form
pub const NODE_IPV4_ANNOTATION: &str = "projectcalico.org/IPv4Address";
/// Node annotation holding the node's IPIP tunnel address
pub const NODE_IPIP_ANNOTATION: &str = "projectcalico.org/IPv4IPIPTunnelAddr";
