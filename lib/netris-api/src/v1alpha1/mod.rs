/// API version v1alpha1 for Netris CRDs

pub mod allocation;
pub mod bgp;
pub mod common;
pub mod controller;
pub mod inventory_profile;
pub mod l4lb;
pub mod link;
pub mod nat;
pub mod server;
pub mod server_cluster;
pub mod server_cluster_template;
pub mod site;
pub mod softgate;
pub mod subnet;
pub mod switch;
pub mod vnet;
pub mod vpc;

pub use allocation::{Allocation, AllocationMeta, AllocationMetaSpec, AllocationSpec};
pub use bgp::{
    BGPMeta, BGPMetaFields, BGPMetaSpec, BGPMultihop, BGPSpec, BGPStatus, BGPTerminateOnSwitch,
    BGPTransport, EBGPMeta, EBGPMetaSpec, EBGPSpec, BGP, EBGP,
};
pub use common::{
    defaulted_annotations, finalizer_name, is_imported, reclaim_policy, MetaHeader,
    ReclaimPolicy, ResourceStatus, IMPORT_ANNOTATION, RECLAIM_ANNOTATION, STATUS_FAILURE,
    STATUS_PROVISIONING, STATUS_SUCCESS,
};
pub use controller::{Controller, ControllerMeta, ControllerMetaSpec, ControllerSpec};
pub use inventory_profile::{
    InventoryProfile, InventoryProfileCustomRule, InventoryProfileMeta, InventoryProfileMetaSpec,
    InventoryProfileSpec,
};
pub use l4lb::{
    IpRole, L4LBCheck, L4LBFrontend, L4LBMeta, L4LBMetaSpec, L4LBSpec, L4LBStatus, L4LB,
};
pub use link::{Link, LinkMeta, LinkMetaSpec, LinkSpec};
pub use nat::{Nat, NatMeta, NatMetaSpec, NatSpec};
pub use server::{Server, ServerMeta, ServerMetaSpec, ServerSpec};
pub use server_cluster::{
    ServerCluster, ServerClusterMeta, ServerClusterMetaSpec, ServerClusterSpec,
};
pub use server_cluster_template::{
    ServerClusterTemplate, ServerClusterTemplateMeta, ServerClusterTemplateMetaSpec,
    ServerClusterTemplateSpec,
};
pub use site::{Site, SiteMeta, SiteMetaSpec, SiteSpec};
pub use softgate::{Softgate, SoftgateMeta, SoftgateMetaSpec, SoftgateSpec};
pub use subnet::{Subnet, SubnetMeta, SubnetMetaSpec, SubnetSpec};
pub use switch::{Switch, SwitchMeta, SwitchMetaSpec, SwitchSpec};
pub use vnet::{VNet, VNetMeta, VNetMetaPort, VNetMetaSpec, VNetSite, VNetSpec, VNetSwitchPort};
pub use vpc::{VPCMeta, VPCMetaSpec, VPCSpec, VPC};

use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube::CustomResourceExt;

/// API group for Netris resources
pub const API_GROUP: &str = "k8s.netris.ai";
/// API version for Netris resources
pub const API_VERSION: &str = "v1alpha1";

/// Every CRD served by this API version, spec kinds followed by their meta kinds.
pub fn all_crds() -> Vec<CustomResourceDefinition> {
    vec![
        VNet::crd(),
        VNetMeta::crd(),
        BGP::crd(),
        BGPMeta::crd(),
        EBGP::crd(),
        EBGPMeta::crd(),
        Switch::crd(),
        SwitchMeta::crd(),
        Server::crd(),
        ServerMeta::crd(),
        Softgate::crd(),
        SoftgateMeta::crd(),
        Controller::crd(),
        ControllerMeta::crd(),
        Site::crd(),
        SiteMeta::crd(),
        Link::crd(),
        LinkMeta::crd(),
        L4LB::crd(),
        L4LBMeta::crd(),
        Subnet::crd(),
        SubnetMeta::crd(),
        Allocation::crd(),
        AllocationMeta::crd(),
        VPC::crd(),
        VPCMeta::crd(),
        InventoryProfile::crd(),
        InventoryProfileMeta::crd(),
        ServerCluster::crd(),
        ServerClusterMeta::crd(),
        ServerClusterTemplate::crd(),
        ServerClusterTemplateMeta::crd(),
        Nat::crd(),
        NatMeta::crd(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_all_crds_share_group() {
        let crds = all_crds();
        assert_eq!(crds.len(), 34);
        for crd in &crds {
            assert_eq!(crd.spec.group, API_GROUP);
            assert_eq!(crd.spec.versions[0].name, API_VERSION);
            assert_eq!(crd.spec.scope, "Namespaced");
        }
    }

    #[test]
    fn test_crd_names_unique() {
        let names: HashSet<_> = all_crds()
            .into_iter()
            .filter_map(|crd| crd.metadata.name)
            .collect();
        assert_eq!(names.len(), 34);
        assert!(names.contains("vnets.k8s.netris.ai"));
        assert!(names.contains("vnetmeta.k8s.netris.ai"));
        assert!(names.contains("l4lbs.k8s.netris.ai"));
        assert!(names.contains("nats.k8s.netris.ai"));
        assert!(names.contains("serverclustertemplatemeta.k8s.netris.ai"));
    }

    #[test]
    fn test_crds_render_as_yaml() {
        let rendered = serde_yaml::to_string(&L4LB::crd()).unwrap();
        assert!(rendered.contains("kind: CustomResourceDefinition"));
        assert!(rendered.contains("L4LB"));
    }
}
