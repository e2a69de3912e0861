//! Netris operator API types and CRDs for Kubernetes integration
//!
//! This library defines the custom resources reconciled by the netris-operator.
//! Every Netris object kind comes as a pair:
//! - a spec resource holding the user's intent (VNet, BGP, L4LB, ...)
//! - a meta resource holding the resolved remote representation and remote id
//!
//! The `calico` module holds bindings to the Calico CRDs the calico watcher
//! manipulates.

pub mod calico;
pub mod v1alpha1;

pub use v1alpha1::{
    all_crds, defaulted_annotations, finalizer_name, is_imported, reclaim_policy, Allocation,
    AllocationMeta, Controller, ControllerMeta, EBGPMeta, InventoryProfile, InventoryProfileMeta,
    L4LBMeta, Link, LinkMeta, MetaHeader, Nat, NatMeta, ReclaimPolicy, ResourceStatus, Server,
    ServerCluster, ServerClusterMeta, ServerClusterTemplate, ServerClusterTemplateMeta, ServerMeta, Site, SiteMeta, Softgate, SoftgateMeta, Subnet, SubnetMeta,
    Switch, SwitchMeta, VNet, VNetMeta, VPCMeta, BGP, BGPMeta, EBGP, IMPORT_ANNOTATION, L4LB,
    RECLAIM_ANNOTATION, STATUS_FAILURE, STATUS_PROVISIONING, STATUS_SUCCESS, VPC,
};
