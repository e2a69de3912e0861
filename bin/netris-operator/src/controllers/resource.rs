//! Traits binding a spec kind to its meta kind and the Netris collection
//! behind it. The generic reconcilers only talk to these.

use super::Result;
use crate::config::OperatorConfig;
use kube::core::NamespaceResourceScope;
use kube::Resource;
use netris_api::v1alpha1::*;
use netris_client::Endpoint;
use netris_storage::Snapshot;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use std::fmt::Debug;

/// Spec of a meta resource: carries the header next to the resolved fields
pub trait MetaSpec:
    Clone + Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    fn header(&self) -> &MetaHeader;
    fn header_mut(&mut self) -> &mut MetaHeader;
}

macro_rules! impl_meta_spec {
    ($($spec:ty),+ $(,)?) => {
        $(
            impl MetaSpec for $spec {
                fn header(&self) -> &MetaHeader {
                    &self.header
                }

                fn header_mut(&mut self) -> &mut MetaHeader {
                    &mut self.header
                }
            }
        )+
    };
}

impl_meta_spec!(
    VNetMetaSpec,
    BGPMetaSpec,
    EBGPMetaSpec,
    SwitchMetaSpec,
    ServerMetaSpec,
    SoftgateMetaSpec,
    ControllerMetaSpec,
    SiteMetaSpec,
    LinkMetaSpec,
    L4LBMetaSpec,
    SubnetMetaSpec,
    AllocationMetaSpec,
    VPCMetaSpec,
    InventoryProfileMetaSpec,
    ServerClusterMetaSpec,
    ServerClusterTemplateMetaSpec,
    NatMetaSpec,
);

/// A user-facing resource describing desired Netris state
pub trait SpecKind:
    Resource<DynamicType = (), Scope = NamespaceResourceScope>
    + Clone
    + Debug
    + Serialize
    + DeserializeOwned
    + Send
    + Sync
    + 'static
{
    type Meta: MetaKind<Owner = Self>;

    /// Lowercase kind, used for logs, metrics and the finalizer name
    const KIND: &'static str;

    /// Resolve names into Netris ids. The header of the result is filled in
    /// by the caller.
    fn translate(
        &self,
        snapshot: &Snapshot,
        config: &OperatorConfig,
    ) -> Result<<Self::Meta as MetaKind>::Spec>;
}

/// The shadow resource holding the resolved spec and the remote id
pub trait MetaKind:
    Resource<DynamicType = (), Scope = NamespaceResourceScope>
    + Clone
    + Debug
    + Serialize
    + DeserializeOwned
    + Send
    + Sync
    + 'static
{
    type Owner: SpecKind<Meta = Self>;
    type Spec: MetaSpec;
    type Remote: Clone + Debug + Send + Sync;

    const KIND: &'static str;
    const ENDPOINT: Endpoint;

    fn build(name: &str, spec: Self::Spec) -> Self;
    fn meta_spec(&self) -> &Self::Spec;
    fn meta_spec_mut(&mut self) -> &mut Self::Spec;

    fn find_by_id(snapshot: &Snapshot, id: i64) -> Option<Self::Remote>;

    /// Remote object adopted when the resource is imported
    fn find_for_import(snapshot: &Snapshot, spec: &Self::Spec) -> Option<Self::Remote>;

    fn remote_id(remote: &Self::Remote) -> i64;

    /// Request body for create and update calls
    fn payload(spec: &Self::Spec) -> Value;

    /// True when the remote object has drifted from the spec
    fn differs(spec: &Self::Spec, remote: &Self::Remote) -> bool;

    /// Provisioning state reported by Netris
    fn remote_state(remote: &Self::Remote) -> String;

    /// Kind specific status fields
    fn status_extras(_remote: &Self::Remote) -> Map<String, Value> {
        Map::new()
    }
}

/// Accessors every derived meta resource shares
macro_rules! meta_accessors {
    () => {
        fn build(name: &str, spec: Self::Spec) -> Self {
            Self::new(name, spec)
        }

        fn meta_spec(&self) -> &Self::Spec {
            &self.spec
        }

        fn meta_spec_mut(&mut self) -> &mut Self::Spec {
            &mut self.spec
        }
    };
}

pub(crate) use meta_accessors;
