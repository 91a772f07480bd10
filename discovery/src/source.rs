/*!

The read-only view of the virtualization inventory that the [`Walker`](crate::walker::Walker)
traverses. [`VcenterSession`](crate::vcenter::VcenterSession) implements it against vCenter; tests
implement it in memory.

!*/

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one managed object (datacenter, folder, cluster, host, VM) of the inventory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ManagedObjectReference {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

impl ManagedObjectReference {
    pub fn new<S1, S2>(kind: S1, value: S2) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        Self {
            kind: kind.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for ManagedObjectReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.value)
    }
}

/// A named container of the inventory: a datacenter, a cluster or a host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryObject {
    pub reference: ManagedObjectReference,
    pub name: String,
}

/// What the hypervisor reports about one virtual machine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VmDetails {
    pub name: String,
    pub num_cpu: u32,
    pub memory_mb: u64,
    /// Bytes of storage committed to the VM. vCenter reports this as a signed value.
    pub committed_bytes: i64,
    /// The guest's network adapters. Empty when guest tools are not reporting.
    pub nics: Vec<GuestNic>,
}

/// One guest network adapter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuestNic {
    /// The name of the network the adapter is connected to.
    pub network: Option<String>,
    pub mac_address: Option<String>,
    pub ip_config: Option<Vec<GuestIp>>,
}

/// One address configured on a guest adapter, IPv4 or IPv6, as text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuestIp {
    pub ip_address: Option<String>,
    pub prefix_length: i32,
}

#[async_trait]
pub trait InventorySource: Send + Sync {
    /// All datacenters, including those nested in folders.
    async fn datacenters(&self) -> Result<Vec<InventoryObject>>;

    /// All compute clusters of the datacenter, including standalone hosts' compute resources.
    async fn clusters(&self, datacenter: &InventoryObject) -> Result<Vec<InventoryObject>>;

    async fn hosts(&self, cluster: &InventoryObject) -> Result<Vec<InventoryObject>>;

    async fn virtual_machines(&self, host: &InventoryObject) -> Result<Vec<ManagedObjectReference>>;

    async fn vm_details(&self, vm: &ManagedObjectReference) -> Result<VmDetails>;
}
