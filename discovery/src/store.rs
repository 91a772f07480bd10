/*!

The write side of discovery: the inventory store that VMs, interfaces and IP addresses are created
in. [`NetboxClient`](crate::netbox::NetboxClient) implements it against NetBox.

!*/

use crate::error::Result;
use crate::walker::Ipv4Interface;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The identifier the store assigns to an entity it creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// An existing cluster of the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterRecord {
    pub id: EntityId,
    pub name: String,
    /// The names the cluster's type is known by (display name and slug).
    pub cluster_type: Vec<String>,
}

impl ClusterRecord {
    pub fn has_type(&self, cluster_type: &str) -> bool {
        self.cluster_type
            .iter()
            .any(|name| name.eq_ignore_ascii_case(cluster_type))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVirtualMachine {
    pub name: String,
    pub cluster: EntityId,
    pub vcpus: u32,
    pub memory_mb: u64,
    pub disk_gb: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInterface {
    pub virtual_machine: EntityId,
    pub name: String,
    /// The name of the network the adapter is connected to.
    pub description: String,
    pub mac_address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIpAddress {
    pub address: Ipv4Interface,
    pub description: String,
    /// The VM interface the address is assigned to.
    pub interface: EntityId,
}

/// Every `create_*` either returns the identifier of the new entity or fails; nothing is updated
/// in place. Creating a VM whose name is taken fails with
/// [`Error::DuplicateName`](crate::Error::DuplicateName).
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Looks up a cluster by exact name.
    async fn find_cluster(&self, name: &str) -> Result<Option<ClusterRecord>>;

    async fn create_virtual_machine(&self, vm: &NewVirtualMachine) -> Result<EntityId>;

    async fn create_interface(&self, interface: &NewInterface) -> Result<EntityId>;

    async fn create_ip_address(&self, address: &NewIpAddress) -> Result<EntityId>;
}
