/*!

A lazy traversal of the inventory: datacenter → cluster → host → virtual machine.

[`Walker::next_event`] fetches only what is needed to produce the next [`WalkEvent`], so a
consumer that stops early never touches the rest of the inventory. Events are produced in the
order the source lists objects, depth first.

!*/

use crate::error::Result;
use crate::source::{GuestIp, GuestNic, InventoryObject, InventorySource, ManagedObjectReference, VmDetails};
use log::debug;
use std::collections::VecDeque;
use std::fmt;
use std::net::Ipv4Addr;

const BYTES_PER_GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Which part of the inventory is walked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum WalkScope {
    #[default]
    Everything,
    /// Only the cluster with this name. Other clusters are reported as skipped.
    Cluster(String),
}

impl WalkScope {
    fn includes(&self, cluster: &InventoryObject) -> bool {
        match self {
            WalkScope::Everything => true,
            WalkScope::Cluster(name) => &cluster.name == name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkEvent {
    Datacenter(InventoryObject),
    Cluster(InventoryObject),
    ClusterSkipped(InventoryObject),
    Host(InventoryObject),
    VirtualMachine(DiscoveredVm),
}

pub struct Walker<'a, S: InventorySource> {
    source: &'a S,
    scope: WalkScope,
    /// `None` until the first call fetches the datacenter list.
    datacenters: Option<VecDeque<InventoryObject>>,
    clusters: VecDeque<InventoryObject>,
    hosts: VecDeque<InventoryObject>,
    vms: VecDeque<ManagedObjectReference>,
}

impl<'a, S: InventorySource> Walker<'a, S> {
    pub fn new(source: &'a S, scope: WalkScope) -> Self {
        Self {
            source,
            scope,
            datacenters: None,
            clusters: VecDeque::new(),
            hosts: VecDeque::new(),
            vms: VecDeque::new(),
        }
    }

    /// Produces the next event, or `None` once the inventory is exhausted. A source error ends the
    /// walk; events already produced stay valid.
    pub async fn next_event(&mut self) -> Result<Option<WalkEvent>> {
        if let Some(vm) = self.vms.pop_front() {
            let details = self.source.vm_details(&vm).await?;
            return Ok(Some(WalkEvent::VirtualMachine(DiscoveredVm::from(details))));
        }
        if let Some(host) = self.hosts.pop_front() {
            self.vms = self.source.virtual_machines(&host).await?.into();
            return Ok(Some(WalkEvent::Host(host)));
        }
        if let Some(cluster) = self.clusters.pop_front() {
            if !self.scope.includes(&cluster) {
                debug!("Cluster '{}' is outside the walk scope", cluster.name);
                return Ok(Some(WalkEvent::ClusterSkipped(cluster)));
            }
            self.hosts = self.source.hosts(&cluster).await?.into();
            return Ok(Some(WalkEvent::Cluster(cluster)));
        }
        if self.datacenters.is_none() {
            self.datacenters = Some(self.source.datacenters().await?.into());
        }
        match self.datacenters.as_mut().and_then(VecDeque::pop_front) {
            Some(datacenter) => {
                self.clusters = self.source.clusters(&datacenter).await?.into();
                Ok(Some(WalkEvent::Datacenter(datacenter)))
            }
            None => Ok(None),
        }
    }
}

/// A virtual machine as it will be recorded in the inventory store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredVm {
    pub name: String,
    pub vcpus: u32,
    pub memory_mb: u64,
    pub disk_gb: u64,
    pub nics: Vec<GuestNic>,
}

impl From<VmDetails> for DiscoveredVm {
    fn from(details: VmDetails) -> Self {
        Self {
            name: details.name,
            vcpus: details.num_cpu,
            memory_mb: details.memory_mb,
            disk_gb: disk_gb(details.committed_bytes),
            nics: details.nics,
        }
    }
}

impl DiscoveredVm {
    /// One record per qualifying IPv4 address of an adapter that has a network, in adapter order.
    /// The records are named `NIC1`, `NIC2`, ... across the whole VM, so an adapter with two
    /// addresses yields two records with the same MAC address.
    pub fn adapters(&self) -> impl Iterator<Item = AdapterRecord> + '_ {
        self.guest_addresses()
            .filter_map(|(nic, network, address)| match address {
                GuestAddress::Ipv4(address) => Some((nic, network, address)),
                _ => None,
            })
            .zip(1..)
            .map(|((nic, network, address), n)| AdapterRecord {
                interface_name: format!("NIC{}", n),
                mac_address: nic.mac_address.clone(),
                network: network.to_string(),
                address,
            })
    }

    /// The addresses of connected adapters that look like IPv4 but cannot be recorded, as
    /// `address/prefix` text. IPv6 addresses are not included.
    pub fn malformed_addresses(&self) -> impl Iterator<Item = String> + '_ {
        self.guest_addresses()
            .filter_map(|(_, _, address)| match address {
                GuestAddress::Malformed(text) => Some(text),
                _ => None,
            })
    }

    fn guest_addresses(&self) -> impl Iterator<Item = (&GuestNic, &str, GuestAddress)> + '_ {
        self.nics
            .iter()
            .filter_map(|nic| nic.network.as_deref().map(|network| (nic, network)))
            .flat_map(|(nic, network)| {
                nic.ip_config
                    .iter()
                    .flatten()
                    .map(move |ip| (nic, network, GuestAddress::from(ip)))
            })
    }
}

/// One interface and address pair to create for a VM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterRecord {
    pub interface_name: String,
    pub mac_address: Option<String>,
    pub network: String,
    pub address: Ipv4Interface,
}

/// An IPv4 address with its prefix length, displayed as `a.b.c.d/p`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ipv4Interface {
    pub address: Ipv4Addr,
    pub prefix_length: u8,
}

impl fmt::Display for Ipv4Interface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.address, self.prefix_length)
    }
}

/// How a guest address is treated.
#[derive(Debug, Clone, PartialEq, Eq)]
enum GuestAddress {
    Ipv4(Ipv4Interface),
    /// IPv6, or no address at all.
    Ignored,
    /// Not a valid IPv4 address, or a prefix length outside `0..=32`.
    Malformed(String),
}

impl From<&GuestIp> for GuestAddress {
    fn from(ip: &GuestIp) -> Self {
        let text = match ip.ip_address.as_deref() {
            Some(text) => text,
            None => return GuestAddress::Ignored,
        };
        if text.contains(':') {
            return GuestAddress::Ignored;
        }
        let prefix_length = u8::try_from(ip.prefix_length)
            .ok()
            .filter(|prefix_length| *prefix_length <= 32);
        match (text.parse::<Ipv4Addr>(), prefix_length) {
            (Ok(address), Some(prefix_length)) => GuestAddress::Ipv4(Ipv4Interface {
                address,
                prefix_length,
            }),
            _ => GuestAddress::Malformed(format!("{}/{}", text, ip.prefix_length)),
        }
    }
}

/// Committed bytes in GiB, rounded to two decimals and then truncated to a whole number.
/// Non-positive values yield 0.
pub fn disk_gb(committed_bytes: i64) -> u64 {
    if committed_bytes <= 0 {
        return 0;
    }
    let gib = committed_bytes as f64 / BYTES_PER_GIB;
    ((gib * 100.0).round() / 100.0).trunc() as u64
}
