/*!

Creates the store entities for discovered VMs: one virtual machine, then for every adapter record
an interface followed by its IP address.

!*/

use crate::error::{ClusterNotFoundSnafu, ClusterTypeMismatchSnafu, Result};
use crate::report::RunReport;
use crate::store::{
    ClusterRecord, EntityId, InventoryStore, NewInterface, NewIpAddress, NewVirtualMachine,
};
use crate::walker::DiscoveredVm;
use job_agent::Journal;
use snafu::{ensure, OptionExt};

/// What [`Reconciler::reconcile`] created for one VM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileResult {
    pub virtual_machine: EntityId,
    pub interfaces: Vec<EntityId>,
    pub ip_addresses: Vec<EntityId>,
}

pub struct Reconciler<'a, T: InventoryStore> {
    store: &'a T,
    cluster: ClusterRecord,
}

impl<'a, T: InventoryStore> Reconciler<'a, T> {
    /// Resolves the destination cluster. It must exist and be of `cluster_type`.
    pub async fn resolve(store: &'a T, cluster: &str, cluster_type: &str) -> Result<Self> {
        let record = store
            .find_cluster(cluster)
            .await?
            .context(ClusterNotFoundSnafu { name: cluster })?;
        ensure!(
            record.has_type(cluster_type),
            ClusterTypeMismatchSnafu {
                name: cluster,
                expected: cluster_type,
                actual: record.cluster_type.join("/"),
            }
        );
        Ok(Self {
            store,
            cluster: record,
        })
    }

    pub fn cluster(&self) -> &ClusterRecord {
        &self.cluster
    }

    /// Creates the VM and its interfaces and addresses. The first failed creation stops the VM;
    /// whatever was created before it stays in the store and in the report's totals.
    pub async fn reconcile<J: Journal>(
        &self,
        vm: &DiscoveredVm,
        report: &mut RunReport<'_, J>,
    ) -> Result<ReconcileResult> {
        let vm_id = self
            .store
            .create_virtual_machine(&NewVirtualMachine {
                name: vm.name.clone(),
                cluster: self.cluster.id,
                vcpus: vm.vcpus,
                memory_mb: vm.memory_mb,
                disk_gb: vm.disk_gb,
            })
            .await?;
        report.count_virtual_machine();
        report.success(format!("Created new VM: {}", vm.name)).await;
        for address in vm.malformed_addresses() {
            report
                .warning(format!("Skipped malformed address: {} - {}", address, vm.name))
                .await;
        }

        let mut result = ReconcileResult {
            virtual_machine: vm_id,
            interfaces: Vec::new(),
            ip_addresses: Vec::new(),
        };
        for adapter in vm.adapters() {
            let interface_id = self
                .store
                .create_interface(&NewInterface {
                    virtual_machine: vm_id,
                    name: adapter.interface_name.clone(),
                    description: adapter.network.clone(),
                    mac_address: adapter.mac_address.clone(),
                })
                .await?;
            report.count_interface();
            report
                .info(format!(
                    "Created new interface: {} - {}",
                    adapter.interface_name,
                    adapter.mac_address.as_deref().unwrap_or_default()
                ))
                .await;
            result.interfaces.push(interface_id);

            let ip_id = self
                .store
                .create_ip_address(&NewIpAddress {
                    address: adapter.address,
                    description: format!("{} - {}", vm.name, adapter.interface_name),
                    interface: interface_id,
                })
                .await?;
            report.count_ip_address();
            report
                .info(format!(
                    "Created new IP: {} - {} - {}",
                    adapter.address, adapter.interface_name, adapter.network
                ))
                .await;
            result.ip_addresses.push(ip_id);
        }
        Ok(result)
    }
}
