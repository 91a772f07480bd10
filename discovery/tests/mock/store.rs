use std::collections::HashSet;
use std::sync::Mutex;
use vm_discovery::error::{Error, Result};
use vm_discovery::store::{
    ClusterRecord, EntityId, NewInterface, NewIpAddress, NewVirtualMachine,
};
use vm_discovery::InventoryStore;

/// Everything the store was asked to create, with the ids it handed out.
#[derive(Debug, Default)]
pub struct StoreState {
    next_id: u64,
    pub vms: Vec<(EntityId, NewVirtualMachine)>,
    pub interfaces: Vec<(EntityId, NewInterface)>,
    pub ip_addresses: Vec<(EntityId, NewIpAddress)>,
}

impl StoreState {
    fn next_id(&mut self) -> EntityId {
        self.next_id += 1;
        EntityId(100 + self.next_id)
    }
}

#[derive(Default)]
pub struct MockStore {
    clusters: Vec<ClusterRecord>,
    existing_vms: HashSet<String>,
    state: Mutex<StoreState>,
}

impl MockStore {
    pub fn with_cluster(mut self, id: u64, name: &str, cluster_type: &str) -> Self {
        self.clusters.push(ClusterRecord {
            id: EntityId(id),
            name: name.to_string(),
            cluster_type: vec![cluster_type.to_string()],
        });
        self
    }

    /// A VM with this name exists before discovery runs.
    pub fn with_existing_vm(mut self, name: &str) -> Self {
        self.existing_vms.insert(name.to_string());
        self
    }

    pub fn state(&self) -> std::sync::MutexGuard<'_, StoreState> {
        self.state.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl InventoryStore for MockStore {
    async fn find_cluster(&self, name: &str) -> Result<Option<ClusterRecord>> {
        Ok(self.clusters.iter().find(|c| c.name == name).cloned())
    }

    async fn create_virtual_machine(&self, vm: &NewVirtualMachine) -> Result<EntityId> {
        let mut state = self.state.lock().unwrap();
        if self.existing_vms.contains(&vm.name) || state.vms.iter().any(|(_, v)| v.name == vm.name) {
            return Err(Error::DuplicateName {
                name: vm.name.clone(),
            });
        }
        let id = state.next_id();
        state.vms.push((id, vm.clone()));
        Ok(id)
    }

    async fn create_interface(&self, interface: &NewInterface) -> Result<EntityId> {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        state.interfaces.push((id, interface.clone()));
        Ok(id)
    }

    async fn create_ip_address(&self, address: &NewIpAddress) -> Result<EntityId> {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        state.ip_addresses.push((id, address.clone()));
        Ok(id)
    }
}
