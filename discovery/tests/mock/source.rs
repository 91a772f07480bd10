use std::collections::HashMap;
use std::sync::Mutex;
use vm_discovery::error::{Error, Result};
use vm_discovery::source::{InventoryObject, ManagedObjectReference, VmDetails};
use vm_discovery::InventorySource;

/// An inventory built with a small builder:
/// `MockSource::default().datacenter("DC1").cluster("A").host("esx-01").vm(..)`. Each call nests
/// under the most recently added parent. Every request is recorded in `calls`.
#[derive(Default)]
pub struct MockSource {
    datacenters: Vec<InventoryObject>,
    clusters: HashMap<String, Vec<InventoryObject>>,
    hosts: HashMap<String, Vec<InventoryObject>>,
    vms: HashMap<String, Vec<ManagedObjectReference>>,
    details: HashMap<String, VmDetails>,
    failing_vm: Option<String>,
    next_id: usize,
    current: [Option<String>; 3],
    calls: Mutex<Vec<String>>,
}

impl MockSource {
    fn object(&mut self, kind: &str, name: &str) -> InventoryObject {
        self.next_id += 1;
        InventoryObject {
            reference: ManagedObjectReference::new(kind, format!("{}-{}", kind, self.next_id)),
            name: name.to_string(),
        }
    }

    pub fn datacenter(mut self, name: &str) -> Self {
        let object = self.object("Datacenter", name);
        self.current = [Some(object.reference.value.clone()), None, None];
        self.datacenters.push(object);
        self
    }

    pub fn cluster(mut self, name: &str) -> Self {
        let object = self.object("ClusterComputeResource", name);
        let parent = self.current[0].clone().expect("cluster needs a datacenter");
        self.current[1] = Some(object.reference.value.clone());
        self.current[2] = None;
        self.clusters.entry(parent).or_default().push(object);
        self
    }

    pub fn host(mut self, name: &str) -> Self {
        let object = self.object("HostSystem", name);
        let parent = self.current[1].clone().expect("host needs a cluster");
        self.current[2] = Some(object.reference.value.clone());
        self.hosts.entry(parent).or_default().push(object);
        self
    }

    pub fn vm(mut self, details: VmDetails) -> Self {
        let object = self.object("VirtualMachine", &details.name);
        let parent = self.current[2].clone().expect("vm needs a host");
        self.vms.entry(parent).or_default().push(object.reference.clone());
        self.details.insert(object.reference.value, details);
        self
    }

    /// Reading the details of the VM with this name fails.
    pub fn failing_vm(mut self, name: &str) -> Self {
        self.failing_vm = Some(name.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait::async_trait]
impl InventorySource for MockSource {
    async fn datacenters(&self) -> Result<Vec<InventoryObject>> {
        self.record("datacenters".into());
        Ok(self.datacenters.clone())
    }

    async fn clusters(&self, datacenter: &InventoryObject) -> Result<Vec<InventoryObject>> {
        self.record(format!("clusters:{}", datacenter.name));
        Ok(self
            .clusters
            .get(&datacenter.reference.value)
            .cloned()
            .unwrap_or_default())
    }

    async fn hosts(&self, cluster: &InventoryObject) -> Result<Vec<InventoryObject>> {
        self.record(format!("hosts:{}", cluster.name));
        Ok(self
            .hosts
            .get(&cluster.reference.value)
            .cloned()
            .unwrap_or_default())
    }

    async fn virtual_machines(&self, host: &InventoryObject) -> Result<Vec<ManagedObjectReference>> {
        self.record(format!("vms:{}", host.name));
        Ok(self
            .vms
            .get(&host.reference.value)
            .cloned()
            .unwrap_or_default())
    }

    async fn vm_details(&self, vm: &ManagedObjectReference) -> Result<VmDetails> {
        let details = self.details[&vm.value].clone();
        self.record(format!("details:{}", details.name));
        if self.failing_vm.as_deref() == Some(details.name.as_str()) {
            return Err(Error::VimResponse {
                path: format!("VirtualMachine/{}/summary", vm.value),
                status: 503,
                body: "service unavailable".into(),
            });
        }
        Ok(details)
    }
}
