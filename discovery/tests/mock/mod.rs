//! In-memory stand-ins for vCenter, NetBox and the framework's journal, so that discovery can be
//! tested end to end without either service.

#![allow(dead_code)]

mod source;
mod store;

pub use source::MockSource;
pub use store::{MockStore, StoreState};

use async_trait::async_trait;
use job_agent::{Journal, LogEntry, Severity};
use std::sync::Mutex;
use vm_discovery::source::{GuestIp, GuestNic, VmDetails};

pub const GIB: i64 = 1024 * 1024 * 1024;

/// Records every entry so that tests can assert on the operator's view of a run.
#[derive(Default)]
pub struct MockJournal {
    entries: Mutex<Vec<LogEntry>>,
}

impl MockJournal {
    pub fn messages(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .map(|entry| entry.message.clone())
            .collect()
    }

    pub fn entries_at(&self, level: Severity) -> Vec<String> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|entry| entry.level == level)
            .map(|entry| entry.message.clone())
            .collect()
    }
}

#[async_trait]
impl Journal for MockJournal {
    async fn record(&self, entry: LogEntry) {
        self.entries.lock().unwrap().push(entry);
    }
}

pub fn vm(name: &str, nics: Vec<GuestNic>) -> VmDetails {
    VmDetails {
        name: name.to_string(),
        num_cpu: 2,
        memory_mb: 4096,
        committed_bytes: 40 * GIB,
        nics,
    }
}

/// A guest adapter on `network` with the given `(address, prefix)` pairs.
pub fn nic(network: &str, mac: &str, ips: &[(&str, i32)]) -> GuestNic {
    GuestNic {
        network: Some(network.to_string()),
        mac_address: Some(mac.to_string()),
        ip_config: Some(
            ips.iter()
                .map(|(address, prefix_length)| GuestIp {
                    ip_address: Some(address.to_string()),
                    prefix_length: *prefix_length,
                })
                .collect(),
        ),
    }
}
