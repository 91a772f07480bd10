use job_agent::Journal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How many entities a run created. A counter only moves once the store confirmed the creation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub virtual_machines: u64,
    pub interfaces: u64,
    pub ip_addresses: u64,
}

impl fmt::Display for Totals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Created {} VMs, {} IPs, and {} interfaces.",
            self.virtual_machines, self.ip_addresses, self.interfaces
        )
    }
}

/// Relays the progress messages of a run to its [`Journal`] and keeps the [`Totals`].
pub struct RunReport<'a, J: Journal> {
    journal: &'a J,
    totals: Totals,
}

impl<'a, J: Journal> RunReport<'a, J> {
    pub fn new(journal: &'a J) -> Self {
        Self {
            journal,
            totals: Totals::default(),
        }
    }

    pub fn totals(&self) -> Totals {
        self.totals
    }

    /// The closing line of a run, e.g. `Created 2 VMs, 3 IPs, and 3 interfaces.`
    pub fn summary(&self) -> String {
        self.totals.to_string()
    }

    pub(crate) fn count_virtual_machine(&mut self) {
        self.totals.virtual_machines += 1;
    }

    pub(crate) fn count_interface(&mut self) {
        self.totals.interfaces += 1;
    }

    pub(crate) fn count_ip_address(&mut self) {
        self.totals.ip_addresses += 1;
    }

    pub async fn info<S: Into<String>>(&self, message: S) {
        self.journal.info(message.into()).await
    }

    pub async fn success<S: Into<String>>(&self, message: S) {
        self.journal.success(message.into()).await
    }

    pub async fn warning<S: Into<String>>(&self, message: S) {
        self.journal.warning(message.into()).await
    }

    pub async fn failure<S: Into<String>>(&self, message: S) {
        self.journal.failure(message.into()).await
    }
}
