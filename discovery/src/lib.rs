/*!

`vm-discovery` discovers the virtual machines of a VMware vCenter inventory and records them,
together with their network interfaces and IPv4 addresses, in a NetBox inventory.

The pieces, leaves first:
- [`vcenter`]: the session gateway and the vSphere JSON API client ([`InventorySource`]).
- [`walker`]: the lazy datacenter → cluster → host → VM traversal.
- [`netbox`]: the NetBox REST client ([`InventoryStore`]).
- [`reconciler`]: creates the store entities for each discovered VM.
- [`report`]: counters and progress messages for the framework.
- [`runner`]: the [`job_agent::Runner`] that ties them together.

!*/

pub mod config;
pub mod constants;
pub mod credentials;
pub mod error;
pub mod netbox;
pub mod reconciler;
pub mod report;
pub mod runner;
pub mod source;
pub mod store;
pub mod sync;
#[cfg(test)]
mod test_server;
pub mod vcenter;
pub mod walker;

pub use config::DiscoveryConfig;
pub use error::{Error, Result};
pub use runner::DiscoveryRunner;
pub use source::InventorySource;
pub use store::InventoryStore;
