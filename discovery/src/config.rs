use crate::constants::{DEFAULT_CLUSTER_TYPE, DEFAULT_VCENTER_PORT, DEFAULT_VIM_RELEASE};
use crate::error::{InvalidConfigSnafu, Result};
use crate::vcenter::VcenterEndpoint;
use crate::walker::WalkScope;
use discovery_model::Configuration;
use serde::{Deserialize, Serialize};
use snafu::ensure;

/// The input of a discovery run, read from the job's `input.yaml`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryConfig {
    /// Hostname or address of the vCenter server.
    pub vcenter_host: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vcenter_port: Option<u16>,
    /// The vSphere JSON API release to address, e.g. `8.0.1.0`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vim_release: Option<String>,
    /// Name of the existing NetBox cluster that discovered VMs are attributed to.
    pub cluster: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_type: Option<String>,
    /// Only discover the VMs of the vCenter cluster with this name. All clusters are walked when
    /// unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_cluster: Option<String>,
    /// Base URL of NetBox, e.g. `https://netbox.example.com`.
    pub netbox_url: String,
    /// Accept untrusted certificates from NetBox.
    #[serde(default)]
    pub netbox_insecure: bool,
}

impl Configuration for DiscoveryConfig {}

impl DiscoveryConfig {
    pub fn validate(&self) -> Result<()> {
        ensure!(
            !self.vcenter_host.trim().is_empty(),
            InvalidConfigSnafu {
                reason: "'vcenterHost' must not be empty"
            }
        );
        ensure!(
            !self.cluster.trim().is_empty(),
            InvalidConfigSnafu {
                reason: "'cluster' must not be empty"
            }
        );
        ensure!(
            !self.netbox_url.trim().is_empty(),
            InvalidConfigSnafu {
                reason: "'netboxUrl' must not be empty"
            }
        );
        Ok(())
    }

    pub fn vcenter_endpoint(&self) -> VcenterEndpoint {
        VcenterEndpoint {
            host: self.vcenter_host.clone(),
            port: self.vcenter_port.unwrap_or(DEFAULT_VCENTER_PORT),
            release: self
                .vim_release
                .clone()
                .unwrap_or_else(|| DEFAULT_VIM_RELEASE.to_string()),
        }
    }

    pub fn cluster_type(&self) -> &str {
        self.cluster_type.as_deref().unwrap_or(DEFAULT_CLUSTER_TYPE)
    }

    pub fn walk_scope(&self) -> WalkScope {
        match &self.source_cluster {
            Some(name) => WalkScope::Cluster(name.clone()),
            None => WalkScope::Everything,
        }
    }
}
