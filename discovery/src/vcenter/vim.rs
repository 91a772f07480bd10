//! Wire types of the vSphere JSON API (`/sdk/vim25/{release}`). Only the properties discovery
//! reads are modelled; everything else in a response is ignored.

use crate::source::{GuestIp, GuestNic, ManagedObjectReference};
use serde::{Deserialize, Serialize};

/// `GET /ServiceInstance/ServiceInstance/content`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ServiceContent {
    pub(crate) root_folder: ManagedObjectReference,
    pub(crate) session_manager: Option<ManagedObjectReference>,
    pub(crate) about: Option<AboutInfo>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AboutInfo {
    pub(crate) full_name: Option<String>,
}

/// Body of `POST /SessionManager/{moId}/Login`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoginRequest<'a> {
    pub(crate) user_name: &'a str,
    pub(crate) password: &'a str,
}

/// `GET /VirtualMachine/{moId}/summary`
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct VirtualMachineSummary {
    pub(crate) config: Option<VmConfigSummary>,
    pub(crate) storage: Option<VmStorageSummary>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VmConfigSummary {
    pub(crate) name: Option<String>,
    pub(crate) num_cpu: Option<u32>,
    #[serde(rename = "memorySizeMB")]
    pub(crate) memory_size_mb: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct VmStorageSummary {
    pub(crate) committed: Option<i64>,
}

/// `GET /VirtualMachine/{moId}/guest`
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct GuestInfo {
    pub(crate) net: Option<Vec<GuestNicInfo>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GuestNicInfo {
    pub(crate) network: Option<String>,
    pub(crate) mac_address: Option<String>,
    pub(crate) ip_config: Option<NetIpConfigInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NetIpConfigInfo {
    pub(crate) ip_address: Option<Vec<NetIpConfigInfoIpAddress>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NetIpConfigInfoIpAddress {
    pub(crate) ip_address: Option<String>,
    #[serde(default)]
    pub(crate) prefix_length: i32,
}

impl From<GuestNicInfo> for GuestNic {
    fn from(nic: GuestNicInfo) -> Self {
        GuestNic {
            network: nic.network,
            mac_address: nic.mac_address,
            ip_config: nic.ip_config.map(|config| {
                config
                    .ip_address
                    .unwrap_or_default()
                    .into_iter()
                    .map(|ip| GuestIp {
                        ip_address: ip.ip_address,
                        prefix_length: ip.prefix_length,
                    })
                    .collect()
            }),
        }
    }
}
