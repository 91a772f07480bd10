/// The secret holding the vCenter `username` and `password`.
pub const VCENTER_CREDENTIALS_SECRET_TYPE: &str = "vcenterCredentials";
/// The secret holding the NetBox API `token`.
pub const NETBOX_CREDENTIALS_SECRET_TYPE: &str = "netboxCredentials";

pub const USERNAME_KEY: &str = "username";
pub const PASSWORD_KEY: &str = "password";
pub const TOKEN_KEY: &str = "token";

pub const DEFAULT_VCENTER_PORT: u16 = 443;
/// The vSphere JSON API release used in request paths (`/sdk/vim25/{release}/...`).
pub const DEFAULT_VIM_RELEASE: &str = "8.0.1.0";
/// Discovered VMs may only be attributed to a destination cluster of this type.
pub const DEFAULT_CLUSTER_TYPE: &str = "ESXi";

pub const HTTP_TIMEOUT_SECS: u64 = 60;

/// Name of the run report written to the results directory.
pub const REPORT_FILE: &str = "report.json";
