use crate::config::DiscoveryConfig;
use crate::constants::{
    NETBOX_CREDENTIALS_SECRET_TYPE, PASSWORD_KEY, TOKEN_KEY, USERNAME_KEY,
    VCENTER_CREDENTIALS_SECRET_TYPE,
};
use crate::error::{CredentialsSnafu, MissingSecretSnafu, Result};
use job_agent::JobInfo;
use snafu::{OptionExt, ResultExt};
use std::fmt;

/// The account used to open the vCenter session.
#[derive(Clone)]
pub struct VcenterCredentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for VcenterCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VcenterCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Reads the vCenter `username` and `password` from the secret the job input names for
/// `vcenterCredentials`.
pub fn vcenter_credentials(info: &JobInfo<DiscoveryConfig>) -> Result<VcenterCredentials> {
    Ok(VcenterCredentials {
        username: secret_value(info, VCENTER_CREDENTIALS_SECRET_TYPE, USERNAME_KEY)?,
        password: secret_value(info, VCENTER_CREDENTIALS_SECRET_TYPE, PASSWORD_KEY)?,
    })
}

/// Reads the NetBox API token from the secret the job input names for `netboxCredentials`.
pub fn netbox_token(info: &JobInfo<DiscoveryConfig>) -> Result<String> {
    secret_value(info, NETBOX_CREDENTIALS_SECRET_TYPE, TOKEN_KEY)
}

fn secret_value(info: &JobInfo<DiscoveryConfig>, secret_type: &str, key: &str) -> Result<String> {
    let secret_name = info
        .secret_name(secret_type)
        .context(MissingSecretSnafu { secret_type })?;
    info.secrets_reader
        .get_secret_value(secret_name, key)
        .context(CredentialsSnafu { secret_type })
}
