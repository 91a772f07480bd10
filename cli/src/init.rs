use anyhow::{Context, Result};
use clap::Parser;
use discovery_model::{JobSpec, SecretName};
use job_agent::JobDirectory;
use std::collections::BTreeMap;
use vm_discovery::constants::{
    NETBOX_CREDENTIALS_SECRET_TYPE, PASSWORD_KEY, TOKEN_KEY, USERNAME_KEY,
    VCENTER_CREDENTIALS_SECRET_TYPE,
};
use vm_discovery::DiscoveryConfig;

const VCENTER_SECRET_NAME: &str = "vcenter-credentials";
const NETBOX_SECRET_NAME: &str = "netbox-credentials";

/// Write the input of a discovery job. Passwords and tokens are read from the environment so
/// that they do not end up in the shell history.
#[derive(Debug, Parser)]
pub(crate) struct Init {
    /// Hostname or address of the vCenter server.
    #[clap(long)]
    vcenter_host: String,

    #[clap(long)]
    vcenter_port: Option<u16>,

    /// The vSphere JSON API release to address (default 8.0.1.0).
    #[clap(long)]
    vim_release: Option<String>,

    #[clap(long)]
    vcenter_user: String,

    #[clap(long, env = "VCENTER_PASSWORD", hide_env_values = true)]
    vcenter_password: String,

    /// The NetBox cluster that discovered VMs are created in.
    #[clap(long)]
    cluster: String,

    /// The type the NetBox cluster must have (default ESXi).
    #[clap(long)]
    cluster_type: Option<String>,

    /// Only discover the VMs of this vCenter cluster.
    #[clap(long)]
    source_cluster: Option<String>,

    #[clap(long)]
    netbox_url: String,

    #[clap(long, env = "NETBOX_TOKEN", hide_env_values = true)]
    netbox_token: String,

    /// Accept untrusted certificates from NetBox.
    #[clap(long)]
    netbox_insecure: bool,
}

impl Init {
    pub(crate) fn run(self, job_dir: &JobDirectory) -> Result<()> {
        let config = DiscoveryConfig {
            vcenter_host: self.vcenter_host,
            vcenter_port: self.vcenter_port,
            vim_release: self.vim_release,
            cluster: self.cluster,
            cluster_type: self.cluster_type,
            source_cluster: self.source_cluster,
            netbox_url: self.netbox_url,
            netbox_insecure: self.netbox_insecure,
        };
        config.validate().context("Invalid discovery input")?;

        job_dir.create().context("Unable to create job directory")?;
        let reader = job_dir.secrets_reader();
        let vcenter = SecretName::new(VCENTER_SECRET_NAME)?;
        reader
            .write_secret(
                &vcenter,
                [
                    (USERNAME_KEY, self.vcenter_user.as_bytes()),
                    (PASSWORD_KEY, self.vcenter_password.as_bytes()),
                ],
            )
            .context("Unable to store vCenter credentials")?;
        let netbox = SecretName::new(NETBOX_SECRET_NAME)?;
        reader
            .write_secret(&netbox, [(TOKEN_KEY, self.netbox_token.as_bytes())])
            .context("Unable to store NetBox token")?;

        let secrets = BTreeMap::from([
            (VCENTER_CREDENTIALS_SECRET_TYPE.to_string(), vcenter),
            (NETBOX_CREDENTIALS_SECRET_TYPE.to_string(), netbox),
        ]);
        let input_file = job_dir.input_file();
        JobSpec::new(config, secrets)
            .context("Unable to create job input")?
            .write(&input_file)
            .context("Unable to write job input")?;
        println!("Wrote discovery job input to '{}'", input_file.display());
        Ok(())
    }
}
