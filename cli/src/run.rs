use anyhow::{Context, Result};
use clap::Parser;
use job_agent::{BootstrapData, DefaultClient, JobAgent, JobDirectory};
use vm_discovery::DiscoveryRunner;

/// Run the discovery job in this process. Progress is logged as it happens and kept in the job's
/// journal.
#[derive(Debug, Parser)]
pub(crate) struct Run {
    /// The name the job is reported under.
    #[clap(long, env = "AGENT_JOB_NAME", default_value = "vm-discovery")]
    name: String,
}

impl Run {
    pub(crate) async fn run(self, job_dir: &JobDirectory) -> Result<()> {
        let mut agent = JobAgent::<DefaultClient, DiscoveryRunner>::new(BootstrapData {
            job_name: self.name,
            job_dir: job_dir.path().to_path_buf(),
        })
        .await
        .context("Unable to start discovery")?;
        agent.run().await.context("Discovery failed")?;

        let status = job_dir
            .read_status()
            .context("Unable to read job status")?;
        if let Some(summary) = status.results.and_then(|results| results.summary) {
            println!("{}", summary);
        }
        Ok(())
    }
}
