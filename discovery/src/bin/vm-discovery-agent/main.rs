/*!

Discovers the virtual machines of a vCenter inventory and creates them, with their interfaces and
IPv4 addresses, in NetBox. The job directory is given by `AGENT_JOB_DIR`.

!*/

use agent_utils::init_agent_logger;
use job_agent::error::Result;
use job_agent::{BootstrapData, ClientError, DefaultClient, JobAgent};
use vm_discovery::DiscoveryRunner;

#[tokio::main]
async fn main() {
    init_agent_logger(env!("CARGO_CRATE_NAME"), None);
    let data = match BootstrapData::from_env() {
        Ok(ok) => ok,
        Err(e) => {
            eprintln!("Unable to get bootstrap data: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = run(data).await {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

async fn run(data: BootstrapData) -> Result<(), ClientError, vm_discovery::Error> {
    let mut agent = JobAgent::<DefaultClient, DiscoveryRunner>::new(data).await?;
    agent.run().await
}
