/*!

This is the command line interface for preparing a VM discovery job, running it and checking on it.

!*/

mod init;
mod run;
mod status;

use agent_utils::init_agent_logger;
use anyhow::Result;
use clap::Parser;
use job_agent::JobDirectory;
use log::LevelFilter;
use std::path::PathBuf;

/// Discover the VMs of a vCenter and create them, with their interfaces and IPs, in NetBox.
#[derive(Debug, Parser)]
#[clap(author, version, about)]
struct Args {
    /// Set logging verbosity [trace|debug|info|warn|error]. If the environment variable `RUST_LOG`
    /// is present, it overrides the default logging behavior. See https://docs.rs/env_logger/latest
    #[clap(long = "log-level", default_value = "info")]
    log_level: LevelFilter,
    /// The job directory holding the discovery input, secrets, status and results.
    #[clap(long = "job-dir", env = "AGENT_JOB_DIR", default_value = "discovery-job")]
    job_dir: PathBuf,
    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Parser)]
enum Command {
    /// Write the input and secrets of a discovery job.
    Init(init::Init),
    /// Run the discovery job.
    Run(run::Run),
    /// Show the status and journal of the discovery job.
    Status(status::Status),
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_agent_logger(env!("CARGO_CRATE_NAME"), Some(args.log_level));
    if let Err(e) = run(args).await {
        eprintln!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let job_dir = JobDirectory::new(args.job_dir);
    match args.command {
        Command::Init(init) => init.run(&job_dir),
        Command::Run(run) => run.run(&job_dir).await,
        Command::Status(status) => status.run(&job_dir),
    }
}
