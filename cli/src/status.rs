use anyhow::{Context, Result};
use clap::Parser;
use job_agent::JobDirectory;
use serde_json::json;

/// Check the status of the discovery job.
#[derive(Debug, Parser)]
pub(crate) struct Status {
    /// Output the status and journal in JSON format.
    #[clap(long = "json")]
    json: bool,

    /// Leave out the journal.
    #[clap(long, short = 'q')]
    quiet: bool,
}

impl Status {
    pub(crate) fn run(self, job_dir: &JobDirectory) -> Result<()> {
        let status = job_dir
            .read_status()
            .context("Unable to read job status")?;
        let journal = if self.quiet {
            Vec::new()
        } else {
            job_dir
                .read_journal()
                .context("Unable to read job journal")?
        };

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "status": status,
                    "journal": journal,
                }))
                .context("Could not create string from status.")?
            );
            return Ok(());
        }

        println!("State: {}", status.state);
        if let Some(error) = &status.error_message {
            println!("Error: {}", error);
        }
        if let Some(results) = &status.results {
            println!("Outcome: {}", results.outcome);
            if let Some(summary) = &results.summary {
                println!("Summary: {}", summary);
            }
        }
        for entry in journal {
            println!("{}", entry);
        }
        Ok(())
    }
}
