use crate::error::{self, AgentError, Error, Result};
use crate::{BootstrapData, Client, JobInfo, Journal, LogEntry, Runner};
use async_trait::async_trait;
use discovery_model::constants::RESULTS_ARCHIVE_ROOT;
use log::{debug, error, info, log};
use snafu::ResultExt;
use std::fs::File;
use std::path::PathBuf;
use tar::Builder;

/// The `JobAgent` is the main entrypoint for the program that runs a plugin. It starts the job,
/// relays its progress messages, sends its results or its error, releases the runner and archives
/// the results directory.
///
/// To create a plugin, implement the [`Runner`] trait on an object and inject it into the
/// `JobAgent`.
///
/// The [`Client`] is injected for the sake of testability. You can mock it in order to test your
/// [`Runner`] in the absence of the framework. See `../tests/mock.rs` for an example.
///
pub struct JobAgent<C, R>
where
    C: Client + 'static,
    R: Runner + 'static,
{
    client: C,
    runner: R,
}

/// Forwards a runner's progress messages to the process log and to the [`Client`].
struct ClientJournal<'a, C: Client> {
    client: &'a C,
}

#[async_trait]
impl<'a, C: Client> Journal for ClientJournal<'a, C> {
    async fn record(&self, entry: LogEntry) {
        log!(entry.level.log_level(), "{}", entry.message);
        if let Err(e) = self.client.send_log(entry).await {
            error!("Unable to record journal entry: {}", e);
        }
    }
}

impl<C, R> JobAgent<C, R>
where
    C: Client + 'static,
    R: Runner + 'static,
{
    /// Create a new `JobAgent`. Since the [`Client`] and [`Runner`] are constructed internally
    /// based on information from the [`BootstrapData`], you will need to specify the types using
    /// the type parameters. `JobAgent::<DefaultClient, MyRunner>::new(BootstrapData::from_env())`.
    /// Any errors that occur during this function are fatal since we are not able to fully
    /// construct the `Runner`.
    pub async fn new(b: BootstrapData) -> Result<Self, C::E, R::E> {
        let client = C::new(b).await.map_err(Error::Client)?;
        let job_info: JobInfo<R::C> = match client.job_info().await.map_err(Error::Client) {
            Ok(ok) => ok,
            Err(e) => {
                Self::send_error_with(&client, &e).await;
                return Err(e);
            }
        };
        let runner = match R::new(job_info).await.map_err(Error::Runner) {
            Ok(ok) => ok,
            Err(e) => {
                Self::send_error_with(&client, &e).await;
                return Err(e);
            }
        };
        Ok(Self { runner, client })
    }

    /// Run the `JobAgent`. This function returns once the job has completed and the runner has
    /// been terminated.
    pub async fn run(&mut self) -> Result<(), C::E, R::E> {
        let result = self.run_inner().await;
        let tar_result = self.tar_results().await;

        match &result {
            Ok(_) => info!("Job execution finished without returning an error."),
            Err(e) => error!("Job execution returned an error: {}", e),
        }
        match &tar_result {
            Ok(_) => info!("Job results archive created."),
            Err(e) => error!("Error creating results archive: {}", e),
        }

        // We want the running error first if there was one.
        match result {
            Err(e) => Err(e),
            Ok(()) => tar_result,
        }
    }

    async fn run_inner(&mut self) -> Result<(), C::E, R::E> {
        debug!("running job");
        if let Err(e) = self
            .client
            .send_job_starting()
            .await
            .map_err(Error::Client)
        {
            self.terminate_best_effort().await;
            return Err(e);
        }

        let journal = ClientJournal {
            client: &self.client,
        };
        let results = match self.runner.run(&journal).await.map_err(Error::Runner) {
            Ok(ok) => ok,
            Err(e) => {
                self.send_error_best_effort(&e).await;
                self.terminate_best_effort().await;
                return Err(e);
            }
        };

        if let Err(e) = self
            .client
            .send_job_done(results)
            .await
            .map_err(Error::Client)
        {
            self.send_error_best_effort(&e).await;
            self.terminate_best_effort().await;
            return Err(e);
        }

        // Job finished successfully. Try to terminate. If termination fails, we try to send the
        // error to the framework, and return the error so that the process will exit with error.
        if let Err(e) = self.runner.terminate().await.map_err(Error::Runner) {
            error!("unable to terminate job runner: {}", e);
            self.send_error_best_effort(&e).await;
            return Err(e);
        }

        Ok(())
    }

    async fn send_error_with(client: &C, e: &Error<C::E, R::E>) {
        if let Err(send_error) = client.send_error(e).await {
            error!(
                "unable to send error message '{}' to the framework: {}",
                e, send_error
            );
        }
    }

    async fn send_error_best_effort(&self, e: &Error<C::E, R::E>) {
        Self::send_error_with(&self.client, e).await
    }

    /// Tells the `Runner` to terminate. If an error occurs, tries to send it to the framework, but
    /// logs it if it cannot be sent.
    async fn terminate_best_effort(&mut self) {
        if let Err(e) = self.runner.terminate().await.map_err(Error::Runner) {
            error!("unable to terminate job runner: {}", e);
            self.send_error_best_effort(&e).await;
        }
    }

    /// Archives the results directory into the results file.
    async fn tar_results(&mut self) -> Result<(), C::E, R::E> {
        let results_dir = self
            .client
            .results_directory()
            .await
            .map_err(Error::Client)?;
        let results_file = self.client.results_file().await.map_err(Error::Client)?;

        let tar = File::create(&results_file)
            .context(error::ArchiveSnafu {
                path: &results_file,
            })
            .map_err(|e| Error::Agent(AgentError::from(e)))?;
        let mut archive = Builder::new(tar);
        archive
            .append_dir_all(RESULTS_ARCHIVE_ROOT, &results_dir)
            .context(error::ArchiveSnafu { path: &results_dir })
            .map_err(|e| Error::Agent(AgentError::from(e)))?;
        archive
            .into_inner()
            .context(error::ArchiveSnafu {
                path: &results_file,
            })
            .map_err(|e| Error::Agent(AgentError::from(e)))?;
        Ok(())
    }

    pub async fn results_file(&self) -> Result<PathBuf, C::E, R::E> {
        self.client.results_file().await.map_err(Error::Client)
    }
}
