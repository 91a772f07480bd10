use crate::job_dir::JobDirectoryError;
use crate::{BootstrapData, Client, JobDirectory, JobInfo, JobResults};
use async_trait::async_trait;
use discovery_model::{Configuration, JobStatus, LogEntry, TaskState};
use log::debug;
use snafu::{ResultExt, Snafu};
use std::fmt::{Debug, Display};
use std::path::PathBuf;

/// Provides the default [`Client`] implementation, which talks to the framework through a
/// [`JobDirectory`].
pub struct DefaultClient {
    name: String,
    job_dir: JobDirectory,
}

/// The public error type for the default [`Client`].
#[derive(Debug, Snafu)]
pub struct ClientError(InnerError);

/// The private error type for the default [`Client`].
#[derive(Debug, Snafu)]
pub(crate) enum InnerError {
    #[snafu(display("Job directory '{}' does not exist", path.display()))]
    MissingJobDirectory { path: PathBuf },

    /// Any error from the job directory will have a descriptive error message, so we forward it.
    #[snafu(display("{}", source))]
    JobDirectory { source: JobDirectoryError },

    #[snafu(display("Unable to read job input: {}", source))]
    JobInput { source: discovery_model::Error },

    #[snafu(display("Unable to deserialize job configuration: {}", source))]
    Deserialization { source: discovery_model::Error },
}

impl DefaultClient {
    pub fn job_directory(&self) -> &JobDirectory {
        &self.job_dir
    }

    fn update_status<F>(&self, update: F) -> Result<(), ClientError>
    where
        F: FnOnce(&mut JobStatus),
    {
        let mut status = self.job_dir.read_status().context(JobDirectorySnafu)?;
        update(&mut status);
        self.job_dir
            .write_status(&status)
            .context(JobDirectorySnafu)?;
        Ok(())
    }
}

#[async_trait]
impl Client for DefaultClient {
    type E = ClientError;

    async fn new(bootstrap_data: BootstrapData) -> Result<Self, Self::E> {
        let job_dir = JobDirectory::new(&bootstrap_data.job_dir);
        if !job_dir.path().is_dir() {
            return Err(MissingJobDirectorySnafu {
                path: bootstrap_data.job_dir,
            }
            .build()
            .into());
        }
        job_dir.create().context(JobDirectorySnafu)?;
        Ok(Self {
            name: bootstrap_data.job_name,
            job_dir,
        })
    }

    async fn job_info<C>(&self) -> Result<JobInfo<C>, Self::E>
    where
        C: Configuration,
    {
        let spec = self.job_dir.read_spec().context(JobInputSnafu)?;
        let configuration = spec.configuration().context(DeserializationSnafu)?;
        Ok(JobInfo {
            name: self.name.clone(),
            configuration,
            secrets: spec.secrets,
            secrets_reader: self.job_dir.secrets_reader(),
            results_dir: self.job_dir.results_directory(),
        })
    }

    async fn results_directory(&self) -> Result<PathBuf, Self::E> {
        Ok(self.job_dir.results_directory())
    }

    async fn results_file(&self) -> Result<PathBuf, Self::E> {
        Ok(self.job_dir.results_file())
    }

    async fn send_job_starting(&self) -> Result<(), Self::E> {
        debug!("Job '{}' is starting", self.name);
        self.job_dir.reset_journal().context(JobDirectorySnafu)?;
        self.job_dir
            .write_status(&JobStatus {
                state: TaskState::Running,
                error_message: None,
                results: None,
            })
            .context(JobDirectorySnafu)?;
        Ok(())
    }

    async fn send_log(&self, entry: LogEntry) -> Result<(), Self::E> {
        self.job_dir
            .append_journal(&entry)
            .context(JobDirectorySnafu)?;
        Ok(())
    }

    async fn send_job_done(&self, results: JobResults) -> Result<(), Self::E> {
        self.update_status(|status| {
            status.state = TaskState::Completed;
            status.results = Some(results);
        })
    }

    async fn send_error<E>(&self, error: E) -> Result<(), Self::E>
    where
        E: Debug + Display + Send + Sync,
    {
        self.update_status(|status| {
            status.state = TaskState::Error;
            status.error_message = Some(error.to_string());
        })
    }
}
