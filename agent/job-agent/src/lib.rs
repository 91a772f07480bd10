/*!

The `job-agent` library is the harness that a job framework uses to run a plugin. A plugin
implements the [`Runner`] trait; the [`JobAgent`] hands it its input, relays its progress messages
through a [`Journal`], records its results and makes sure that [`Runner::terminate`] is called on
every exit path.

The [`Client`] trait is the seam between the agent and the framework. [`DefaultClient`] implements
it against a job directory on the local file system.

!*/

mod agent;
mod bootstrap;
mod client;
pub mod error;
mod job_dir;

pub use crate::agent::JobAgent;
pub use agent_common::secrets::SecretsReader;
use async_trait::async_trait;
pub use bootstrap::{BootstrapData, BootstrapError};
pub use client::{ClientError, DefaultClient};
pub use discovery_model::{Configuration, JobResults, LogEntry, Outcome, Severity};
use discovery_model::{SecretName, SecretType};
pub use job_dir::{JobDirectory, JobDirectoryError};
use std::collections::BTreeMap;
use std::fmt::{Debug, Display};
use std::path::PathBuf;

/// Information that a [`Runner`] needs before it can begin its job.
#[derive(Debug, Clone)]
pub struct JobInfo<C: Configuration> {
    pub name: String,
    pub configuration: C,
    pub secrets: BTreeMap<SecretType, SecretName>,
    pub secrets_reader: SecretsReader,
    pub results_dir: PathBuf,
}

impl<C: Configuration> JobInfo<C> {
    /// The name of the secret the job input declares for `secret_type`, if any.
    pub fn secret_name(&self, secret_type: &str) -> Option<&SecretName> {
        self.secrets.get(secret_type)
    }
}

/// The `Runner` trait wraps the work a plugin does. You must implement this trait for your job.
///
/// The [`JobAgent`] will call your implementation of the `Runner` trait as follows:
/// - `new` will be called to instantiate the object.
/// - `run` will be called once to do the job.
/// - `terminate` will be called before the program exits, whether or not `run` succeeded.
///
/// You will also define a [`Configuration`] type for the input your job needs when it starts.
#[async_trait]
pub trait Runner: Sized + Send {
    /// Input that you need to initialize your job.
    type C: Configuration;

    /// The error type returned by this trait's functions.
    type E: Debug + Display + Send + Sync + 'static;

    /// Creates a new instance of the `Runner`.
    async fn new(job_info: JobInfo<Self::C>) -> Result<Self, Self::E>;

    /// Does the job and returns when it is done. Progress messages for the operator are relayed
    /// through `journal`. If the job cannot be completed, returns an error.
    async fn run<J>(&mut self, journal: &J) -> Result<JobResults, Self::E>
    where
        J: Journal;

    /// Releases anything acquired by `run`.
    async fn terminate(&mut self) -> Result<(), Self::E>;
}

/// Receives the human readable progress messages of a run. Recording is best-effort: a message
/// that cannot be delivered is logged locally and the run carries on.
#[async_trait]
pub trait Journal: Send + Sync {
    async fn record(&self, entry: LogEntry);

    async fn info(&self, message: String) {
        self.record(LogEntry::new(Severity::Info, message)).await
    }

    async fn success(&self, message: String) {
        self.record(LogEntry::new(Severity::Success, message)).await
    }

    async fn warning(&self, message: String) {
        self.record(LogEntry::new(Severity::Warning, message)).await
    }

    async fn failure(&self, message: String) {
        self.record(LogEntry::new(Severity::Failure, message)).await
    }
}

/// The `Client` is an interface to the job framework. The purpose of the interface is to allow
/// injection of a mock for development and testing of agents. In practice you will use the
/// provided implementation by calling `DefaultClient::new()`.
#[async_trait]
pub trait Client: Sized + Send + Sync {
    /// The error type returned by this trait's functions.
    type E: Debug + Display + Send + Sync + 'static;

    /// Create a new instance of the `Client`. The [`JobAgent`] will instantiate the `Client` with
    /// this function after it obtains `BootstrapData`.
    async fn new(bootstrap_data: BootstrapData) -> Result<Self, Self::E>;

    /// Get the information needed by a [`Runner`] from the framework.
    async fn job_info<C>(&self) -> Result<JobInfo<C>, Self::E>
    where
        C: Configuration;

    /// Get the directory that the job's results are stored in.
    async fn results_directory(&self) -> Result<PathBuf, Self::E>;

    /// Get the file that the job's results archive should be stored in.
    async fn results_file(&self) -> Result<PathBuf, Self::E>;

    /// Set the appropriate status field to represent that the job has started.
    async fn send_job_starting(&self) -> Result<(), Self::E>;

    /// Relay one progress message to the framework.
    async fn send_log(&self, entry: LogEntry) -> Result<(), Self::E>;

    /// Set the appropriate status fields once the job has finished.
    async fn send_job_done(&self, results: JobResults) -> Result<(), Self::E>;

    /// Send an error to the framework.
    async fn send_error<E>(&self, error: E) -> Result<(), Self::E>
    where
        E: Debug + Display + Send + Sync;
}
