/*!

The `bootstrap` module defines a struct and function for getting the necessary information from the
process environment to construct the [`JobAgent`] and all of its parts.

!*/

use discovery_model::constants::{ENV_JOB_DIR, ENV_JOB_NAME};
use snafu::{ResultExt, Snafu};
use std::path::PathBuf;

/// Data that is read from the agent's environment.
#[derive(Debug, Clone)]
pub struct BootstrapData {
    /// The name of the job.
    pub job_name: String,
    /// The directory holding the job input, its secrets and everything the agent writes back.
    pub job_dir: PathBuf,
}

/// The public error type for [`BootstrapData`].
#[derive(Debug, Snafu)]
pub struct BootstrapError(InnerError);

/// The private error type for [`BootstrapData`].
#[derive(Debug, Snafu)]
pub(crate) enum InnerError {
    #[snafu(display("Unable to read environment variable: '{}': {}", key, source))]
    EnvRead {
        key: String,
        source: std::env::VarError,
    },
}

impl BootstrapData {
    pub fn from_env() -> Result<BootstrapData, BootstrapError> {
        Ok(BootstrapData {
            job_name: std::env::var(ENV_JOB_NAME).context(EnvReadSnafu { key: ENV_JOB_NAME })?,
            job_dir: std::env::var(ENV_JOB_DIR)
                .context(EnvReadSnafu { key: ENV_JOB_DIR })?
                .into(),
        })
    }
}
