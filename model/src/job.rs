use crate::error::{self, Result};
use crate::{Configuration, SecretName, SecretType};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_plain::{derive_display_from_serialize, derive_fromstr_from_deserialize};
use snafu::ResultExt;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// The input that the framework hands to an agent: an open configuration object, which the agent
/// deserializes into its own [`Configuration`] type, and the names of the secrets it may read.
#[derive(Serialize, Deserialize, Debug, Default, Eq, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct JobSpec {
    /// The configuration to pass to the agent. This is 'open' to allow agents to define their own
    /// schemas.
    #[serde(default)]
    pub configuration: Map<String, Value>,
    /// Secrets the agent may read, keyed by the role they play for the agent.
    #[serde(default)]
    pub secrets: BTreeMap<SecretType, SecretName>,
}

impl JobSpec {
    /// Build a `JobSpec` from a strongly typed configuration.
    pub fn new<C: Configuration>(
        configuration: C,
        secrets: BTreeMap<SecretType, SecretName>,
    ) -> Result<Self> {
        Ok(Self {
            configuration: configuration.into_map()?,
            secrets,
        })
    }

    /// Read a `JobSpec` from a YAML (or JSON) file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path).context(error::JobSpecReadSnafu { path })?;
        Ok(serde_yaml::from_str(&data).context(error::JobSpecParseSnafu { path })?)
    }

    /// Write the `JobSpec` to a YAML file.
    pub fn write(&self, path: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self).context(error::JobSpecSerializeSnafu)?;
        fs::write(path, data).context(error::JobSpecWriteSnafu { path })?;
        Ok(())
    }

    /// Deserialize the open configuration object into the agent's configuration type.
    pub fn configuration<C: Configuration>(&self) -> Result<C> {
        C::from_map(self.configuration.clone())
    }
}

/// The states that an agent declares about its job.
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Clone, Copy)]
#[serde(rename_all = "camelCase")]
pub enum TaskState {
    Unknown,
    Running,
    Completed,
    Error,
}

impl Default for TaskState {
    fn default() -> Self {
        Self::Unknown
    }
}

derive_display_from_serialize!(TaskState);
derive_fromstr_from_deserialize!(TaskState);

#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Clone, Copy)]
#[serde(rename_all = "camelCase")]
pub enum Outcome {
    Pass,
    Fail,
    Unknown,
}

impl Default for Outcome {
    fn default() -> Self {
        Self::Unknown
    }
}

derive_display_from_serialize!(Outcome);

/// What an agent reports once its job has finished.
#[derive(Serialize, Deserialize, Debug, Default, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct JobResults {
    pub outcome: Outcome,
    /// A one line, human readable summary of the run.
    pub summary: Option<String>,
    /// Agent specific details, e.g. counters.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub details: Map<String, Value>,
}

/// The status of a job as last written by its agent.
#[derive(Serialize, Deserialize, Debug, Default, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct JobStatus {
    pub state: TaskState,
    /// If the `state` is `Error` then there *may* be an error message here.
    pub error_message: Option<String>,
    pub results: Option<JobResults>,
}
