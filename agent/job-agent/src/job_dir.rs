use crate::SecretsReader;
use discovery_model::constants::{
    JOB_INPUT_FILE, JOB_JOURNAL_FILE, JOB_RESULTS_DIRECTORY, JOB_RESULTS_FILE,
    JOB_SECRETS_DIRECTORY, JOB_STATUS_FILE,
};
use discovery_model::{JobSpec, JobStatus, LogEntry};
use snafu::{ResultExt, Snafu};
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// A job directory is where the framework and an agent exchange everything about one job:
///
/// ```text
/// <job dir>/
///   input.yaml       job input written by the framework
///   secrets/<name>/  one directory per secret, one file per key
///   status.json      last status written by the agent
///   journal.jsonl    progress messages, one JSON object per line
///   results/         files produced by the run
///   results.tar      archive of `results/`
/// ```
#[derive(Debug, Clone)]
pub struct JobDirectory {
    path: PathBuf,
}

/// The error type for [`JobDirectory`] operations.
#[derive(Debug, Snafu)]
pub struct JobDirectoryError(InnerError);

#[derive(Debug, Snafu)]
pub(crate) enum InnerError {
    #[snafu(display("Unable to create directory '{}': {}", path.display(), source))]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("Unable to open '{}': {}", path.display(), source))]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("Unable to read '{}': {}", path.display(), source))]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("Unable to write '{}': {}", path.display(), source))]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("Unable to parse '{}': {}", path.display(), source))]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[snafu(display("Unable to serialize data for '{}': {}", path.display(), source))]
    Serialize {
        path: PathBuf,
        source: serde_json::Error,
    },
}

type Result<T> = std::result::Result<T, JobDirectoryError>;

impl JobDirectory {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn input_file(&self) -> PathBuf {
        self.path.join(JOB_INPUT_FILE)
    }

    pub fn status_file(&self) -> PathBuf {
        self.path.join(JOB_STATUS_FILE)
    }

    pub fn journal_file(&self) -> PathBuf {
        self.path.join(JOB_JOURNAL_FILE)
    }

    pub fn secrets_directory(&self) -> PathBuf {
        self.path.join(JOB_SECRETS_DIRECTORY)
    }

    pub fn results_directory(&self) -> PathBuf {
        self.path.join(JOB_RESULTS_DIRECTORY)
    }

    pub fn results_file(&self) -> PathBuf {
        self.path.join(JOB_RESULTS_FILE)
    }

    pub fn secrets_reader(&self) -> SecretsReader {
        SecretsReader::new(self.secrets_directory())
    }

    /// Create the job directory and the directories inside it.
    pub fn create(&self) -> Result<()> {
        for path in [
            self.path.clone(),
            self.secrets_directory(),
            self.results_directory(),
        ] {
            fs::create_dir_all(&path).context(CreateDirSnafu { path: &path })?;
        }
        Ok(())
    }

    /// Read the job input.
    pub fn read_spec(&self) -> std::result::Result<JobSpec, discovery_model::Error> {
        JobSpec::from_path(&self.input_file())
    }

    /// Read the last status written by the agent. A job that has not started yet has the default
    /// status.
    pub fn read_status(&self) -> Result<JobStatus> {
        let path = self.status_file();
        if !path.exists() {
            return Ok(JobStatus::default());
        }
        let data = fs::read_to_string(&path).context(ReadSnafu { path: &path })?;
        Ok(serde_json::from_str(&data).context(ParseSnafu { path: &path })?)
    }

    pub fn write_status(&self, status: &JobStatus) -> Result<()> {
        let path = self.status_file();
        let data = serde_json::to_string_pretty(status).context(SerializeSnafu { path: &path })?;
        fs::write(&path, data).context(WriteSnafu { path: &path })?;
        Ok(())
    }

    /// Remove the journal of an earlier run.
    pub fn reset_journal(&self) -> Result<()> {
        let path = self.journal_file();
        if path.exists() {
            fs::remove_file(&path).context(WriteSnafu { path: &path })?;
        }
        Ok(())
    }

    pub fn append_journal(&self, entry: &LogEntry) -> Result<()> {
        let path = self.journal_file();
        let line = serde_json::to_string(entry).context(SerializeSnafu { path: &path })?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .context(OpenSnafu { path: &path })?;
        writeln!(file, "{}", line).context(WriteSnafu { path: &path })?;
        Ok(())
    }

    pub fn read_journal(&self) -> Result<Vec<LogEntry>> {
        let path = self.journal_file();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let file = fs::File::open(&path).context(OpenSnafu { path: &path })?;
        let mut entries = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line.context(ReadSnafu { path: &path })?;
            if line.trim().is_empty() {
                continue;
            }
            entries.push(serde_json::from_str(&line).context(ParseSnafu { path: &path })?);
        }
        Ok(entries)
    }
}
