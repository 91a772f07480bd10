// Environment variables read by agent binaries at startup.
pub const ENV_JOB_NAME: &str = "AGENT_JOB_NAME";
pub const ENV_JOB_DIR: &str = "AGENT_JOB_DIR";

// Layout of a job directory.
pub const JOB_INPUT_FILE: &str = "input.yaml";
pub const JOB_STATUS_FILE: &str = "status.json";
pub const JOB_JOURNAL_FILE: &str = "journal.jsonl";
pub const JOB_SECRETS_DIRECTORY: &str = "secrets";
pub const JOB_RESULTS_DIRECTORY: &str = "results";
pub const JOB_RESULTS_FILE: &str = "results.tar";

// Name of the results directory inside the results archive.
pub const RESULTS_ARCHIVE_ROOT: &str = "job-results";
