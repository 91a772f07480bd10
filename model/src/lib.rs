/*!

This library provides the data model shared between a discovery job, the agent harness that runs
it, and the command line interface: job input, job status, run journal entries and secret names.

!*/

#![deny(
    clippy::expect_used,
    clippy::get_unwrap,
    clippy::panic,
    clippy::panic_in_result_fn,
    clippy::panicking_unwrap,
    clippy::unwrap_in_result,
    clippy::unwrap_used
)]

pub use configuration::Configuration;
pub use error::{Error, Result};
pub use job::{JobResults, JobSpec, JobStatus, Outcome, TaskState};
pub use journal::{LogEntry, Severity};
pub use secret::{SecretName, SecretType};

mod configuration;
pub mod constants;
mod error;
mod job;
mod journal;
mod secret;
