/*!

`agent-utils` is a collection of functions that may be used by agent binaries and the command
line interface.

!*/

use constants::{DEFAULT_AGENT_LEVEL_FILTER, WORKSPACE_CRATES};
use env_logger::Builder;
use log::LevelFilter;
use std::env;

pub mod constants;

/// Extract the value of `RUST_LOG` if it exists, otherwise log this application at
/// `DEFAULT_AGENT_LEVEL_FILTER`.
pub fn init_agent_logger(bin_crate: &str, log_level: Option<LevelFilter>) {
    match env::var(env_logger::DEFAULT_FILTER_ENV).ok() {
        Some(_) => {
            // RUST_LOG exists; env_logger will use it.
            Builder::from_default_env().init();
        }
        None => {
            // RUST_LOG does not exist; use default log level except for HTTP internals.
            let log_level = log_level.unwrap_or(DEFAULT_AGENT_LEVEL_FILTER);
            agent_log_builder(bin_crate, log_level).init();
        }
    }
}

/// A `Builder` that logs `bin_crate` and the workspace crates at `log_level`, and everything else
/// (reqwest, hyper, rustls) at `Error`.
fn agent_log_builder(bin_crate: &str, log_level: LevelFilter) -> Builder {
    let mut builder = Builder::new();
    // Set log level to Error for crates other than our own.
    builder.filter_level(LevelFilter::Error);
    // Set all of our crates to the desired level.
    builder.filter(Some(bin_crate), log_level);
    for name in WORKSPACE_CRATES {
        builder.filter(Some(*name), log_level);
    }
    builder
}
