use log::LevelFilter;

pub const DEFAULT_AGENT_LEVEL_FILTER: LevelFilter = LevelFilter::Info;

/// Library crates of this workspace whose log lines an agent shows at its own level.
pub const WORKSPACE_CRATES: &[&str] = &[
    "agent_common",
    "discovery_model",
    "job_agent",
    "vm_discovery",
];
