use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_plain::derive_display_from_serialize;
use std::fmt::{Display, Formatter};

/// The severity of a line in a run journal. `Success` sits between `Info` and `Warning` and marks
/// a step that completed something the operator asked for.
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Ord, PartialOrd, Clone, Copy)]
#[serde(rename_all = "camelCase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Failure,
}

derive_display_from_serialize!(Severity);

impl Severity {
    /// The `log` level used when a journal line is also written to the process log.
    pub fn log_level(&self) -> log::Level {
        match self {
            Severity::Info | Severity::Success => log::Level::Info,
            Severity::Warning => log::Level::Warn,
            Severity::Failure => log::Level::Error,
        }
    }
}

/// One human readable progress message that an agent relays to the framework.
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Clone)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: Severity,
    pub message: String,
}

impl LogEntry {
    pub fn new<S: Into<String>>(level: Severity, message: S) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            message: message.into(),
        }
    }
}

impl Display for LogEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] {}",
            self.timestamp.to_rfc3339(),
            self.level,
            self.message
        )
    }
}

#[test]
fn severity_serializes_lowercase() {
    let entry = LogEntry::new(Severity::Success, "Connected to vCenter!");
    let json = serde_json::to_value(&entry).unwrap();
    assert_eq!(json.get("level").unwrap(), "success");
    assert_eq!(Severity::Failure.log_level(), log::Level::Error);
}
