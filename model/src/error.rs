use snafu::Snafu;
use std::path::PathBuf;

#[derive(Debug, Snafu)]
pub struct Error(OpaqueError);
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub(crate) enum OpaqueError {
    #[snafu(display("Error deserializing configuration: {}", source))]
    ConfigDeserialization { source: serde_json::Error },

    #[snafu(display("Error serializing configuration: {}", source))]
    ConfigSerialization { source: serde_json::Error },

    #[snafu(display(
        "Error serializing configuration: expected Value::Object type but got something else."
    ))]
    ConfigWrongValueType {},

    #[snafu(display("Invalid secret name '{}': {}", name, reason))]
    InvalidSecretName { name: String, reason: String },

    #[snafu(display("Unable to read job input '{}': {}", path.display(), source))]
    JobSpecRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("Unable to parse job input '{}': {}", path.display(), source))]
    JobSpecParse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[snafu(display("Unable to write job input '{}': {}", path.display(), source))]
    JobSpecWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("Unable to serialize job input: {}", source))]
    JobSpecSerialize { source: serde_yaml::Error },
}
