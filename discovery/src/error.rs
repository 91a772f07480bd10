use snafu::Snafu;
use std::path::PathBuf;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// Every failure while opening the vCenter session is reported as this one terminal kind.
    #[snafu(display("Unable to connect to vCenter '{}': {}", host, source))]
    Connection {
        host: String,
        #[snafu(source(from(Error, Box::new)))]
        source: Box<Error>,
    },

    #[snafu(display("Unable to build HTTP client: {}", source))]
    HttpClient { source: reqwest::Error },

    #[snafu(display("Invalid URL '{}': {}", url, source))]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },

    #[snafu(display("Request to '{}' failed: {}", url, source))]
    ServiceRequest { url: String, source: reqwest::Error },

    #[snafu(display("vCenter rejected the login of '{}' with status {}: {}", user, status, body))]
    LoginRejected {
        user: String,
        status: u16,
        body: String,
    },

    #[snafu(display("vCenter login response has no '{}' header", header))]
    MissingSessionId { header: String },

    #[snafu(display("vCenter service content has no session manager"))]
    MissingSessionManager,

    #[snafu(display("Unable to log out of vCenter: {}", source))]
    Logout { source: reqwest::Error },

    #[snafu(display("vSphere request '{}' failed: {}", path, source))]
    VimRequest { path: String, source: reqwest::Error },

    #[snafu(display("vSphere request '{}' returned status {}: {}", path, status, body))]
    VimResponse {
        path: String,
        status: u16,
        body: String,
    },

    #[snafu(display("Unable to decode vSphere response for '{}': {}", path, source))]
    VimDecode { path: String, source: reqwest::Error },

    #[snafu(display("Virtual machine '{}' has no {}", vm, field))]
    IncompleteVm { vm: String, field: String },

    #[snafu(display("The job input names no '{}' secret", secret_type))]
    MissingSecret { secret_type: String },

    #[snafu(display("Unable to read '{}' credentials: {}", secret_type, source))]
    Credentials {
        secret_type: String,
        source: agent_common::secrets::Error,
    },

    #[snafu(display("Invalid configuration: {}", reason))]
    InvalidConfig { reason: String },

    #[snafu(display("Inventory store request '{}' failed: {}", what, source))]
    StoreRequest { what: String, source: reqwest::Error },

    #[snafu(display("Inventory store request '{}' returned status {}: {}", what, status, body))]
    StoreResponse {
        what: String,
        status: u16,
        body: String,
    },

    #[snafu(display("Unable to decode inventory store response for '{}': {}", what, source))]
    StoreDecode { what: String, source: reqwest::Error },

    #[snafu(display(
        "A virtual machine named '{}' already exists in the inventory store; discovery can only \
         run once per environment",
        name
    ))]
    DuplicateName { name: String },

    #[snafu(display("Destination cluster '{}' does not exist", name))]
    ClusterNotFound { name: String },

    #[snafu(display("Destination cluster name '{}' matches {} clusters", name, count))]
    ClusterAmbiguous { name: String, count: usize },

    #[snafu(display(
        "Destination cluster '{}' has type '{}', expected '{}'",
        name,
        actual,
        expected
    ))]
    ClusterTypeMismatch {
        name: String,
        expected: String,
        actual: String,
    },

    #[snafu(display("Unable to serialize run report: {}", source))]
    ReportSerialize { source: serde_json::Error },

    #[snafu(display("Unable to write run report '{}': {}", path.display(), source))]
    ReportWrite {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
