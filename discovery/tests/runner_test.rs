/*!

Drives the [`DiscoveryRunner`] through the [`JobAgent`] with a real job directory. No vCenter is
reachable, so these cover everything that happens before and at the connection.

!*/

use discovery_model::{JobSpec, SecretName, Severity, TaskState};
use job_agent::{BootstrapData, DefaultClient, JobAgent, JobDirectory};
use std::collections::BTreeMap;
use vm_discovery::constants::{
    NETBOX_CREDENTIALS_SECRET_TYPE, PASSWORD_KEY, REPORT_FILE, TOKEN_KEY, USERNAME_KEY,
    VCENTER_CREDENTIALS_SECRET_TYPE,
};
use vm_discovery::{DiscoveryConfig, DiscoveryRunner};

fn config() -> DiscoveryConfig {
    DiscoveryConfig {
        vcenter_host: "127.0.0.1".into(),
        // Nothing listens here, so the connection is refused at once.
        vcenter_port: Some(1),
        cluster: "prod".into(),
        netbox_url: "http://127.0.0.1:1".into(),
        ..Default::default()
    }
}

fn job_dir(config: DiscoveryConfig, with_netbox_secret: bool) -> (tempfile::TempDir, JobDirectory) {
    let dir = tempfile::TempDir::new().unwrap();
    let job_dir = JobDirectory::new(dir.path());
    job_dir.create().unwrap();

    let reader = job_dir.secrets_reader();
    let vcenter = SecretName::new("vcenter-creds").unwrap();
    reader
        .write_secret(
            &vcenter,
            [
                (USERNAME_KEY, b"administrator@vsphere.local".as_ref()),
                (PASSWORD_KEY, b"wrong".as_ref()),
            ],
        )
        .unwrap();
    let mut secrets = BTreeMap::from([(VCENTER_CREDENTIALS_SECRET_TYPE.to_string(), vcenter)]);
    if with_netbox_secret {
        let netbox = SecretName::new("netbox-creds").unwrap();
        reader
            .write_secret(&netbox, [(TOKEN_KEY, b"0123456789abcdef".as_ref())])
            .unwrap();
        secrets.insert(NETBOX_CREDENTIALS_SECRET_TYPE.to_string(), netbox);
    }

    JobSpec::new(config, secrets)
        .unwrap()
        .write(&job_dir.input_file())
        .unwrap();
    (dir, job_dir)
}

fn bootstrap(job_dir: &JobDirectory) -> BootstrapData {
    BootstrapData {
        job_name: "discover".into(),
        job_dir: job_dir.path().to_path_buf(),
    }
}

#[tokio::test]
async fn unreachable_vcenter_fails_the_job() {
    let (_dir, job_dir) = job_dir(config(), true);
    let mut agent = JobAgent::<DefaultClient, DiscoveryRunner>::new(bootstrap(&job_dir))
        .await
        .unwrap();
    assert!(agent.run().await.is_err());

    let status = job_dir.read_status().unwrap();
    assert_eq!(status.state, TaskState::Error);
    assert!(status
        .error_message
        .unwrap()
        .contains("Unable to connect to vCenter '127.0.0.1'"));

    let journal = job_dir.read_journal().unwrap();
    let last = journal.last().unwrap();
    assert_eq!(last.level, Severity::Failure);
    assert_eq!(
        last.message,
        "Couldn't connect to vCenter with the given credentials."
    );
    assert!(!journal.iter().any(|entry| entry.level == Severity::Success));
    // Nothing was discovered, so there is no run report.
    assert!(!job_dir.results_directory().join(REPORT_FILE).exists());
    assert!(job_dir.results_file().is_file());
}

#[tokio::test]
async fn undeclared_netbox_secret_fails_before_connecting() {
    let (_dir, job_dir) = job_dir(config(), false);
    let mut agent = JobAgent::<DefaultClient, DiscoveryRunner>::new(bootstrap(&job_dir))
        .await
        .unwrap();
    assert!(agent.run().await.is_err());

    let status = job_dir.read_status().unwrap();
    assert_eq!(status.state, TaskState::Error);
    assert!(status
        .error_message
        .unwrap()
        .contains(NETBOX_CREDENTIALS_SECRET_TYPE));
    let journal = job_dir.read_journal().unwrap();
    assert_eq!(journal.len(), 1);
    assert_eq!(journal[0].level, Severity::Failure);
    assert!(journal[0].message.starts_with("Discovery stopped:"));
}

#[tokio::test]
async fn invalid_configuration_is_rejected() {
    let (_dir, job_dir) = job_dir(
        DiscoveryConfig {
            cluster: String::new(),
            ..config()
        },
        true,
    );
    let result = JobAgent::<DefaultClient, DiscoveryRunner>::new(bootstrap(&job_dir)).await;
    assert!(result.is_err());

    let status = job_dir.read_status().unwrap();
    assert_eq!(status.state, TaskState::Error);
    assert!(status.error_message.unwrap().contains("'cluster'"));
}
