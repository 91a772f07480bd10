/*!

Runs a small [`Runner`] against a real job directory with the [`DefaultClient`] and checks what the
framework can read back afterwards.

!*/

use async_trait::async_trait;
use discovery_model::{JobSpec, TaskState};
use job_agent::{
    BootstrapData, Configuration, DefaultClient, JobAgent, JobDirectory, JobInfo, JobResults,
    Journal, Outcome, Runner, Severity,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CounterConfig {
    count_to: u32,
    fail: bool,
}

impl Configuration for CounterConfig {}

struct Counter {
    info: JobInfo<CounterConfig>,
}

#[async_trait]
impl Runner for Counter {
    type C = CounterConfig;
    type E = String;

    async fn new(info: JobInfo<Self::C>) -> Result<Self, Self::E> {
        Ok(Self { info })
    }

    async fn run<J>(&mut self, journal: &J) -> Result<JobResults, Self::E>
    where
        J: Journal,
    {
        for i in 1..=self.info.configuration.count_to {
            journal.info(format!("Counted {}", i)).await;
        }
        if self.info.configuration.fail {
            return Err("lost count".into());
        }
        fs::write(self.info.results_dir.join("count.txt"), "done").map_err(|e| e.to_string())?;
        Ok(JobResults {
            outcome: Outcome::Pass,
            summary: Some(format!("Counted to {}.", self.info.configuration.count_to)),
            ..JobResults::default()
        })
    }

    async fn terminate(&mut self) -> Result<(), Self::E> {
        Ok(())
    }
}

fn job_dir(config: CounterConfig) -> (tempfile::TempDir, JobDirectory) {
    let dir = tempfile::TempDir::new().unwrap();
    let job_dir = JobDirectory::new(dir.path());
    job_dir.create().unwrap();
    JobSpec::new(config, BTreeMap::new())
        .unwrap()
        .write(&job_dir.input_file())
        .unwrap();
    (dir, job_dir)
}

#[tokio::test]
async fn completed_job_is_persisted() {
    let (_dir, job_dir) = job_dir(CounterConfig {
        count_to: 2,
        fail: false,
    });
    let mut agent = JobAgent::<DefaultClient, Counter>::new(BootstrapData {
        job_name: "count".into(),
        job_dir: job_dir.path().to_path_buf(),
    })
    .await
    .unwrap();
    agent.run().await.unwrap();

    let status = job_dir.read_status().unwrap();
    assert_eq!(status.state, TaskState::Completed);
    assert_eq!(
        status.results.unwrap().summary.as_deref(),
        Some("Counted to 2.")
    );
    let journal = job_dir.read_journal().unwrap();
    assert_eq!(journal.len(), 2);
    assert_eq!(journal[1].message, "Counted 2");
    assert_eq!(journal[1].level, Severity::Info);
    assert!(job_dir.results_file().is_file());
}

#[tokio::test]
async fn failed_job_records_the_error() {
    let (_dir, job_dir) = job_dir(CounterConfig {
        count_to: 1,
        fail: true,
    });
    let mut agent = JobAgent::<DefaultClient, Counter>::new(BootstrapData {
        job_name: "count".into(),
        job_dir: job_dir.path().to_path_buf(),
    })
    .await
    .unwrap();
    assert!(agent.run().await.is_err());

    let status = job_dir.read_status().unwrap();
    assert_eq!(status.state, TaskState::Error);
    assert!(status.error_message.unwrap().contains("lost count"));
    assert!(status.results.is_none());
    assert_eq!(job_dir.read_journal().unwrap().len(), 1);
}

#[tokio::test]
async fn missing_job_directory_is_an_error() {
    let result = JobAgent::<DefaultClient, Counter>::new(BootstrapData {
        job_name: "count".into(),
        job_dir: "/definitely/not/a/job/dir".into(),
    })
    .await;
    assert!(result.is_err());
}
