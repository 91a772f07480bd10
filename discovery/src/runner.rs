/*!

The [`Runner`] of the `vm-discovery-agent`: connects to vCenter, resolves the destination cluster
in NetBox, then walks the inventory and creates what it finds.

!*/

use crate::config::DiscoveryConfig;
use crate::constants::REPORT_FILE;
use crate::credentials::{netbox_token, vcenter_credentials};
use crate::error::{Error, ReportSerializeSnafu, ReportWriteSnafu, Result};
use crate::netbox::NetboxClient;
use crate::reconciler::Reconciler;
use crate::report::{RunReport, Totals};
use crate::source::InventorySource;
use crate::store::InventoryStore;
use crate::sync::sync_inventory;
use crate::vcenter::VcenterSession;
use async_trait::async_trait;
use job_agent::{JobInfo, JobResults, Journal, Outcome, Runner};
use log::{debug, error, info};
use serde::Serialize;
use snafu::ResultExt;
use std::fs;
use std::path::Path;

const CONNECTION_FAILED: &str = "Couldn't connect to vCenter with the given credentials.";
const CONNECTED: &str = "Connected to vCenter!";

/// Written to `results/report.json` at the end of every run that got past connecting.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportFile<'a> {
    summary: &'a str,
    totals: Totals,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub struct DiscoveryRunner {
    info: JobInfo<DiscoveryConfig>,
    session: Option<VcenterSession>,
}

#[async_trait]
impl Runner for DiscoveryRunner {
    type C = DiscoveryConfig;
    type E = Error;

    async fn new(info: JobInfo<Self::C>) -> Result<Self> {
        info.configuration.validate()?;
        Ok(Self {
            info,
            session: None,
        })
    }

    async fn run<J>(&mut self, journal: &J) -> Result<JobResults>
    where
        J: Journal,
    {
        let mut report = RunReport::new(journal);
        let credentials = match vcenter_credentials(&self.info) {
            Ok(credentials) => credentials,
            Err(e) => return Err(stopped(&report, e).await),
        };
        let token = match netbox_token(&self.info) {
            Ok(token) => token,
            Err(e) => return Err(stopped(&report, e).await),
        };

        let config = &self.info.configuration;
        let session = match VcenterSession::connect(&config.vcenter_endpoint(), &credentials).await
        {
            Ok(session) => self.session.insert(session),
            Err(e) => {
                report.failure(CONNECTION_FAILED).await;
                return Err(e);
            }
        };
        report.success(CONNECTED).await;

        let store = match NetboxClient::new(&config.netbox_url, &token, config.netbox_insecure) {
            Ok(store) => store,
            Err(e) => return Err(stopped(&report, e).await),
        };
        discover(config, &*session, &store, &self.info.results_dir, &mut report).await
    }

    async fn terminate(&mut self) -> Result<()> {
        if let Some(session) = self.session.take() {
            session.logout().await?;
        }
        Ok(())
    }
}

/// Everything a run does once the vCenter session is open. Resolves the destination cluster and
/// syncs `source` into `store`. The summary line is journaled and `report.json` is written to
/// `results_dir` whether or not the sync got to the end. When the sync failed, its error is the one
/// returned, even if the report could not be written.
pub async fn discover<S, T, J>(
    config: &DiscoveryConfig,
    source: &S,
    store: &T,
    results_dir: &Path,
    report: &mut RunReport<'_, J>,
) -> Result<JobResults>
where
    S: InventorySource,
    T: InventoryStore,
    J: Journal,
{
    let outcome = match sync_to_store(config, source, store, report).await {
        Ok(()) => Ok(()),
        Err(e) => Err(stopped(report, e).await),
    };

    let summary = report.summary();
    report.info(summary.clone()).await;
    let written = write_report(results_dir, report.totals(), outcome.as_ref().err());
    if let Err(e) = outcome {
        if let Err(write_error) = written {
            error!("{}", write_error);
        }
        return Err(e);
    }
    written?;

    let details = match serde_json::to_value(report.totals()).context(ReportSerializeSnafu)? {
        serde_json::Value::Object(map) => map,
        _ => Default::default(),
    };
    Ok(JobResults {
        outcome: Outcome::Pass,
        summary: Some(summary),
        details,
    })
}

async fn sync_to_store<S, T, J>(
    config: &DiscoveryConfig,
    source: &S,
    store: &T,
    report: &mut RunReport<'_, J>,
) -> Result<()>
where
    S: InventorySource,
    T: InventoryStore,
    J: Journal,
{
    let reconciler = Reconciler::resolve(store, &config.cluster, config.cluster_type()).await?;
    info!(
        "Discovered VMs will be created in cluster '{}' ({})",
        reconciler.cluster().name,
        reconciler.cluster().id
    );
    sync_inventory(source, &reconciler, config.walk_scope(), report).await
}

fn write_report(results_dir: &Path, totals: Totals, error: Option<&Error>) -> Result<()> {
    let summary = totals.to_string();
    let report = ReportFile {
        summary: &summary,
        totals,
        error: error.map(ToString::to_string),
    };
    let json = serde_json::to_string_pretty(&report).context(ReportSerializeSnafu)?;
    let path = results_dir.join(REPORT_FILE);
    fs::write(&path, json).context(ReportWriteSnafu { path: &path })?;
    debug!("Wrote run report to '{}'", path.display());
    Ok(())
}

/// Reports a fatal error to the operator and hands it back.
async fn stopped<J: Journal>(report: &RunReport<'_, J>, error: Error) -> Error {
    report.failure(format!("Discovery stopped: {}", error)).await;
    error
}
