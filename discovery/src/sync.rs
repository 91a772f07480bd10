use crate::error::Result;
use crate::reconciler::Reconciler;
use crate::report::RunReport;
use crate::source::InventorySource;
use crate::store::InventoryStore;
use crate::walker::{WalkEvent, WalkScope, Walker};
use job_agent::Journal;
use log::debug;

/// Walks `source` and reconciles every VM it yields into the reconciler's store, reporting
/// progress as it goes. Stops at the first error; the report keeps the totals reached so far.
pub async fn sync_inventory<S, T, J>(
    source: &S,
    reconciler: &Reconciler<'_, T>,
    scope: WalkScope,
    report: &mut RunReport<'_, J>,
) -> Result<()>
where
    S: InventorySource,
    T: InventoryStore,
    J: Journal,
{
    let mut walker = Walker::new(source, scope);
    while let Some(event) = walker.next_event().await? {
        match event {
            WalkEvent::Datacenter(datacenter) => {
                debug!("Found Datacenter: {}", datacenter.name)
            }
            WalkEvent::Cluster(cluster) => {
                report.info(format!("Found Cluster: {}", cluster.name)).await
            }
            WalkEvent::ClusterSkipped(cluster) => {
                report
                    .info(format!("Skipping Cluster: {}", cluster.name))
                    .await
            }
            WalkEvent::Host(host) => report.info(format!("Found Host: {}", host.name)).await,
            WalkEvent::VirtualMachine(vm) => {
                reconciler.reconcile(&vm, report).await?;
            }
        }
    }
    Ok(())
}
