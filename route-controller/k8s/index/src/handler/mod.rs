mod pod;
mod workload;

pub use self::pod::PodUpdateHandler;
pub(crate) use self::workload::emit_for_pod;
pub use self::workload::{WorkloadDeleteHandler, WorkloadUpdateHandler};

use crate::{PodUpdate, WorkloadEvent};
use route_sync_controller_core::Emit;
use route_sync_controller_k8s_api::{PodLister, WorkloadGetter};
use tokio::sync::mpsc::UnboundedReceiver;

/// Drains the pod watch queue, invoking the handler for each event.
///
/// Events are processed serially within the kind; a slow collaborator call
/// throttles subsequent pod events by design.
pub async fn process_pod_updates<W, E>(
    handler: PodUpdateHandler<W, E>,
    mut events: UnboundedReceiver<PodUpdate>,
) where
    W: WorkloadGetter,
    E: Emit,
{
    while let Some(update) = events.recv().await {
        handler.handle(update).await;
    }
    tracing::debug!("Pod watch closed");
}

/// Drains the workload watch queue, routing each event variant to its
/// handler.
pub async fn process_workload_events<P, E>(
    updates: WorkloadUpdateHandler<P, E>,
    deletes: WorkloadDeleteHandler<P, E>,
    mut events: UnboundedReceiver<WorkloadEvent>,
) where
    P: PodLister,
    E: Emit,
{
    while let Some(event) = events.recv().await {
        match event {
            WorkloadEvent::Updated { old, new } => updates.handle(old, new).await,
            WorkloadEvent::Deleted { workload } => deletes.handle(workload).await,
        }
    }
    tracing::debug!("Workload watch closed");
}
