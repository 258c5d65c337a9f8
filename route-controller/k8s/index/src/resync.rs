use crate::handler::emit_for_pod;
use route_sync_controller_core::{decode_routes, group_routes_by_port, Emit, RouteSet};
use route_sync_controller_k8s_api::{
    self as k8s, marked_for_deletion, pod_ready, routes_annotation, selector_string, tls_port,
    PodLister, ResourceExt, WorkloadLister,
};
use tokio::time::{self, Duration, MissedTickBehavior};

/// Periodic full re-emission of desired state.
///
/// The diff handlers are purely edge-triggered: a dropped watch event, a
/// process restart, or a lost transport delivery would leave the registry
/// stale indefinitely. Re-registering every ready instance's routes on a
/// fixed interval bounds that staleness to one interval.
///
/// Resync only re-registers. Unregistration relies on the delete handlers
/// observing at least one event; that reliance is a hard requirement on
/// watch delivery.
pub struct Resync<L, P, E> {
    workloads: L,
    pods: P,
    emitter: E,
    period: Duration,
}

impl<L, P, E> Resync<L, P, E>
where
    L: WorkloadLister,
    P: PodLister,
    E: Emit,
{
    pub fn new(workloads: L, pods: P, emitter: E, period: Duration) -> Self {
        Self {
            workloads,
            pods,
            emitter,
            period,
        }
    }

    pub async fn run(self) {
        let mut interval = time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            self.resync_once().await;
        }
    }

    /// Walks every annotated workload and re-emits register messages for all
    /// of its ready child pods. Bypasses the diff handlers entirely.
    pub async fn resync_once(&self) {
        let workloads = match self.workloads.list().await {
            Ok(workloads) => workloads,
            Err(error) => {
                tracing::warn!(%error, "Failed to list workloads for resync");
                return;
            }
        };

        for workload in &workloads {
            self.resync_workload(workload).await;
        }
    }

    async fn resync_workload(&self, workload: &k8s::Workload) {
        let namespace = match workload.namespace() {
            Some(namespace) => namespace,
            None => return,
        };
        let name = workload.name_unchecked();

        let routes = match decode_routes(routes_annotation(&workload.metadata)) {
            Ok(routes) => routes,
            Err(error) => {
                tracing::warn!(ns = %namespace, workload = %name, %error, "Skipping workload with malformed route annotation");
                return;
            }
        };
        if routes.is_empty() {
            return;
        }
        let group = group_routes_by_port(&routes, &RouteSet::default());

        let selector = match selector_string(workload) {
            Some(selector) => selector,
            None => {
                tracing::warn!(ns = %namespace, workload = %name, "Workload has no pod selector");
                return;
            }
        };
        let children = match self.pods.list(&namespace, &selector).await {
            Ok(children) => children,
            Err(error) => {
                tracing::warn!(ns = %namespace, workload = %name, %error, "Failed to list child pods for resync");
                return;
            }
        };

        let tls_port = tls_port(&workload.metadata);
        for pod in &children {
            if marked_for_deletion(&pod.metadata) || !pod_ready(pod) {
                continue;
            }
            emit_for_pod(&self.emitter, &name, tls_port, pod, &group);
        }
    }
}
