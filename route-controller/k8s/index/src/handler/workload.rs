use crate::WorkloadSnapshot;
use route_sync_controller_core::{
    decode_routes, group_routes_by_port, messages_for_instance, Emit, Instance, PortGroup,
    RouteSet,
};
use route_sync_controller_k8s_api::{
    marked_for_deletion, pod_ip, pod_ready, Pod, PodLister, ResourceExt,
};

/// Reacts to annotation changes on a workload object.
///
/// Every still-ready child pod is told to re-assert all currently-desired
/// routes as registered and only the truly removed ones as unregistered, so
/// each emitted message is idempotent and safe to replay.
pub struct WorkloadUpdateHandler<P, E> {
    pods: P,
    emitter: E,
}

/// Reacts to workload deletion by unregistering every route for every child
/// pod.
pub struct WorkloadDeleteHandler<P, E> {
    pods: P,
    emitter: E,
}

impl<P, E> WorkloadUpdateHandler<P, E>
where
    P: PodLister,
    E: Emit,
{
    pub fn new(pods: P, emitter: E) -> Self {
        Self { pods, emitter }
    }

    pub async fn handle(&self, old: Option<WorkloadSnapshot>, new: WorkloadSnapshot) {
        // Unrelated spec edits do not change the annotation map; stay silent.
        if let Some(old) = &old {
            if old.annotations == new.annotations {
                return;
            }
        }

        let old_routes = match decode_routes(old.as_ref().and_then(WorkloadSnapshot::routes)) {
            Ok(routes) => routes,
            Err(error) => {
                tracing::warn!(ns = %new.namespace, workload = %new.name, %error, "Ignoring malformed route annotation");
                return;
            }
        };
        let new_routes = match decode_routes(new.routes()) {
            Ok(routes) => routes,
            Err(error) => {
                tracing::warn!(ns = %new.namespace, workload = %new.name, %error, "Ignoring malformed route annotation");
                return;
            }
        };

        let removed = old_routes
            .difference(&new_routes)
            .cloned()
            .collect::<RouteSet>();
        let group = group_routes_by_port(&new_routes, &removed);
        if group.is_empty() {
            return;
        }

        emit_for_children(&self.pods, &self.emitter, &new, &group, true).await;
    }
}

impl<P, E> WorkloadDeleteHandler<P, E>
where
    P: PodLister,
    E: Emit,
{
    pub fn new(pods: P, emitter: E) -> Self {
        Self { pods, emitter }
    }

    pub async fn handle(&self, workload: WorkloadSnapshot) {
        let routes = match decode_routes(workload.routes()) {
            Ok(routes) => routes,
            Err(error) => {
                tracing::warn!(ns = %workload.namespace, workload = %workload.name, %error, "Ignoring malformed route annotation");
                return;
            }
        };
        if routes.is_empty() {
            return;
        }

        let group = group_routes_by_port(&RouteSet::default(), &routes);
        emit_for_children(&self.pods, &self.emitter, &workload, &group, false).await;
    }
}

/// Fans a port group out to the workload's child pods.
///
/// A failure to list child pods aborts the whole batch: registering a subset
/// of instances as if it were the whole state would corrupt the registry.
/// Per-pod failures are logged and skipped.
async fn emit_for_children<P, E>(
    pods: &P,
    emitter: &E,
    workload: &WorkloadSnapshot,
    group: &PortGroup,
    only_ready: bool,
) where
    P: PodLister,
    E: Emit,
{
    let selector = match workload.selector.as_deref() {
        Some(selector) => selector,
        None => {
            tracing::warn!(ns = %workload.namespace, workload = %workload.name, "Workload has no pod selector");
            return;
        }
    };

    let children = match pods.list(&workload.namespace, selector).await {
        Ok(children) => children,
        Err(error) => {
            tracing::warn!(
                ns = %workload.namespace,
                workload = %workload.name,
                %error,
                "Failed to list child pods; aborting route update",
            );
            return;
        }
    };

    for pod in &children {
        if marked_for_deletion(&pod.metadata) {
            continue;
        }
        if only_ready && !pod_ready(pod) {
            continue;
        }
        emit_for_pod(emitter, &workload.name, workload.tls_port, pod, group);
    }
}

/// Emits one message per port for a single pod; failures touch only this pod.
pub(crate) fn emit_for_pod<E: Emit>(
    emitter: &E,
    workload_name: &str,
    tls_port: u16,
    pod: &Pod,
    group: &PortGroup,
) {
    let name = pod.name_unchecked();
    let instance = match Instance::new(workload_name, &name, pod_ip(pod), tls_port) {
        Ok(instance) => instance,
        Err(error) => {
            tracing::warn!(pod = %name, %error, "Skipping route messages for pod");
            return;
        }
    };

    for message in messages_for_instance(&instance, group) {
        if let Err(error) = emitter.emit(message) {
            tracing::warn!(pod = %name, %error, "Failed to queue route message");
        }
    }
}
