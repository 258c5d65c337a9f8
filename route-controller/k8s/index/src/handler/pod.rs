use crate::{PodSnapshot, PodUpdate};
use route_sync_controller_core::{
    decode_routes, group_routes_by_port, messages_for_instance, Emit, Instance, RouteSet,
};
use route_sync_controller_k8s_api::{routes_annotation, tls_port, WorkloadGetter};

/// Reacts to one pod's before/after state, registering or unregistering all
/// of the pod's currently-desired routes.
///
/// A pod's registration is best-effort: every failure here is logged and
/// skipped, to be healed by a later event or the periodic resync.
pub struct PodUpdateHandler<W, E> {
    workloads: W,
    emitter: E,
}

/// What a readiness/deletion transition demands for the pod's routes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Action {
    RegisterAll,
    UnregisterAll,
}

fn transition(old: Option<&PodSnapshot>, new: &PodSnapshot) -> Option<Action> {
    // Deletion dominates readiness.
    if new.deleted {
        return Some(Action::UnregisterAll);
    }
    if new.ready {
        return Some(Action::RegisterAll);
    }
    let was_ready = old.map(|old| old.ready && !old.deleted).unwrap_or(false);
    if was_ready {
        return Some(Action::UnregisterAll);
    }
    None
}

impl<W, E> PodUpdateHandler<W, E>
where
    W: WorkloadGetter,
    E: Emit,
{
    pub fn new(workloads: W, emitter: E) -> Self {
        Self { workloads, emitter }
    }

    pub async fn handle(&self, PodUpdate { old, new: pod }: PodUpdate) {
        let action = match transition(old.as_ref(), &pod) {
            Some(action) => action,
            None => return,
        };

        let owner = match pod.owner.as_deref() {
            Some(owner) => owner,
            None => {
                tracing::debug!(
                    ns = %pod.namespace,
                    pod = %pod.name,
                    "Pod has no workload owner; skipping route sync",
                );
                return;
            }
        };

        let workload = match self.workloads.get(&pod.namespace, owner).await {
            Ok(workload) => workload,
            Err(error) => {
                tracing::warn!(
                    ns = %pod.namespace,
                    pod = %pod.name,
                    workload = %owner,
                    %error,
                    "Failed to resolve pod's workload owner",
                );
                return;
            }
        };

        // The workload annotation is the sole source of desired routes.
        let routes = match decode_routes(routes_annotation(&workload.metadata)) {
            Ok(routes) => routes,
            Err(error) => {
                tracing::warn!(ns = %pod.namespace, workload = %owner, %error, "Ignoring malformed route annotation");
                return;
            }
        };
        if routes.is_empty() {
            return;
        }

        let group = match action {
            Action::RegisterAll => group_routes_by_port(&routes, &RouteSet::default()),
            Action::UnregisterAll => group_routes_by_port(&RouteSet::default(), &routes),
        };

        let instance = match Instance::new(
            owner,
            &pod.name,
            pod.address.as_deref(),
            tls_port(&workload.metadata),
        ) {
            Ok(instance) => instance,
            Err(error) => {
                tracing::warn!(ns = %pod.namespace, pod = %pod.name, %error, "Skipping route messages for pod");
                return;
            }
        };

        for message in messages_for_instance(&instance, &group) {
            if let Err(error) = self.emitter.emit(message) {
                tracing::warn!(ns = %pod.namespace, pod = %pod.name, %error, "Failed to queue route message");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(ready: bool, deleted: bool) -> PodSnapshot {
        PodSnapshot {
            namespace: "ns".to_string(),
            name: "app-0".to_string(),
            owner: Some("app".to_string()),
            address: Some("10.0.0.1".to_string()),
            ready,
            deleted,
        }
    }

    #[test]
    fn deletion_always_unregisters() {
        for old in [None, Some(snapshot(false, false)), Some(snapshot(true, false))] {
            assert_eq!(
                transition(old.as_ref(), &snapshot(true, true)),
                Some(Action::UnregisterAll),
            );
            assert_eq!(
                transition(old.as_ref(), &snapshot(false, true)),
                Some(Action::UnregisterAll),
            );
        }
    }

    #[test]
    fn becoming_ready_registers() {
        assert_eq!(
            transition(None, &snapshot(true, false)),
            Some(Action::RegisterAll),
        );
        assert_eq!(
            transition(Some(&snapshot(false, false)), &snapshot(true, false)),
            Some(Action::RegisterAll),
        );
        // Re-asserting an already-ready pod is an idempotent upsert.
        assert_eq!(
            transition(Some(&snapshot(true, false)), &snapshot(true, false)),
            Some(Action::RegisterAll),
        );
    }

    #[test]
    fn losing_readiness_unregisters() {
        assert_eq!(
            transition(Some(&snapshot(true, false)), &snapshot(false, false)),
            Some(Action::UnregisterAll),
        );
    }

    #[test]
    fn never_ready_pods_are_ignored() {
        assert_eq!(transition(None, &snapshot(false, false)), None);
        assert_eq!(
            transition(Some(&snapshot(false, false)), &snapshot(false, false)),
            None,
        );
    }
}
