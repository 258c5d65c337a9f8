use crate::PodUpdate;
use ahash::AHashMap as HashMap;
use parking_lot::RwLock;
use route_sync_controller_k8s_api::{self as k8s, ResourceExt};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

pub type SharedPodIndex = Arc<RwLock<PodIndex>>;

/// Watch-layer cache of pod state.
///
/// Forwards before/after diffs to the pod event worker; holds no route state.
#[derive(Debug)]
pub struct PodIndex {
    pods: HashMap<(String, String), PodSnapshot>,
    events: UnboundedSender<PodUpdate>,
}

/// The fields of a pod that the route sync engine reacts to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PodSnapshot {
    pub namespace: String,
    pub name: String,
    /// Name of the owning workload object, if the pod has one.
    pub owner: Option<String>,
    pub address: Option<String>,
    pub ready: bool,
    pub deleted: bool,
}

// === impl PodSnapshot ===

impl PodSnapshot {
    pub fn from_pod(pod: &k8s::Pod) -> Self {
        Self {
            namespace: pod.namespace().unwrap_or_default(),
            name: pod.name_unchecked(),
            owner: k8s::owner_workload(pod),
            address: k8s::pod_ip(pod).map(ToString::to_string),
            ready: k8s::pod_ready(pod),
            deleted: k8s::marked_for_deletion(&pod.metadata),
        }
    }
}

// === impl PodIndex ===

impl PodIndex {
    pub fn shared(events: UnboundedSender<PodUpdate>) -> SharedPodIndex {
        Arc::new(RwLock::new(Self {
            pods: HashMap::default(),
            events,
        }))
    }

    fn send(&self, update: PodUpdate) {
        if self.events.send(update).is_err() {
            tracing::error!("Pod event worker has shut down");
        }
    }
}

impl kubert::index::IndexNamespacedResource<k8s::Pod> for PodIndex {
    fn apply(&mut self, pod: k8s::Pod) {
        let new = PodSnapshot::from_pod(&pod);
        let key = (new.namespace.clone(), new.name.clone());
        let old = self.pods.insert(key, new.clone());

        // Pods churn status frequently; only forward updates that change
        // something the handlers react to.
        if old.as_ref() == Some(&new) {
            return;
        }
        self.send(PodUpdate { old, new });
    }

    fn delete(&mut self, namespace: String, name: String) {
        if let Some(last) = self.pods.remove(&(namespace, name)) {
            let mut terminal = last.clone();
            terminal.deleted = true;
            self.send(PodUpdate {
                old: Some(last),
                new: terminal,
            });
        }
    }

    // The default `reset` replays a full re-list through apply/delete, so a
    // missed pod deletion surfaces here as a terminal update.
}
