use crate::WorkloadEvent;
use ahash::AHashMap as HashMap;
use parking_lot::RwLock;
use route_sync_controller_k8s_api::{self as k8s, ResourceExt};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

pub type SharedWorkloadIndex = Arc<RwLock<WorkloadIndex>>;

/// Watch-layer cache of workload objects.
///
/// The cached snapshot is what lets a deletion event carry the deleted
/// object's annotation: the watch only reports namespace and name.
#[derive(Debug)]
pub struct WorkloadIndex {
    workloads: HashMap<(String, String), WorkloadSnapshot>,
    events: UnboundedSender<WorkloadEvent>,
}

/// The fields of a workload object that the route sync engine reacts to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkloadSnapshot {
    pub namespace: String,
    pub name: String,
    /// The full annotation map; updates whose maps are identical are no-ops.
    pub annotations: BTreeMap<String, String>,
    /// Label selector string copied from the pod-template selector.
    pub selector: Option<String>,
    pub tls_port: u16,
}

// === impl WorkloadSnapshot ===

impl WorkloadSnapshot {
    pub fn from_workload(workload: &k8s::Workload) -> Self {
        Self {
            namespace: workload.namespace().unwrap_or_default(),
            name: workload.name_unchecked(),
            annotations: workload.metadata.annotations.clone().unwrap_or_default(),
            selector: k8s::selector_string(workload),
            tls_port: k8s::tls_port(&workload.metadata),
        }
    }

    /// The raw route annotation, re-read on every handler invocation.
    pub fn routes(&self) -> Option<&str> {
        self.annotations
            .get(k8s::ROUTES_ANNOTATION)
            .map(String::as_str)
    }
}

// === impl WorkloadIndex ===

impl WorkloadIndex {
    pub fn shared(events: UnboundedSender<WorkloadEvent>) -> SharedWorkloadIndex {
        Arc::new(RwLock::new(Self {
            workloads: HashMap::default(),
            events,
        }))
    }

    fn send(&self, event: WorkloadEvent) {
        if self.events.send(event).is_err() {
            tracing::error!("Workload event worker has shut down");
        }
    }
}

impl kubert::index::IndexNamespacedResource<k8s::Workload> for WorkloadIndex {
    fn apply(&mut self, workload: k8s::Workload) {
        let new = WorkloadSnapshot::from_workload(&workload);
        let key = (new.namespace.clone(), new.name.clone());
        let old = self.workloads.insert(key, new.clone());

        // Status-only updates change nothing the handlers care about.
        if old.as_ref() == Some(&new) {
            return;
        }
        self.send(WorkloadEvent::Updated { old, new });
    }

    fn delete(&mut self, namespace: String, name: String) {
        match self.workloads.remove(&(namespace.clone(), name.clone())) {
            Some(workload) => self.send(WorkloadEvent::Deleted { workload }),
            None => {
                // Without a cached snapshot there is no annotation to diff
                // against; any stale registrations age out via the registry.
                tracing::debug!(ns = %namespace, %name, "Unknown workload deleted");
            }
        }
    }
}
