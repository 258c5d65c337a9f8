use crate::{PodSnapshot, WorkloadSnapshot};

/// A pod's before/after state, as observed by the pod watch.
///
/// `old` is `None` the first time a pod is seen. A watch-observed deletion is
/// delivered as a terminal update whose `new` snapshot has `deleted` set.
#[derive(Clone, Debug)]
pub struct PodUpdate {
    pub old: Option<PodSnapshot>,
    pub new: PodSnapshot,
}

/// Workload-object events, as observed by the workload watch.
#[derive(Clone, Debug)]
pub enum WorkloadEvent {
    Updated {
        old: Option<WorkloadSnapshot>,
        new: WorkloadSnapshot,
    },
    Deleted {
        workload: WorkloadSnapshot,
    },
}
