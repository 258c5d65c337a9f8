#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

//! Watch adapters and diff handlers for the route synchronization engine.
//!
//! The indices in this crate are the only caching layer in the system: they
//! hold the last-seen snapshot of each watched object so that edge-triggered
//! watch events can be turned into before/after diffs. Desired route state is
//! never memoized; handlers re-read it from the workload object on every
//! invocation.

mod event;
mod handler;
mod pod;
mod resync;
mod workload;


pub use self::event::{PodUpdate, WorkloadEvent};
pub use self::handler::{
    process_pod_updates, process_workload_events, PodUpdateHandler, WorkloadDeleteHandler,
    WorkloadUpdateHandler,
};
pub use self::pod::{PodIndex, PodSnapshot, SharedPodIndex};
pub use self::resync::Resync;
pub use self::workload::{SharedWorkloadIndex, WorkloadIndex, WorkloadSnapshot};
