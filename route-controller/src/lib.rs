#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

//! Keeps an external routing registry consistent with the routes annotated
//! on workload objects and the readiness of their child pods.

pub use route_sync_controller_core as core;
pub use route_sync_controller_emit as emit;
pub use route_sync_controller_k8s_api as k8s;
pub use route_sync_controller_k8s_index as index;

mod args;

pub use self::args::Args;
