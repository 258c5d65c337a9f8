#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

//! Cluster API types and clients consumed by the route-sync engine.

mod clients;
mod workload;

pub use self::clients::{ClusterClient, PodLister, WorkloadGetter, WorkloadLister};
pub use self::workload::{
    marked_for_deletion, owner_workload, pod_ip, pod_ready, routes_annotation, selector_string,
    tls_port, ROUTES_ANNOTATION, TLS_PORT_ANNOTATION, WORKLOAD_KIND,
};
pub use k8s_openapi::api::{
    apps::v1::StatefulSet,
    core::v1::{Pod, PodSpec, PodStatus},
};
pub use kube::{
    api::{Api, ListParams, ObjectMeta, ResourceExt},
    Client,
};

/// The per-application workload object carrying the desired-routes
/// annotation and owning the application's pods.
pub type Workload = StatefulSet;
