use crate::{Instance, RouteSet};
use serde::Serialize;
use std::collections::HashMap;

/// The per-port registration delta carried by a [`Message`].
///
/// Hostname order within each list is insertion order, not a sorted
/// contract; consumers must treat the lists as sets.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Routes {
    pub registered: Vec<String>,
    pub unregistered: Vec<String>,
}

impl Routes {
    pub fn is_empty(&self) -> bool {
        self.registered.is_empty() && self.unregistered.is_empty()
    }
}

/// One wire event: one application instance, one port.
///
/// Messages are transient. They are constructed per diff invocation, handed
/// to the emitter, and never persisted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Message {
    pub name: String,
    pub instance_id: String,
    pub address: String,
    pub port: u16,
    pub tls_port: u16,
    #[serde(flatten)]
    pub routes: Routes,
}

/// Registration deltas accumulated per port across a complete diff.
pub type PortGroup = HashMap<u16, Routes>;

/// Merges added and removed route sets into one delta per port.
///
/// Must be invoked once per complete diff: routes sharing a port always
/// collapse into a single grouped entry, so one message per instance-port
/// pair is emitted downstream.
pub fn group_routes_by_port(to_add: &RouteSet, to_remove: &RouteSet) -> PortGroup {
    let mut group = PortGroup::default();
    for route in to_add {
        group
            .entry(route.port)
            .or_default()
            .registered
            .push(route.hostname.clone());
    }
    for route in to_remove {
        group
            .entry(route.port)
            .or_default()
            .unregistered
            .push(route.hostname.clone());
    }
    group
}

/// Expands a port group into wire messages for one instance.
pub fn messages_for_instance(instance: &Instance, group: &PortGroup) -> Vec<Message> {
    group
        .iter()
        .filter(|(_, routes)| !routes.is_empty())
        .map(|(port, routes)| Message {
            name: instance.name.clone(),
            instance_id: instance.instance_id.clone(),
            address: instance.address.clone(),
            port: *port,
            tls_port: instance.tls_port,
            routes: routes.clone(),
        })
        .collect()
}
