use crate::{routes_annotation, Api, Client, ListParams, Pod, Workload};
use anyhow::Result;

/// Resolves a pod's owning workload object.
#[async_trait::async_trait]
pub trait WorkloadGetter: Clone + Send + Sync + 'static {
    async fn get(&self, namespace: &str, name: &str) -> Result<Workload>;
}

/// Enumerates a workload's child pods via its pod-template selector.
#[async_trait::async_trait]
pub trait PodLister: Clone + Send + Sync + 'static {
    async fn list(&self, namespace: &str, selector: &str) -> Result<Vec<Pod>>;
}

/// Enumerates every workload carrying a route annotation, for resync.
#[async_trait::async_trait]
pub trait WorkloadLister: Clone + Send + Sync + 'static {
    async fn list(&self) -> Result<Vec<Workload>>;
}

/// Kube-backed implementation of the collaborator contracts.
#[derive(Clone)]
pub struct ClusterClient {
    client: Client,
}

impl ClusterClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl WorkloadGetter for ClusterClient {
    async fn get(&self, namespace: &str, name: &str) -> Result<Workload> {
        let api = Api::<Workload>::namespaced(self.client.clone(), namespace);
        Ok(api.get(name).await?)
    }
}

#[async_trait::async_trait]
impl PodLister for ClusterClient {
    async fn list(&self, namespace: &str, selector: &str) -> Result<Vec<Pod>> {
        let api = Api::<Pod>::namespaced(self.client.clone(), namespace);
        let pods = api.list(&ListParams::default().labels(selector)).await?;
        Ok(pods.items)
    }
}

#[async_trait::async_trait]
impl WorkloadLister for ClusterClient {
    async fn list(&self) -> Result<Vec<Workload>> {
        let api = Api::<Workload>::all(self.client.clone());
        let workloads = api.list(&ListParams::default()).await?;
        Ok(workloads
            .items
            .into_iter()
            .filter(|workload| routes_annotation(&workload.metadata).is_some())
            .collect())
    }
}
