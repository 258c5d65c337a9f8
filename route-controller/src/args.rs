use crate::{emit, index, k8s};
use anyhow::{bail, Result};
use clap::Parser;
use kube::runtime::watcher;
use prometheus_client::registry::Registry;
use tokio::{sync::mpsc, time::Duration};
use tracing::{info_span, Instrument};

#[derive(Debug, Parser)]
#[clap(
    name = "route-sync",
    about = "Synchronizes workload route annotations to an external routing registry"
)]
pub struct Args {
    #[clap(long, default_value = "info", env = "ROUTE_SYNC_CONTROLLER_LOG")]
    log_level: kubert::LogFilter,

    #[clap(long, default_value = "plain")]
    log_format: kubert::LogFormat,

    #[clap(flatten)]
    client: kubert::ClientArgs,

    #[clap(flatten)]
    admin: kubert::AdminArgs,

    /// Address of the NATS server backing the routing registry.
    #[clap(
        long,
        default_value = "nats://127.0.0.1:4222",
        env = "ROUTE_SYNC_NATS_URL"
    )]
    nats_url: String,

    #[clap(long, default_value = "router.register")]
    register_subject: String,

    #[clap(long, default_value = "router.unregister")]
    unregister_subject: String,

    /// Interval between full desired-state re-emissions.
    ///
    /// Bounds how long a missed watch event or lost delivery can leave the
    /// registry stale.
    #[clap(long, default_value = "30")]
    resync_interval_secs: u64,

    /// Capacity of the outbound message buffer.
    #[clap(long, default_value = "1024")]
    emit_buffer_capacity: usize,

    /// Label selector restricting which pods are watched.
    #[clap(long)]
    pod_selector: Option<String>,
}

impl Args {
    #[inline]
    pub async fn parse_and_run() -> Result<()> {
        Self::parse().run().await
    }

    pub async fn run(self) -> Result<()> {
        let Self {
            admin,
            client,
            log_level,
            log_format,
            nats_url,
            register_subject,
            unregister_subject,
            resync_interval_secs,
            emit_buffer_capacity,
            pod_selector,
        } = self;

        let mut prom = <Registry>::default();
        let emit_metrics = emit::Metrics::register(prom.sub_registry_with_prefix("route_emitter"));
        let rt_metrics = kubert::RuntimeMetrics::register(prom.sub_registry_with_prefix("kube"));

        let mut runtime = kubert::Runtime::builder()
            .with_log(log_level, log_format)
            .with_metrics(rt_metrics)
            .with_admin(admin.into_builder().with_prometheus(prom))
            .with_client(client)
            .build()
            .await?;

        // Outbound path: bounded buffer drained by the dispatch worker.
        let publisher =
            emit::NatsPublisher::connect(&nats_url, register_subject, unregister_subject).await?;
        let (emitter, dispatch) = emit::channel(publisher, emit_buffer_capacity, emit_metrics);
        tokio::spawn(dispatch.run().instrument(info_span!("dispatch")));

        // One watch per kind; each index forwards diffs into its own queue.
        let (pod_tx, pod_rx) = mpsc::unbounded_channel();
        let pod_index = index::PodIndex::shared(pod_tx);
        let pod_config = match &pod_selector {
            Some(selector) => watcher::Config::default().labels(selector),
            None => watcher::Config::default(),
        };
        let pods = runtime.watch_all::<k8s::Pod>(pod_config);
        tokio::spawn(kubert::index::namespaced(pod_index, pods).instrument(info_span!("pods")));

        let (workload_tx, workload_rx) = mpsc::unbounded_channel();
        let workload_index = index::WorkloadIndex::shared(workload_tx);
        let workloads = runtime.watch_all::<k8s::Workload>(watcher::Config::default());
        tokio::spawn(
            kubert::index::namespaced(workload_index, workloads)
                .instrument(info_span!("workloads")),
        );

        // Per-kind workers invoke the diff handlers serially within a kind.
        let cluster = k8s::ClusterClient::new(runtime.client());
        let pod_handler = index::PodUpdateHandler::new(cluster.clone(), emitter.clone());
        tokio::spawn(
            index::process_pod_updates(pod_handler, pod_rx).instrument(info_span!("pod_events")),
        );

        let update_handler = index::WorkloadUpdateHandler::new(cluster.clone(), emitter.clone());
        let delete_handler = index::WorkloadDeleteHandler::new(cluster.clone(), emitter.clone());
        tokio::spawn(
            index::process_workload_events(update_handler, delete_handler, workload_rx)
                .instrument(info_span!("workload_events")),
        );

        // Self-healing backstop for the edge-triggered handlers above.
        let resync = index::Resync::new(
            cluster.clone(),
            cluster,
            emitter,
            Duration::from_secs(resync_interval_secs),
        );
        tokio::spawn(resync.run().instrument(info_span!("resync")));

        // Block on the shutdown signal.
        if runtime.run().await.is_err() {
            bail!("Aborted");
        }

        Ok(())
    }
}
