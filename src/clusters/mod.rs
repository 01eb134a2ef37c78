pub mod access;
pub mod address;
mod error;
mod node_lister;
mod processor;
mod translator;

pub use error::*;
pub use node_lister::*;
pub use processor::*;
pub use translator::*;

use futures::stream;
use futures_util::StreamExt as _;
use tracing::{info, warn};

use crate::ansible::InventorySink;
use crate::config::GlobalConfig;

/// How many clusters may be in flight at once.
const MAX_CONCURRENT_CLUSTERS: usize = 8;

/// A cluster that could not be inventoried, and why.
#[derive(Debug)]
pub struct ClusterFailure {
    pub cluster: String,
    pub error: ClusterError,
}

/// Builds the full inventory. Clusters run through a bounded concurrent pool;
/// per-cluster failures are collected, never propagated, so the remaining
/// clusters always finish. Results are sorted by cluster name before
/// emission, and all sink writes stay on this task.
pub async fn build_inventory(
    config: &GlobalConfig,
    credentials: &dyn access::CredentialResolver,
    lister: &dyn NodeLister,
    sink: &mut dyn InventorySink,
) -> Vec<ClusterFailure> {
    let mut results: Vec<(String, Result<Vec<HostRecord>, ClusterError>)> =
        stream::iter(config.clusters.iter().map(|cluster| async move {
            let outcome = process_cluster(cluster, config, credentials, lister).await;
            (cluster.name.clone(), outcome)
        }))
        .buffer_unordered(MAX_CONCURRENT_CLUSTERS)
        .collect()
        .await;

    results.sort_by(|(a, _), (b, _)| a.cmp(b));

    let mut failures = Vec::new();

    for (cluster, outcome) in results {
        match outcome {
            Ok(hosts) => {
                info!(cluster = %cluster, hosts = hosts.len(), "inventoried cluster");

                for host in &hosts {
                    emit_host(sink, host);
                }
            }
            Err(error) => {
                warn!(cluster = %cluster, %error, "skipping cluster");
                failures.push(ClusterFailure { cluster, error });
            }
        }
    }

    failures
}

/// Writes one host into the sink. Safe to call repeatedly with the same
/// record.
pub fn emit_host(sink: &mut dyn InventorySink, host: &HostRecord) {
    for group in &host.groups {
        sink.ensure_group(group);
        sink.add_host_to_group(&host.name, group);
    }

    for (key, value) in &host.variables {
        sink.set_host_variable(&host.name, key, value.clone());
    }
}
