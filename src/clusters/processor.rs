use std::time::Duration;

use tokio::time::timeout;
use tracing::debug;

use crate::clusters::access::{self, CredentialResolver};
use crate::clusters::error::{AccessError, ClusterError, ListError};
use crate::clusters::node_lister::NodeLister;
use crate::clusters::translator::{self, HostRecord};
use crate::config::{ClusterDescriptor, GlobalConfig};

/// Upper bound on each remote call (credential fetch, node list).
pub const CLUSTER_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Runs one cluster through the pipeline: resolve access, list nodes,
/// translate every node. Hosts come back sorted by node name so downstream
/// output does not depend on API ordering.
pub async fn process_cluster(
    cluster: &ClusterDescriptor,
    config: &GlobalConfig,
    credentials: &dyn CredentialResolver,
    lister: &dyn NodeLister,
) -> Result<Vec<HostRecord>, ClusterError> {
    let access_handle = timeout(
        CLUSTER_CALL_TIMEOUT,
        access::resolve_access(credentials, cluster),
    )
    .await
    .map_err(|_| AccessError::Timeout)??;

    let nodes = timeout(
        CLUSTER_CALL_TIMEOUT,
        lister.list_nodes(&access_handle, None),
    )
    .await
    .map_err(|_| ListError::Timeout)??;

    debug!(cluster = %cluster.name, nodes = nodes.len(), "listed nodes");

    let effective_subnet = cluster.subnet_override.or(config.default_subnet);

    let mut hosts: Vec<HostRecord> = nodes
        .iter()
        .map(|node| {
            translator::translate(
                node,
                cluster,
                &config.global_host_group_rules,
                effective_subnet.as_ref(),
            )
        })
        .collect();

    hosts.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(hosts)
}
