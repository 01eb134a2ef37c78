use std::collections::{BTreeMap, BTreeSet};

use ipnet::IpNet;
use k8s_openapi::api::core::v1::Node;
use serde_json::{Value, json};

use crate::ansible::group_name;
use crate::clusters::address;
use crate::config::{ClusterDescriptor, HostGroupRule};

/// One inventory host, derived from one node of one cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct HostRecord {
    pub name: String,
    pub primary_address: Option<String>,
    pub internal_ip: Option<String>,
    pub external_ip: Option<String>,
    pub variables: BTreeMap<String, Value>,
    pub groups: BTreeSet<String>,
}

/// Translates one node into a host record: connection address, variables and
/// group memberships. Pure; all network state arrives in the arguments.
///
/// Label rules are evaluated in order, the cluster's own rules first, then
/// the global ones; every rule whose key appears in the node's labels adds a
/// group. A node may acquire any number of label-derived groups.
pub fn translate(
    node: &Node,
    cluster: &ClusterDescriptor,
    global_rules: &[HostGroupRule],
    effective_subnet: Option<&IpNet>,
) -> HostRecord {
    let name = node.metadata.name.clone().unwrap_or_default();
    let labels = node.metadata.labels.clone().unwrap_or_default();

    let status = node.status.as_ref();
    let addresses = status.and_then(|s| s.addresses.clone()).unwrap_or_default();
    let node_info = status.and_then(|s| s.node_info.as_ref());

    let selected = address::select(&addresses, effective_subnet);

    let mut groups = BTreeSet::new();
    groups.insert(group_name::ROOT_GROUP.to_owned());
    groups.insert(group_name::cluster_group(&cluster.namespace, &cluster.name));
    groups.insert(group_name::namespace_group(&cluster.namespace));

    for rule in cluster.host_group_rules.iter().chain(global_rules) {
        if let Some(value) = labels.get(&rule.label_key) {
            groups.insert(group_name::label_group(
                &cluster.namespace,
                &cluster.name,
                &rule.group_prefix,
                value,
            ));
        }
    }

    let mut variables = BTreeMap::new();
    variables.insert("labels".to_owned(), json!(labels));
    variables.insert("internal_ip".to_owned(), json!(selected.internal));
    variables.insert("external_ip".to_owned(), json!(selected.external));
    variables.insert(
        "os_image".to_owned(),
        json!(node_info.map(|i| i.os_image.clone()).unwrap_or_default()),
    );
    variables.insert(
        "kubelet_version".to_owned(),
        json!(node_info.map(|i| i.kubelet_version.clone()).unwrap_or_default()),
    );
    if let Some(primary) = &selected.primary {
        variables.insert("ansible_host".to_owned(), json!(primary));
    }

    HostRecord {
        name,
        primary_address: selected.primary,
        internal_ip: selected.internal,
        external_ip: selected.external,
        variables,
        groups,
    }
}
