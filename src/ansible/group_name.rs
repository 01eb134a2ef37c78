/// Every host across every cluster is a member of this group.
pub const ROOT_GROUP: &str = "k8s_nodes";

const SEPARATOR: &str = "__";

/// Replaces every character Ansible does not accept in a group name with an
/// underscore. Dashes are kept: Kubernetes label values lean on them and
/// Ansible accepts them in group names. The result is always a usable name,
/// never an error.
pub fn to_safe_group_name(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Group holding all hosts of one cluster: `<namespace>__<cluster>`.
pub fn cluster_group(namespace: &str, cluster_name: &str) -> String {
    to_safe_group_name(&format!("{namespace}{SEPARATOR}{cluster_name}"))
}

/// Group holding all hosts of every cluster in one namespace.
pub fn namespace_group(namespace: &str) -> String {
    to_safe_group_name(namespace)
}

/// Group derived from a node label:
/// `<namespace>__<cluster>__<prefix><label value>`. An empty prefix leaves
/// the group named by the label value alone.
pub fn label_group(
    namespace: &str,
    cluster_name: &str,
    group_prefix: &str,
    label_value: &str,
) -> String {
    to_safe_group_name(&format!(
        "{namespace}{SEPARATOR}{cluster_name}{SEPARATOR}{group_prefix}{label_value}"
    ))
}
