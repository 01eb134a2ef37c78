use std::path::{Path, PathBuf};

use ipnet::IpNet;
use serde::Deserialize;
use tracing::warn;

use crate::clusters::access::SecretRef;

/// Accepted values for the document's `plugin` discriminator.
pub const PLUGIN_TOKENS: [&str; 2] = ["k8s_nodes", "k0rdent.core.k8s_nodes"];

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Parse(#[from] serde_yaml::Error),

    #[error("unknown plugin token {0:?}")]
    UnknownPlugin(String),

    #[error("at least one cluster must be configured")]
    NoClusters,

    #[error("cluster entry {index}: {field} must not be empty")]
    EmptyField { index: usize, field: &'static str },

    #[error("adopted cluster {cluster:?} requires a kubeconfig_secret")]
    MissingCredentialRef { cluster: String },

    #[error("capi cluster {cluster:?} must not set kubeconfig_secret; its secret is located by convention")]
    UnexpectedCredentialRef { cluster: String },
}

/// The inventory source document as written. Validated into [`GlobalConfig`]
/// in one pass before anything touches the network.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfig {
    pub plugin: String,
    #[serde(default)]
    pub ansible_subnet: Option<String>,
    pub clusters: Vec<RawCluster>,
    #[serde(default)]
    pub host_groups: Vec<RawHostGroup>,
    #[serde(default)]
    pub kubeconfig: Option<PathBuf>,
    #[serde(default)]
    pub context: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawCluster {
    pub name: String,
    pub namespace: String,
    #[serde(rename = "type")]
    pub cluster_type: RawClusterType,
    #[serde(default)]
    pub kubeconfig_secret: Option<RawSecretRef>,
    #[serde(default)]
    pub ansible_subnet: Option<String>,
    #[serde(default)]
    pub host_groups: Vec<RawHostGroup>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RawClusterType {
    Capi,
    Adopted,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawSecretRef {
    pub name: String,
    pub namespace: String,
    pub key: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawHostGroup {
    pub key: String,
    pub group_prefix: String,
}

/// One label-to-group rule. Rules are evaluated in the order configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostGroupRule {
    pub label_key: String,
    pub group_prefix: String,
}

impl From<RawHostGroup> for HostGroupRule {
    fn from(raw: RawHostGroup) -> Self {
        Self {
            label_key: raw.key,
            group_prefix: raw.group_prefix,
        }
    }
}

/// How a cluster's kubeconfig is located. Adopted clusters must carry an
/// explicit secret reference; CAPI clusters must not, their secret is located
/// by convention. The variant carries exactly the fields each case needs, so
/// the invariant holds by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClusterAccess {
    Capi,
    Adopted(SecretRef),
}

#[derive(Debug, Clone)]
pub struct ClusterDescriptor {
    pub name: String,
    pub namespace: String,
    pub access: ClusterAccess,
    pub subnet_override: Option<IpNet>,
    pub host_group_rules: Vec<HostGroupRule>,
}

#[derive(Debug, Clone)]
pub struct GlobalConfig {
    pub default_subnet: Option<IpNet>,
    pub clusters: Vec<ClusterDescriptor>,
    pub global_host_group_rules: Vec<HostGroupRule>,
    pub kubeconfig: Option<PathBuf>,
    pub context: Option<String>,
}

impl GlobalConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let document = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let raw: RawConfig = serde_yaml::from_str(&document)?;

        Self::from_raw(raw)
    }

    pub fn from_raw(raw: RawConfig) -> Result<Self, ConfigError> {
        if !PLUGIN_TOKENS.contains(&raw.plugin.as_str()) {
            return Err(ConfigError::UnknownPlugin(raw.plugin));
        }

        if raw.clusters.is_empty() {
            return Err(ConfigError::NoClusters);
        }

        let clusters = raw
            .clusters
            .into_iter()
            .enumerate()
            .map(|(index, cluster)| validate_cluster(index, cluster))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            default_subnet: parse_subnet(raw.ansible_subnet.as_deref()),
            clusters,
            global_host_group_rules: raw.host_groups.into_iter().map(Into::into).collect(),
            kubeconfig: raw.kubeconfig,
            context: raw.context,
        })
    }
}

fn validate_cluster(index: usize, raw: RawCluster) -> Result<ClusterDescriptor, ConfigError> {
    if raw.name.is_empty() {
        return Err(ConfigError::EmptyField {
            index,
            field: "name",
        });
    }

    if raw.namespace.is_empty() {
        return Err(ConfigError::EmptyField {
            index,
            field: "namespace",
        });
    }

    let access = match (raw.cluster_type, raw.kubeconfig_secret) {
        (RawClusterType::Adopted, Some(secret)) => ClusterAccess::Adopted(SecretRef {
            name: secret.name,
            namespace: secret.namespace,
            key: secret.key,
        }),
        (RawClusterType::Adopted, None) => {
            return Err(ConfigError::MissingCredentialRef { cluster: raw.name });
        }
        (RawClusterType::Capi, None) => ClusterAccess::Capi,
        (RawClusterType::Capi, Some(_)) => {
            return Err(ConfigError::UnexpectedCredentialRef { cluster: raw.name });
        }
    };

    Ok(ClusterDescriptor {
        name: raw.name,
        namespace: raw.namespace,
        access,
        subnet_override: parse_subnet(raw.ansible_subnet.as_deref()),
        host_group_rules: raw.host_groups.into_iter().map(Into::into).collect(),
    })
}

/// An empty subnet means "no preference"; a subnet that does not parse as
/// CIDR downgrades to the same, with a warning, and never fails the run.
fn parse_subnet(raw: Option<&str>) -> Option<IpNet> {
    let raw = raw.filter(|s| !s.is_empty())?;

    match raw.parse() {
        Ok(net) => Some(net),
        Err(error) => {
            warn!(%error, subnet = raw, "ignoring unparsable ansible_subnet");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use super::*;

    const SAMPLE_DOCUMENT: &str = r#"
plugin: k8s_nodes
ansible_subnet: 10.0.0.0/24
kubeconfig: /etc/kubernetes/admin.conf
context: mgmt
host_groups:
  - key: zone
    group_prefix: zone-
clusters:
  - name: west
    namespace: prod
    type: capi
    host_groups:
      - key: tier
        group_prefix: role-
  - name: legacy
    namespace: infra
    type: adopted
    ansible_subnet: 172.16.0.0/12
    kubeconfig_secret:
      name: legacy-kubeconfig
      namespace: infra
      key: admin.conf
"#;

    fn parse(document: &str) -> Result<GlobalConfig, ConfigError> {
        GlobalConfig::from_raw(serde_yaml::from_str(document).unwrap())
    }

    #[test]
    fn test_full_document_validates() {
        // When
        let config = parse(SAMPLE_DOCUMENT).unwrap();

        // Then
        assert_eq!(config.default_subnet, Some("10.0.0.0/24".parse().unwrap()));
        assert_eq!(config.kubeconfig.as_deref().unwrap().to_str().unwrap(), "/etc/kubernetes/admin.conf");
        assert_eq!(config.context.as_deref(), Some("mgmt"));
        assert_eq!(config.global_host_group_rules.len(), 1);
        assert_eq!(config.clusters.len(), 2);

        let west = &config.clusters[0];
        assert_eq!(west.access, ClusterAccess::Capi);
        assert_eq!(west.subnet_override, None);
        assert_eq!(
            west.host_group_rules,
            vec![HostGroupRule {
                label_key: "tier".to_owned(),
                group_prefix: "role-".to_owned(),
            }]
        );

        let legacy = &config.clusters[1];
        assert_eq!(
            legacy.subnet_override,
            Some("172.16.0.0/12".parse().unwrap())
        );
        assert_eq!(
            legacy.access,
            ClusterAccess::Adopted(SecretRef {
                name: "legacy-kubeconfig".to_owned(),
                namespace: "infra".to_owned(),
                key: "admin.conf".to_owned(),
            })
        );
    }

    #[test]
    fn test_adopted_cluster_without_secret_is_rejected() {
        let document = r#"
plugin: k8s_nodes
clusters:
  - name: legacy
    namespace: infra
    type: adopted
"#;

        let result = parse(document);

        assert!(matches!(
            result,
            Err(ConfigError::MissingCredentialRef { cluster }) if cluster == "legacy"
        ));
    }

    #[test]
    fn test_capi_cluster_with_secret_is_rejected() {
        let document = r#"
plugin: k8s_nodes
clusters:
  - name: west
    namespace: prod
    type: capi
    kubeconfig_secret:
      name: west-kubeconfig
      namespace: prod
      key: value
"#;

        let result = parse(document);

        assert!(matches!(
            result,
            Err(ConfigError::UnexpectedCredentialRef { cluster }) if cluster == "west"
        ));
    }

    #[test]
    fn test_unknown_plugin_token_is_rejected() {
        let document = r#"
plugin: something_else
clusters:
  - name: west
    namespace: prod
    type: capi
"#;

        assert!(matches!(parse(document), Err(ConfigError::UnknownPlugin(_))));
    }

    #[test]
    fn test_empty_cluster_list_is_rejected() {
        let document = r#"
plugin: k8s_nodes
clusters: []
"#;

        assert!(matches!(parse(document), Err(ConfigError::NoClusters)));
    }

    #[test]
    fn test_empty_cluster_name_is_rejected() {
        let document = r#"
plugin: k8s_nodes
clusters:
  - name: ""
    namespace: prod
    type: capi
"#;

        assert!(matches!(
            parse(document),
            Err(ConfigError::EmptyField { index: 0, field: "name" })
        ));
    }

    #[test]
    fn test_empty_or_invalid_subnet_means_no_preference() {
        let document = r#"
plugin: k8s_nodes
ansible_subnet: ""
clusters:
  - name: west
    namespace: prod
    type: capi
    ansible_subnet: not-a-cidr
"#;

        let config = parse(document).unwrap();

        assert_eq!(config.default_subnet, None);
        assert_eq!(config.clusters[0].subnet_override, None);
    }

    #[test]
    fn test_load_reads_a_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE_DOCUMENT.as_bytes()).unwrap();

        let config = GlobalConfig::load(file.path()).unwrap();

        assert_eq!(config.clusters.len(), 2);
    }

    #[test]
    fn test_load_surfaces_missing_file() {
        let result = GlobalConfig::load(Path::new("/nonexistent/inventory.yaml"));

        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}
