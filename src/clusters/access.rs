use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use k8s_openapi::api::core::v1::Secret;
use kube::Api;
use kube::config::{KubeConfigOptions, Kubeconfig};

use crate::clusters::error::AccessError;
use crate::config::{ClusterAccess, ClusterDescriptor};

pub const CAPI_KUBECONFIG_SUFFIX: &str = "-kubeconfig";
pub const CAPI_KUBECONFIG_SECRET_KEY: &str = "value";

/// Location of a kubeconfig payload in a secret on the management cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretRef {
    pub name: String,
    pub namespace: String,
    pub key: String,
}

/// Which secret holds a cluster's kubeconfig. Adopted clusters name their
/// secret explicitly; CAPI clusters follow the `<cluster>-kubeconfig`
/// convention in the cluster's own namespace, under a fixed key.
pub fn credential_ref(cluster: &ClusterDescriptor) -> SecretRef {
    match &cluster.access {
        ClusterAccess::Adopted(secret_ref) => secret_ref.clone(),
        ClusterAccess::Capi => SecretRef {
            name: format!("{}{CAPI_KUBECONFIG_SUFFIX}", cluster.name),
            namespace: cluster.namespace.clone(),
            key: CAPI_KUBECONFIG_SECRET_KEY.to_owned(),
        },
    }
}

/// Fetches the stored payload of a kubeconfig secret.
#[async_trait]
pub trait CredentialResolver: Send + Sync {
    async fn fetch(&self, secret_ref: &SecretRef) -> Result<Vec<u8>, AccessError>;
}

/// Reads kubeconfig payloads from secrets on the management cluster.
pub struct SecretCredentialResolver {
    client: kube::Client,
}

impl SecretCredentialResolver {
    pub fn new(client: kube::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CredentialResolver for SecretCredentialResolver {
    async fn fetch(&self, secret_ref: &SecretRef) -> Result<Vec<u8>, AccessError> {
        let secrets: Api<Secret> = Api::namespaced(self.client.clone(), &secret_ref.namespace);

        let secret = secrets
            .get(&secret_ref.name)
            .await
            .map_err(|source| AccessError::SecretFetch {
                name: secret_ref.name.clone(),
                namespace: secret_ref.namespace.clone(),
                source,
            })?;

        let mut data = secret.data.unwrap_or_default();

        data.remove(&secret_ref.key)
            .map(|payload| payload.0)
            .ok_or_else(|| AccessError::MissingSecretKey {
                name: secret_ref.name.clone(),
                namespace: secret_ref.namespace.clone(),
                key: secret_ref.key.clone(),
            })
    }
}

/// Parses a fetched payload into a kubeconfig document. The wire-level base64
/// is already undone by the client machinery; payloads stored with one extra
/// base64 layer are accepted too.
pub fn parse_kubeconfig(payload: &[u8]) -> Result<Kubeconfig, AccessError> {
    match serde_yaml::from_slice::<Kubeconfig>(payload) {
        Ok(kubeconfig) => Ok(kubeconfig),
        Err(parse_error) => {
            let decoded = STANDARD
                .decode(payload.trim_ascii())
                .map_err(|_| AccessError::KubeconfigParse(parse_error))?;

            serde_yaml::from_slice(&decoded).map_err(AccessError::KubeconfigParse)
        }
    }
}

/// Builds a client scoped to the given kubeconfig document.
pub async fn client_for_kubeconfig(kubeconfig: Kubeconfig) -> Result<kube::Client, AccessError> {
    let config =
        kube::Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default()).await?;

    Ok(kube::Client::try_from(config)?)
}

/// Full access resolution for one cluster: locate the secret, fetch it,
/// parse the kubeconfig and build a client. Every failure is scoped to this
/// cluster.
pub async fn resolve_access(
    resolver: &dyn CredentialResolver,
    cluster: &ClusterDescriptor,
) -> Result<kube::Client, AccessError> {
    let secret_ref = credential_ref(cluster);
    let payload = resolver.fetch(&secret_ref).await?;
    let kubeconfig = parse_kubeconfig(&payload)?;

    client_for_kubeconfig(kubeconfig).await
}
