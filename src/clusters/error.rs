#[derive(thiserror::Error, Debug)]
pub enum AccessError {
    #[error("failed to read kubeconfig secret {namespace}/{name}: {source}")]
    SecretFetch {
        name: String,
        namespace: String,
        #[source]
        source: kube::Error,
    },

    #[error("kubeconfig secret {namespace}/{name} has no key {key:?}")]
    MissingSecretKey {
        name: String,
        namespace: String,
        key: String,
    },

    #[error("kubeconfig payload did not parse: {0}")]
    KubeconfigParse(#[source] serde_yaml::Error),

    #[error(transparent)]
    KubeconfigLoad(#[from] kube::config::KubeconfigError),

    #[error(transparent)]
    ClientBuild(#[from] kube::Error),

    #[error("timed out resolving cluster credentials")]
    Timeout,
}

#[derive(thiserror::Error, Debug)]
pub enum ListError {
    #[error(transparent)]
    Kube(#[from] kube::Error),

    #[error("timed out listing nodes")]
    Timeout,
}

/// Why one cluster dropped out of the run. Never aborts the other clusters.
#[derive(thiserror::Error, Debug)]
pub enum ClusterError {
    #[error(transparent)]
    Access(#[from] AccessError),

    #[error(transparent)]
    List(#[from] ListError),
}
