use async_trait::async_trait;
use k8s_openapi::api::core::v1::Node;
use kube::Api;
use kube::api::ListParams;

use crate::clusters::error::ListError;

/// Lists the nodes of one cluster through an access handle resolved for it.
#[async_trait]
pub trait NodeLister: Send + Sync {
    async fn list_nodes(
        &self,
        access: &kube::Client,
        label_selector: Option<&str>,
    ) -> Result<Vec<Node>, ListError>;
}

/// Lists nodes through the workload cluster's API server.
pub struct ApiNodeLister;

#[async_trait]
impl NodeLister for ApiNodeLister {
    async fn list_nodes(
        &self,
        access: &kube::Client,
        label_selector: Option<&str>,
    ) -> Result<Vec<Node>, ListError> {
        let nodes: Api<Node> = Api::all(access.clone());

        let params = match label_selector {
            Some(selector) => ListParams::default().labels(selector),
            None => ListParams::default(),
        };

        Ok(nodes.list(&params).await?.items)
    }
}
