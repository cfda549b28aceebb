use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Namespace, Node, Pod};
use kube::{
    api::{Api, ListParams},
    Client,
};

use super::scope::NamespaceScope;
use crate::contexts::ClientResult;

/// Read-only view of one cluster through one client handle.
#[async_trait]
pub trait ClusterApi: Send + Sync + 'static {
    async fn server_version(&self) -> ClientResult<String>;

    async fn list_pods(&self, scope: &NamespaceScope) -> ClientResult<Vec<Pod>>;

    /// Namespace names, sorted.
    async fn list_namespaces(&self) -> ClientResult<Vec<String>>;

    async fn list_nodes(&self) -> ClientResult<Vec<Node>>;
}

/// Builds client handles for kubeconfig contexts and answers questions about
/// the kubeconfig itself.
#[async_trait]
pub trait ClientFactory: Send + Sync + 'static {
    type Client: ClusterApi;

    /// Builds a fresh client for `context`, or for the kubeconfig's
    /// current-context when `None`.
    async fn connect(&self, context: Option<&str>) -> ClientResult<Self::Client>;

    /// Context names, sorted.
    fn list_contexts(&self) -> ClientResult<Vec<String>>;

    /// The kubeconfig's own current-context.
    fn current_context(&self) -> ClientResult<String>;
}

/// `ClusterApi` backed by a `kube::Client`.
#[derive(Clone)]
pub struct KubeClient {
    client: Client,
}

impl KubeClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ClusterApi for KubeClient {
    async fn server_version(&self) -> ClientResult<String> {
        let info = self.client.apiserver_version().await?;
        Ok(info.git_version)
    }

    async fn list_pods(&self, scope: &NamespaceScope) -> ClientResult<Vec<Pod>> {
        let pods: Api<Pod> = match scope {
            NamespaceScope::All => Api::all(self.client.clone()),
            NamespaceScope::Named(ns) => Api::namespaced(self.client.clone(), ns),
        };
        let list = pods.list(&ListParams::default()).await?;
        Ok(list.items)
    }

    async fn list_namespaces(&self) -> ClientResult<Vec<String>> {
        let ns_api: Api<Namespace> = Api::all(self.client.clone());
        let ns_list = ns_api.list(&ListParams::default()).await?;
        let mut names = ns_list
            .items
            .into_iter()
            .filter_map(|ns| ns.metadata.name)
            .collect::<Vec<_>>();
        names.sort();
        Ok(names)
    }

    async fn list_nodes(&self) -> ClientResult<Vec<Node>> {
        let nodes: Api<Node> = Api::all(self.client.clone());
        let list = nodes.list(&ListParams::default()).await?;
        Ok(list.items)
    }
}
