use async_trait::async_trait;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::Client;
use std::path::PathBuf;

use super::error::{ClientError, ClientResult};
use crate::k8s::{ClientFactory, KubeClient};

/// Builds clients from one kubeconfig file. The file is re-read on every
/// call so edits made by other tools (e.g. `kubectl config use-context`)
/// are picked up.
#[derive(Clone, Debug)]
pub struct KubeconfigSource {
    path: PathBuf,
}

impl KubeconfigSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> ClientResult<Kubeconfig> {
        // Verify the file exists before trying to use it
        if !self.path.exists() {
            return Err(ClientError::NotFound(self.path.display().to_string()));
        }
        Kubeconfig::read_from(&self.path).map_err(|e| ClientError::InvalidContent(e.to_string()))
    }
}

#[async_trait]
impl ClientFactory for KubeconfigSource {
    type Client = KubeClient;

    async fn connect(&self, context: Option<&str>) -> ClientResult<KubeClient> {
        let kubeconfig = self.load()?;

        if let Some(name) = context {
            if !kubeconfig.contexts.iter().any(|c| c.name == name) {
                return Err(ClientError::UnknownContext(name.to_string()));
            }
        }

        let options = KubeConfigOptions {
            context: context.map(str::to_owned),
            ..Default::default()
        };
        let config = kube::Config::from_custom_kubeconfig(kubeconfig, &options)
            .await
            .map_err(|e| ClientError::InvalidContent(e.to_string()))?;
        let client = Client::try_from(config).map_err(|e| ClientError::ClientCreation(e.to_string()))?;

        Ok(KubeClient::new(client))
    }

    fn list_contexts(&self) -> ClientResult<Vec<String>> {
        let kubeconfig = self.load()?;
        let mut names: Vec<String> = kubeconfig.contexts.into_iter().map(|c| c.name).collect();
        names.sort();
        Ok(names)
    }

    fn current_context(&self) -> ClientResult<String> {
        Ok(self.load()?.current_context.unwrap_or_default())
    }
}
