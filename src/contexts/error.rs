use std::path::PathBuf;

/// Failures reported by the Kubernetes collaborator (kubeconfig loading,
/// client construction and API calls).
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Error when kubeconfig file is not found
    #[error("Kubeconfig not found: {0}")]
    NotFound(String),
    /// Error when kubeconfig content is invalid
    #[error("Invalid kubeconfig content: {0}")]
    InvalidContent(String),
    /// Error when the requested context is not defined in the kubeconfig
    #[error("Context not found in kubeconfig: {0}")]
    UnknownContext(String),
    /// Error when creating Kubernetes client fails
    #[error("Client creation failed: {0}")]
    ClientCreation(String),
    /// Error returned by the API server or the transport
    #[error("API request failed: {0}")]
    Api(#[from] kube::Error),
    /// IO related errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A fetch that could not produce a snapshot. Every variant is a
/// connectivity-class failure and is shown to the user as an error state.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("failed to connect to context {context}: {source}")]
    Connect {
        context: String,
        #[source]
        source: ClientError,
    },
    #[error("failed to get server version: {0}")]
    ServerVersion(#[source] ClientError),
    #[error("failed to get current context: {0}")]
    CurrentContext(#[source] ClientError),
    #[error("failed to get pod status: {0}")]
    ListPods(#[source] ClientError),
}

/// Resource statistics could not be collected. Logged only; the snapshot
/// is published without resource stats.
#[derive(Debug, thiserror::Error)]
pub enum PartialDataError {
    #[error("failed to list nodes: {0}")]
    Nodes(#[source] ClientError),
    #[error("failed to list cluster pods: {0}")]
    Pods(#[source] ClientError),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("reading config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid poll_interval {0:?}")]
    InvalidInterval(String),
}

/// Result type for collaborator operations
pub type ClientResult<T> = Result<T, ClientError>;
