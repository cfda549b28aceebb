//! In-memory cluster used by the unit tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::{
    Container, Node, NodeStatus, Pod, PodCondition, PodSpec, PodStatus, ResourceRequirements,
};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use tokio::time::Instant;

use super::client::{ClientFactory, ClusterApi};
use super::scope::NamespaceScope;
use crate::contexts::{ClientError, ClientResult};

static POD_SEQ: AtomicUsize = AtomicUsize::new(0);

/// A pod requesting 500m CPU and 1Gi memory.
pub fn pod(namespace: &str, phase: &str, ready: bool) -> Pod {
    let seq = POD_SEQ.fetch_add(1, Ordering::Relaxed);
    let requests = BTreeMap::from([
        ("cpu".to_string(), Quantity("500m".to_string())),
        ("memory".to_string(), Quantity("1Gi".to_string())),
    ]);
    Pod {
        metadata: ObjectMeta {
            name: Some(format!("{}-pod-{}", namespace, seq)),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        spec: Some(PodSpec {
            containers: vec![Container {
                name: "app".to_string(),
                resources: Some(ResourceRequirements {
                    requests: Some(requests),
                    ..Default::default()
                }),
                ..Default::default()
            }],
            ..Default::default()
        }),
        status: Some(PodStatus {
            phase: Some(phase.to_string()),
            conditions: Some(vec![PodCondition {
                type_: "Ready".to_string(),
                status: if ready { "True" } else { "False" }.to_string(),
                ..Default::default()
            }]),
            ..Default::default()
        }),
    }
}

fn unreachable() -> ClientError {
    ClientError::Io(std::io::Error::new(
        std::io::ErrorKind::ConnectionRefused,
        "connection refused",
    ))
}

#[derive(Default)]
struct FakeState {
    pods: Vec<Pod>,
    nodes: Vec<Node>,
    contexts: Vec<String>,
    current_context: String,
    version_failures: usize,
    fail_pods: bool,
    fail_nodes: bool,
    /// keyed by context name
    version_delays: HashMap<String, Duration>,
    /// keyed by namespace setting
    pod_delays: HashMap<String, Duration>,
    fetch_attempts: Vec<Instant>,
    connects: Vec<Option<String>>,
}

/// Fake kubeconfig + cluster. Clones share state.
#[derive(Clone)]
pub struct FakeCluster {
    state: Arc<Mutex<FakeState>>,
}

impl FakeCluster {
    pub fn new() -> Self {
        let state = FakeState {
            contexts: vec!["prod".to_string(), "staging".to_string()],
            current_context: "prod".to_string(),
            ..Default::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn set_pods(&self, pods: Vec<Pod>) {
        self.lock().pods = pods;
    }

    pub fn set_nodes(&self, nodes: Vec<(&str, &str)>) {
        self.lock().nodes = nodes
            .into_iter()
            .map(|(cpu, memory)| Node {
                status: Some(NodeStatus {
                    allocatable: Some(BTreeMap::from([
                        ("cpu".to_string(), Quantity(cpu.to_string())),
                        ("memory".to_string(), Quantity(memory.to_string())),
                    ])),
                    ..Default::default()
                }),
                ..Default::default()
            })
            .collect();
    }

    /// The next `count` server version calls fail.
    pub fn fail_server_version(&self, count: usize) {
        self.lock().version_failures = count;
    }

    pub fn fail_pod_listing(&self, fail: bool) {
        self.lock().fail_pods = fail;
    }

    pub fn fail_node_listing(&self, fail: bool) {
        self.lock().fail_nodes = fail;
    }

    pub fn delay_context(&self, context: &str, delay: Duration) {
        self.lock().version_delays.insert(context.to_string(), delay);
    }

    pub fn delay_namespace(&self, namespace: &str, delay: Duration) {
        self.lock().pod_delays.insert(namespace.to_string(), delay);
    }

    /// When each fetch began (one entry per server version call).
    pub fn fetch_attempts(&self) -> Vec<Instant> {
        self.lock().fetch_attempts.clone()
    }

    pub fn connects(&self) -> Vec<Option<String>> {
        self.lock().connects.clone()
    }
}

pub struct FakeClient {
    context: String,
    state: Arc<Mutex<FakeState>>,
}

impl FakeClient {
    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }
}

#[async_trait]
impl ClusterApi for FakeClient {
    async fn server_version(&self) -> ClientResult<String> {
        let (delay, fail) = {
            let mut state = self.lock();
            state.fetch_attempts.push(Instant::now());
            let fail = state.version_failures > 0;
            if fail {
                state.version_failures -= 1;
            }
            (state.version_delays.get(&self.context).copied(), fail)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if fail {
            return Err(unreachable());
        }
        Ok("v1.32.1".to_string())
    }

    async fn list_pods(&self, scope: &NamespaceScope) -> ClientResult<Vec<Pod>> {
        let (delay, result) = {
            let state = self.lock();
            let result = if state.fail_pods {
                Err(unreachable())
            } else {
                Ok(state
                    .pods
                    .iter()
                    .filter(|p| match scope {
                        NamespaceScope::All => true,
                        NamespaceScope::Named(ns) => p.metadata.namespace.as_deref() == Some(ns.as_str()),
                    })
                    .cloned()
                    .collect())
            };
            (state.pod_delays.get(scope.as_setting()).copied(), result)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        result
    }

    async fn list_namespaces(&self) -> ClientResult<Vec<String>> {
        let mut names: Vec<String> = self
            .lock()
            .pods
            .iter()
            .filter_map(|p| p.metadata.namespace.clone())
            .collect();
        names.sort();
        names.dedup();
        Ok(names)
    }

    async fn list_nodes(&self) -> ClientResult<Vec<Node>> {
        let state = self.lock();
        if state.fail_nodes {
            return Err(unreachable());
        }
        Ok(state.nodes.clone())
    }
}

#[async_trait]
impl ClientFactory for FakeCluster {
    type Client = FakeClient;

    async fn connect(&self, context: Option<&str>) -> ClientResult<FakeClient> {
        let mut state = self.lock();
        state.connects.push(context.map(str::to_owned));
        let context = match context {
            Some(name) if state.contexts.iter().any(|c| c == name) => name.to_string(),
            Some(name) => return Err(ClientError::UnknownContext(name.to_string())),
            None => state.current_context.clone(),
        };
        Ok(FakeClient {
            context,
            state: self.state.clone(),
        })
    }

    fn list_contexts(&self) -> ClientResult<Vec<String>> {
        Ok(self.lock().contexts.clone())
    }

    fn current_context(&self) -> ClientResult<String> {
        Ok(self.lock().current_context.clone())
    }
}
