use k8s_openapi::chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::client::{ClientFactory, ClusterApi};
use super::cluster_resources::{get_cluster_resources, ClusterResourceUsage};
use super::health::{classify, HealthVerdict, PodAggregate, PodBucket, PodObservation};
use super::scope::NamespaceScope;
use crate::contexts::FetchError;

/// One complete observation of the cluster. Never mutated after it is built;
/// the next poll produces a new one.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterSnapshot {
    pub cluster_name: String,
    pub server_version: String,
    pub scope: NamespaceScope,
    pub pods: PodAggregate,
    pub pod_details: Vec<PodObservation>,
    /// Absent when metrics are disabled or could not be collected.
    pub resources: Option<ClusterResourceUsage>,
    pub namespaces: Option<Vec<String>>,
    pub contexts: Option<Vec<String>>,
    pub captured_at: DateTime<Utc>,
    pub health: HealthVerdict,
}

impl ClusterSnapshot {
    pub fn pods_in(&self, bucket: PodBucket) -> impl Iterator<Item = &PodObservation> {
        self.pod_details.iter().filter(move |pod| pod.bucket() == bucket)
    }
}

/// What a single fetch looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Explicitly selected context; `None` follows the kubeconfig.
    pub context: Option<String>,
    pub scope: NamespaceScope,
    pub metrics_enabled: bool,
}

/// Produces a snapshot for `request` using an already built client.
///
/// The server version and the pod listing are required; resource stats and
/// the namespace/context catalog are best effort and left absent on failure.
pub async fn fetch_snapshot<F>(
    factory: &F,
    client: &F::Client,
    request: &FetchRequest,
    now: DateTime<Utc>,
) -> Result<ClusterSnapshot, FetchError>
where
    F: ClientFactory + ?Sized,
{
    let server_version = client.server_version().await.map_err(FetchError::ServerVersion)?;

    let cluster_name = match &request.context {
        Some(context) => context.clone(),
        None => factory.current_context().map_err(FetchError::CurrentContext)?,
    };

    let pods = client.list_pods(&request.scope).await.map_err(FetchError::ListPods)?;
    let pod_details: Vec<PodObservation> = pods.iter().map(|pod| PodObservation::from_pod(pod, now)).collect();
    let aggregate = PodAggregate::from_pods(&pod_details);
    let health = classify(&aggregate);

    let resources = if request.metrics_enabled {
        match get_cluster_resources(client).await {
            Ok(usage) => Some(usage),
            Err(e) => {
                warn!(error = %e, "resource stats unavailable");
                None
            }
        }
    } else {
        None
    };

    let namespaces = match client.list_namespaces().await {
        Ok(names) => Some(names),
        Err(e) => {
            warn!(error = %e, "failed to get namespaces");
            None
        }
    };

    let contexts = match factory.list_contexts() {
        Ok(names) => Some(names),
        Err(e) => {
            warn!(error = %e, "failed to get contexts");
            None
        }
    };

    debug!(
        cluster = %cluster_name,
        namespace = %request.scope,
        total = aggregate.total,
        %health,
        "built cluster snapshot"
    );

    Ok(ClusterSnapshot {
        cluster_name,
        server_version,
        scope: request.scope.clone(),
        pods: aggregate,
        pod_details,
        resources,
        namespaces,
        contexts,
        captured_at: now,
        health,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::k8s::fake::{pod, FakeCluster};
    use crate::k8s::health::PodPhase;

    fn request(scope: NamespaceScope, metrics_enabled: bool) -> FetchRequest {
        FetchRequest {
            context: None,
            scope,
            metrics_enabled,
        }
    }

    #[tokio::test]
    async fn test_snapshot_of_mixed_workload() {
        let cluster = FakeCluster::new();
        cluster.set_pods(
            std::iter::repeat_with(|| pod("shop", "Running", true))
                .take(5)
                .chain(std::iter::repeat_with(|| pod("shop", "Running", false)).take(2))
                .chain([pod("shop", "Pending", false)])
                .chain(std::iter::repeat_with(|| pod("batch", "Succeeded", false)).take(2))
                .collect(),
        );
        let client = cluster.connect(None).await.unwrap();

        let now = Utc::now();
        let snapshot = fetch_snapshot(&cluster, &client, &request(NamespaceScope::All, false), now)
            .await
            .unwrap();

        assert_eq!(snapshot.cluster_name, "prod");
        assert_eq!(snapshot.server_version, "v1.32.1");
        assert_eq!(snapshot.pods.total, 10);
        assert_eq!(snapshot.pods.running_ready, 5);
        assert_eq!(snapshot.pods.running_not_ready, 2);
        assert_eq!(snapshot.pods.pending, 1);
        assert_eq!(snapshot.pods.completed, 2);
        assert_eq!(snapshot.health, HealthVerdict::Warning);
        assert_eq!(snapshot.pod_details.len(), 10);
        assert_eq!(snapshot.captured_at, now);
        assert!(snapshot.resources.is_none());
        assert_eq!(snapshot.contexts, Some(vec!["prod".to_string(), "staging".to_string()]));
    }

    #[tokio::test]
    async fn test_named_scope_only_sees_that_namespace() {
        let cluster = FakeCluster::new();
        cluster.set_pods(vec![
            pod("shop", "Running", true),
            pod("batch", "Failed", false),
        ]);
        let client = cluster.connect(None).await.unwrap();

        let snapshot = fetch_snapshot(
            &cluster,
            &client,
            &request(NamespaceScope::Named("shop".into()), false),
            Utc::now(),
        )
        .await
        .unwrap();

        assert_eq!(snapshot.pods.total, 1);
        assert_eq!(snapshot.health, HealthVerdict::Healthy);
        assert!(snapshot.pod_details.iter().all(|p| p.namespace == "shop"));
    }

    #[tokio::test]
    async fn test_explicit_context_wins_for_display_name() {
        let cluster = FakeCluster::new();
        let client = cluster.connect(Some("staging")).await.unwrap();
        let mut req = request(NamespaceScope::All, false);
        req.context = Some("staging".to_string());

        let snapshot = fetch_snapshot(&cluster, &client, &req, Utc::now()).await.unwrap();
        assert_eq!(snapshot.cluster_name, "staging");
        assert_eq!(snapshot.health, HealthVerdict::Unknown);
    }

    #[tokio::test]
    async fn test_unreachable_cluster_fails_fetch() {
        let cluster = FakeCluster::new();
        cluster.fail_server_version(1);
        let client = cluster.connect(None).await.unwrap();

        let err = fetch_snapshot(&cluster, &client, &request(NamespaceScope::All, true), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::ServerVersion(_)));
    }

    #[tokio::test]
    async fn test_pod_listing_failure_fails_fetch() {
        let cluster = FakeCluster::new();
        cluster.fail_pod_listing(true);
        let client = cluster.connect(None).await.unwrap();

        let err = fetch_snapshot(&cluster, &client, &request(NamespaceScope::All, false), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::ListPods(_)));
    }

    #[tokio::test]
    async fn test_metrics_failure_leaves_resources_absent() {
        let cluster = FakeCluster::new();
        cluster.set_pods(vec![pod("shop", "Running", true)]);
        cluster.fail_node_listing(true);
        let client = cluster.connect(None).await.unwrap();

        let snapshot = fetch_snapshot(&cluster, &client, &request(NamespaceScope::All, true), Utc::now())
            .await
            .unwrap();
        assert!(snapshot.resources.is_none());
        assert_eq!(snapshot.health, HealthVerdict::Healthy);
    }

    #[tokio::test]
    async fn test_metrics_cover_whole_cluster() {
        let cluster = FakeCluster::new();
        cluster.set_pods(vec![
            pod("shop", "Running", true),
            pod("batch", "Pending", false),
        ]);
        cluster.set_nodes(vec![("4", "8Gi")]);
        let client = cluster.connect(None).await.unwrap();

        let snapshot = fetch_snapshot(
            &cluster,
            &client,
            &request(NamespaceScope::Named("shop".into()), true),
            Utc::now(),
        )
        .await
        .unwrap();

        let resources = snapshot.resources.expect("metrics enabled");
        // each fake pod requests 500m / 1Gi, both namespaces count
        assert_eq!(resources.cpu.used, 1.0);
        assert_eq!(resources.cpu.available, 4.0);
        assert_eq!(resources.cpu.percentage, 25.0);
        assert_eq!(resources.memory.used, 2.0);
        assert_eq!(resources.memory.percentage, 25.0);
        assert_eq!(snapshot.pods.total, 1);
    }

    #[tokio::test]
    async fn test_pods_in_bucket() {
        let cluster = FakeCluster::new();
        cluster.set_pods(vec![
            pod("shop", "Running", true),
            pod("shop", "Running", false),
            pod("shop", "Failed", false),
        ]);
        let client = cluster.connect(None).await.unwrap();
        let snapshot = fetch_snapshot(&cluster, &client, &request(NamespaceScope::All, false), Utc::now())
            .await
            .unwrap();

        assert_eq!(snapshot.pods_in(PodBucket::Failed).count(), 1);
        assert!(snapshot
            .pods_in(PodBucket::RunningNotReady)
            .all(|p| p.phase == PodPhase::Running && !p.ready));
        assert_eq!(snapshot.health, HealthVerdict::Critical);
    }
}
