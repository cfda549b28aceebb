use k8s_openapi::api::core::v1::{Node, Pod};
use tracing::debug;

use super::client::ClusterApi;
use super::health::PodPhase;
use super::quantity::{cpu_cores, memory_gib};
use super::scope::NamespaceScope;
use crate::contexts::PartialDataError;

/// Used vs. available amount of one resource.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ResourceUsage {
    pub used: f64,
    pub available: f64,
    pub percentage: f64,
}

impl ResourceUsage {
    /// Percentage is 0 when nothing is available.
    pub fn new(used: f64, available: f64) -> Self {
        let percentage = if available > 0.0 {
            used / available * 100.0
        } else {
            0.0
        };
        ResourceUsage {
            used,
            available,
            percentage,
        }
    }
}

/// Requested CPU (cores) and memory (GiB) against node allocatable capacity.
/// These are scheduler requests, not measured usage.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ClusterResourceUsage {
    pub cpu: ResourceUsage,
    pub memory: ResourceUsage,
}

impl ClusterResourceUsage {
    pub fn compute(nodes: &[Node], pods: &[Pod]) -> Self {
        let (cpu_total, memory_total) = allocatable_totals(nodes);
        let (cpu_used, memory_used) = requested_totals(pods);
        ClusterResourceUsage {
            cpu: ResourceUsage::new(cpu_used, cpu_total),
            memory: ResourceUsage::new(memory_used, memory_total),
        }
    }
}

/// Sum of allocatable CPU cores and memory GiB over all nodes.
pub fn allocatable_totals(nodes: &[Node]) -> (f64, f64) {
    let mut cpu_total = 0.0;
    let mut memory_total = 0.0;

    for node in nodes {
        if let Some(allocatable) = node.status.as_ref().and_then(|s| s.allocatable.as_ref()) {
            if let Some(cpu) = allocatable.get("cpu") {
                cpu_total += cpu_cores(cpu);
            }
            if let Some(memory) = allocatable.get("memory") {
                memory_total += memory_gib(memory);
            }
        } else {
            debug!(node = node.metadata.name.as_deref().unwrap_or_default(), "node reports no allocatable resources");
        }
    }

    (cpu_total, memory_total)
}

/// Sum of container requests of every pending or running pod.
pub fn requested_totals(pods: &[Pod]) -> (f64, f64) {
    let mut cpu_used = 0.0;
    let mut memory_used = 0.0;

    for pod in pods {
        let phase = PodPhase::parse(pod.status.as_ref().and_then(|s| s.phase.as_deref()));
        if !matches!(phase, PodPhase::Pending | PodPhase::Running) {
            continue;
        }
        let Some(spec) = &pod.spec else {
            continue;
        };
        for container in &spec.containers {
            if let Some(requests) = container.resources.as_ref().and_then(|r| r.requests.as_ref()) {
                if let Some(cpu) = requests.get("cpu") {
                    cpu_used += cpu_cores(cpu);
                }
                if let Some(memory) = requests.get("memory") {
                    memory_used += memory_gib(memory);
                }
            }
        }
    }

    (cpu_used, memory_used)
}

/// Collects node capacity and cluster-wide pod requests. Independent of the
/// namespace the user is looking at.
pub async fn get_cluster_resources<C>(client: &C) -> Result<ClusterResourceUsage, PartialDataError>
where
    C: ClusterApi + ?Sized,
{
    let nodes = client.list_nodes().await.map_err(PartialDataError::Nodes)?;
    let pods = client
        .list_pods(&NamespaceScope::All)
        .await
        .map_err(PartialDataError::Pods)?;

    Ok(ClusterResourceUsage::compute(&nodes, &pods))
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::core::v1::{Container, NodeStatus, PodSpec, PodStatus, ResourceRequirements};
    use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
    use std::collections::BTreeMap;

    fn resources(cpu: &str, memory: &str) -> BTreeMap<String, Quantity> {
        BTreeMap::from([
            ("cpu".to_string(), Quantity(cpu.to_string())),
            ("memory".to_string(), Quantity(memory.to_string())),
        ])
    }

    fn node(cpu: &str, memory: &str) -> Node {
        Node {
            status: Some(NodeStatus {
                allocatable: Some(resources(cpu, memory)),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn pod(phase: &str, requests: &[(&str, &str)]) -> Pod {
        Pod {
            spec: Some(PodSpec {
                containers: requests
                    .iter()
                    .map(|(cpu, memory)| Container {
                        name: "app".to_string(),
                        resources: Some(ResourceRequirements {
                            requests: Some(resources(cpu, memory)),
                            ..Default::default()
                        }),
                        ..Default::default()
                    })
                    .collect(),
                ..Default::default()
            }),
            status: Some(PodStatus {
                phase: Some(phase.to_string()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_zero_available_gives_zero_percentage() {
        let usage = ResourceUsage::new(3.0, 0.0);
        assert_eq!(usage.percentage, 0.0);
        assert!(usage.percentage.is_finite());
    }

    #[test]
    fn test_percentage() {
        let usage = ResourceUsage::new(1.5, 4.0);
        assert_eq!(usage.percentage, 37.5);
    }

    #[test]
    fn test_only_active_pods_count_towards_requests() {
        let nodes = vec![node("4", "8Gi"), node("4000m", "8Gi")];
        let pods = vec![
            pod("Running", &[("500m", "1Gi"), ("500m", "512Mi")]),
            pod("Pending", &[("1", "1Gi")]),
            pod("Succeeded", &[("2", "4Gi")]),
            pod("Failed", &[("2", "4Gi")]),
        ];

        let usage = ClusterResourceUsage::compute(&nodes, &pods);
        assert_eq!(usage.cpu, ResourceUsage::new(2.0, 8.0));
        assert_eq!(usage.memory.used, 2.5);
        assert_eq!(usage.memory.available, 16.0);
        assert_eq!(usage.cpu.percentage, 25.0);
    }

    #[test]
    fn test_nodes_without_status_are_skipped() {
        let (cpu, memory) = allocatable_totals(&[Node::default(), node("2", "1Gi")]);
        assert_eq!(cpu, 2.0);
        assert_eq!(memory, 1.0);
    }
}
