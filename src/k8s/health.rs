use std::fmt;
use std::time::Duration;

use k8s_openapi::api::core::v1::Pod;
use k8s_openapi::chrono::{DateTime, Utc};

/// Overall health of the observed pods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HealthVerdict {
    #[default]
    Unknown,
    Healthy,
    Warning,
    Critical,
}

impl fmt::Display for HealthVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            HealthVerdict::Healthy => "Healthy",
            HealthVerdict::Warning => "Warning",
            HealthVerdict::Critical => "Critical",
            HealthVerdict::Unknown => "Unknown",
        };
        write!(f, "{}", label)
    }
}

/// Pod phase as reported by the API server. Any value outside the five
/// documented phases is treated as `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PodPhase {
    Pending,
    Running,
    Succeeded,
    Failed,
    Unknown,
}

impl PodPhase {
    pub fn parse(phase: Option<&str>) -> Self {
        match phase {
            Some("Pending") => PodPhase::Pending,
            Some("Running") => PodPhase::Running,
            Some("Succeeded") => PodPhase::Succeeded,
            Some("Failed") => PodPhase::Failed,
            _ => PodPhase::Unknown,
        }
    }
}

impl fmt::Display for PodPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PodPhase::Pending => "Pending",
            PodPhase::Running => "Running",
            PodPhase::Succeeded => "Succeeded",
            PodPhase::Failed => "Failed",
            PodPhase::Unknown => "Unknown",
        };
        write!(f, "{}", label)
    }
}

/// The buckets a pod is counted in. Every pod lands in exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PodBucket {
    RunningReady,
    RunningNotReady,
    Pending,
    Completed,
    Failed,
    Unknown,
}

impl PodBucket {
    pub fn label(&self) -> &'static str {
        match self {
            PodBucket::RunningReady => "Ready",
            PodBucket::RunningNotReady => "Not Ready",
            PodBucket::Pending => "Pending",
            PodBucket::Completed => "Completed",
            PodBucket::Failed => "Failed",
            PodBucket::Unknown => "Unknown",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            PodBucket::RunningReady => "🟢",
            PodBucket::RunningNotReady => "🛑",
            PodBucket::Pending => "⏳",
            PodBucket::Completed => "✅",
            PodBucket::Failed => "❌",
            PodBucket::Unknown => "❔",
        }
    }
}

/// One pod at observation time.
#[derive(Debug, Clone, PartialEq)]
pub struct PodObservation {
    pub name: String,
    pub namespace: String,
    pub phase: PodPhase,
    pub ready: bool,
    pub restarts: u32,
    pub age: Duration,
}

impl PodObservation {
    pub fn from_pod(pod: &Pod, now: DateTime<Utc>) -> Self {
        let age = pod
            .metadata
            .creation_timestamp
            .as_ref()
            .and_then(|created| now.signed_duration_since(created.0).to_std().ok())
            .unwrap_or_default();

        PodObservation {
            name: pod.metadata.name.clone().unwrap_or_default(),
            namespace: pod.metadata.namespace.clone().unwrap_or_default(),
            phase: PodPhase::parse(pod.status.as_ref().and_then(|s| s.phase.as_deref())),
            ready: is_pod_ready(pod),
            restarts: restart_count(pod),
            age,
        }
    }

    pub fn bucket(&self) -> PodBucket {
        match self.phase {
            PodPhase::Running if self.ready => PodBucket::RunningReady,
            PodPhase::Running => PodBucket::RunningNotReady,
            PodPhase::Pending => PodBucket::Pending,
            PodPhase::Succeeded => PodBucket::Completed,
            PodPhase::Failed => PodBucket::Failed,
            PodPhase::Unknown => PodBucket::Unknown,
        }
    }
}

/// A pod is ready iff it reports a `Ready` condition with status `True`.
pub fn is_pod_ready(pod: &Pod) -> bool {
    pod.status
        .as_ref()
        .and_then(|status| status.conditions.as_ref())
        .and_then(|conditions| conditions.iter().find(|c| c.type_ == "Ready"))
        .map(|condition| condition.status == "True")
        .unwrap_or(false)
}

/// Sum of restarts across all containers of the pod.
pub fn restart_count(pod: &Pod) -> u32 {
    pod.status
        .as_ref()
        .and_then(|status| status.container_statuses.as_ref())
        .map(|containers| {
            containers
                .iter()
                .map(|c| c.restart_count.max(0) as u32)
                .fold(0u32, u32::saturating_add)
        })
        .unwrap_or(0)
}

/// Per-bucket pod counts; `total` always equals the sum of the buckets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PodAggregate {
    pub total: usize,
    pub running_ready: usize,
    pub running_not_ready: usize,
    pub pending: usize,
    pub completed: usize,
    pub failed: usize,
    pub unknown: usize,
}

impl PodAggregate {
    pub fn from_pods(pods: &[PodObservation]) -> Self {
        let mut aggregate = PodAggregate::default();
        for pod in pods {
            aggregate.total += 1;
            match pod.bucket() {
                PodBucket::RunningReady => aggregate.running_ready += 1,
                PodBucket::RunningNotReady => aggregate.running_not_ready += 1,
                PodBucket::Pending => aggregate.pending += 1,
                PodBucket::Completed => aggregate.completed += 1,
                PodBucket::Failed => aggregate.failed += 1,
                PodBucket::Unknown => aggregate.unknown += 1,
            }
        }
        aggregate
    }

    pub fn count(&self, bucket: PodBucket) -> usize {
        match bucket {
            PodBucket::RunningReady => self.running_ready,
            PodBucket::RunningNotReady => self.running_not_ready,
            PodBucket::Pending => self.pending,
            PodBucket::Completed => self.completed,
            PodBucket::Failed => self.failed,
            PodBucket::Unknown => self.unknown,
        }
    }
}

/// Reduces an aggregate to one verdict. The first matching rule wins:
/// any failed pod is critical, then anything pending, unknown or not ready
/// is a warning, then at least one ready pod is healthy. Nothing observed
/// is unknown.
pub fn classify(aggregate: &PodAggregate) -> HealthVerdict {
    if aggregate.failed > 0 {
        HealthVerdict::Critical
    } else if aggregate.pending > 0 || aggregate.unknown > 0 || aggregate.running_not_ready > 0 {
        HealthVerdict::Warning
    } else if aggregate.running_ready > 0 {
        HealthVerdict::Healthy
    } else {
        HealthVerdict::Unknown
    }
}
