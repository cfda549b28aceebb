use k8s_openapi::chrono::{DateTime, Utc};

use crate::k8s::{ClusterSnapshot, HealthVerdict, NamespaceScope, PodBucket, PodObservation, ResourceUsage};
use crate::reconcile::PresenterEvent;
use crate::utils::config::APP_NAME;
use crate::utils::format_age;

/// Buckets that get their own menu row and drill-down.
pub const LISTED_BUCKETS: [PodBucket; 5] = [
    PodBucket::RunningReady,
    PodBucket::RunningNotReady,
    PodBucket::Pending,
    PodBucket::Completed,
    PodBucket::Failed,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrayIcon {
    #[default]
    Connecting,
    Unknown,
    Healthy,
    Warning,
    Critical,
    Error,
}

impl TrayIcon {
    pub fn from_verdict(verdict: HealthVerdict) -> Self {
        match verdict {
            HealthVerdict::Healthy => TrayIcon::Healthy,
            HealthVerdict::Warning => TrayIcon::Warning,
            HealthVerdict::Critical => TrayIcon::Critical,
            HealthVerdict::Unknown => TrayIcon::Unknown,
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            TrayIcon::Connecting | TrayIcon::Unknown => "icon-gray",
            TrayIcon::Healthy => "icon-green",
            TrayIcon::Warning => "icon-yellow",
            TrayIcon::Critical => "icon-red",
            TrayIcon::Error => "icon-error",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TrayIcon::Connecting => "Connecting",
            TrayIcon::Unknown => "Unknown",
            TrayIcon::Healthy => "Healthy",
            TrayIcon::Warning => "Warning",
            TrayIcon::Critical => "Critical",
            TrayIcon::Error => "Error",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PodEntry {
    pub key: String,
    pub display_name: String,
    pub tooltip: String,
}

impl PodEntry {
    fn new(pod: &PodObservation, scope: &NamespaceScope) -> Self {
        let display_name = if scope.is_all() {
            format!("{} ({})", pod.name, pod.namespace)
        } else {
            pod.name.clone()
        };

        let mut tooltip = format!(
            "Pod: {}\nNamespace: {}\nPhase: {}\nReady: {}",
            pod.name, pod.namespace, pod.phase, pod.ready
        );
        if pod.restarts > 0 {
            tooltip.push_str(&format!("\nRestarts: {}", pod.restarts));
        }
        tooltip.push_str(&format!("\nAge: {}", format_age(pod.age)));

        PodEntry {
            key: format!("{}/{}", pod.namespace, pod.name),
            display_name,
            tooltip,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BucketRow {
    pub bucket: PodBucket,
    pub count: usize,
    pub pods: Vec<PodEntry>,
}

impl BucketRow {
    fn empty(bucket: PodBucket) -> Self {
        BucketRow {
            bucket,
            count: 0,
            pods: Vec::new(),
        }
    }

    pub fn title(&self) -> String {
        format!("{} {}: {}", self.bucket.icon(), self.bucket.label(), self.count)
    }

    /// Empty buckets are hidden from the menu.
    pub fn visible(&self) -> bool {
        self.count > 0
    }
}

/// Everything the tray shows, rebuilt from the events the reconciler
/// publishes.
#[derive(Debug, Clone, PartialEq)]
pub struct TrayState {
    pub icon: TrayIcon,
    pub status: String,
    pub cluster: String,
    pub namespace: String,
    pub cpu: Option<String>,
    pub memory: Option<String>,
    pub pods_total: String,
    pub buckets: Vec<BucketRow>,
    pub tooltip: String,
    pub scope: NamespaceScope,
    pub namespaces: Vec<String>,
    pub contexts: Vec<String>,
    pub updated_at: Option<DateTime<Utc>>,
    /// Cluster and pod rows are from before the last failed fetch.
    pub stale: bool,
}

impl TrayState {
    pub fn new(scope: NamespaceScope) -> Self {
        let mut state = TrayState {
            icon: TrayIcon::Connecting,
            status: String::new(),
            cluster: String::new(),
            namespace: String::new(),
            cpu: None,
            memory: None,
            pods_total: String::new(),
            buckets: Vec::new(),
            tooltip: String::new(),
            scope,
            namespaces: Vec::new(),
            contexts: Vec::new(),
            updated_at: None,
            stale: false,
        };
        state.set_connecting();
        state
    }

    pub fn apply(&mut self, event: PresenterEvent) {
        match event {
            PresenterEvent::Snapshot(snapshot) => self.set_snapshot(&snapshot),
            PresenterEvent::Error(message) => self.set_error(&message),
            PresenterEvent::Connecting => self.set_connecting(),
            PresenterEvent::NamespaceSwitched(scope) => self.set_namespace(scope),
        }
    }

    /// Rows shown in the pods section, in menu order.
    pub fn visible_buckets(&self) -> impl Iterator<Item = &BucketRow> {
        self.buckets.iter().filter(|row| row.visible())
    }

    fn set_connecting(&mut self) {
        self.icon = TrayIcon::Connecting;
        self.status = "Status: Connecting...".to_string();
        self.cluster = "Cluster: Unknown".to_string();
        self.namespace = "Namespace: Loading...".to_string();
        self.cpu = None;
        self.memory = None;
        self.clear_pods();
        // namespaces belong to the old cluster; contexts come from the kubeconfig
        self.namespaces.clear();
        self.tooltip = format!("{} - Connecting...", APP_NAME);
        self.updated_at = None;
        self.stale = false;
    }

    fn set_namespace(&mut self, scope: NamespaceScope) {
        self.namespace = format!("Namespace: {}", scope);
        self.scope = scope;
        self.clear_pods();
    }

    fn set_error(&mut self, message: &str) {
        self.icon = TrayIcon::Error;
        self.status = format!("Status: Error - {}", message);
        self.tooltip = format!("{} - Error: {}", APP_NAME, message);
        self.stale = self.updated_at.is_some();
    }

    fn set_snapshot(&mut self, snapshot: &ClusterSnapshot) {
        self.icon = TrayIcon::from_verdict(snapshot.health);
        self.scope = snapshot.scope.clone();
        self.status = format!("Status: {}", snapshot.health);
        self.cluster = format!("Cluster: {} ({})", snapshot.cluster_name, snapshot.server_version);
        self.namespace = format!("Namespace: {}", snapshot.scope);
        self.cpu = snapshot.resources.map(|r| format_cpu(&r.cpu));
        self.memory = snapshot.resources.map(|r| format_memory(&r.memory));
        self.pods_total = format!("Pods: {} total", snapshot.pods.total);
        self.buckets = LISTED_BUCKETS
            .iter()
            .map(|&bucket| BucketRow {
                bucket,
                count: snapshot.pods.count(bucket),
                pods: snapshot
                    .pods_in(bucket)
                    .map(|pod| PodEntry::new(pod, &snapshot.scope))
                    .collect(),
            })
            .collect();

        if let Some(namespaces) = &snapshot.namespaces {
            self.namespaces = namespaces.clone();
        }
        if let Some(contexts) = &snapshot.contexts {
            self.contexts = contexts.clone();
        }

        let mut tooltip = format!(
            "{} - {}\nCluster: {} ({})\nNamespace: {}\nPods: {} total",
            APP_NAME,
            snapshot.health,
            snapshot.cluster_name,
            snapshot.server_version,
            snapshot.scope,
            snapshot.pods.total
        );
        if snapshot.pods.unknown > 0 {
            tooltip.push_str(&format!("\nUnknown: {}", snapshot.pods.unknown));
        }
        if let (Some(cpu), Some(memory)) = (&self.cpu, &self.memory) {
            tooltip.push_str(&format!("\n{}\n{}", cpu, memory));
        }
        self.tooltip = tooltip;
        self.updated_at = Some(snapshot.captured_at);
        self.stale = false;
    }

    fn clear_pods(&mut self) {
        self.pods_total = "Pods: Loading...".to_string();
        self.buckets = LISTED_BUCKETS.iter().map(|&b| BucketRow::empty(b)).collect();
    }
}

pub fn format_cpu(usage: &ResourceUsage) -> String {
    format!(
        "CPU: {:.1}/{:.1} cores ({:.1}%)",
        usage.used, usage.available, usage.percentage
    )
}

pub fn format_memory(usage: &ResourceUsage) -> String {
    format!(
        "Memory: {:.1}/{:.1} GB ({:.1}%)",
        usage.used, usage.available, usage.percentage
    )
}
