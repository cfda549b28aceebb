use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::k8s::NamespaceScope;
use crate::utils::config::clamp_interval;

/// Parameters of every future fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationTarget {
    /// `None` follows the kubeconfig's current-context.
    pub context: Option<String>,
    pub namespace: NamespaceScope,
    pub interval: Duration,
}

impl ReconciliationTarget {
    pub fn new(context: Option<String>, namespace: NamespaceScope, interval: Duration) -> Self {
        Self {
            context,
            namespace,
            interval: clamp_interval(interval),
        }
    }
}

/// The single slot shared between the action side and the loop.
#[derive(Debug, Clone)]
pub(crate) struct TargetState {
    pub target: ReconciliationTarget,
    /// Bumped on every target mutation.
    pub generation: u64,
    /// Bumped on every refresh request.
    pub refresh_seq: u64,
}

/// Fire-and-forget control surface of a running reconciler. Cheap to clone;
/// none of its methods block or wait for a fetch.
#[derive(Clone)]
pub struct ReconcilerHandle {
    state: Arc<watch::Sender<TargetState>>,
    shutdown: CancellationToken,
}

impl ReconcilerHandle {
    pub(crate) fn new(
        target: ReconciliationTarget,
    ) -> (Self, watch::Receiver<TargetState>, CancellationToken) {
        let (tx, rx) = watch::channel(TargetState {
            target,
            generation: 0,
            refresh_seq: 0,
        });
        let shutdown = CancellationToken::new();
        let handle = Self {
            state: Arc::new(tx),
            shutdown: shutdown.clone(),
        };
        (handle, rx, shutdown)
    }

    fn mutate(&self, apply: impl FnOnce(&mut ReconciliationTarget)) {
        self.state.send_modify(|state| {
            apply(&mut state.target);
            state.generation += 1;
        });
    }

    pub fn request_refresh(&self) {
        self.state.send_modify(|state| state.refresh_seq += 1);
    }

    pub fn set_namespace(&self, namespace: NamespaceScope) {
        info!(namespace = %namespace, "switching namespace");
        self.mutate(|target| target.namespace = namespace);
    }

    pub fn set_context(&self, context: impl Into<String>) {
        let context = context.into();
        info!(context = %context, "switching context");
        self.mutate(|target| target.context = Some(context));
    }

    /// The interval is clamped into the supported range.
    pub fn set_poll_interval(&self, interval: Duration) {
        let interval = clamp_interval(interval);
        info!(interval = ?interval, "changing refresh interval");
        self.mutate(|target| target.interval = interval);
    }

    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    pub fn target(&self) -> ReconciliationTarget {
        self.state.borrow().target.clone()
    }

    pub fn generation(&self) -> u64 {
        self.state.borrow().generation
    }
}
