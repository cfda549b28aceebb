use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::trace;

use crate::k8s::{ClusterSnapshot, NamespaceScope};

/// Receiver of everything the reconciler publishes, in publish order.
pub trait Presenter: Send + 'static {
    fn on_snapshot(&self, snapshot: Arc<ClusterSnapshot>);

    /// A fetch failed; `message` is meant for the user.
    fn on_error(&self, message: String);

    /// The context changed; anything shown for the old cluster is stale.
    fn on_connecting(&self);

    /// The namespace changed; pod lists for the old namespace are stale.
    fn on_namespace_switched(&self, namespace: &NamespaceScope);
}

#[derive(Debug, Clone, PartialEq)]
pub enum PresenterEvent {
    Snapshot(Arc<ClusterSnapshot>),
    Error(String),
    Connecting,
    NamespaceSwitched(NamespaceScope),
}

/// Forwards published events over an unbounded channel to a consumer on
/// another task (the UI).
#[derive(Clone)]
pub struct ChannelPresenter {
    tx: mpsc::UnboundedSender<PresenterEvent>,
}

impl ChannelPresenter {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<PresenterEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn send(&self, event: PresenterEvent) {
        if self.tx.send(event).is_err() {
            trace!("presenter is gone, dropping event");
        }
    }
}

impl Presenter for ChannelPresenter {
    fn on_snapshot(&self, snapshot: Arc<ClusterSnapshot>) {
        self.send(PresenterEvent::Snapshot(snapshot));
    }

    fn on_error(&self, message: String) {
        self.send(PresenterEvent::Error(message));
    }

    fn on_connecting(&self) {
        self.send(PresenterEvent::Connecting);
    }

    fn on_namespace_switched(&self, namespace: &NamespaceScope) {
        self.send(PresenterEvent::NamespaceSwitched(namespace.clone()));
    }
}
