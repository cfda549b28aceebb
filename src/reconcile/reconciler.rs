use std::sync::Arc;

use futures::future::BoxFuture;
use futures::stream::FuturesUnordered;
use futures::{FutureExt, StreamExt};
use k8s_openapi::chrono::Utc;
use tokio::sync::watch;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use super::presenter::Presenter;
use super::target::{ReconcilerHandle, ReconciliationTarget, TargetState};
use crate::contexts::FetchError;
use crate::k8s::{fetch_snapshot, ClientFactory, ClusterSnapshot, FetchRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopState {
    Idle,
    Fetching,
    Publishing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchCause {
    Startup,
    Tick,
    Refresh,
    TargetChanged,
}

struct FetchOutcome<C> {
    generation: u64,
    /// Set when the fetch had to build its own client.
    client: Option<Arc<C>>,
    result: Result<ClusterSnapshot, FetchError>,
}

/// Polls the cluster on an interval and publishes every outcome to a
/// [`Presenter`].
///
/// The loop is the only owner of the client handle and the only publisher.
/// It waits on cancellation, target updates, in-flight fetches and the tick
/// deadline at the same time, so actions are picked up while a fetch is
/// still running. A fetch result is dropped if the context or namespace
/// changed after the fetch started.
pub struct Reconciler<F: ClientFactory, P: Presenter> {
    factory: Arc<F>,
    presenter: P,
    client: Option<Arc<F::Client>>,
    target: ReconciliationTarget,
    metrics_enabled: bool,
    generation: u64,
    /// Results of fetches started before this generation are stale.
    valid_since: u64,
    published: u64,
    refresh_seq: u64,
    refresh_pending: bool,
    state: LoopState,
    next_tick: Option<Instant>,
    updates: watch::Receiver<TargetState>,
    shutdown: CancellationToken,
    in_flight: FuturesUnordered<BoxFuture<'static, FetchOutcome<F::Client>>>,
}

impl<F: ClientFactory, P: Presenter> Reconciler<F, P> {
    pub fn new(
        factory: F,
        presenter: P,
        target: ReconciliationTarget,
        metrics_enabled: bool,
    ) -> (Self, ReconcilerHandle) {
        let (handle, updates, shutdown) = ReconcilerHandle::new(target.clone());
        let reconciler = Self {
            factory: Arc::new(factory),
            presenter,
            client: None,
            target,
            metrics_enabled,
            generation: 0,
            valid_since: 0,
            published: 0,
            refresh_seq: 0,
            refresh_pending: false,
            state: LoopState::Idle,
            next_tick: None,
            updates,
            shutdown,
            in_flight: FuturesUnordered::new(),
        };
        (reconciler, handle)
    }

    /// Runs until [`ReconcilerHandle::shutdown`] is called or every handle is
    /// dropped. Fetch errors never end the loop.
    pub async fn run(mut self) {
        info!(
            context = self.target.context.as_deref().unwrap_or("(current)"),
            namespace = %self.target.namespace,
            interval = ?self.target.interval,
            "starting monitoring"
        );
        self.presenter.on_connecting();
        self.start_fetch(FetchCause::Startup);

        loop {
            let next_tick = self.next_tick;
            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => {
                    info!("monitoring stopped");
                    break;
                }
                changed = self.updates.changed() => {
                    if changed.is_err() {
                        info!("all handles dropped, monitoring stopped");
                        break;
                    }
                    self.apply_update();
                }
                Some(outcome) = self.in_flight.next(), if !self.in_flight.is_empty() => {
                    self.complete(outcome);
                }
                _ = wait_for_tick(next_tick) => {
                    self.start_fetch(FetchCause::Tick);
                }
            }
        }
    }

    fn apply_update(&mut self) {
        let update = self.updates.borrow_and_update().clone();

        let refresh_requested = update.refresh_seq != self.refresh_seq;
        self.refresh_seq = update.refresh_seq;

        if update.generation != self.generation {
            let previous = std::mem::replace(&mut self.target, update.target);
            self.generation = update.generation;

            let context_changed = previous.context != self.target.context;
            let namespace_changed = previous.namespace != self.target.namespace;

            if context_changed {
                info!(
                    generation = self.generation,
                    context = self.target.context.as_deref().unwrap_or("(current)"),
                    "switched context"
                );
                self.client = None;
                self.valid_since = self.generation;
                self.presenter.on_connecting();
            } else if namespace_changed {
                info!(generation = self.generation, namespace = %self.target.namespace, "switched namespace");
                self.valid_since = self.generation;
                self.presenter.on_namespace_switched(&self.target.namespace);
            }

            if previous.interval != self.target.interval {
                info!(interval = ?self.target.interval, "updated monitoring interval");
            }

            // An interval-only change does not invalidate the running fetch;
            // the new interval is used when that fetch re-arms the timer.
            if context_changed || namespace_changed || self.state != LoopState::Fetching {
                // also serves a refresh that arrived with this change
                self.start_fetch(FetchCause::TargetChanged);
            } else if refresh_requested {
                self.refresh_pending = true;
            }
        } else if refresh_requested {
            if self.state == LoopState::Fetching {
                self.refresh_pending = true;
            } else {
                self.start_fetch(FetchCause::Refresh);
            }
        }
    }

    fn start_fetch(&mut self, cause: FetchCause) {
        let generation = self.generation;
        let factory = self.factory.clone();
        let client = self.client.clone();
        let request = FetchRequest {
            context: self.target.context.clone(),
            scope: self.target.namespace.clone(),
            metrics_enabled: self.metrics_enabled,
        };

        debug!(generation, ?cause, namespace = %request.scope, "starting fetch");
        self.transition(LoopState::Fetching);
        self.next_tick = None;

        let fetch = async move {
            let (client, built) = match client {
                Some(client) => (client, false),
                None => match factory.connect(request.context.as_deref()).await {
                    Ok(client) => (Arc::new(client), true),
                    Err(source) => {
                        let context = request
                            .context
                            .clone()
                            .unwrap_or_else(|| "(current)".to_string());
                        return FetchOutcome {
                            generation,
                            client: None,
                            result: Err(FetchError::Connect { context, source }),
                        };
                    }
                },
            };

            let result = fetch_snapshot(factory.as_ref(), client.as_ref(), &request, Utc::now()).await;
            FetchOutcome {
                generation,
                client: built.then_some(client),
                result,
            }
        };
        self.in_flight.push(fetch.boxed());
    }

    fn complete(&mut self, outcome: FetchOutcome<F::Client>) {
        if self.shutdown.is_cancelled() {
            return;
        }
        if outcome.generation < self.valid_since || outcome.generation < self.published {
            debug!(
                generation = outcome.generation,
                current = self.generation,
                "dropping stale fetch result"
            );
            return;
        }

        if let Some(client) = outcome.client {
            if self.client.is_none() {
                self.client = Some(client);
            }
        }

        self.transition(LoopState::Publishing);
        self.published = outcome.generation;
        match outcome.result {
            Ok(snapshot) => {
                debug!(
                    generation = outcome.generation,
                    health = %snapshot.health,
                    total = snapshot.pods.total,
                    "refreshed cluster status"
                );
                self.presenter.on_snapshot(Arc::new(snapshot));
            }
            Err(e) => {
                warn!(generation = outcome.generation, error = %e, "failed to get cluster status");
                self.presenter.on_error(e.to_string());
            }
        }
        self.transition(LoopState::Idle);

        if std::mem::take(&mut self.refresh_pending) {
            self.start_fetch(FetchCause::Refresh);
        } else {
            self.next_tick = Some(Instant::now() + self.target.interval);
        }
    }

    fn transition(&mut self, next: LoopState) {
        trace!(from = ?self.state, to = ?next, "loop state");
        self.state = next;
    }
}

async fn wait_for_tick(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
