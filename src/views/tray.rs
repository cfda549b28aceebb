use std::time::Duration;

use dioxus::prelude::*;
use tracing::info;

use crate::components::{ContextSelector, HealthBadge, IntervalSelector, NamespaceSelector, PodBucketRow};
use crate::config::TrayConfig;
use crate::contexts::KubeconfigSource;
use crate::k8s::NamespaceScope;
use crate::reconcile::{ChannelPresenter, Reconciler, ReconcilerHandle, ReconciliationTarget};
use crate::views::tray_state::TrayState;

/// Starts the reconciler for the configured target and renders whatever it
/// publishes. Closing happens from the Quit button or when the loop ends.
#[component]
pub fn TrayMenu() -> Element {
    let config = use_context::<TrayConfig>();
    let window = dioxus_desktop::use_window();

    let tray = use_signal(|| TrayState::new(config.namespace.clone()));
    let mut selected_context = use_signal(|| config.context.clone());
    let mut selected_interval = use_signal(|| config.poll_interval);

    let handle: ReconcilerHandle = use_hook(|| {
        let (presenter, mut events) = ChannelPresenter::new();
        let target = ReconciliationTarget::new(
            config.context.clone(),
            config.namespace.clone(),
            config.poll_interval,
        );
        let factory = KubeconfigSource::new(config.kubeconfig.clone());
        let (reconciler, handle) = Reconciler::new(factory, presenter, target, config.show_metrics);
        tokio::spawn(reconciler.run());

        let interrupt = handle.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("interrupt received, shutting down");
                interrupt.shutdown();
            }
        });

        let window = window.clone();
        let mut tray = tray;
        spawn(async move {
            while let Some(event) = events.recv().await {
                tray.write().apply(event);
            }
            // the presenter is dropped only when the loop has ended
            window.close();
        });

        handle
    });

    let state = tray.read();
    let updated = state
        .updated_at
        .map(|at| at.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "never".to_string());
    let data_class = if state.stale { "menu-section stale" } else { "menu-section" };

    let namespace_handle = handle.clone();
    let context_handle = handle.clone();
    let interval_handle = handle.clone();
    let refresh_handle = handle.clone();
    let quit_handle = handle.clone();
    let quit_window = window.clone();

    rsx! {
        div { class: "tray-menu", title: "{state.tooltip}",
            HealthBadge { icon: state.icon, status: state.status.clone() }

            {state.stale.then(|| rsx! {
                div { class: "stale-note", "Showing data from {updated}" }
            })}

            div { class: data_class,
                div { class: "menu-item disabled", "{state.cluster}" }
                div { class: "menu-item disabled", "{state.namespace}" }
                {state.cpu.as_ref().map(|cpu| rsx! {
                    div { class: "menu-item disabled", "{cpu}" }
                })}
                {state.memory.as_ref().map(|memory| rsx! {
                    div { class: "menu-item disabled", "{memory}" }
                })}
            }

            div { class: data_class,
                div { class: "menu-item disabled", "{state.pods_total}" }
                for row in state.visible_buckets() {
                    PodBucketRow { key: "{row.bucket.label()}", row: row.clone() }
                }
            }

            div { class: "menu-section",
                label { class: "menu-label", "Namespace" }
                NamespaceSelector {
                    namespaces: state.namespaces.clone(),
                    selected_namespace: state.scope.clone(),
                    on_change: move |namespace: NamespaceScope| namespace_handle.set_namespace(namespace),
                }

                label { class: "menu-label", "Context" }
                ContextSelector {
                    contexts: state.contexts.clone(),
                    selected_context: selected_context(),
                    on_change: move |context: String| {
                        selected_context.set(Some(context.clone()));
                        context_handle.set_context(context);
                    },
                }

                label { class: "menu-label", "Refresh interval" }
                IntervalSelector {
                    selected_interval: selected_interval(),
                    on_change: move |interval: Duration| {
                        selected_interval.set(interval);
                        interval_handle.set_poll_interval(interval);
                    },
                }
            }

            div { class: "menu-footer",
                span { class: "last-updated", "Last updated: {updated}" }
                button {
                    class: "btn",
                    onclick: move |_| refresh_handle.request_refresh(),
                    "Refresh Now"
                }
                button {
                    class: "btn btn-quit",
                    onclick: move |_| {
                        quit_handle.shutdown();
                        quit_window.close();
                    },
                    "Quit"
                }
            }
        }
    }
}
