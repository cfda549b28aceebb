use dioxus::prelude::*;
use dioxus_desktop::{Config, WindowBuilder};
use tracing_subscriber::EnvFilter;

mod components;
mod config;
mod contexts;
mod k8s;
mod reconcile;
mod utils;
mod views;

use config::TrayConfig;
use utils::config::APP_NAME;
use views::TrayMenu;

const MAIN_CSS: Asset = asset!("/assets/styling/main.css");

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("kubetray=info")),
        )
        .init();

    let config = match TrayConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}: {}", APP_NAME, e);
            std::process::exit(1);
        }
    };
    tracing::info!(kubeconfig = %config.kubeconfig.display(), "loaded configuration");

    LaunchBuilder::desktop()
        .with_cfg(
            Config::new().with_window(
                WindowBuilder::new().with_title(APP_NAME)
            ),
        )
        .with_context(config)
        .launch(App);
}

#[component]
fn App() -> Element {
    rsx! {
        document::Link { rel: "stylesheet", href: MAIN_CSS }
        TrayMenu {}
    }
}
