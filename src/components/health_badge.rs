use dioxus::prelude::*;

use crate::views::tray_state::TrayIcon;

#[derive(Props, PartialEq, Clone)]
pub struct HealthBadgeProps {
    icon: TrayIcon,
    status: String,
}

#[component]
pub fn HealthBadge(props: HealthBadgeProps) -> Element {
    rsx! {
        div { class: "health-badge",
            span {
                class: "health-dot {props.icon.css_class()}",
                title: "{props.icon.label()}",
            }
            span { class: "health-status", "{props.status}" }
        }
    }
}
