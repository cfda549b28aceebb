use dioxus::prelude::*;

use crate::views::tray_state::BucketRow;

#[derive(Props, PartialEq, Clone)]
pub struct PodBucketRowProps {
    row: BucketRow,
}

/// One pod bucket row; expands into the pods it holds.
#[component]
pub fn PodBucketRow(props: PodBucketRowProps) -> Element {
    let mut is_expanded = use_signal(|| false);
    let has_pods = !props.row.pods.is_empty();

    rsx! {
        div { class: "bucket-row",
            div {
                class: "menu-item bucket-header",
                onclick: move |_| {
                    if has_pods {
                        is_expanded.set(!is_expanded());
                    }
                },
                span { "{props.row.title()}" }
                {has_pods.then(|| rsx! {
                    span { class: "expand-toggle", if is_expanded() { "▾" } else { "▸" } }
                })}
            }

            {(is_expanded() && has_pods).then(|| rsx! {
                ul { class: "bucket-pods",
                    for pod in props.row.pods.iter() {
                        li {
                            key: "{pod.key}",
                            class: "pod-entry",
                            title: "{pod.tooltip}",
                            "{pod.display_name}"
                        }
                    }
                }
            })}
        }
    }
}
