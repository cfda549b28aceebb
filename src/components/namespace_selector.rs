use dioxus::prelude::*;

use crate::k8s::NamespaceScope;
use crate::utils::config::ALL_NAMESPACES;

#[derive(Props, PartialEq, Clone)]
pub struct NamespaceSelectorProps {
    namespaces: Vec<String>,
    selected_namespace: NamespaceScope,
    on_change: EventHandler<NamespaceScope>,
}

#[component]
pub fn NamespaceSelector(props: NamespaceSelectorProps) -> Element {
    let mut options = props.namespaces.clone();
    // keep the active namespace selectable while the catalog is loading
    if let NamespaceScope::Named(current) = &props.selected_namespace {
        if !options.contains(current) {
            options.insert(0, current.clone());
        }
    }

    rsx! {
        select {
            class: "namespace-select",
            value: "{props.selected_namespace.as_setting()}",
            onchange: move |evt| {
                props.on_change.call(NamespaceScope::from_setting(&evt.value()));
            },
            option {
                value: ALL_NAMESPACES,
                selected: props.selected_namespace.is_all(),
                "All Namespaces"
            }
            {options.iter().map(|ns| {
                let selected = props.selected_namespace.as_setting() == ns.as_str();
                rsx! {
                    option {
                        key: "{ns}",
                        value: "{ns}",
                        selected: selected,
                        "{ns}"
                    }
                }
            })}
        }
    }
}
