use dioxus::prelude::*;

#[derive(Props, PartialEq, Clone)]
pub struct ContextSelectorProps {
    contexts: Vec<String>,
    /// `None` while following the kubeconfig's current-context
    selected_context: Option<String>,
    on_change: EventHandler<String>,
}

#[component]
pub fn ContextSelector(props: ContextSelectorProps) -> Element {
    let selected = props.selected_context.clone().unwrap_or_default();

    rsx! {
        select {
            class: "context-select",
            value: "{selected}",
            onchange: move |evt| {
                let context = evt.value();
                if !context.is_empty() {
                    props.on_change.call(context);
                }
            },
            {props.selected_context.is_none().then(|| rsx! {
                option { value: "", disabled: true, selected: true, "(current context)" }
            })}
            {props.contexts.iter().map(|context| {
                rsx! {
                    option {
                        key: "{context}",
                        value: "{context}",
                        selected: *context == selected,
                        "{context}"
                    }
                }
            })}
        }
    }
}
