use std::time::Duration;

use dioxus::prelude::*;

use crate::utils::config::INTERVAL_PRESETS;
use crate::utils::interval_label;

#[derive(Props, PartialEq, Clone)]
pub struct IntervalSelectorProps {
    selected_interval: Duration,
    on_change: EventHandler<Duration>,
}

#[component]
pub fn IntervalSelector(props: IntervalSelectorProps) -> Element {
    rsx! {
        select {
            class: "interval-select",
            value: "{props.selected_interval.as_secs()}",
            onchange: move |evt| {
                if let Ok(secs) = evt.value().parse::<u64>() {
                    props.on_change.call(Duration::from_secs(secs));
                }
            },
            {INTERVAL_PRESETS.iter().map(|interval| {
                let current = *interval == props.selected_interval;
                let label = interval_label(*interval);
                rsx! {
                    option {
                        key: "{interval.as_secs()}",
                        value: "{interval.as_secs()}",
                        selected: current,
                        if current { "✓ {label}" } else { "{label}" }
                    }
                }
            })}
        }
    }
}
