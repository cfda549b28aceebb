//! Shared building blocks of the tray window: the health badge, pod bucket
//! rows and the selectors that drive the reconciler.

mod context_selector;
pub use context_selector::ContextSelector;

mod health_badge;
pub use health_badge::HealthBadge;

mod interval_selector;
pub use interval_selector::IntervalSelector;

mod namespace_selector;
pub use namespace_selector::NamespaceSelector;

mod pod_bucket_row;
pub use pod_bucket_row::PodBucketRow;
