//! Background reconciliation: the polling loop, its control handle and the
//! presenter it publishes to.
pub mod presenter;
pub mod reconciler;
pub mod target;

pub use presenter::*;
pub use reconciler::*;
pub use target::*;
