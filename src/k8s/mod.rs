pub mod client;
pub mod cluster_resources;
pub mod health;
pub mod quantity;
pub mod scope;
pub mod snapshot;

#[cfg(test)]
pub mod fake;

pub use client::*;
pub use cluster_resources::*;
pub use health::*;
pub use scope::*;
pub use snapshot::*;
