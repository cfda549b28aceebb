// Kubeconfig access and error types shared by the rest of the app
pub mod error;
pub mod kubeconfig;

pub use error::*;
pub use kubeconfig::*;
