//! The tray window and the state it renders.

mod tray;
pub use tray::TrayMenu;

pub mod tray_state;
pub use tray_state::TrayState;
