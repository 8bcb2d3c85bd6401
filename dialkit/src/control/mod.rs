pub mod config;
pub mod dial_kit;
pub mod dial_store;
pub mod resolve;
pub mod ui_controls;

pub use config::*;
pub use dial_kit::*;
pub use dial_store::*;
pub use resolve::*;
pub use ui_controls::*;
