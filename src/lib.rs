pub mod cli;
pub mod hotkey;
pub mod logging;
pub mod overlay;
pub mod server;
pub mod settings;
pub mod shutdown;
pub mod text;
