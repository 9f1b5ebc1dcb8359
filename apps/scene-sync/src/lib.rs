pub mod commands;
pub mod config;
pub mod error;
pub mod service;

pub use config::{Cli, Command, Config, EditCommand, PreviewArgs};
pub use error::{Error, Result};
pub use service::SceneSyncService;
