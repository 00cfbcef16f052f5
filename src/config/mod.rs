#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::{GenerateCli, SyncCli, TouchCli};
pub use toml_config::{AppConfig, FolderErrorPolicy};
