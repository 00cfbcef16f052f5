pub mod adapters;
pub mod app;
pub mod config;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{GenerateCli, SyncCli, TouchCli};

pub use adapters::{Credentials, DropboxStore, TwentyClient};
pub use app::sync::{FolderPlan, FolderSync};
pub use config::{AppConfig, FolderErrorPolicy};
pub use utils::error::{Result, SyncError};
