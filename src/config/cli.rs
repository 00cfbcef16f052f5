use crate::config::toml_config::{AppConfig, FolderErrorPolicy};
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "crm-folder-sync")]
#[command(about = "Create CRM people and attachments from customer folders in cloud storage")]
pub struct SyncCli {
    /// Path to TOML configuration file (defaults to ./sync-config.toml when present)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Root folder holding one sub-folder per customer
    #[arg(short, long)]
    pub root_folder: Option<String>,

    /// What to do when a customer folder fails
    #[arg(long, value_enum)]
    pub on_folder_error: Option<FolderErrorPolicy>,

    /// Override the log file path
    #[arg(long)]
    pub log_file: Option<String>,

    /// List the folders that would be processed without calling the CRM
    #[arg(long)]
    pub dry_run: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl SyncCli {
    pub fn apply_to(&self, config: &mut AppConfig) {
        if let Some(root) = &self.root_folder {
            config.storage.root_folder = root.clone();
        }
        if let Some(policy) = self.on_folder_error {
            config.run.on_folder_error = policy;
        }
        if let Some(log_file) = &self.log_file {
            config.logging.log_file = log_file.clone();
        }
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "generate-customers")]
#[command(about = "Generate synthetic customer documents and upload them to cloud storage")]
pub struct GenerateCli {
    /// Path to TOML configuration file (defaults to ./sync-config.toml when present)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Root folder to create customer folders under (created when missing)
    #[arg(short, long)]
    pub root_folder: Option<String>,

    /// Number of customers to generate (1-100)
    #[arg(short = 'n', long, default_value_t = 5)]
    pub customers: usize,

    /// Additional documents per customer (0-10)
    #[arg(short, long, default_value_t = 2)]
    pub files_per_customer: usize,

    /// Seed for reproducible output
    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "touch-recursive")]
#[command(about = "Touch files and directories recursively in batches.")]
pub struct TouchCli {
    /// The directory to process recursively
    pub directory: String,

    /// Number of files/directories to touch in each batch
    #[arg(short, long, default_value_t = 10)]
    pub batch_size: usize,

    /// Delay in seconds between batches
    #[arg(short = 'n', long, default_value_t = 5)]
    pub delay: u64,

    /// Verbose output (prints each touched file)
    #[arg(short, long)]
    pub verbose: bool,

    /// Patterns to ignore (can be used multiple times)
    #[arg(short, long = "ignore")]
    pub ignore: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_touch_cli_defaults() {
        let cli = TouchCli::parse_from(["touch-recursive", "/data"]);
        assert_eq!(cli.directory, "/data");
        assert_eq!(cli.batch_size, 10);
        assert_eq!(cli.delay, 5);
        assert!(!cli.verbose);
        assert!(cli.ignore.is_empty());
    }

    #[test]
    fn test_touch_cli_repeated_ignore() {
        let cli = TouchCli::parse_from([
            "touch-recursive",
            "/data",
            "-b",
            "3",
            "-n",
            "0",
            "-i",
            ".git",
            "--ignore",
            "node_modules",
        ]);
        assert_eq!(cli.batch_size, 3);
        assert_eq!(cli.delay, 0);
        assert_eq!(cli.ignore, vec![".git", "node_modules"]);
    }

    #[test]
    fn test_sync_cli_overrides_config() {
        let cli = SyncCli::parse_from([
            "crm-folder-sync",
            "--root-folder",
            "Clients",
            "--on-folder-error",
            "skip",
        ]);
        let mut config = AppConfig::default();
        cli.apply_to(&mut config);

        assert_eq!(config.storage.root_folder, "Clients");
        assert_eq!(config.run.on_folder_error, FolderErrorPolicy::Skip);
        assert_eq!(config.logging.log_file, "sync_to_twenty.log");
    }
}
