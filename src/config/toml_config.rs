use crate::utils::error::{Result, SyncError};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "sync-config.toml";
pub const DEFAULT_ROOT_FOLDER: &str = "Wealth Management";

/// 所有元件共用的設定，啟動時建立一次並以參考傳遞
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub crm: CrmConfig,
    pub run: RunConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub api_url: String,
    pub content_url: String,
    pub token_file: String,
    pub root_folder: String,
    pub timeout_seconds: Option<u64>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.dropboxapi.com/2".to_string(),
            content_url: "https://content.dropboxapi.com/2".to_string(),
            token_file: "token.txt".to_string(),
            root_folder: DEFAULT_ROOT_FOLDER.to_string(),
            timeout_seconds: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrmConfig {
    pub endpoint: String,
    pub token_file: String,
    /// `fileFolder` argument of the upload mutation
    pub upload_folder: String,
    /// `type` label written on every attachment
    pub attachment_type: String,
    pub timeout_seconds: Option<u64>,
}

impl Default for CrmConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:3003/graphql".to_string(),
            token_file: "twenty_token.txt".to_string(),
            upload_folder: "Attachment".to_string(),
            attachment_type: "passport".to_string(),
            timeout_seconds: None,
        }
    }
}

/// What the run does after a customer folder fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum FolderErrorPolicy {
    /// Stop the whole run at the first failed folder.
    #[default]
    Abort,
    /// Log the failure and continue with the next folder.
    Skip,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub on_folder_error: FolderErrorPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub log_file: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_file: "sync_to_twenty.log".to_string(),
        }
    }
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| SyncError::ConfigError {
            message: format!("Cannot read config file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    /// 明確指定的檔案必須存在；未指定時若預設檔不存在則使用內建預設值
    pub fn load(explicit: Option<&str>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::from_file(DEFAULT_CONFIG_FILE),
            None => {
                tracing::debug!("No {} found, using built-in defaults", DEFAULT_CONFIG_FILE);
                Ok(Self::default())
            }
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| SyncError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${CRM_ENDPOINT})，未設定的變數保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| SyncError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn storage_timeout(&self) -> Option<Duration> {
        self.storage.timeout_seconds.map(Duration::from_secs)
    }

    pub fn crm_timeout(&self) -> Option<Duration> {
        self.crm.timeout_seconds.map(Duration::from_secs)
    }

    /// `/<root>` as the store expects it, without a trailing slash
    pub fn root_path(&self) -> String {
        format!("/{}", self.storage.root_folder.trim().trim_matches('/'))
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("storage.api_url", &self.storage.api_url)?;
        validation::validate_url("storage.content_url", &self.storage.content_url)?;
        validation::validate_path("storage.token_file", &self.storage.token_file)?;
        validation::validate_folder_name("storage.root_folder", &self.storage.root_folder)?;

        validation::validate_url("crm.endpoint", &self.crm.endpoint)?;
        validation::validate_path("crm.token_file", &self.crm.token_file)?;
        validation::validate_non_empty_string("crm.upload_folder", &self.crm.upload_folder)?;
        validation::validate_non_empty_string("crm.attachment_type", &self.crm.attachment_type)?;

        validation::validate_path("logging.log_file", &self.logging.log_file)?;

        for (field, timeout) in [
            ("storage.timeout_seconds", self.storage.timeout_seconds),
            ("crm.timeout_seconds", self.crm.timeout_seconds),
        ] {
            if let Some(seconds) = timeout {
                validation::validate_positive_number(field, seconds as usize, 1)?;
            }
        }

        Ok(())
    }
}
