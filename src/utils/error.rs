use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("PDF error: {0}")]
    PdfError(#[from] lopdf::Error),

    #[error("Spreadsheet error: {0}")]
    SpreadsheetError(#[from] rust_xlsxwriter::XlsxError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Storage API {endpoint} returned {status}: {summary}")]
    StorageApiError {
        endpoint: String,
        status: u16,
        summary: String,
    },

    #[error("GraphQL {operation} failed: {message}")]
    GraphQlError { operation: String, message: String },

    #[error("No *_info.pdf found in folder {folder}")]
    InfoFileMissing { folder: String },

    #[error("Could not extract customer info from {source_name}: {message}")]
    ExtractionError {
        source_name: String,
        message: String,
    },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    RemoteApi,
    Document,
    Processing,
}

impl SyncError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SyncError::ConfigError { .. }
            | SyncError::InvalidConfigValueError { .. }
            | SyncError::MissingConfigError { .. } => ErrorCategory::Configuration,
            SyncError::ApiError(_) => ErrorCategory::Network,
            SyncError::StorageApiError { .. } | SyncError::GraphQlError { .. } => {
                ErrorCategory::RemoteApi
            }
            SyncError::PdfError(_)
            | SyncError::SpreadsheetError(_)
            | SyncError::InfoFileMissing { .. }
            | SyncError::ExtractionError { .. } => ErrorCategory::Document,
            SyncError::IoError(_)
            | SyncError::SerializationError(_)
            | SyncError::ProcessingError { .. } => ErrorCategory::Processing,
        }
    }

    /// Storage 409 回應中的 `path/not_found` 摘要
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            SyncError::StorageApiError { status: 409, summary, .. } if summary.contains("not_found")
        )
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => {
                "Check the config file, CLI flags and token files, then run again"
            }
            ErrorCategory::Network => "Check network connectivity and that the endpoints are reachable",
            ErrorCategory::RemoteApi => match self {
                SyncError::StorageApiError { status: 401, .. } => {
                    "The storage token was rejected; replace the contents of the token file"
                }
                SyncError::StorageApiError { .. } => {
                    "Verify the root folder exists and the token has access to it"
                }
                _ => "Check the CRM token and that the GraphQL schema matches the mutations",
            },
            ErrorCategory::Document => {
                "Make sure each customer folder holds a readable <Name>_info.pdf"
            }
            ErrorCategory::Processing => "Inspect the log file for the failing step",
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_detection() {
        let err = SyncError::StorageApiError {
            endpoint: "files/get_metadata".to_string(),
            status: 409,
            summary: "path/not_found/..".to_string(),
        };
        assert!(err.is_not_found());
        assert_eq!(err.category(), ErrorCategory::RemoteApi);

        let conflict = SyncError::StorageApiError {
            endpoint: "files/create_folder_v2".to_string(),
            status: 409,
            summary: "path/conflict/folder/...".to_string(),
        };
        assert!(!conflict.is_not_found());
    }

    #[test]
    fn test_info_missing_is_document_error() {
        let err = SyncError::InfoFileMissing {
            folder: "/Wealth Management/Jane Doe".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Document);
        assert!(err.to_string().contains("Jane Doe"));
    }
}
